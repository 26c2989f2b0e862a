// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod chains;

pub use chains::{
    ChainVoteConfig, ConfigError, DEFAULT_CHAINVOTE_CONTRACT, DEFAULT_RPC_URL, SEPOLIA_CHAIN_ID,
};
pub use crate::fhe::SessionConfig;
