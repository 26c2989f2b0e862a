// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Encrypted vote payload handed to the contract gateway

use serde::{Deserialize, Serialize};

use super::error::FheError;
use super::sdk::EncryptionOutput;

/// Width of a cipher handle (`bytes32` on the contract side)
pub const CIPHER_HANDLE_LEN: usize = 32;

/// `{cipherHandle, proof}` as `0x`-prefixed hex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedVotePayload {
    pub cipher_handle: String,
    pub proof: String,
}

impl EncryptedVotePayload {
    /// Take the first handle and the input proof of an encryption result
    pub fn from_output(output: EncryptionOutput) -> Result<Self, FheError> {
        let handle = output
            .handles
            .first()
            .ok_or_else(|| FheError::EncryptionFailed {
                reason: "encryption returned no handles".to_string(),
            })?;
        if handle.len() != CIPHER_HANDLE_LEN {
            return Err(FheError::EncryptionFailed {
                reason: format!(
                    "cipher handle must be {} bytes, got {}",
                    CIPHER_HANDLE_LEN,
                    handle.len()
                ),
            });
        }

        Ok(Self {
            cipher_handle: to_hex(handle),
            proof: to_hex(&output.input_proof),
        })
    }

    /// Handle as the `bytes32` call argument
    pub fn handle_bytes(&self) -> Result<[u8; CIPHER_HANDLE_LEN], String> {
        let bytes = from_hex(&self.cipher_handle)?;
        bytes
            .try_into()
            .map_err(|b: Vec<u8>| format!("cipher handle must be 32 bytes, got {}", b.len()))
    }

    /// Proof as the `bytes` call argument
    pub fn proof_bytes(&self) -> Result<Vec<u8>, String> {
        from_hex(&self.proof)
    }
}

/// `0x` + lowercase hex
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Inverse of [`to_hex`]; the prefix is mandatory
pub fn from_hex(value: &str) -> Result<Vec<u8>, String> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| format!("'{}' is missing the 0x prefix", value))?;
    hex::decode(digits).map_err(|e| format!("invalid hex '{}': {}", value, e))
}
