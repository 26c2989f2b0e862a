// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Address validation and EIP-55 normalization

use ethers::types::Address;
use ethers::utils::to_checksum;

use super::error::FheError;

const ADDRESS_HEX_LEN: usize = 40;

/// Parse `0x` + 40 hex digits (any case) into an address
pub fn parse_address(field: &str, value: &str) -> Result<Address, FheError> {
    let invalid = |reason: &str| FheError::InvalidAddress {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| invalid("missing 0x prefix"))?;
    if digits.len() != ADDRESS_HEX_LEN {
        return Err(invalid(&format!(
            "expected {} hex digits, got {}",
            ADDRESS_HEX_LEN,
            digits.len()
        )));
    }
    let bytes = hex::decode(digits).map_err(|e| invalid(&e.to_string()))?;
    Ok(Address::from_slice(&bytes))
}

/// Canonical checksummed form of an address
pub fn checksum_address(field: &str, value: &str) -> Result<String, FheError> {
    let address = parse_address(field, value)?;
    Ok(to_checksum(&address, None))
}
