//! Classic address encoding and validation
//!
//! Classic addresses are base58 with the XRP Ledger alphabet: one version
//! byte (0x00), the 20-byte account id, and a 4-byte double-SHA-256
//! checksum.

use bs58::Alphabet;

use crate::error::{Error, Result};

/// Version byte prefixing a classic address payload
const ACCOUNT_ID_VERSION: u8 = 0x00;

/// Raw account id length in bytes
const ACCOUNT_ID_LEN: usize = 20;

/// Decode a classic address into its 20-byte account id.
pub fn decode_classic_address(address: &str) -> Result<[u8; ACCOUNT_ID_LEN]> {
    let decoded = bs58::decode(address)
        .with_alphabet(Alphabet::RIPPLE)
        .with_check(Some(ACCOUNT_ID_VERSION))
        .into_vec()
        .map_err(|e| Error::InvalidAddress(format!("{}: {}", address, e)))?;

    // with_check strips the checksum but keeps the version byte
    if decoded.len() != ACCOUNT_ID_LEN + 1 {
        return Err(Error::InvalidAddress(format!(
            "{}: unexpected payload length {}",
            address,
            decoded.len()
        )));
    }

    let mut account_id = [0u8; ACCOUNT_ID_LEN];
    account_id.copy_from_slice(&decoded[1..]);
    Ok(account_id)
}

/// Encode a 20-byte account id as a classic address.
pub fn encode_classic_address(account_id: &[u8; ACCOUNT_ID_LEN]) -> String {
    let mut payload = Vec::with_capacity(ACCOUNT_ID_LEN + 1);
    payload.push(ACCOUNT_ID_VERSION);
    payload.extend_from_slice(account_id);
    bs58::encode(payload)
        .with_alphabet(Alphabet::RIPPLE)
        .with_check()
        .into_string()
}

/// Syntactic validity of a classic address.
pub fn is_valid_classic_address(address: &str) -> bool {
    decode_classic_address(address).is_ok()
}
