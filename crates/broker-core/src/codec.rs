//! Little-endian IEEE-754 float codec for slot payloads.
//!
//! No framing beyond the byte length itself: the caller never needs to know
//! element count ahead of time, only that the buffer length is a multiple of 8.

use crate::error::BrokerError;

const ELEMENT_SIZE: usize = std::mem::size_of::<f64>();

/// Packs `values` into the little-endian concatenation of their IEEE-754 bits.
pub fn encode(values: &[f64]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * ELEMENT_SIZE);
    for value in values {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Unpacks a little-endian byte buffer into its constituent `f64`s.
///
/// Fails with `BrokerError::InvalidInput` if `bytes.len()` is not a multiple
/// of 8.
pub fn decode(bytes: &[u8]) -> Result<Vec<f64>, BrokerError> {
    if bytes.len() % ELEMENT_SIZE != 0 {
        return Err(BrokerError::InvalidInput(format!(
            "payload length {} is not a multiple of {}",
            bytes.len(),
            ELEMENT_SIZE
        )));
    }

    Ok(bytes
        .chunks_exact(ELEMENT_SIZE)
        .map(|chunk| {
            let mut buf = [0u8; ELEMENT_SIZE];
            buf.copy_from_slice(chunk);
            f64::from_le_bytes(buf)
        })
        .collect())
}
