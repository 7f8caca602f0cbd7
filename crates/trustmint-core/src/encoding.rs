//! # Text Codecs
//!
//! Pure encoding helpers shared by the key and token layers:
//!
//! - RFC 4648 base32 (standard alphabet, no padding) for seeds, public
//!   identifiers, and claim IDs.
//! - CRC-16/XMODEM checksums embedded in seeds and public identifiers.
//! - base64url (no padding) for token segments and standard base64
//!   (no padding) for exported raw key bytes.
//!
//! Base32 and CRC-16 are implemented here rather than pulled from a crate;
//! both are a handful of lines and the key formats only need the one
//! alphabet and the one polynomial.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// CRC-16/XMODEM polynomial.
const CRC16_POLY: u16 = 0x1021;

/// Encode bytes as unpadded RFC 4648 base32.
pub fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8 + 4) / 5);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;
    for &byte in data {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
        buffer &= (1 << bits) - 1;
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

/// Decode unpadded RFC 4648 base32.
///
/// Rejects characters outside the alphabet, padding, lengths that cannot
/// come from the encoder, and non-zero trailing bits, so every accepted
/// string has exactly one byte sequence and vice versa.
pub fn base32_decode(text: &str) -> Result<Vec<u8>, String> {
    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;
    for (position, c) in text.bytes().enumerate() {
        let value = match c {
            b'A'..=b'Z' => c - b'A',
            b'2'..=b'7' => c - b'2' + 26,
            _ => return Err(format!("invalid character {:?} at position {position}", c as char)),
        };
        buffer = (buffer << 5) | u32::from(value);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
        buffer &= (1 << bits) - 1;
    }
    if bits >= 5 {
        return Err(format!("invalid length {}", text.len()));
    }
    if buffer != 0 {
        return Err("non-zero trailing bits".to_string());
    }
    Ok(out)
}

/// CRC-16/XMODEM (poly 0x1021, init 0, no reflection, no final xor).
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ CRC16_POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Append the little-endian CRC-16 of `payload` to it.
pub(crate) fn append_checksum(payload: &mut Vec<u8>) {
    let crc = crc16(payload);
    payload.extend_from_slice(&crc.to_le_bytes());
}

/// Split a checksummed buffer into payload, verifying the trailing CRC-16.
pub(crate) fn strip_checksum(raw: &[u8]) -> Option<&[u8]> {
    if raw.len() < 2 {
        return None;
    }
    let (payload, checksum) = raw.split_at(raw.len() - 2);
    let expected = u16::from_le_bytes([checksum[0], checksum[1]]);
    (crc16(payload) == expected).then_some(payload)
}

/// Encode bytes as unpadded base64url.
pub fn base64url_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode unpadded base64url.
pub fn base64url_decode(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(text)
}

/// Encode bytes as unpadded standard base64.
pub fn base64_encode(data: &[u8]) -> String {
    STANDARD_NO_PAD.encode(data)
}
