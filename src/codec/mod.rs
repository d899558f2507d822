//! Binary UUID codec
//!
//! Stateless conversion between canonical UUID text
//! (`xxxxxxxx-xxxx-Vxxx-Nxxx-xxxxxxxxxxxx`) and the 16-byte form stored
//! in `BINARY(16)` columns.
//!
//! Two byte layouts exist:
//!
//! - [`BinaryLayout::Raw`] - bytes in the same order as the hex digits
//! - [`BinaryLayout::SortOptimized`] - the time fields of a version 1 UUID
//!   are moved to the front (`time_hi`, `time_mid`, `time_low`, then the
//!   clock sequence and node), so byte-wise comparison roughly follows
//!   creation time and index inserts stay append-mostly

use crate::core::{Result, UuidError};
use regex::Regex;
use uuid::Uuid;

lazy_static::lazy_static! {
    static ref UUID_TEXT_PATTERN: Regex = Regex::new(
        r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$"
    ).unwrap();
}

pub const UUID_BYTES: usize = 16;
pub const UUID_TEXT_LEN: usize = 36;

/// Byte order of a stored binary UUID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BinaryLayout {
    #[default]
    Raw,
    SortOptimized,
}

impl BinaryLayout {
    pub fn from_optimize(optimize: bool) -> Self {
        if optimize {
            Self::SortOptimized
        } else {
            Self::Raw
        }
    }

    pub fn is_optimized(self) -> bool {
        matches!(self, Self::SortOptimized)
    }

    /// Raw byte order -> this layout
    pub fn encode(self, raw: [u8; UUID_BYTES]) -> [u8; UUID_BYTES] {
        match self {
            Self::Raw => raw,
            Self::SortOptimized => {
                let mut out = [0u8; UUID_BYTES];
                out[0..2].copy_from_slice(&raw[6..8]);
                out[2..4].copy_from_slice(&raw[4..6]);
                out[4..8].copy_from_slice(&raw[0..4]);
                out[8..].copy_from_slice(&raw[8..]);
                out
            }
        }
    }

    /// This layout -> raw byte order
    pub fn decode(self, stored: [u8; UUID_BYTES]) -> [u8; UUID_BYTES] {
        match self {
            Self::Raw => stored,
            Self::SortOptimized => {
                let mut out = [0u8; UUID_BYTES];
                out[0..4].copy_from_slice(&stored[4..8]);
                out[4..6].copy_from_slice(&stored[2..4]);
                out[6..8].copy_from_slice(&stored[0..2]);
                out[8..].copy_from_slice(&stored[8..]);
                out
            }
        }
    }
}

/// Checks for canonical 36-character UUID text (versions 1-5, RFC variant)
pub fn is_uuid_text(text: &str) -> bool {
    text.len() == UUID_TEXT_LEN && UUID_TEXT_PATTERN.is_match(text)
}

/// Heuristic check for a stored binary UUID
///
/// The value must be 16 bytes, must not be valid UTF-8 (so a 16-character
/// string is never mistaken for a key) and must decode to UUID text.
pub fn is_binary_uuid(bytes: &[u8], optimized: bool) -> bool {
    if bytes.len() != UUID_BYTES || std::str::from_utf8(bytes).is_ok() {
        return false;
    }

    match binary_to_text(bytes, optimized) {
        Ok(text) => is_uuid_text(&text),
        Err(_) => false,
    }
}

/// Converts a stored binary UUID to lower-case canonical text
pub fn binary_to_text(bytes: &[u8], optimized: bool) -> Result<String> {
    let stored: [u8; UUID_BYTES] = bytes.try_into().map_err(|_| {
        UuidError::FormatError(format!(
            "binary UUID must be {} bytes, got {}",
            UUID_BYTES,
            bytes.len()
        ))
    })?;

    let raw = BinaryLayout::from_optimize(optimized).decode(stored);
    Ok(Uuid::from_bytes(raw).hyphenated().to_string())
}

/// Converts UUID text (dashes optional) to its binary form
///
/// Returns `Ok(None)` when the value is not UUID-shaped at all. A value that
/// is already a raw binary UUID is returned unchanged, so re-encoding is a
/// no-op. Hex input of the wrong length is a [`UuidError::FormatError`].
pub fn text_to_binary(value: impl AsRef<[u8]>, optimize: bool) -> Result<Option<[u8; UUID_BYTES]>> {
    let value = value.as_ref();
    let stripped: Vec<u8> = value.iter().copied().filter(|b| *b != b'-').collect();

    if !stripped.is_empty() && stripped.iter().all(u8::is_ascii_hexdigit) {
        let raw = decode_hex(&stripped)?;
        return Ok(Some(BinaryLayout::from_optimize(optimize).encode(raw)));
    }

    // Checked on the unstripped value: 0x2d is a legal byte inside binary data
    if is_binary_uuid(value, false) {
        let mut out = [0u8; UUID_BYTES];
        out.copy_from_slice(value);
        return Ok(Some(out));
    }

    Ok(None)
}

/// Lower-cases and re-dashes UUID text, `None` if it is not 32 hex digits
pub fn normalize_text(text: &str) -> Option<String> {
    let stripped: Vec<u8> = text.bytes().filter(|b| *b != b'-').collect();
    if !stripped.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    decode_hex(&stripped)
        .ok()
        .map(|raw| Uuid::from_bytes(raw).hyphenated().to_string())
}

fn decode_hex(hex: &[u8]) -> Result<[u8; UUID_BYTES]> {
    if hex.len() != UUID_BYTES * 2 {
        return Err(UuidError::FormatError(format!(
            "expected {} hex digits, got {}",
            UUID_BYTES * 2,
            hex.len()
        )));
    }

    let text = std::str::from_utf8(hex).map_err(|e| UuidError::FormatError(e.to_string()))?;
    Uuid::try_parse(text)
        .map(Uuid::into_bytes)
        .map_err(|e| UuidError::FormatError(e.to_string()))
}
