//! Conversion between entry names and their fixed-size on-disk form.
//!
//! Names are stored in Shift_JIS. The same code page is used for reading and writing,
//! so any name written by [`crate::write::ArcWriter`] reads back unchanged.

use std::borrow::Cow;

use encoding_rs::SHIFT_JIS;
use tracing::warn;

use crate::error::{Error, Result};

/// Decode a zero padded name, stopping at the first NUL byte.
///
/// Bytes after the first NUL are ignored even when they are not padding, so a
/// record starting with NUL decodes to an empty name and its entry is rejected.
pub fn decode_name(raw: &[u8]) -> Cow<'_, str> {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    let (name, had_errors) = SHIFT_JIS.decode_without_bom_handling(&raw[..end]);
    if had_errors {
        warn!(raw = ?&raw[..end], "name contains bytes outside of shift_jis");
    }
    name
}

/// Encode a name into exactly `N` bytes, zero padding short names.
///
/// Names longer than `N` bytes are cut at the last character that still fits.
pub fn encode_name<const N: usize>(name: &str) -> Result<[u8; N]> {
    if name.is_empty() {
        return Err(Error::InvalidEntryName(name.to_owned()));
    }

    let (encoded, _, had_errors) = SHIFT_JIS.encode(name);
    if had_errors || encoded.contains(&0) {
        return Err(Error::InvalidEntryName(name.to_owned()));
    }

    let mut out = [0u8; N];
    if encoded.len() <= N {
        out[..encoded.len()].copy_from_slice(&encoded);
        return Ok(out);
    }

    let mut used = 0;
    let mut buf = [0u8; 4];
    for c in name.chars() {
        let (bytes, _, _) = SHIFT_JIS.encode(c.encode_utf8(&mut buf));
        if used + bytes.len() > N {
            break;
        }
        out[used..used + bytes.len()].copy_from_slice(&bytes);
        used += bytes.len();
    }
    warn!(name, kept = used, "name truncated to fit the record");

    Ok(out)
}
