//! Protocol Module
//!
//! Defines the binary wire protocol spoken with ADDE servers. All integers
//! are big-endian.
//!
//! ## Request Format
//!
//! ```text
//! ┌───────────┬──────────┬──────────┬──────────┐
//! │ Version(4)│ SrvIP (4)│ Port (4) │ Tag (4)  │   16-byte preamble
//! ├───────────┴──────────┴──────────┴──────────┤
//! │ SrvIP (4) + Port (4) + LocalIP (4)         │
//! │ User (4) + Project (4) + Password (12)     │
//! │ Tag (4) + BinCount (4) + [TextLen (4)]     │
//! │ Text (120 padded, or 116 zeros + verbatim) │
//! └────────────────────────────────────────────┘
//! ```
//!
//! ## Service Tags
//! - `txtg`: text get (catalog listings)
//! - `adir`: directory get (image metadata)
//! - `aget`: area get (image payload)
//!
//! ## Response Framing
//! - Catalog/directory: 8-byte header `(length, reserved)`
//! - Image: 4-byte header `(length)`
//! - `length == 0` (or a 96-byte catalog payload) signals a server error
//!   whose text occupies bytes [12, 84) of the payload

mod catalog;
mod directory;
mod image;
mod request;

pub use catalog::{Catalog, CatalogRecord};
pub use directory::{decode_directories, ImageDirectory, COMMENT_CARD_SIZE, DIRECTORY_BLOCK_SIZE};
pub use image::{decode_image, ImagePayload};
pub use request::{encode_request, Request, ServiceTag, MAX_INLINE_TEXT};

/// Byte window of a server-signaled error payload holding the message text
const ERROR_MESSAGE_RANGE: std::ops::Range<usize> = 12..84;

/// Extract the human-readable message from a server error payload.
///
/// Keeps only ASCII alphabetic characters and spaces from bytes [12, 84);
/// everything else in the window is frame noise.
pub(crate) fn server_error_message(payload: &[u8]) -> String {
    let end = ERROR_MESSAGE_RANGE.end.min(payload.len());
    let start = ERROR_MESSAGE_RANGE.start.min(end);
    payload[start..end]
        .iter()
        .map(|&b| b as char)
        .filter(|c| c.is_ascii_alphabetic() || *c == ' ')
        .collect()
}

/// Read a big-endian i32 at `offset`, failing with a Protocol error on a
/// short buffer.
pub(crate) fn read_i32(bytes: &[u8], offset: usize, what: &str) -> crate::Result<i32> {
    let end = offset + 4;
    if bytes.len() < end {
        return Err(crate::AddeError::Protocol(format!(
            "truncated response: expected {} at byte {}, got {} bytes total",
            what,
            offset,
            bytes.len()
        )));
    }
    Ok(i32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ]))
}
