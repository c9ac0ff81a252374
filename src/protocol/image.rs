//! Image decoder
//!
//! An image response is a 4-byte length header followed by the raw area
//! payload. The payload stays opaque here; a collaborating image type
//! decodes the per-band pixel arrays.

use bytes::Bytes;

use crate::error::{AddeError, Result};
use crate::protocol::{read_i32, server_error_message};

/// Raw image payload handed to the external image-decoding collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload(Bytes);

impl ImagePayload {
    /// The raw payload bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the payload, returning the underlying buffer
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Strip the length header from an image response.
///
/// A zero length signals a server error carrying its message in the usual
/// [12, 84) window.
pub fn decode_image(bytes: &[u8]) -> Result<ImagePayload> {
    let num_bytes = read_i32(bytes, 0, "image header")?;
    if num_bytes == 0 {
        return Err(AddeError::Protocol(server_error_message(bytes)));
    }
    Ok(ImagePayload(Bytes::copy_from_slice(&bytes[4..])))
}
