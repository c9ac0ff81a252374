//! Request encoder
//!
//! Serializes a service tag and request text into the fixed binary envelope
//! the server expects. Two layouts exist depending on the text length; the
//! server's parsers are layout-sensitive, so the split is reproduced exactly.

use crate::error::{AddeError, Result};

/// Wire protocol version, fixed
pub const PROTOCOL_VERSION: i32 = 1;

/// Longest request text carried inline (space-padded); longer text switches
/// to the extended layout
pub const MAX_INLINE_TEXT: usize = 120;

/// Zero filler preceding the verbatim text in the extended layout
const EXTENDED_PADDING: usize = 116;

/// Local IP placeholder sent in the request body. The server does not route
/// anything back to it, so a loopback marker suffices.
const LOCAL_IP: [u8; 4] = [127, 0, 1, 1];

/// Service tags understood by this client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceTag {
    /// `txtg` - text get, used for catalog listings
    TextGet,
    /// `adir` - directory get, used for image metadata
    DirectoryGet,
    /// `aget` - area get, used for image payloads
    AreaGet,
}

impl ServiceTag {
    /// The 4-character wire form of the tag
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceTag::TextGet => "txtg",
            ServiceTag::DirectoryGet => "adir",
            ServiceTag::AreaGet => "aget",
        }
    }
}

impl std::fmt::Display for ServiceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request: a service tag plus free-text body. Constructed fresh per
/// call and never reused.
#[derive(Debug, Clone)]
pub struct Request {
    /// Service tag selecting the server-side handler
    pub service: ServiceTag,

    /// Request text composed by the query layer
    pub text: String,
}

impl Request {
    pub fn new(service: ServiceTag, text: impl Into<String>) -> Self {
        Self {
            service,
            text: text.into(),
        }
    }
}

/// Encode a request into its binary envelope.
///
/// `server_ip` and `server_port` identify the server the frame is sent to
/// (the server echoes them back through its own layers), `user` is the
/// 4-character user code and `project` the numeric project id.
///
/// Layouts:
/// - text ≤ 120 bytes: text right-padded with spaces to exactly 120 bytes
/// - text > 120 bytes: a 4-byte length-with-binary field, a 4-byte text
///   length field, 116 zero bytes, then the verbatim unpadded text
pub fn encode_request(
    request: &Request,
    server_ip: [u8; 4],
    server_port: u16,
    user: &str,
    project: i32,
) -> Result<Vec<u8>> {
    let text = request.text.as_str();
    if !text.is_ascii() {
        return Err(AddeError::Validation(format!(
            "request text must be ASCII: {text:?}"
        )));
    }
    if user.len() > 4 || !user.is_ascii() {
        return Err(AddeError::Validation(format!(
            "user code '{user}' must be at most 4 ASCII characters"
        )));
    }

    let tag = pad4(request.service.as_str());
    let port_be = (server_port as i32).to_be_bytes();
    let text_len = text.len();

    let mut frame = Vec::with_capacity(176 + text_len);

    // 16-byte preamble
    frame.extend_from_slice(&PROTOCOL_VERSION.to_be_bytes());
    frame.extend_from_slice(&server_ip);
    frame.extend_from_slice(&port_be);
    frame.extend_from_slice(&tag);

    // Body
    frame.extend_from_slice(&server_ip);
    frame.extend_from_slice(&port_be);
    frame.extend_from_slice(&LOCAL_IP);
    frame.extend_from_slice(&pad4(user));
    frame.extend_from_slice(&project.to_be_bytes());
    frame.extend_from_slice(&[0u8; 12]); // password, unused on the wire
    frame.extend_from_slice(&tag);

    // This client never appends trailing binary data, so the binary count
    // contributes nothing to the extended length field.
    let binary_count: i32 = 0;

    if text_len > MAX_INLINE_TEXT {
        frame.extend_from_slice(&(text_len as i32 + binary_count).to_be_bytes());
        frame.extend_from_slice(&(text_len as i32).to_be_bytes());
        frame.extend_from_slice(&[0u8; EXTENDED_PADDING]);
        frame.extend_from_slice(text.as_bytes());
    } else {
        frame.extend_from_slice(&binary_count.to_be_bytes());
        frame.extend_from_slice(text.as_bytes());
        frame.resize(frame.len() + (MAX_INLINE_TEXT - text_len), b' ');
    }

    Ok(frame)
}

/// Space-pad a short ASCII token to exactly 4 bytes
fn pad4(s: &str) -> [u8; 4] {
    let mut out = [b' '; 4];
    for (i, b) in s.as_bytes().iter().take(4).enumerate() {
        out[i] = *b;
    }
    out
}
