//! Network Module
//!
//! Connection-per-exchange TCP transport.
//!
//! ## Model
//! - One fresh connection per request; the server closes after responding
//! - Two independent deadlines: connect and response
//! - Responses from the well-known compressed port are gunzipped

mod transport;

pub use transport::{exchange, COMPRESSED_PORT, READ_CHUNK_SIZE};
