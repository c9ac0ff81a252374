//! # adde
//!
//! A client for the ADDE protocol: a stateless, connection-per-exchange
//! binary protocol for querying a remote catalog service and retrieving
//! scientific raster imagery and its metadata.
//!
//! - Exact binary request encoding (dual inline/extended layout)
//! - Transport with independent connect and response deadlines
//! - Catalog, directory and image response decoders
//! - Request composition with coordinate/magnification defaulting
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Session                               │
//! │        (cached catalog, list/fetch operations)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Query Composer                            │
//! │      (validation, defaulting, request text)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Encoder   │─────────▶│  Transport  │
//!   │  (binary)   │          │ (1 conn/req)│
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │  Decoders   │
//!                           │ cat/dir/img │
//!                           └─────────────┘
//! ```
//!
//! The decoded directory blocks and image payloads stay opaque: callers
//! plug in their own directory type through [`ImageDirectory`] and receive
//! raw [`ImagePayload`] bytes for their image decoder.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod network;
pub mod protocol;
pub mod query;
pub mod session;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Endpoint, EndpointBuilder, DEFAULT_PORT};
pub use error::{AddeError, Result};
pub use protocol::{Catalog, CatalogRecord, ImageDirectory, ImagePayload};
pub use query::{Band, CoordPos, CoordType, DirectoryQuery, ImageQuery, Position};
pub use session::Session;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
