//! Query Module
//!
//! Turns structured caller parameters into protocol-correct request text.
//! All composition is pure: validation and defaulting happen here, before
//! any network exchange.
//!
//! ## Request text shape
//!
//! ```text
//! directory:  GROUP DESCR POSITION [BAND=..] [DAY=..] [TIME=s e] [AUX=..] TRACE=.. VERSION=..
//! image:      GROUP DESCR POS  CT CP d1 d2 X lines elems  LMAG=.. EMAG=..
//!             BAND=.. [DAY=..] [TIME=s e] [UNIT=..] SPAC=.. CAL=.. DOC=.. AUX=.. TRACE=.. VERSION=..
//! ```

mod directory;
mod image;
mod param;

pub use directory::DirectoryQuery;
pub use image::ImageQuery;
pub use param::{Band, CoordPos, CoordType, Position, ProtocolArgs, POSITION_ALL_SENTINEL};

/// Render YES/NO flags the way the protocol spells them
pub(crate) fn yes_no(v: bool) -> &'static str {
    if v {
        "YES"
    } else {
        "NO"
    }
}
