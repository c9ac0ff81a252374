//! Query parameter types
//!
//! Tagged variants replace the free-form strings the protocol grew up with.
//! Each type parses an explicit grammar and renders its exact wire spelling;
//! nothing downstream branches on runtime shapes.

use std::fmt;
use std::str::FromStr;

use crate::error::AddeError;

/// Reserved 32-bit sentinel the server understands as "all positions".
/// It is the big-endian integer reading of the ASCII bytes `"ALL "`.
pub const POSITION_ALL_SENTINEL: i32 = 1095519264;

// =============================================================================
// Position
// =============================================================================

/// Dataset position selector.
///
/// Grammar accepted by [`FromStr`]: empty | integer | `ALL` | `X` |
/// `<int> <int>` pair. Anything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// No selection; the protocol form is `0 0`
    #[default]
    Unset,
    /// Every stored position (sent as the reserved sentinel integer)
    All,
    /// Server-chosen position, sent as `X X`
    Wildcard,
    /// One position: non-negative values are absolute, negative values are
    /// time-relative offsets (sent as `n 0`)
    At(i32),
    /// An inclusive position range
    Range(i32, i32),
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Position::Unset => write!(f, "0 0"),
            Position::All => write!(f, "{POSITION_ALL_SENTINEL}"),
            Position::Wildcard => write!(f, "X X"),
            Position::At(p) if p < 0 => write!(f, "{p} 0"),
            Position::At(p) => write!(f, "{p}"),
            Position::Range(a, b) => write!(f, "{a} {b}"),
        }
    }
}

impl FromStr for Position {
    type Err = AddeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Position::Unset);
        }
        if s.eq_ignore_ascii_case("all") {
            return Ok(Position::All);
        }
        if s.eq_ignore_ascii_case("x") {
            return Ok(Position::Wildcard);
        }
        if let Ok(p) = s.parse::<i32>() {
            return Ok(Position::At(p));
        }
        let parts: Vec<&str> = s.split_whitespace().collect();
        if let [a, b] = parts[..] {
            if let (Ok(a), Ok(b)) = (a.parse::<i32>(), b.parse::<i32>()) {
                return Ok(Position::Range(a, b));
            }
        }
        Err(AddeError::Validation(format!(
            "invalid position '{s}': expected an integer, 'ALL', 'X', or an integer pair"
        )))
    }
}

// =============================================================================
// Band
// =============================================================================

/// Spectral band selector.
///
/// Grammar accepted by [`FromStr`]: `ALL` | integer | `<int> <int>` pair.
/// Directory requests treat a pair as an inclusive range; image requests
/// treat it as exactly two bands. That asymmetry belongs to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    /// Every band of the dataset
    All,
    /// One band number
    Number(u32),
    /// A start/end band pair
    Range(u32, u32),
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Band::All => write!(f, "ALL"),
            Band::Number(b) => write!(f, "{b}"),
            Band::Range(a, b) => write!(f, "{a} {b}"),
        }
    }
}

impl FromStr for Band {
    type Err = AddeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Band::All);
        }
        if let Ok(b) = s.parse::<u32>() {
            return Ok(Band::Number(b));
        }
        let parts: Vec<&str> = s.split_whitespace().collect();
        if let [a, b] = parts[..] {
            if let (Ok(a), Ok(b)) = (a.parse::<u32>(), b.parse::<u32>()) {
                return Ok(Band::Range(a, b));
            }
        }
        Err(AddeError::Validation(format!(
            "invalid band '{s}': expected 'ALL', a band number, or a 'start end' pair"
        )))
    }
}

// =============================================================================
// Coordinates
// =============================================================================

/// Coordinate system the start coordinates are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordType {
    /// Area (file) coordinates
    #[default]
    Area,
    /// Original image coordinates
    Image,
    /// Earth latitude/longitude
    Earth,
}

impl CoordType {
    /// One-letter wire form
    pub fn code(&self) -> char {
        match self {
            CoordType::Area => 'A',
            CoordType::Image => 'I',
            CoordType::Earth => 'E',
        }
    }
}

/// How the start coordinates anchor the requested window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordPos {
    /// Start coordinates are the upper-left corner
    #[default]
    Upper,
    /// Start coordinates are the window center
    Centered,
}

impl CoordPos {
    /// One-letter wire form
    pub fn code(&self) -> char {
        match self {
            CoordPos::Upper => 'U',
            CoordPos::Centered => 'C',
        }
    }
}

// =============================================================================
// Protocol arguments
// =============================================================================

/// Arguments appended to every composed request, sorted by name and
/// uppercased. The recognized set is closed: trace level and protocol
/// version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolArgs {
    /// Server-side trace level
    pub trace: u32,
    /// Protocol version
    pub version: u32,
}

impl ProtocolArgs {
    /// Render as `TRACE=t VERSION=v`
    pub fn clauses(&self) -> String {
        format!("TRACE={} VERSION={}", self.trace, self.version)
    }
}

impl Default for ProtocolArgs {
    fn default() -> Self {
        Self {
            trace: 0,
            version: 1,
        }
    }
}
