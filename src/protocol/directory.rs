//! Directory decoder
//!
//! A directory response carries one metadata record per stored image. Each
//! record is a fixed 256-byte block (64 big-endian 32-bit words) preceded by
//! an 8-byte sub-header mirroring the outer `(numBytes, fileNumber)` header,
//! and followed by `commentCount × 80` bytes of comment cards.
//!
//! The block's internal word semantics (navigation, calibration, sensor
//! fields) belong to a collaborating directory type supplied by the caller
//! through [`ImageDirectory`]; this decoder only needs the comment count to
//! advance and the nominal time to sort.

use crate::error::{AddeError, Result};
use crate::protocol::{read_i32, server_error_message};

/// Size of one directory block: 64 32-bit words
pub const DIRECTORY_BLOCK_SIZE: usize = 64 * 4;

/// Size of one blank-padded comment card
pub const COMMENT_CARD_SIZE: usize = 80;

/// Per-record sub-header consumed as part of the running offset
const SUB_HEADER_SIZE: usize = 8;

/// The crate's seam to the external directory-object collaborator.
///
/// Implementations interpret the 256-byte block. The decoder and the query
/// layer only use the accessors below; everything else in the block stays
/// opaque to this crate.
pub trait ImageDirectory: Sized {
    /// Decode one 256-byte directory block
    fn from_block(block: &[u8]) -> Result<Self>;

    /// Number of 80-byte comment cards following the block
    fn comment_count(&self) -> usize;

    /// Attach the comment card bytes that followed the block
    fn attach_comments(&mut self, bytes: &[u8]);

    /// Sortable nominal timestamp the image is indexed by
    fn nominal_time(&self) -> i64;

    /// Image size as `(lines, elements)`
    fn size(&self) -> (u32, u32);

    /// Sub-satellite point `(latitude, longitude)`, when navigable
    fn subsatellite_point(&self) -> Option<(f64, f64)>;

    /// Image-box corners `(start_line, end_line, start_element, end_element)`
    fn image_box(&self) -> Option<(i64, i64, i64, i64)>;

    /// Upper-left corner `(line, element)` in image coordinates
    fn upper_left(&self) -> Option<(i64, i64)>;

    /// Calibration unit the stored data is expressed in
    fn calibration_unit(&self) -> Option<String>;
}

/// Decode a directory response into records sorted by nominal time.
///
/// The server's own record ordering is not guaranteed to be chronological;
/// callers (e.g. "take the smallest image") assume time order, so the sort
/// is a correctness contract of this function.
pub fn decode_directories<D: ImageDirectory>(bytes: &[u8]) -> Result<Vec<D>> {
    let num_bytes = read_i32(bytes, 0, "directory header")?;
    let file_number = read_i32(bytes, 4, "directory header")?;

    if num_bytes == 0 {
        return Err(AddeError::Protocol(server_error_message(bytes)));
    }
    if num_bytes < 0 {
        return Err(AddeError::Protocol(format!(
            "negative directory record size {num_bytes}"
        )));
    }

    tracing::debug!(
        "Decoding directory response: {} bytes, file number {}",
        bytes.len(),
        file_number
    );

    // Offsets below count from the start of the record region; the stream
    // ends with a terminator sub-header the loop bound accounts for.
    let payload_len = (bytes.len() - SUB_HEADER_SIZE) as i64;
    let mut records: Vec<D> = Vec::new();
    let mut offset = 0i64;

    while offset < payload_len - num_bytes as i64 {
        let start = offset as usize + SUB_HEADER_SIZE;
        let end = start + DIRECTORY_BLOCK_SIZE;
        if bytes.len() < end {
            return Err(AddeError::Protocol(format!(
                "truncated directory block at byte {}: {} bytes available",
                start,
                bytes.len() - start.min(bytes.len())
            )));
        }

        let mut record = D::from_block(&bytes[start..end])?;

        let comment_bytes = record.comment_count() * COMMENT_CARD_SIZE;
        if comment_bytes > 0 {
            if bytes.len() < end + comment_bytes {
                return Err(AddeError::Protocol(format!(
                    "truncated comment cards at byte {end}: {comment_bytes} bytes expected"
                )));
            }
            record.attach_comments(&bytes[end..end + comment_bytes]);
        }

        records.push(record);
        offset += (SUB_HEADER_SIZE + DIRECTORY_BLOCK_SIZE + comment_bytes) as i64;
    }

    records.sort_by_key(|d| d.nominal_time());
    tracing::debug!("Decoded {} directory records", records.len());
    Ok(records)
}
