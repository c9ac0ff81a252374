//! Catalog decoder
//!
//! Parses the listing the server publishes for dataset discovery. The
//! listing is a sequence of comma-separated `key=value` lines, each framed
//! by a 4-byte length. The relevant keys:
//!
//! - `N1`: group name
//! - `N2`: descriptor name
//! - `TYPE`: data type (`IMAGE`, `TEXT`, `GRID`, ...)
//! - `K`: data format or kind (`AREA`, `GVAR`, `GEOTIFF`, ...)
//! - `R1`/`R2`: beginning/ending dataset position numbers
//! - `C`: free-text comment

use std::collections::HashMap;

use crate::error::{AddeError, Result};
use crate::protocol::{read_i32, server_error_message};

/// Catalog field key: group name
pub const KEY_GROUP: &str = "N1";
/// Catalog field key: descriptor name
pub const KEY_DESCRIPTOR: &str = "N2";
/// Catalog field key: data type
pub const KEY_TYPE: &str = "TYPE";
/// Catalog field key: data format
pub const KEY_FORMAT: &str = "K";
/// Catalog field key: comment
pub const KEY_COMMENT: &str = "C";

/// Record type of interest to this client
const TYPE_IMAGE: &str = "IMAGE";

/// Length of a server-error catalog payload
const ERROR_PAYLOAD_LEN: usize = 96;

/// One line of the catalog listing, as a field-name → value map.
///
/// Duplicate records across lines are expected; consumers filter them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogRecord {
    fields: HashMap<String, String>,
}

impl CatalogRecord {
    /// Look up a field by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Group name (`N1`)
    pub fn group(&self) -> Option<&str> {
        self.get(KEY_GROUP)
    }

    /// Descriptor name (`N2`)
    pub fn descriptor(&self) -> Option<&str> {
        self.get(KEY_DESCRIPTOR)
    }

    /// Data format (`K`)
    pub fn format(&self) -> Option<&str> {
        self.get(KEY_FORMAT)
    }

    /// Comment (`C`)
    pub fn comment(&self) -> Option<&str> {
        self.get(KEY_COMMENT)
    }

    /// Whether this record describes an image dataset with both a group
    /// and a descriptor name
    pub fn is_image(&self) -> bool {
        self.group().is_some()
            && self.descriptor().is_some()
            && self.get(KEY_TYPE) == Some(TYPE_IMAGE)
    }

    fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// The server's published dataset listing, fetched once per session
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<CatalogRecord>,
}

impl Catalog {
    /// Decode a catalog listing response.
    ///
    /// The first 8 bytes are `(totalBytes, reserved)`; a zero total or a
    /// payload of exactly 96 bytes encodes a server-side error. After the
    /// header the stream is a chain of `[len][text]` chunks. The running
    /// total is reassigned to each chunk's length and the chain terminates
    /// on a zero length, i.e. the "total" field acts as a continuation
    /// flag, not a running total. Servers depend on this termination rule.
    pub fn decode(bytes: &[u8]) -> Result<Catalog> {
        let total = read_i32(bytes, 0, "catalog header")?;
        let _reserved = read_i32(bytes, 4, "catalog header")?;

        if total == 0 || bytes.len() == ERROR_PAYLOAD_LEN {
            return Err(AddeError::Protocol(server_error_message(bytes)));
        }

        let mut records = Vec::new();
        let mut offset = 8usize;
        let mut remaining = total;

        while remaining > 0 {
            let chunk_len = read_i32(bytes, offset, "catalog chunk length")?;
            offset += 4;
            remaining = chunk_len;
            if chunk_len < 0 {
                return Err(AddeError::Protocol(format!(
                    "negative catalog chunk length {chunk_len} at byte {offset}"
                )));
            }
            let chunk_len = chunk_len as usize;
            if bytes.len() < offset + chunk_len {
                return Err(AddeError::Protocol(format!(
                    "truncated catalog chunk: {} bytes at byte {}, {} available",
                    chunk_len,
                    offset,
                    bytes.len() - offset
                )));
            }

            let text: String = bytes[offset..offset + chunk_len]
                .iter()
                .map(|&b| b as char)
                .collect();
            let record = parse_line(&text);
            if !record.is_empty() {
                records.push(record);
            }

            offset += chunk_len;
        }

        tracing::debug!("Decoded catalog with {} records", records.len());
        Ok(Catalog { records })
    }

    /// All decoded records in source order
    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    /// Unique `(group, format)` pairs of image records, sorted by name
    pub fn groups(&self) -> Vec<(String, String)> {
        let mut groups: Vec<(String, String)> = self
            .records
            .iter()
            .filter(|r| r.is_image())
            .filter_map(|r| {
                Some((r.group()?.to_string(), r.format().unwrap_or("").to_string()))
            })
            .collect();
        groups.sort();
        groups.dedup();
        groups
    }

    /// Names of all image groups, sorted
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups().into_iter().map(|(n, _)| n).collect();
        names.dedup();
        names
    }

    /// Whether `group` names a known image group (case-insensitive)
    pub fn has_group(&self, group: &str) -> bool {
        self.groups()
            .iter()
            .any(|(n, _)| n.eq_ignore_ascii_case(group))
    }

    /// Unique `(descriptor, comment)` pairs of the image records in
    /// `group`, sorted by name. Fails when the group is unknown.
    pub fn descriptors(&self, group: &str) -> Result<Vec<(String, String)>> {
        if !self.has_group(group) {
            return Err(AddeError::Validation(format!(
                "unknown group '{}'; known groups are {:?}",
                group,
                self.group_names()
            )));
        }
        let mut descriptors: Vec<(String, String)> = self
            .records
            .iter()
            .filter(|r| r.is_image())
            .filter(|r| {
                r.group()
                    .map(|g| g.eq_ignore_ascii_case(group))
                    .unwrap_or(false)
            })
            .filter_map(|r| {
                Some((
                    r.descriptor()?.to_string(),
                    r.comment().unwrap_or("").to_string(),
                ))
            })
            .collect();
        descriptors.sort();
        descriptors.dedup();
        Ok(descriptors)
    }

    /// Whether `descriptor` is known within `group`
    pub fn has_descriptor(&self, group: &str, descriptor: &str) -> bool {
        self.descriptors(group)
            .map(|d| d.iter().any(|(n, _)| n == descriptor))
            .unwrap_or(false)
    }

    /// Check that `group`/`descriptor` name a cataloged image dataset,
    /// failing with the allowed set in the message.
    pub fn validate_dataset(&self, group: &str, descriptor: &str) -> Result<()> {
        if !self.has_group(group) {
            return Err(AddeError::Validation(format!(
                "unknown group '{}'; known groups are {:?}",
                group,
                self.group_names()
            )));
        }
        if !self.has_descriptor(group, descriptor) {
            let known = self.descriptors(group)?;
            return Err(AddeError::Validation(format!(
                "unknown descriptor '{}' for group '{}'; known descriptors are {:?}",
                descriptor,
                group,
                known.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>()
            )));
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn from_records(records: Vec<CatalogRecord>) -> Self {
        Self { records }
    }
}

/// Split one listing line into a record.
///
/// A token without `=` is dropped; a token with several `=` splits at the
/// first one, the remainder becoming the value.
fn parse_line(text: &str) -> CatalogRecord {
    let mut fields = HashMap::new();
    for token in text.split(',') {
        if let Some(eq) = token.find('=') {
            let (key, value) = token.split_at(eq);
            fields.insert(key.to_string(), value[1..].to_string());
        }
    }
    CatalogRecord { fields }
}
