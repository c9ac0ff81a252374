//! Session facade
//!
//! Ties the layers together: on open, fetches and caches the server's
//! catalog; exposes group/descriptor listing, directory fetches and image
//! fetches. Every call performs exactly one exchange on its own connection
//! (plus at most one internal directory lookup for image defaulting), so
//! sessions are freely shared across threads.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Endpoint;
use crate::error::{AddeError, Result};
use crate::network::exchange;
use crate::protocol::{
    decode_directories, decode_image, Catalog, ImageDirectory, ImagePayload, Request, ServiceTag,
};
use crate::query::{DirectoryQuery, ImageQuery};

/// Catalog files the server publishes its listing under, tried in order
const CATALOG_FILES: [&str; 2] = ["RESOLV.SRV", "PUBLIC.SRV"];

/// One client session against one endpoint.
///
/// Owns the endpoint and a catalog cache populated at most once. No other
/// state persists between calls; the protocol never reuses a connection.
#[derive(Debug)]
pub struct Session {
    endpoint: Endpoint,
    catalog: Mutex<Option<Arc<Catalog>>>,
}

impl Session {
    /// Open a session: validates the endpoint's reachability by fetching
    /// and caching the catalog.
    pub fn open(endpoint: Endpoint) -> Result<Session> {
        let session = Session {
            endpoint,
            catalog: Mutex::new(None),
        };
        let catalog = session.catalog()?;
        tracing::info!(
            "Session open against {}: {} catalog records, {} image groups",
            session.endpoint.host,
            catalog.records().len(),
            catalog.groups().len()
        );
        Ok(session)
    }

    /// The endpoint this session talks to
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The cached catalog, fetching it on first use.
    ///
    /// Concurrent first callers serialize on the cache lock so the catalog
    /// is fetched exactly once per session; the cache is never invalidated.
    pub fn catalog(&self) -> Result<Arc<Catalog>> {
        let mut slot = self.catalog.lock();
        if let Some(catalog) = slot.as_ref() {
            return Ok(Arc::clone(catalog));
        }
        let catalog = Arc::new(self.fetch_catalog()?);
        *slot = Some(Arc::clone(&catalog));
        Ok(catalog)
    }

    /// Unique `(group, format)` pairs of the server's image datasets
    pub fn list_groups(&self) -> Result<Vec<(String, String)>> {
        Ok(self.catalog()?.groups())
    }

    /// Unique `(descriptor, comment)` pairs within `group`
    pub fn list_descriptors(&self, group: &str) -> Result<Vec<(String, String)>> {
        self.catalog()?.descriptors(group)
    }

    /// Fetch directory records matching the query, sorted ascending by
    /// nominal time.
    pub fn fetch_directories<D: ImageDirectory>(&self, query: &DirectoryQuery) -> Result<Vec<D>> {
        let catalog = self.catalog()?;
        let text = query.compose(&catalog, &self.endpoint.protocol_args())?;
        tracing::debug!("Directory request: {text}");
        let response = exchange(
            &self.endpoint,
            &Request::new(ServiceTag::DirectoryGet, text),
            self.endpoint.directory_timeout,
            false,
        )?;
        decode_directories(&response)
    }

    /// Fetch one image matching the query.
    ///
    /// When the query leaves the window size unset, the image's native size
    /// is discovered through an internal directory lookup with the same
    /// filters; if several records match, the smallest by pixel area wins.
    pub fn fetch_image<D: ImageDirectory>(&self, query: &ImageQuery) -> Result<ImagePayload> {
        let catalog = self.catalog()?;
        query.validate(&catalog)?;

        let directory: Option<D> = if query.needs_directory() {
            let records: Vec<D> = self.fetch_directories(&query.directory_query())?;
            let smallest = records.into_iter().min_by_key(|d| {
                let (lines, elements) = d.size();
                u64::from(lines) * u64::from(elements)
            });
            match &smallest {
                Some(d) => {
                    let (lines, elements) = d.size();
                    tracing::info!("Native image size is {lines}x{elements}");
                }
                None => {
                    return Err(AddeError::Protocol(
                        "directory lookup matched no records".to_string(),
                    ))
                }
            }
            smallest
        } else {
            None
        };

        let text = query.compose(&catalog, &self.endpoint.protocol_args(), directory.as_ref())?;
        tracing::debug!("Image request: {text}");
        let response = exchange(
            &self.endpoint,
            &Request::new(ServiceTag::AreaGet, text),
            self.endpoint.image_timeout,
            false,
        )?;
        decode_image(&response)
    }

    /// Close the session. Idempotent; the protocol holds no connection
    /// between calls, so there is nothing to release beyond the session
    /// itself.
    pub fn close(&self) {
        tracing::debug!("Session against {} closed", self.endpoint.host);
    }

    /// Fetch the catalog listing, falling back to the next published file
    /// when the server signals it cannot serve the first one.
    fn fetch_catalog(&self) -> Result<Catalog> {
        let mut last_err = None;
        for file in CATALOG_FILES {
            let text = format!("null null FILE={file}");
            let response = exchange(
                &self.endpoint,
                &Request::new(ServiceTag::TextGet, text),
                self.endpoint.directory_timeout,
                false,
            )?;
            match Catalog::decode(&response) {
                Ok(catalog) => return Ok(catalog),
                Err(e @ AddeError::Protocol(_)) => {
                    tracing::warn!("Catalog file {file} not served by {}: {e}", self.endpoint.host);
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            AddeError::Protocol("catalog fetch failed with no server response".to_string())
        }))
    }
}
