//! Endpoint configuration
//!
//! An [`Endpoint`] identifies one ADDE server together with the credentials
//! and deadlines used for every exchange. Immutable after construction.

use std::time::Duration;

use crate::error::{AddeError, Result};
use crate::query::ProtocolArgs;

/// Default ADDE service port. Responses from this port are gzip-compressed.
pub const DEFAULT_PORT: u16 = 112;

/// One ADDE server endpoint
#[derive(Debug, Clone)]
pub struct Endpoint {
    // -------------------------------------------------------------------------
    // Server identity
    // -------------------------------------------------------------------------
    /// Server host name or address
    pub host: String,

    /// Server TCP port
    pub port: u16,

    // -------------------------------------------------------------------------
    // Credentials
    // -------------------------------------------------------------------------
    /// Numeric project id sent with every request
    pub project: i32,

    /// User code, at most 4 ASCII characters (space-padded on the wire)
    pub user: String,

    /// Password. Unused by the wire format (the password field is sent as
    /// zeros) but kept for endpoints that require out-of-band registration.
    pub password: String,

    // -------------------------------------------------------------------------
    // Deadlines
    // -------------------------------------------------------------------------
    /// Connect deadline for every exchange
    pub connect_timeout: Duration,

    /// Response deadline for catalog and directory exchanges
    pub directory_timeout: Duration,

    /// Response deadline for image exchanges (image payloads take
    /// materially longer than listings)
    pub image_timeout: Duration,

    // -------------------------------------------------------------------------
    // Protocol arguments
    // -------------------------------------------------------------------------
    /// Server-side trace level appended to every request
    pub trace: u32,

    /// Protocol version appended to every request
    pub version: u32,
}

impl Endpoint {
    /// Create a builder for the given host
    pub fn builder(host: impl Into<String>) -> EndpointBuilder {
        EndpointBuilder {
            endpoint: Endpoint {
                host: host.into(),
                port: DEFAULT_PORT,
                project: 0,
                user: "XXXX".to_string(),
                password: String::new(),
                connect_timeout: Duration::from_secs(5),
                directory_timeout: Duration::from_secs(10),
                image_timeout: Duration::from_secs(600),
                trace: 0,
                version: 1,
            },
        }
    }

    /// The trace/version arguments appended to every composed request
    pub fn protocol_args(&self) -> ProtocolArgs {
        ProtocolArgs {
            trace: self.trace,
            version: self.version,
        }
    }
}

/// Builder for Endpoint
pub struct EndpointBuilder {
    endpoint: Endpoint,
}

impl EndpointBuilder {
    /// Set the server TCP port
    pub fn port(mut self, port: u16) -> Self {
        self.endpoint.port = port;
        self
    }

    /// Set the numeric project id
    pub fn project(mut self, project: i32) -> Self {
        self.endpoint.project = project;
        self
    }

    /// Set the user code (at most 4 ASCII characters)
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.endpoint.user = user.into();
        self
    }

    /// Set the password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.endpoint.password = password.into();
        self
    }

    /// Set the connect deadline
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.endpoint.connect_timeout = timeout;
        self
    }

    /// Set the response deadline for catalog/directory exchanges
    pub fn directory_timeout(mut self, timeout: Duration) -> Self {
        self.endpoint.directory_timeout = timeout;
        self
    }

    /// Set the response deadline for image exchanges
    pub fn image_timeout(mut self, timeout: Duration) -> Self {
        self.endpoint.image_timeout = timeout;
        self
    }

    /// Set the server-side trace level
    pub fn trace(mut self, trace: u32) -> Self {
        self.endpoint.trace = trace;
        self
    }

    /// Set the protocol version
    pub fn version(mut self, version: u32) -> Self {
        self.endpoint.version = version;
        self
    }

    /// Validate and build the endpoint
    pub fn build(self) -> Result<Endpoint> {
        let e = self.endpoint;
        if e.host.is_empty() {
            return Err(AddeError::Validation("host must not be empty".to_string()));
        }
        if e.user.len() > 4 || !e.user.is_ascii() {
            return Err(AddeError::Validation(format!(
                "user code '{}' must be at most 4 ASCII characters",
                e.user
            )));
        }
        Ok(e)
    }
}
