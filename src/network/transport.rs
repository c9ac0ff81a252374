//! Transport
//!
//! Opens a fresh connection, writes one encoded request, reads the response
//! under a deadline, optionally gunzips it, and tears the connection down.
//! The protocol is stateless: the server services exactly one request per
//! connection and closes, so sockets are never reused or pooled.

use std::io::{Read, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use bytes::Bytes;
use flate2::read::GzDecoder;

use crate::config::Endpoint;
use crate::error::{AddeError, Result};
use crate::protocol::{encode_request, Request};

/// Well-known port of the compressed ADDE service. Responses from this port
/// are gzip streams; any other port is treated as already-decompressed.
/// This is a convention of the original service, not a protocol field.
pub const COMPRESSED_PORT: u16 = 112;

/// Read size used in chunked mode
pub const READ_CHUNK_SIZE: usize = 100 * 1024;

/// Raw-byte excerpt length reported on decompression failure
const ERROR_EXCERPT_LEN: usize = 1000;

/// Perform one request/response exchange with the endpoint.
///
/// Opens a connection under the endpoint's connect deadline, writes the
/// encoded request, and reads the response to end-of-stream under
/// `response_timeout`, an overall deadline for the whole read — not an
/// idle timeout, so a server that drips bytes still fails the exchange at
/// the deadline. `chunked` additionally logs per-chunk progress, useful
/// for long image transfers. The connection is closed on every path; a
/// deadline overrun discards the partial buffer.
pub fn exchange(
    endpoint: &Endpoint,
    request: &Request,
    response_timeout: Duration,
    chunked: bool,
) -> Result<Bytes> {
    let (addr, server_ip) = resolve(endpoint)?;
    let frame = encode_request(
        request,
        server_ip,
        endpoint.port,
        &endpoint.user,
        endpoint.project,
    )?;

    let stream = TcpStream::connect_timeout(&addr, endpoint.connect_timeout).map_err(|e| {
        AddeError::Connection {
            host: endpoint.host.clone(),
            port: endpoint.port,
            reason: e.to_string(),
        }
    })?;
    tracing::debug!(
        "New connection to {}:{} for {}",
        endpoint.host,
        endpoint.port,
        request.service
    );

    // Teardown is guaranteed by the stream going out of scope; the explicit
    // shutdown below is best-effort courtesy to the peer.
    let result = exchange_on(&stream, endpoint, request, &frame, response_timeout, chunked);
    let _ = stream.shutdown(Shutdown::Both);
    tracing::debug!("Connection to {} closed", endpoint.host);

    let raw = result?;
    if endpoint.port == COMPRESSED_PORT {
        decompress(&raw, endpoint)
    } else {
        Ok(raw)
    }
}

/// Write the frame and read the full response under the deadline
fn exchange_on(
    mut stream: &TcpStream,
    endpoint: &Endpoint,
    request: &Request,
    frame: &[u8],
    response_timeout: Duration,
    chunked: bool,
) -> Result<Bytes> {
    stream.set_nodelay(true)?;

    stream.write_all(frame)?;
    stream.flush()?;
    tracing::debug!("Sent {} byte {} request", frame.len(), request.service);

    let timed_out = || AddeError::Timeout {
        service: request.service.to_string(),
        host: endpoint.host.clone(),
    };

    // Fixed-size reads, re-arming the socket timeout from the remaining
    // overall deadline before each one. A single read_to_end under a socket
    // timeout would reset the clock on every received byte and turn the
    // deadline into an idle timeout.
    let deadline = Instant::now() + response_timeout;
    let mut body = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];
    loop {
        let remaining = deadline
            .checked_duration_since(Instant::now())
            .filter(|d| !d.is_zero())
            .ok_or_else(timed_out)?;
        stream.set_read_timeout(Some(remaining))?;
        match stream.read(&mut chunk) {
            Ok(0) => break, // peer signaled end-of-stream
            Ok(n) => {
                body.extend_from_slice(&chunk[..n]);
                if chunked {
                    tracing::debug!("Read {} byte chunk, {} bytes total", n, body.len());
                }
            }
            Err(e) if is_timeout(&e) => return Err(timed_out()),
            Err(e) => return Err(e.into()),
        }
    }

    tracing::debug!("Received {} bytes from {}", body.len(), endpoint.host);
    Ok(Bytes::from(body))
}

/// Gunzip a compressed-port response
fn decompress(raw: &[u8], endpoint: &Endpoint) -> Result<Bytes> {
    let mut decoded = Vec::new();
    match GzDecoder::new(raw).read_to_end(&mut decoded) {
        Ok(_) => {
            tracing::debug!(
                "Server {} sent {} compressed bytes, {} decompressed",
                endpoint.host,
                raw.len(),
                decoded.len()
            );
            Ok(Bytes::from(decoded))
        }
        Err(e) => {
            let excerpt = &raw[..raw.len().min(ERROR_EXCERPT_LEN)];
            Err(AddeError::Protocol(format!(
                "failed to decompress response from {}: {} (raw bytes: {:?})",
                endpoint.host, e, excerpt
            )))
        }
    }
}

/// Resolve the endpoint host to a connectable IPv4 address.
///
/// The request frame embeds the server's IPv4 octets, so an IPv6-only
/// resolution cannot be used.
fn resolve(endpoint: &Endpoint) -> Result<(SocketAddr, [u8; 4])> {
    let addrs = (endpoint.host.as_str(), endpoint.port)
        .to_socket_addrs()
        .map_err(|e| AddeError::Connection {
            host: endpoint.host.clone(),
            port: endpoint.port,
            reason: format!("host resolution failed: {e}"),
        })?;

    for addr in addrs {
        if let IpAddr::V4(v4) = addr.ip() {
            return Ok((addr, v4.octets()));
        }
    }
    Err(AddeError::Connection {
        host: endpoint.host.clone(),
        port: endpoint.port,
        reason: "no IPv4 address for host".to_string(),
    })
}

/// Read timeouts surface as WouldBlock on Unix and TimedOut on Windows
fn is_timeout(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}
