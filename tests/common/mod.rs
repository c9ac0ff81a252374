//! Shared test support: a fake in-process ADDE server, synthetic response
//! builders, and a minimal directory type implementing the decoder seam.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use adde::protocol::ImageDirectory;
use adde::{AddeError, Result};

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

// =============================================================================
// Synthetic directory type
// =============================================================================

/// Directory collaborator used by the tests: 64 big-endian words plus raw
/// comment bytes. Word layout (test convention):
/// 3 = nominal date, 4 = nominal time, 5/6 = upper-left line/element,
/// 8/9 = lines/elements, 20/21 = sub-satellite lat/lon (0 = none),
/// 13 = 1 when the stored unit is RAW, 63 = comment card count.
#[derive(Debug, Clone)]
pub struct TestDirectory {
    pub words: [i32; 64],
    pub comments: Vec<u8>,
}

impl ImageDirectory for TestDirectory {
    fn from_block(block: &[u8]) -> Result<Self> {
        if block.len() != 256 {
            return Err(AddeError::Protocol(format!(
                "directory block must be 256 bytes, got {}",
                block.len()
            )));
        }
        let mut words = [0i32; 64];
        for (i, chunk) in block.chunks_exact(4).enumerate() {
            words[i] = i32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(Self {
            words,
            comments: Vec::new(),
        })
    }

    fn comment_count(&self) -> usize {
        self.words[63].max(0) as usize
    }

    fn attach_comments(&mut self, bytes: &[u8]) {
        self.comments = bytes.to_vec();
    }

    fn nominal_time(&self) -> i64 {
        i64::from(self.words[3]) * 1_000_000 + i64::from(self.words[4])
    }

    fn size(&self) -> (u32, u32) {
        (self.words[8].max(0) as u32, self.words[9].max(0) as u32)
    }

    fn subsatellite_point(&self) -> Option<(f64, f64)> {
        if self.words[20] == 0 && self.words[21] == 0 {
            None
        } else {
            Some((f64::from(self.words[20]), f64::from(self.words[21])))
        }
    }

    fn image_box(&self) -> Option<(i64, i64, i64, i64)> {
        let (ul_line, ul_elem) = self.upper_left()?;
        let (lines, elements) = self.size();
        Some((
            ul_line,
            ul_line + i64::from(lines),
            ul_elem,
            ul_elem + i64::from(elements),
        ))
    }

    fn upper_left(&self) -> Option<(i64, i64)> {
        Some((i64::from(self.words[5]), i64::from(self.words[6])))
    }

    fn calibration_unit(&self) -> Option<String> {
        (self.words[13] == 1).then(|| "RAW".to_string())
    }
}

/// Build one 256-byte directory block with the test word layout
pub struct BlockSpec {
    pub date: i32,
    pub time: i32,
    pub lines: i32,
    pub elements: i32,
    pub comment_count: i32,
}

impl Default for BlockSpec {
    fn default() -> Self {
        Self {
            date: 2020_152,
            time: 120_000,
            lines: 500,
            elements: 700,
            comment_count: 0,
        }
    }
}

pub fn directory_block(spec: &BlockSpec) -> [u8; 256] {
    let mut words = [0i32; 64];
    words[1] = 4; // image type marker
    words[3] = spec.date;
    words[4] = spec.time;
    words[5] = 100; // upper-left line
    words[6] = 200; // upper-left element
    words[8] = spec.lines;
    words[9] = spec.elements;
    words[13] = 1; // stored unit: RAW
    words[20] = 0;
    words[21] = 0;
    words[63] = spec.comment_count;

    let mut block = [0u8; 256];
    for (i, w) in words.iter().enumerate() {
        block[i * 4..i * 4 + 4].copy_from_slice(&w.to_be_bytes());
    }
    block
}

// =============================================================================
// Response builders
// =============================================================================

/// Catalog listing: 8-byte header, then `[len][text]` chunks, then a zero
/// length terminating the chain
pub fn catalog_response(lines: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    let first = lines.first().map(|l| l.len() as i32).unwrap_or(1);
    out.extend_from_slice(&first.max(1).to_be_bytes());
    out.extend_from_slice(&0i32.to_be_bytes()); // reserved
    for line in lines {
        out.extend_from_slice(&(line.len() as i32).to_be_bytes());
        out.extend_from_slice(line.as_bytes());
    }
    out.extend_from_slice(&0i32.to_be_bytes());
    out
}

/// 96-byte server error payload with the message text at byte 12
pub fn error_response(message: &str) -> Vec<u8> {
    let mut out = vec![0u8; 96];
    let msg = message.as_bytes();
    out[12..12 + msg.len().min(72)].copy_from_slice(&msg[..msg.len().min(72)]);
    out
}

/// Directory response: per record an 8-byte sub-header, the 256-byte block
/// and its comment cards, closed by a terminator sub-header (the framing
/// real servers produce)
pub fn directory_response(records: &[(Vec<u8>, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, (block, comments)) in records.iter().enumerate() {
        assert_eq!(block.len(), 256);
        assert_eq!(comments.len() % 80, 0);
        let num_bytes = 260 + comments.len() as i32;
        out.extend_from_slice(&num_bytes.to_be_bytes());
        out.extend_from_slice(&(i as i32).to_be_bytes()); // file number
        out.extend_from_slice(block);
        out.extend_from_slice(comments);
    }
    out.extend_from_slice(&[0u8; 8]); // terminator sub-header
    out
}

/// Image response: 4-byte length then the raw payload
pub fn image_response(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(payload.len() as i32).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

// =============================================================================
// Fake server
// =============================================================================

/// What the fake server does with one accepted connection
pub enum Behavior {
    /// Read the request, send these bytes, close
    Reply(Vec<u8>),
    /// Read the request, sleep without replying, close
    Stall(Duration),
    /// Read the request, then send one byte at a time with a pause after
    /// each, close
    Drip(Vec<u8>, Duration),
}

/// One-thread fake ADDE server: services one connection per scripted
/// behavior, in order, recording every request frame it reads.
pub struct FakeServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Vec<u8>>>>,
    handle: Option<JoinHandle<()>>,
}

impl FakeServer {
    pub fn spawn(behaviors: Vec<Behavior>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake server");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        let handle = std::thread::spawn(move || {
            for behavior in behaviors {
                let (mut stream, _) = match listener.accept() {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                let frame = match read_request(&mut stream) {
                    Ok(frame) => frame,
                    Err(_) => continue,
                };
                log.lock().unwrap().push(frame);
                match behavior {
                    Behavior::Reply(bytes) => {
                        let _ = stream.write_all(&bytes);
                        let _ = stream.flush();
                    }
                    Behavior::Stall(pause) => std::thread::sleep(pause),
                    Behavior::Drip(bytes, pause) => {
                        for byte in bytes {
                            if stream.write_all(&[byte]).is_err() {
                                break; // client gave up
                            }
                            let _ = stream.flush();
                            std::thread::sleep(pause);
                        }
                    }
                }
                // dropping the stream closes the connection
            }
        });

        Self {
            addr,
            requests,
            handle: Some(handle),
        }
    }

    /// Request frames read so far
    pub fn requests(&self) -> Vec<Vec<u8>> {
        self.requests.lock().unwrap().clone()
    }

    /// Wait for the scripted behaviors to finish
    pub fn join(mut self) -> Vec<Vec<u8>> {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.requests.lock().unwrap().clone()
    }
}

/// Read one request frame: the fixed 176 bytes, plus the extended text
/// when the length-with-binary field is nonzero
fn read_request(stream: &mut std::net::TcpStream) -> std::io::Result<Vec<u8>> {
    let mut fixed = vec![0u8; 176];
    stream.read_exact(&mut fixed)?;
    let extended = i32::from_be_bytes([fixed[52], fixed[53], fixed[54], fixed[55]]).max(0) as usize;
    if extended > 0 {
        let mut text = vec![0u8; extended];
        stream.read_exact(&mut text)?;
        fixed.extend_from_slice(&text);
    }
    Ok(fixed)
}

/// Recover the request text from a captured frame
pub fn request_text(frame: &[u8]) -> String {
    let extended = i32::from_be_bytes([frame[52], frame[53], frame[54], frame[55]]).max(0) as usize;
    let bytes = if extended > 0 {
        &frame[176..176 + extended]
    } else {
        &frame[56..176]
    };
    String::from_utf8_lossy(bytes).trim_end().to_string()
}

/// Recover the service tag from a captured frame
pub fn request_tag(frame: &[u8]) -> String {
    String::from_utf8_lossy(&frame[12..16]).trim_end().to_string()
}
