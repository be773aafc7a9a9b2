//! Frame sources
//!
//! A source yields whole frames, one at a time. The hex dump format is one
//! frame per line:
//!
//! ```text
//! # TCP SYN 192.168.0.1:128 -> 192.168.0.2:144
//! 02 00 00 00 00 02 02 00 00 00 00 01 08 00 45 00 ...
//! ```
//!
//! Octets may be separated by whitespace, `:` or `-`, or written back to
//! back. Everything after `#` is ignored and blank lines are skipped.

use bytes::Bytes;
use ethscan_core::{Error, Frame, Result};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Anything that can hand out frames in order
pub trait FrameSource {
    /// Next frame, or `None` once the source is exhausted
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Human-readable name of the source
    fn name(&self) -> &str;
}

/// Frames read from a hex dump text stream
pub struct HexDumpSource<R> {
    reader: R,
    origin: String,
    line: usize,
    frames: usize,
    buf: Vec<u8>,
}

impl HexDumpSource<BufReader<File>> {
    /// Open a hex dump file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        info!("Reading frames from {}", path.display());
        Ok(Self::new(path.display().to_string(), BufReader::new(file)))
    }
}

impl<R: BufRead> HexDumpSource<R> {
    /// Wrap an already open reader
    pub fn new(origin: impl Into<String>, reader: R) -> Self {
        Self {
            reader,
            origin: origin.into(),
            line: 0,
            frames: 0,
            buf: Vec::new(),
        }
    }

    /// Number of lines read so far
    pub fn lines_read(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> FrameSource for HexDumpSource<R> {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                debug!(lines = self.line, frames = self.frames, "end of {}", self.origin);
                return Ok(None);
            }
            self.line += 1;

            let text = std::str::from_utf8(&self.buf)
                .map_err(|_| Error::frame_source(self.line, "line is not valid UTF-8"))?;
            let data =
                parse_hex_line(text).map_err(|reason| Error::frame_source(self.line, reason))?;
            if let Some(data) = data {
                self.frames += 1;
                return Ok(Some(Frame::new(self.origin.clone(), self.frames, data)));
            }
        }
    }

    fn name(&self) -> &str {
        &self.origin
    }
}

/// Frames held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    frames: VecDeque<Frame>,
}

impl MemorySource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    /// Wrap raw byte vectors, numbering them from 1
    pub fn from_bytes<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let frames = frames
            .into_iter()
            .enumerate()
            .map(|(i, data)| Frame::new("memory", i + 1, data))
            .collect();
        Self { frames }
    }

    /// Frames not yet handed out
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for MemorySource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        Ok(self.frames.pop_front())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Decode one hex dump line. `Ok(None)` means the line holds no frame.
pub fn parse_hex_line(line: &str) -> std::result::Result<Option<Bytes>, String> {
    let content = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };

    let digits: String = content
        .chars()
        .filter(|c| !(c.is_whitespace() || *c == ':' || *c == '-'))
        .collect();
    if digits.is_empty() {
        return Ok(None);
    }

    match hex::decode(&digits) {
        Ok(data) => Ok(Some(Bytes::from(data))),
        Err(hex::FromHexError::OddLength) => Err("odd number of hex digits".to_string()),
        Err(hex::FromHexError::InvalidHexCharacter { c, .. }) => {
            Err(format!("invalid hex character '{}'", c))
        }
        Err(e) => Err(e.to_string()),
    }
}

/// Render a frame as one hex dump line, readable by [`HexDumpSource`]
pub fn format_hex_line(data: &[u8]) -> String {
    data.chunks(1).map(hex::encode).collect::<Vec<_>>().join(" ")
}
