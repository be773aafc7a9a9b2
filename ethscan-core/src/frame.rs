//! Frame record handed from sources to the parser

use bytes::Bytes;

/// One Ethernet-layer frame as delivered by a frame source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Where the frame came from (file name, "memory", ...)
    pub origin: String,
    /// 1-based position of the frame within its source
    pub index: usize,
    /// Raw octets, starting at the destination MAC address
    pub data: Bytes,
}

impl Frame {
    /// Create a new frame
    pub fn new(origin: impl Into<String>, index: usize, data: impl Into<Bytes>) -> Self {
        Self {
            origin: origin.into(),
            index,
            data: data.into(),
        }
    }

    /// Get frame data as slice
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get frame length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if frame is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
