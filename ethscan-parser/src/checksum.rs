//! IPv4 header checksum engine
//!
//! The engine holds no state of its own. It is handed the captured header
//! bytes once, at the moment a frame completes, and produces a verdict.

use ethscan_packet::checksum::fold_carries;

/// Capacity of the header capture buffer (IHL = 15)
pub const MAX_IP_HEADER_LEN: usize = 60;

/// Byte offset of the checksum field inside the IPv4 header
const CHECKSUM_OFFSET: usize = 10;

/// Checksum values latched when a frame completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumVerdict {
    /// Value carried in header bytes 10-11
    pub carried: u16,
    /// One's complement of the folded sum over the header, checksum field as zero
    pub computed: u16,
    /// `carried == computed` and the frame raised no error
    pub ok: bool,
}

/// Sum the header as big-endian words over `[0, header_len)`, skipping the
/// checksum field, fold the carries and complement.
///
/// Bytes at or beyond `header_len` are ignored even if they were captured.
pub fn compute(header: &[u8; MAX_IP_HEADER_LEN], header_len: usize) -> u16 {
    let len = header_len.min(MAX_IP_HEADER_LEN) & !1;

    let sum: u32 = (0..len)
        .step_by(2)
        .filter(|&i| i != CHECKSUM_OFFSET)
        .map(|i| u16::from_be_bytes([header[i], header[i + 1]]) as u32)
        .sum();

    !fold_carries(sum)
}

/// Checksum field as carried in the header
pub fn carried(header: &[u8; MAX_IP_HEADER_LEN]) -> u16 {
    u16::from_be_bytes([header[CHECKSUM_OFFSET], header[CHECKSUM_OFFSET + 1]])
}

/// Produce the verdict for a completing frame.
///
/// `error` must already include any fault raised by the completing byte.
pub fn verify(header: &[u8; MAX_IP_HEADER_LEN], header_len: usize, error: bool) -> ChecksumVerdict {
    let carried = carried(header);
    let computed = compute(header, header_len);

    ChecksumVerdict {
        carried,
        computed,
        ok: carried == computed && !error,
    }
}
