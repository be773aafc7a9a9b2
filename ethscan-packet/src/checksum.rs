//! Checksum calculations for network headers
//!
//! This module provides the 16-bit one's-complement arithmetic behind the
//! Internet Checksum (RFC 1071) used in IPv4, TCP and UDP headers. The
//! carry-folding step is exposed on its own so that incremental checksum
//! engines can share it.

/// Folds every carry above bit 15 back into the low 16 bits.
///
/// Repeats until no carry remains, so the result is the 16-bit
/// one's-complement sum of everything accumulated into `sum`.
///
/// # Examples
///
/// ```
/// use ethscan_packet::checksum::fold_carries;
///
/// assert_eq!(fold_carries(0x0001_FFFF), 0x0001);
/// assert_eq!(fold_carries(0x0000_1234), 0x1234);
/// ```
pub fn fold_carries(mut sum: u32) -> u16 {
    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    sum as u16
}

/// Sums `data` as big-endian 16-bit words without folding.
///
/// An odd trailing byte is treated as the high byte of a final word.
pub fn word_sum(data: &[u8]) -> u32 {
    let mut sum: u32 = 0;

    let mut chunks = data.chunks_exact(2);
    for chunk in &mut chunks {
        sum += u16::from_be_bytes([chunk[0], chunk[1]]) as u32;
    }

    if let Some(&byte) = chunks.remainder().first() {
        sum += (byte as u32) << 8;
    }

    sum
}

/// Calculates the Internet Checksum as defined in RFC 1071.
///
/// # Examples
///
/// ```
/// use ethscan_packet::checksum::internet_checksum;
///
/// let data = vec![0x45, 0x00, 0x00, 0x3c];
/// let checksum = internet_checksum(&data);
/// assert_eq!(checksum, !0x453cu16);
/// ```
pub fn internet_checksum(data: &[u8]) -> u16 {
    !fold_carries(word_sum(data))
}

/// Calculates the checksum for a TCP or UDP segment including the
/// IPv4 pseudo-header (source, destination, zero, protocol, length).
pub fn transport_checksum(src_ip: &[u8; 4], dst_ip: &[u8; 4], protocol: u8, data: &[u8]) -> u16 {
    let mut sum = word_sum(src_ip) + word_sum(dst_ip);
    sum += protocol as u32;
    sum += data.len() as u32;
    sum += word_sum(data);
    !fold_carries(sum)
}
