//! IPv4 header construction
//!
//! The header is modelled field by field so that test inputs can carry
//! deliberately broken values (wrong version, short IHL, bad checksum)
//! next to well-formed ones.

use crate::checksum::internet_checksum;
use bytes::{BufMut, BytesMut};
use ethscan_core::{Error, Result};
use std::fmt;
use std::net::Ipv4Addr;

/// IP protocol numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpProtocol {
    /// ICMP (1)
    ICMP,
    /// TCP (6)
    TCP,
    /// UDP (17)
    UDP,
    /// Any other protocol number
    Custom(u8),
}

impl IpProtocol {
    pub fn to_u8(self) -> u8 {
        match self {
            IpProtocol::ICMP => 1,
            IpProtocol::TCP => 6,
            IpProtocol::UDP => 17,
            IpProtocol::Custom(val) => val,
        }
    }

    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => IpProtocol::ICMP,
            6 => IpProtocol::TCP,
            17 => IpProtocol::UDP,
            val => IpProtocol::Custom(val),
        }
    }
}

impl fmt::Display for IpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpProtocol::ICMP => write!(f, "ICMP"),
            IpProtocol::TCP => write!(f, "TCP"),
            IpProtocol::UDP => write!(f, "UDP"),
            IpProtocol::Custom(val) => write!(f, "proto-{}", val),
        }
    }
}

/// IPv4 header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Header {
    /// Version nibble (4 for IPv4)
    pub version: u8,
    /// Internet Header Length in 32-bit words
    pub ihl: u8,
    /// Type of Service / DSCP+ECN
    pub tos: u8,
    /// Total length (header + data) in bytes
    pub total_length: u16,
    /// Identification
    pub identification: u16,
    /// Flags (3 bits) and fragment offset (13 bits)
    pub flags_fragment: u16,
    /// Time to Live
    pub ttl: u8,
    /// Protocol
    pub protocol: IpProtocol,
    /// Header checksum
    pub checksum: u16,
    /// Source IP address
    pub source: Ipv4Addr,
    /// Destination IP address
    pub destination: Ipv4Addr,
    /// Options, already padded to a 4-byte boundary
    pub options: Vec<u8>,
}

impl Ipv4Header {
    /// Minimum IPv4 header size (without options)
    pub const MIN_HEADER_SIZE: usize = 20;

    /// Maximum IPv4 header size (IHL = 15)
    pub const MAX_HEADER_SIZE: usize = 60;

    /// Don't Fragment bit in `flags_fragment`
    pub const DONT_FRAGMENT: u16 = 0x4000;

    /// Create a header without options; checksum is left at zero
    pub fn new(source: Ipv4Addr, destination: Ipv4Addr, protocol: IpProtocol) -> Self {
        Ipv4Header {
            version: 4,
            ihl: 5,
            tos: 0,
            total_length: Self::MIN_HEADER_SIZE as u16,
            identification: 0,
            flags_fragment: Self::DONT_FRAGMENT,
            ttl: 64,
            protocol,
            checksum: 0,
            source,
            destination,
            options: Vec::new(),
        }
    }

    /// Set IP options, padding them to a 4-byte boundary and updating IHL
    pub fn with_options(mut self, options: Vec<u8>) -> Result<Self> {
        let padded_len = (options.len() + 3) & !3;
        if Self::MIN_HEADER_SIZE + padded_len > Self::MAX_HEADER_SIZE {
            return Err(Error::frame_construction(format!(
                "{} bytes of IPv4 options exceed the 40-byte limit",
                options.len()
            )));
        }

        let mut padded = options;
        padded.resize(padded_len, 0);

        let payload_len = (self.total_length as usize).saturating_sub(self.header_len_bytes());
        self.options = padded;
        self.ihl = (self.header_len_bytes() / 4) as u8;
        self.total_length = (self.header_len_bytes() + payload_len) as u16;
        Ok(self)
    }

    /// Set total length from the size of whatever follows the header
    pub fn set_payload_len(&mut self, payload_len: usize) {
        self.total_length = (self.header_len_bytes() + payload_len) as u16;
    }

    /// Number of header bytes actually emitted (20 + options)
    pub fn header_len_bytes(&self) -> usize {
        Self::MIN_HEADER_SIZE + self.options.len()
    }

    /// Recompute the header checksum over the emitted header bytes
    pub fn calculate_checksum(&mut self) {
        self.checksum = 0;
        self.checksum = internet_checksum(&self.to_bytes());
    }

    /// Serialize the header as-is, without touching the checksum field
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = BytesMut::with_capacity(self.header_len_bytes());
        self.write_to(&mut buffer);
        buffer.to_vec()
    }

    /// Append the header as-is to `buffer`
    pub fn write_to(&self, buffer: &mut BytesMut) {
        buffer.put_u8((self.version << 4) | (self.ihl & 0x0F));
        buffer.put_u8(self.tos);
        buffer.put_u16(self.total_length);
        buffer.put_u16(self.identification);
        buffer.put_u16(self.flags_fragment);
        buffer.put_u8(self.ttl);
        buffer.put_u8(self.protocol.to_u8());
        buffer.put_u16(self.checksum);
        buffer.put_slice(&self.source.octets());
        buffer.put_slice(&self.destination.octets());
        buffer.put_slice(&self.options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ipv4Header {
        Ipv4Header::new(
            Ipv4Addr::new(192, 168, 0, 1),
            Ipv4Addr::new(192, 168, 0, 2),
            IpProtocol::TCP,
        )
    }

    #[test]
    fn test_ip_protocol_conversion() {
        assert_eq!(IpProtocol::TCP.to_u8(), 6);
        assert_eq!(IpProtocol::UDP.to_u8(), 17);
        assert_eq!(IpProtocol::from_u8(1), IpProtocol::ICMP);
        assert_eq!(IpProtocol::from_u8(47), IpProtocol::Custom(47));
    }

    #[test]
    fn test_header_layout() {
        let bytes = sample().to_bytes();
        assert_eq!(bytes.len(), 20);
        assert_eq!(bytes[0], 0x45);
        assert_eq!(bytes[9], 6);
        assert_eq!(&bytes[12..16], &[192, 168, 0, 1]);
        assert_eq!(&bytes[16..20], &[192, 168, 0, 2]);
    }

    #[test]
    fn test_calculated_checksum_validates() {
        let mut header = sample();
        header.set_payload_len(20);
        header.calculate_checksum();

        assert_ne!(header.checksum, 0);
        assert_eq!(internet_checksum(&header.to_bytes()), 0);
    }

    #[test]
    fn test_options_are_padded_and_counted() {
        let mut header = sample().with_options(vec![0x01, 0x01, 0x01]).unwrap();
        header.set_payload_len(8);

        assert_eq!(header.options.len(), 4);
        assert_eq!(header.ihl, 6);
        assert_eq!(header.header_len_bytes(), 24);
        assert_eq!(header.total_length, 32);
    }

    #[test]
    fn test_options_limit() {
        assert!(sample().with_options(vec![0x01; 40]).is_ok());
        assert!(sample().with_options(vec![0x01; 41]).is_err());
    }
}
