//! TCP header construction
//!
//! Only the fixed 20-byte header is produced; the scanner never looks past
//! the port fields, so TCP options are not modelled.

use crate::checksum::transport_checksum;
use crate::ip::IpProtocol;
use bytes::{BufMut, BytesMut};
use std::net::Ipv4Addr;
use std::ops::BitOr;

/// TCP control flags, one bit each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TcpFlags(pub u8);

impl TcpFlags {
    pub const NONE: TcpFlags = TcpFlags(0x00);
    pub const FIN: TcpFlags = TcpFlags(0x01);
    pub const SYN: TcpFlags = TcpFlags(0x02);
    pub const RST: TcpFlags = TcpFlags(0x04);
    pub const PSH: TcpFlags = TcpFlags(0x08);
    pub const ACK: TcpFlags = TcpFlags(0x10);
    pub const URG: TcpFlags = TcpFlags(0x20);

    /// True if every bit of `other` is set in `self`
    pub fn contains(self, other: TcpFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TcpFlags {
    type Output = TcpFlags;

    fn bitor(self, rhs: TcpFlags) -> TcpFlags {
        TcpFlags(self.0 | rhs.0)
    }
}

/// TCP header (no options)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpHeader {
    pub source_port: u16,
    pub destination_port: u16,
    pub sequence_number: u32,
    pub acknowledgment_number: u32,
    pub flags: TcpFlags,
    pub window_size: u16,
    pub checksum: u16,
    pub urgent_pointer: u16,
}

impl TcpHeader {
    /// Header size in bytes (data offset 5)
    pub const SIZE: usize = 20;

    pub fn new(source_port: u16, destination_port: u16) -> Self {
        TcpHeader {
            source_port,
            destination_port,
            sequence_number: 0,
            acknowledgment_number: 0,
            flags: TcpFlags::NONE,
            window_size: 65535,
            checksum: 0,
            urgent_pointer: 0,
        }
    }

    /// Append the header to `buffer` as-is
    pub fn write_to(&self, buffer: &mut BytesMut) {
        buffer.put_u16(self.source_port);
        buffer.put_u16(self.destination_port);
        buffer.put_u32(self.sequence_number);
        buffer.put_u32(self.acknowledgment_number);
        buffer.put_u8(((Self::SIZE / 4) as u8) << 4);
        buffer.put_u8(self.flags.0);
        buffer.put_u16(self.window_size);
        buffer.put_u16(self.checksum);
        buffer.put_u16(self.urgent_pointer);
    }

    /// Serialize header and payload with the pseudo-header checksum filled in
    pub fn to_segment(&self, src_ip: Ipv4Addr, dst_ip: Ipv4Addr, payload: &[u8]) -> Vec<u8> {
        let mut header = *self;
        header.checksum = 0;

        let mut buffer = BytesMut::with_capacity(Self::SIZE + payload.len());
        header.write_to(&mut buffer);
        buffer.put_slice(payload);

        let checksum = transport_checksum(
            &src_ip.octets(),
            &dst_ip.octets(),
            IpProtocol::TCP.to_u8(),
            &buffer,
        );
        buffer[16..18].copy_from_slice(&checksum.to_be_bytes());
        buffer.to_vec()
    }
}
