//! UDP header construction

use crate::checksum::transport_checksum;
use crate::ip::IpProtocol;
use bytes::{BufMut, BytesMut};
use std::net::Ipv4Addr;

/// UDP header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpHeader {
    pub source_port: u16,
    pub destination_port: u16,
    /// Length of header plus data
    pub length: u16,
    pub checksum: u16,
}

impl UdpHeader {
    /// UDP header size in bytes
    pub const SIZE: usize = 8;

    pub fn new(source_port: u16, destination_port: u16) -> Self {
        UdpHeader {
            source_port,
            destination_port,
            length: Self::SIZE as u16,
            checksum: 0,
        }
    }

    /// Serialize header and payload with length and checksum filled in
    ///
    /// A computed checksum of zero is sent as 0xFFFF, since zero means
    /// "no checksum" for UDP over IPv4.
    pub fn to_datagram(&self, src_ip: Ipv4Addr, dst_ip: Ipv4Addr, payload: &[u8]) -> Vec<u8> {
        let length = (Self::SIZE + payload.len()) as u16;

        let mut buffer = BytesMut::with_capacity(length as usize);
        buffer.put_u16(self.source_port);
        buffer.put_u16(self.destination_port);
        buffer.put_u16(length);
        buffer.put_u16(0);
        buffer.put_slice(payload);

        let mut checksum = transport_checksum(
            &src_ip.octets(),
            &dst_ip.octets(),
            IpProtocol::UDP.to_u8(),
            &buffer,
        );
        if checksum == 0 {
            checksum = 0xFFFF;
        }
        buffer[6..8].copy_from_slice(&checksum.to_be_bytes());
        buffer.to_vec()
    }
}
