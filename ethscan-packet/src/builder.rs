//! Frame builder for constructing test and sample frames with a fluent API
//!
//! Besides well-formed Ethernet/IPv4/TCP/UDP frames, the builder can emit
//! frames that are broken in controlled ways: a wrong IPv4 version nibble,
//! an IHL that disagrees with the emitted header, or a corrupted header
//! checksum. Truncated frames are produced by slicing the built bytes.

use crate::ethernet::{EtherType, EthernetHeader, MacAddress};
use crate::ip::{IpProtocol, Ipv4Header};
use crate::tcp::{TcpFlags, TcpHeader};
use crate::udp::UdpHeader;
use bytes::{BufMut, BytesMut};
use ethscan_core::{Error, Result};
use std::net::Ipv4Addr;

/// How the IPv4 header checksum field is filled in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChecksumMode {
    /// Correct checksum over the emitted header
    Computed,
    /// Correct checksum with one bit flipped afterwards
    FlipBit(u8),
    /// Fixed value, whatever the header says
    Fixed(u16),
}

/// Layer 3 settings
#[derive(Debug, Clone)]
struct Layer3 {
    src: Ipv4Addr,
    dst: Ipv4Addr,
    ttl: u8,
    identification: u16,
    options: Vec<u8>,
    version: Option<u8>,
    ihl: Option<u8>,
    checksum: ChecksumMode,
}

/// Layer 4 settings
#[derive(Debug, Clone, Copy)]
enum Layer4 {
    Udp { src_port: u16, dst_port: u16 },
    Tcp { src_port: u16, dst_port: u16, seq: u32, flags: TcpFlags },
    Raw(IpProtocol),
}

/// Fluent builder for a single Ethernet frame
///
/// # Examples
///
/// ```
/// use std::net::Ipv4Addr;
/// use ethscan_packet::FrameBuilder;
///
/// let frame = FrameBuilder::new()
///     .ipv4(Ipv4Addr::new(192, 168, 0, 1), Ipv4Addr::new(192, 168, 0, 2))
///     .tcp(0x80, 0x90)
///     .build()
///     .unwrap();
///
/// assert_eq!(&frame[12..14], &[0x08, 0x00]);
/// assert_eq!(frame[23], 6);
/// ```
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    src_mac: MacAddress,
    dst_mac: MacAddress,
    ethertype: EtherType,
    layer3: Option<Layer3>,
    layer4: Option<Layer4>,
    payload: Vec<u8>,
    pad: bool,
}

impl FrameBuilder {
    /// Create a new builder for an IPv4 EtherType frame between two
    /// locally administered MAC addresses
    pub fn new() -> Self {
        FrameBuilder {
            src_mac: MacAddress([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]),
            dst_mac: MacAddress([0x02, 0x00, 0x00, 0x00, 0x00, 0x02]),
            ethertype: EtherType::IPv4,
            layer3: None,
            layer4: None,
            payload: Vec::new(),
            pad: true,
        }
    }

    /// Set the Ethernet addresses and EtherType
    pub fn ethernet(mut self, src: MacAddress, dst: MacAddress, ethertype: EtherType) -> Self {
        self.src_mac = src;
        self.dst_mac = dst;
        self.ethertype = ethertype;
        self
    }

    /// Set only the EtherType
    pub fn ethertype(mut self, ethertype: EtherType) -> Self {
        self.ethertype = ethertype;
        self
    }

    /// Add an IPv4 header
    pub fn ipv4(mut self, src: Ipv4Addr, dst: Ipv4Addr) -> Self {
        self.layer3 = Some(Layer3 {
            src,
            dst,
            ttl: 64,
            identification: 0,
            options: Vec::new(),
            version: None,
            ihl: None,
            checksum: ChecksumMode::Computed,
        });
        self
    }

    fn with_layer3(mut self, f: impl FnOnce(&mut Layer3)) -> Self {
        if let Some(ref mut layer3) = self.layer3 {
            f(layer3);
        }
        self
    }

    /// Set the TTL. Must be called after `ipv4()`.
    pub fn ttl(self, ttl: u8) -> Self {
        self.with_layer3(|l3| l3.ttl = ttl)
    }

    /// Set the identification field. Must be called after `ipv4()`.
    pub fn identification(self, id: u16) -> Self {
        self.with_layer3(|l3| l3.identification = id)
    }

    /// Add IPv4 options (padded to 4 bytes, IHL grows to match).
    /// Must be called after `ipv4()`.
    pub fn ip_options(self, options: Vec<u8>) -> Self {
        self.with_layer3(|l3| l3.options = options)
    }

    /// Force the version nibble. Must be called after `ipv4()`.
    pub fn ip_version(self, version: u8) -> Self {
        self.with_layer3(|l3| l3.version = Some(version & 0x0F))
    }

    /// Force the IHL nibble without changing the emitted header bytes.
    /// Must be called after `ipv4()`.
    pub fn ip_ihl(self, ihl: u8) -> Self {
        self.with_layer3(|l3| l3.ihl = Some(ihl & 0x0F))
    }

    /// Write a fixed header checksum. Must be called after `ipv4()`.
    pub fn ip_checksum(self, checksum: u16) -> Self {
        self.with_layer3(|l3| l3.checksum = ChecksumMode::Fixed(checksum))
    }

    /// Compute the header checksum, then flip bit `bit` (0 = LSB) of it.
    /// Must be called after `ipv4()`.
    pub fn flip_checksum_bit(self, bit: u8) -> Self {
        self.with_layer3(|l3| l3.checksum = ChecksumMode::FlipBit(bit))
    }

    /// Add a UDP header
    pub fn udp(mut self, src_port: u16, dst_port: u16) -> Self {
        self.layer4 = Some(Layer4::Udp { src_port, dst_port });
        self
    }

    /// Add a TCP header with the SYN flag
    pub fn tcp(self, src_port: u16, dst_port: u16) -> Self {
        self.tcp_with(src_port, dst_port, 0, TcpFlags::SYN)
    }

    /// Add a TCP header with explicit sequence number and flags
    pub fn tcp_with(mut self, src_port: u16, dst_port: u16, seq: u32, flags: TcpFlags) -> Self {
        self.layer4 = Some(Layer4::Tcp {
            src_port,
            dst_port,
            seq,
            flags,
        });
        self
    }

    /// Carry the payload directly above IPv4 under the given protocol number
    pub fn protocol(mut self, protocol: IpProtocol) -> Self {
        self.layer4 = Some(Layer4::Raw(protocol));
        self
    }

    /// Set the payload data
    pub fn payload(mut self, data: Vec<u8>) -> Self {
        self.payload = data;
        self
    }

    /// Pad the frame to the 60-byte Ethernet minimum (default on)
    pub fn pad(mut self, pad: bool) -> Self {
        self.pad = pad;
        self
    }

    /// Build the complete frame
    ///
    /// # Errors
    ///
    /// Returns an error if a transport layer was requested without IPv4,
    /// if the options do not fit in an IPv4 header, or if the checksum bit
    /// to flip is out of range.
    pub fn build(self) -> Result<Vec<u8>> {
        let mut body = self.payload.clone();
        let protocol = match (self.layer3.as_ref(), self.layer4) {
            (None, Some(_)) => {
                return Err(Error::frame_construction("transport layer requires IPv4"));
            }
            (Some(l3), Some(Layer4::Udp { src_port, dst_port })) => {
                body = UdpHeader::new(src_port, dst_port).to_datagram(l3.src, l3.dst, &body);
                IpProtocol::UDP
            }
            (
                Some(l3),
                Some(Layer4::Tcp {
                    src_port,
                    dst_port,
                    seq,
                    flags,
                }),
            ) => {
                let mut tcp = TcpHeader::new(src_port, dst_port);
                tcp.sequence_number = seq;
                tcp.flags = flags;
                body = tcp.to_segment(l3.src, l3.dst, &body);
                IpProtocol::TCP
            }
            (_, Some(Layer4::Raw(protocol))) => protocol,
            (_, None) => IpProtocol::Custom(0),
        };

        let mut buffer = BytesMut::with_capacity(EthernetHeader::MIN_FRAME_SIZE + body.len());
        EthernetHeader::new(self.dst_mac, self.src_mac, self.ethertype).write_to(&mut buffer);

        if let Some(l3) = self.layer3 {
            let header = Self::ipv4_header(&l3, protocol, body.len())?;
            header.write_to(&mut buffer);
        }

        buffer.put_slice(&body);

        if self.pad && buffer.len() < EthernetHeader::MIN_FRAME_SIZE {
            buffer.resize(EthernetHeader::MIN_FRAME_SIZE, 0);
        }

        Ok(buffer.to_vec())
    }

    fn ipv4_header(l3: &Layer3, protocol: IpProtocol, payload_len: usize) -> Result<Ipv4Header> {
        let mut header =
            Ipv4Header::new(l3.src, l3.dst, protocol).with_options(l3.options.clone())?;
        header.ttl = l3.ttl;
        header.identification = l3.identification;
        header.set_payload_len(payload_len);
        if let Some(version) = l3.version {
            header.version = version;
        }
        if let Some(ihl) = l3.ihl {
            header.ihl = ihl;
        }

        header.calculate_checksum();
        match l3.checksum {
            ChecksumMode::Computed => {}
            ChecksumMode::FlipBit(bit) if bit < 16 => header.checksum ^= 1 << bit,
            ChecksumMode::FlipBit(bit) => {
                return Err(Error::invalid_parameter(
                    "checksum bit",
                    format!("bit {} is outside a 16-bit field", bit),
                ));
            }
            ChecksumMode::Fixed(value) => header.checksum = value,
        }

        Ok(header)
    }
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::internet_checksum;

    fn src() -> Ipv4Addr {
        Ipv4Addr::new(192, 168, 0, 1)
    }

    fn dst() -> Ipv4Addr {
        Ipv4Addr::new(192, 168, 0, 2)
    }

    #[test]
    fn test_build_tcp_frame() {
        let frame = FrameBuilder::new().ipv4(src(), dst()).tcp(0x80, 0x90).build().unwrap();

        // 54 bytes of headers, padded to the Ethernet minimum
        assert_eq!(frame.len(), EthernetHeader::MIN_FRAME_SIZE);
        assert_eq!(&frame[12..14], &[0x08, 0x00]);
        assert_eq!(frame[14], 0x45);
        assert_eq!(frame[23], 6);
        assert_eq!(internet_checksum(&frame[14..34]), 0);
        assert_eq!(&frame[34..38], &[0x00, 0x80, 0x00, 0x90]);
    }

    #[test]
    fn test_build_udp_frame_is_padded() {
        let frame = FrameBuilder::new().ipv4(src(), dst()).udp(53, 5353).build().unwrap();

        assert_eq!(frame.len(), EthernetHeader::MIN_FRAME_SIZE);
        assert_eq!(frame[23], 17);
        assert_eq!(&frame[34..38], &[0x00, 0x35, 0x14, 0xE9]);
    }

    #[test]
    fn test_build_without_padding() {
        let frame = FrameBuilder::new()
            .ipv4(src(), dst())
            .udp(1, 2)
            .pad(false)
            .build()
            .unwrap();
        assert_eq!(frame.len(), 14 + 20 + 8);
    }

    #[test]
    fn test_build_with_options() {
        let frame = FrameBuilder::new()
            .ipv4(src(), dst())
            .ip_options(vec![0x01; 8])
            .udp(1, 2)
            .build()
            .unwrap();

        assert_eq!(frame[14], 0x47);
        assert_eq!(internet_checksum(&frame[14..42]), 0);
        assert_eq!(&frame[42..46], &[0x00, 0x01, 0x00, 0x02]);
    }

    #[test]
    fn test_flip_checksum_bit() {
        let good = FrameBuilder::new().ipv4(src(), dst()).tcp(1, 2).build().unwrap();
        let bad = FrameBuilder::new()
            .ipv4(src(), dst())
            .tcp(1, 2)
            .flip_checksum_bit(3)
            .build()
            .unwrap();

        assert_eq!(good[24] ^ bad[24], 0x00);
        assert_eq!(good[25] ^ bad[25], 0x08);
        assert_ne!(internet_checksum(&bad[14..34]), 0);
    }

    #[test]
    fn test_flip_checksum_bit_out_of_range() {
        let result = FrameBuilder::new()
            .ipv4(src(), dst())
            .flip_checksum_bit(16)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_forced_version_and_ihl() {
        let frame = FrameBuilder::new()
            .ipv4(src(), dst())
            .ip_version(6)
            .ip_ihl(4)
            .build()
            .unwrap();
        assert_eq!(frame[14], 0x64);
    }

    #[test]
    fn test_raw_protocol() {
        let frame = FrameBuilder::new()
            .ipv4(src(), dst())
            .protocol(IpProtocol::ICMP)
            .payload(vec![0x08, 0x00, 0xF7, 0xFF])
            .build()
            .unwrap();
        assert_eq!(frame[23], 1);
        assert_eq!(&frame[34..38], &[0x08, 0x00, 0xF7, 0xFF]);
    }

    #[test]
    fn test_transport_without_ipv4_fails() {
        assert!(FrameBuilder::new().udp(1, 2).build().is_err());
    }

    #[test]
    fn test_non_ip_frame() {
        let frame = FrameBuilder::new()
            .ethertype(EtherType::ARP)
            .payload(vec![0x00, 0x01])
            .build()
            .unwrap();
        assert_eq!(&frame[12..16], &[0x08, 0x06, 0x00, 0x01]);
    }
}
