//! Field extraction datapath
//!
//! Latches bytes into the extracted fields and the IPv4 header buffer. Every
//! decision is keyed on the phase the parser was in *before* the current
//! step's transition, together with that phase's byte offset.

use crate::checksum::MAX_IP_HEADER_LEN;
use crate::fields::ExtractedFields;
use crate::phase::Phase;
use ethscan_packet::ip::{IpProtocol, Ipv4Header};

/// Header length assumed until the IHL nibble has been seen
pub const DEFAULT_IP_HEADER_LEN: usize = Ipv4Header::MIN_HEADER_SIZE;

/// Registers written by the datapath
#[derive(Debug, Clone)]
pub struct Datapath {
    /// IHL x 4, from the first IPv4 header byte
    pub ip_header_len: usize,
    /// Raw protocol byte, IPv4 header offset 9
    pub declared_protocol: u8,
    /// Every byte seen during the IP-header phase, in order
    pub ip_header_buffer: [u8; MAX_IP_HEADER_LEN],
    /// Bytes written into `ip_header_buffer` so far
    pub ip_header_byte_count: usize,
    pub fields: ExtractedFields,
}

impl Datapath {
    pub fn new() -> Self {
        Datapath {
            ip_header_len: DEFAULT_IP_HEADER_LEN,
            declared_protocol: 0,
            ip_header_buffer: [0u8; MAX_IP_HEADER_LEN],
            ip_header_byte_count: 0,
            fields: ExtractedFields::default(),
        }
    }

    /// Per-frame reset, applied when a byte starts a new frame
    pub fn begin_frame(&mut self) {
        self.ip_header_len = DEFAULT_IP_HEADER_LEN;
        self.declared_protocol = 0;
        self.fields = ExtractedFields::default();
        self.enter_ip_header();
    }

    /// Header buffer reset on entry to the IP-header phase
    pub fn enter_ip_header(&mut self) {
        self.ip_header_buffer = [0u8; MAX_IP_HEADER_LEN];
        self.ip_header_byte_count = 0;
    }

    /// True once `offset` is the last byte of the declared IPv4 header
    pub fn is_last_header_byte(&self, offset: usize) -> bool {
        self.ip_header_len >= DEFAULT_IP_HEADER_LEN && offset + 1 == self.ip_header_len
    }

    /// Latch `byte` according to `phase` and `offset`
    pub fn capture(&mut self, phase: Phase, offset: usize, byte: u8) {
        match phase {
            Phase::IpHeader => self.capture_ip_header(offset, byte),
            Phase::L4Ports => self.capture_ports(offset, byte),
            // The EtherType is assembled by the controller from prev_byte
            Phase::Idle | Phase::EthernetHeader | Phase::DrainToEnd | Phase::Complete => {}
        }
    }

    fn capture_ip_header(&mut self, offset: usize, byte: u8) {
        if self.ip_header_byte_count < MAX_IP_HEADER_LEN {
            self.ip_header_buffer[self.ip_header_byte_count] = byte;
            self.ip_header_byte_count += 1;
        }

        match offset {
            0 => self.ip_header_len = (byte & 0x0F) as usize * 4,
            9 => self.declared_protocol = byte,
            12..=15 => self.fields.src_ip = (self.fields.src_ip << 8) | byte as u32,
            16..=19 => self.fields.dst_ip = (self.fields.dst_ip << 8) | byte as u32,
            _ => {}
        }

        if self.is_last_header_byte(offset) {
            let protocol = IpProtocol::from_u8(self.declared_protocol);
            self.fields.is_tcp = protocol == IpProtocol::TCP;
            self.fields.is_udp = protocol == IpProtocol::UDP;
        }
    }

    fn capture_ports(&mut self, offset: usize, byte: u8) {
        match offset {
            0 | 1 => self.fields.src_port = (self.fields.src_port << 8) | byte as u16,
            2 | 3 => self.fields.dst_port = (self.fields.dst_port << 8) | byte as u16,
            _ => {}
        }
    }
}

impl Default for Datapath {
    fn default() -> Self {
        Self::new()
    }
}
