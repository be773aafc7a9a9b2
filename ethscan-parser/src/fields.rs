//! Fields latched by the extraction datapath

use std::fmt;
use std::net::Ipv4Addr;

/// Addresses, ports and transport classification of the current or last frame
///
/// Addresses and ports are assembled most-significant byte first, one byte
/// per parser step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractedFields {
    /// IPv4 source address, header bytes 12-15
    pub src_ip: u32,
    /// IPv4 destination address, header bytes 16-19
    pub dst_ip: u32,
    /// First two transport bytes
    pub src_port: u16,
    /// Transport bytes 2-3
    pub dst_port: u16,
    /// Protocol field was 6
    pub is_tcp: bool,
    /// Protocol field was 17
    pub is_udp: bool,
}

impl ExtractedFields {
    pub fn src_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.src_ip)
    }

    pub fn dst_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.dst_ip)
    }

    /// True if the ports were captured for a TCP or UDP frame
    pub fn has_ports(&self) -> bool {
        self.is_tcp || self.is_udp
    }
}

impl fmt::Display for ExtractedFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_ports() {
            write!(
                f,
                "{} {}:{} -> {}:{}",
                if self.is_tcp { "TCP" } else { "UDP" },
                self.src_addr(),
                self.src_port,
                self.dst_addr(),
                self.dst_port
            )
        } else {
            write!(f, "{} -> {}", self.src_addr(), self.dst_addr())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_views() {
        let fields = ExtractedFields {
            src_ip: 0xC0A80001,
            dst_ip: 0xC0A80002,
            ..Default::default()
        };
        assert_eq!(fields.src_addr(), Ipv4Addr::new(192, 168, 0, 1));
        assert_eq!(fields.dst_addr(), Ipv4Addr::new(192, 168, 0, 2));
    }

    #[test]
    fn test_display() {
        let fields = ExtractedFields {
            src_ip: 0x0A000001,
            dst_ip: 0x0A000002,
            src_port: 1234,
            dst_port: 80,
            is_tcp: true,
            is_udp: false,
        };
        assert_eq!(fields.to_string(), "TCP 10.0.0.1:1234 -> 10.0.0.2:80");

        let icmp = ExtractedFields {
            is_tcp: false,
            ..fields
        };
        assert_eq!(icmp.to_string(), "10.0.0.1 -> 10.0.0.2");
    }
}
