//! Owned per-frame result snapshot

use crate::checksum::ChecksumVerdict;
use crate::fault::Fault;
use crate::fields::ExtractedFields;
use crate::parser::FrameParser;
use ethscan_packet::ethernet::EtherType;
use ethscan_packet::ip::IpProtocol;
use std::fmt;

/// Everything the parser knows about the current or last frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Parser was in `Complete` when the snapshot was taken
    pub complete: bool,
    /// Sticky error flag
    pub error: bool,
    /// First fault, when `error` is set
    pub fault: Option<Fault>,
    /// Committed checksum verdict
    pub checksum_ok: bool,
    /// Carried/computed checksum pair, once a frame has completed
    pub verdict: Option<ChecksumVerdict>,
    pub fields: ExtractedFields,
    /// EtherType, if the Ethernet header was fully seen
    pub ethertype: Option<u16>,
    pub declared_protocol: u8,
    pub ip_header_len: usize,
    /// Bytes consumed by the frame
    pub bytes: usize,
}

impl FrameReport {
    /// True if the frame carried an IPv4 EtherType
    pub fn is_ipv4(&self) -> bool {
        self.ethertype == Some(EtherType::IPv4.to_u16())
    }
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5}B ", self.bytes)?;

        if let Some(fault) = self.fault {
            return write!(f, "ERROR {}", fault);
        }

        match self.ethertype {
            None => return write!(f, "incomplete"),
            Some(ethertype) if !self.is_ipv4() => {
                return write!(f, "ethertype {}", EtherType::from_u16(ethertype));
            }
            Some(_) => {}
        }

        if self.fields.has_ports() {
            write!(f, "{}", self.fields)?;
        } else {
            write!(
                f,
                "{} {}",
                IpProtocol::from_u8(self.declared_protocol),
                self.fields
            )?;
        }

        match self.verdict {
            Some(v) if v.ok => write!(f, " checksum ok (0x{:04x})", v.carried),
            Some(v) => write!(
                f,
                " checksum BAD (carried 0x{:04x}, computed 0x{:04x})",
                v.carried, v.computed
            ),
            None => Ok(()),
        }
    }
}

/// Run one complete frame through a fresh parser
pub fn parse_frame(frame: &[u8]) -> FrameReport {
    FrameParser::new().feed(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethscan_packet::FrameBuilder;
    use std::net::Ipv4Addr;

    fn addrs() -> (Ipv4Addr, Ipv4Addr) {
        (Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2))
    }

    #[test]
    fn test_display_tcp() {
        let (src, dst) = addrs();
        let frame = FrameBuilder::new().ipv4(src, dst).tcp(1234, 80).build().unwrap();
        let report = parse_frame(&frame);

        let line = report.to_string();
        assert!(line.contains("TCP 10.0.0.1:1234 -> 10.0.0.2:80"), "{}", line);
        assert!(line.contains("checksum ok"), "{}", line);
    }

    #[test]
    fn test_display_bad_checksum() {
        let (src, dst) = addrs();
        let frame = FrameBuilder::new()
            .ipv4(src, dst)
            .udp(1, 2)
            .ip_checksum(0x1234)
            .build()
            .unwrap();
        let line = parse_frame(&frame).to_string();
        assert!(line.contains("checksum BAD (carried 0x1234"), "{}", line);
    }

    #[test]
    fn test_display_icmp_and_arp() {
        let (src, dst) = addrs();
        let icmp = FrameBuilder::new()
            .ipv4(src, dst)
            .protocol(IpProtocol::ICMP)
            .build()
            .unwrap();
        assert!(parse_frame(&icmp).to_string().contains("ICMP 10.0.0.1 -> 10.0.0.2"));

        let arp = FrameBuilder::new()
            .ethertype(EtherType::ARP)
            .build()
            .unwrap();
        assert!(parse_frame(&arp).to_string().contains("ethertype ARP"));
    }

    #[test]
    fn test_display_error() {
        let line = parse_frame(&[0u8; 5]).to_string();
        assert!(line.contains("ERROR frame ended inside the Ethernet header"), "{}", line);
    }

    #[test]
    fn test_parse_empty_frame() {
        let report = parse_frame(&[]);
        assert!(!report.complete);
        assert_eq!(report.bytes, 0);
        assert!(report.verdict.is_none());
    }
}
