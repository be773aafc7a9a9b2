//! Parsing phases of the frame state controller

use std::fmt;

/// Region of the frame the parser is currently consuming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// No frame in progress; the next byte starts one
    #[default]
    Idle,
    /// Destination MAC, source MAC and EtherType (14 bytes)
    EthernetHeader,
    /// IPv4 header, including options (IHL x 4 bytes)
    IpHeader,
    /// First four bytes of the TCP or UDP header (the two ports)
    L4Ports,
    /// Everything else up to the end-of-frame marker
    DrainToEnd,
    /// Frame finished; results are stable until the next byte
    Complete,
}

impl Phase {
    /// True for the two phases in which an arriving byte starts a new frame
    pub fn is_between_frames(self) -> bool {
        matches!(self, Phase::Idle | Phase::Complete)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::EthernetHeader => "ethernet-header",
            Phase::IpHeader => "ip-header",
            Phase::L4Ports => "l4-ports",
            Phase::DrainToEnd => "drain",
            Phase::Complete => "complete",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(Phase::default(), Phase::Idle);
    }

    #[test]
    fn test_between_frames() {
        assert!(Phase::Idle.is_between_frames());
        assert!(Phase::Complete.is_between_frames());
        assert!(!Phase::DrainToEnd.is_between_frames());
        assert!(!Phase::IpHeader.is_between_frames());
    }

    #[test]
    fn test_display() {
        assert_eq!(Phase::L4Ports.to_string(), "l4-ports");
        assert_eq!(Phase::EthernetHeader.to_string(), "ethernet-header");
    }
}
