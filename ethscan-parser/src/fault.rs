//! Per-frame fault conditions
//!
//! Callers only see a single sticky error flag; the fault kind is kept for
//! logging and reports.

use thiserror::Error;

/// Reason a frame was flagged as erroneous
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// End of frame before the 14-byte Ethernet header was complete
    #[error("frame ended inside the Ethernet header")]
    TruncatedEthernet,

    /// End of frame before IHL x 4 header bytes were consumed
    #[error("frame ended inside the IPv4 header")]
    TruncatedIpHeader,

    /// End of frame before both transport ports were captured
    #[error("frame ended inside the transport ports")]
    TruncatedPorts,

    /// IPv4 version nibble other than 4
    #[error("IPv4 version field is {0}, expected 4")]
    BadVersion(u8),

    /// IHL below the 5-word minimum
    #[error("IPv4 header length field is {0}, minimum is 5")]
    BadHeaderLength(u8),
}

impl Fault {
    /// True for the truncation family, false for malformed headers
    pub fn is_truncation(self) -> bool {
        matches!(
            self,
            Fault::TruncatedEthernet | Fault::TruncatedIpHeader | Fault::TruncatedPorts
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_messages() {
        assert_eq!(
            Fault::BadVersion(6).to_string(),
            "IPv4 version field is 6, expected 4"
        );
        assert_eq!(
            Fault::TruncatedPorts.to_string(),
            "frame ended inside the transport ports"
        );
    }

    #[test]
    fn test_fault_family() {
        assert!(Fault::TruncatedEthernet.is_truncation());
        assert!(!Fault::BadHeaderLength(3).is_truncation());
    }
}
