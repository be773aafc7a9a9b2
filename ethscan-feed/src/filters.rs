//! Report filters applied before reports reach the caller

use ethscan_core::Error;
use ethscan_parser::FrameReport;
use std::fmt;
use std::str::FromStr;

/// Which frame reports to pass on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFilter {
    /// Every frame
    #[default]
    All,
    /// TCP over IPv4
    Tcp,
    /// UDP over IPv4
    Udp,
    /// Frames with a structural error
    Errors,
    /// Structurally sound IPv4 frames whose header checksum failed
    BadChecksum,
    /// No error and a good header checksum
    Valid,
}

impl ReportFilter {
    /// Names accepted by `FromStr`
    pub const NAMES: [&'static str; 6] = ["all", "tcp", "udp", "errors", "bad-checksum", "valid"];

    /// Check whether a report passes the filter
    pub fn matches(&self, report: &FrameReport) -> bool {
        match self {
            ReportFilter::All => true,
            ReportFilter::Tcp => report.fields.is_tcp,
            ReportFilter::Udp => report.fields.is_udp,
            ReportFilter::Errors => report.error,
            ReportFilter::BadChecksum => is_checksum_failure(report),
            ReportFilter::Valid => !report.error && report.checksum_ok,
        }
    }
}

/// An IPv4 frame that parsed cleanly but carries a wrong header checksum
pub fn is_checksum_failure(report: &FrameReport) -> bool {
    report.is_ipv4() && !report.error && !report.checksum_ok
}

impl FromStr for ReportFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(ReportFilter::All),
            "tcp" => Ok(ReportFilter::Tcp),
            "udp" => Ok(ReportFilter::Udp),
            "errors" | "error" => Ok(ReportFilter::Errors),
            "bad-checksum" | "bad_checksum" => Ok(ReportFilter::BadChecksum),
            "valid" => Ok(ReportFilter::Valid),
            other => Err(Error::invalid_parameter(
                "filter",
                format!(
                    "unknown filter '{}', expected one of: {}",
                    other,
                    Self::NAMES.join(", ")
                ),
            )),
        }
    }
}

impl fmt::Display for ReportFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportFilter::All => "all",
            ReportFilter::Tcp => "tcp",
            ReportFilter::Udp => "udp",
            ReportFilter::Errors => "errors",
            ReportFilter::BadChecksum => "bad-checksum",
            ReportFilter::Valid => "valid",
        };
        write!(f, "{}", name)
    }
}
