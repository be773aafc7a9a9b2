//! Streaming Ethernet/IPv4/TCP/UDP frame parser
//!
//! The parser consumes a frame one byte at a time, with an end-of-frame
//! marker on the final byte, and exposes the extracted addresses, ports and
//! transport classification together with a sticky error flag and an IPv4
//! header checksum verdict.
//!
//! It is built from three cooperating parts:
//!
//! - [`parser`] - the state controller and frame session ([`FrameParser`])
//! - [`datapath`] - field extraction and IPv4 header capture
//! - [`checksum`] - one's-complement header checksum verification
//!
//! Truncated or malformed frames never desynchronize the parser: as soon as
//! a frame cannot be parsed further it drains to its end marker, and the
//! next byte always starts a clean frame.
//!
//! ```
//! use ethscan_parser::parse_frame;
//!
//! // 10 bytes: ends inside the Ethernet header
//! let report = parse_frame(&[0xFF; 10]);
//! assert!(report.complete);
//! assert!(report.error);
//! assert!(!report.checksum_ok);
//! ```

pub mod checksum;
pub mod datapath;
pub mod fault;
pub mod fields;
pub mod parser;
pub mod phase;
pub mod report;


pub use checksum::ChecksumVerdict;
pub use fault::Fault;
pub use fields::ExtractedFields;
pub use parser::FrameParser;
pub use phase::Phase;
pub use report::{parse_frame, FrameReport};
