//! Frame feeding for ethscan
//!
//! This crate reads frames from a source, runs them byte by byte through an
//! [`ethscan_parser::FrameParser`] and collects statistics.
//!
//! ## Features
//!
//! - **Sources**: hex dump files (one frame per line) and in-memory frames
//! - **Filters**: pass only TCP, UDP, erroneous or checksum-failing frames
//! - **Statistics**: thread-safe counters with a snapshot view
//!
//! ## Example
//!
//! ```
//! use std::io::Cursor;
//! use ethscan_feed::{FeedConfig, FrameFeeder, HexDumpSource};
//!
//! # fn main() -> ethscan_core::Result<()> {
//! let dump = "# truncated frame\n02 00 00 00 00 02 02 00\n";
//! let mut source = HexDumpSource::new("dump", Cursor::new(dump));
//!
//! let mut feeder = FrameFeeder::new(FeedConfig::default());
//! let stats = feeder.run(&mut source, |frame, report| {
//!     println!("#{} {}", frame.index, report);
//! })?;
//!
//! assert_eq!(stats.frames, 1);
//! assert_eq!(stats.errors, 1);
//! # Ok(())
//! # }
//! ```

pub mod feeder;
pub mod filters;
pub mod source;
pub mod stats;

pub use feeder::{FeedConfig, FrameFeeder};
pub use filters::ReportFilter;
pub use source::{format_hex_line, parse_hex_line, FrameSource, HexDumpSource, MemorySource};
pub use stats::{ScanStats, StatsAccumulator};
