//! Frame construction library for ethscan
//!
//! This crate builds Ethernet II frames carrying IPv4 and TCP/UDP headers,
//! and holds the Internet checksum arithmetic shared with the streaming
//! parser. It is used to generate sample traffic and test vectors:
//!
//! - [`builder`] - fluent `FrameBuilder`, including deliberately broken frames
//! - [`ethernet`] - Ethernet II header and MAC addresses
//! - [`ip`] - IPv4 header with options
//! - [`tcp`] / [`udp`] - transport headers with pseudo-header checksums
//! - [`checksum`] - RFC 1071 one's-complement arithmetic
//!
//! # Quick Start
//!
//! ```rust
//! use std::net::Ipv4Addr;
//! use ethscan_packet::FrameBuilder;
//!
//! let frame = FrameBuilder::new()
//!     .ipv4(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2))
//!     .udp(54321, 53)
//!     .payload(vec![0x12, 0x34])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(frame.len(), 60);
//! ```

pub mod builder;
pub mod checksum;
pub mod ethernet;
pub mod ip;
pub mod tcp;
pub mod udp;

// Re-export commonly used types for convenience
pub use builder::FrameBuilder;
pub use checksum::{fold_carries, internet_checksum, transport_checksum};
pub use ethernet::{EtherType, EthernetHeader, MacAddress};
pub use ip::{IpProtocol, Ipv4Header};
pub use tcp::{TcpFlags, TcpHeader};
pub use udp::UdpHeader;
