//! Frame state controller
//!
//! [`FrameParser`] is the frame session. Each call to [`FrameParser::step`]
//! consumes one byte and performs, in this order:
//!
//! 1. new-frame reset, if the byte arrives while idle or complete;
//! 2. datapath capture, keyed on the phase held before this step;
//! 3. next-phase decision and this step's fault, if any;
//! 4. when entering `Complete`, the checksum verdict, computed against the
//!    latched error OR-ed with this step's fault;
//! 5. commit of phase, offset, error latch and verdict.
//!
//! All queries observe the post-step state.

use crate::checksum::{self, ChecksumVerdict};
use crate::datapath::Datapath;
use crate::fault::Fault;
use crate::fields::ExtractedFields;
use crate::phase::Phase;
use crate::report::FrameReport;
use ethscan_packet::ethernet::EtherType;
use ethscan_packet::ip::IpProtocol;
use tracing::{debug, trace};

/// Byte offset of the second EtherType byte
const ETHERTYPE_LAST_OFFSET: usize = 13;

/// Number of transport bytes holding the two ports
const PORT_BYTES: usize = 4;

/// Streaming Ethernet/IPv4/TCP/UDP parser for one byte stream
///
/// The parser is not reentrant; `step` takes `&mut self`. Results of the
/// last completed frame stay readable until the next frame supersedes them.
///
/// # Examples
///
/// ```
/// use std::net::Ipv4Addr;
/// use ethscan_packet::FrameBuilder;
/// use ethscan_parser::FrameParser;
///
/// let frame = FrameBuilder::new()
///     .ipv4(Ipv4Addr::new(192, 168, 0, 1), Ipv4Addr::new(192, 168, 0, 2))
///     .tcp(0x80, 0x90)
///     .build()
///     .unwrap();
///
/// let mut parser = FrameParser::new();
/// for (i, &byte) in frame.iter().enumerate() {
///     parser.step(byte, i + 1 == frame.len());
/// }
///
/// assert!(parser.is_complete());
/// assert!(parser.checksum_ok());
/// assert!(!parser.has_error());
/// assert_eq!(parser.extracted_fields().src_ip, 0xC0A80001);
/// ```
#[derive(Debug, Clone)]
pub struct FrameParser {
    phase: Phase,
    byte_offset: usize,
    prev_byte: u8,
    ethertype: Option<u16>,
    datapath: Datapath,
    error_latched: bool,
    fault: Option<Fault>,
    checksum_ok_latched: bool,
    verdict: Option<ChecksumVerdict>,
    bytes_consumed: usize,
}

impl FrameParser {
    /// Create a parser in the idle phase
    pub fn new() -> Self {
        FrameParser {
            phase: Phase::Idle,
            byte_offset: 0,
            prev_byte: 0,
            ethertype: None,
            datapath: Datapath::new(),
            error_latched: false,
            fault: None,
            checksum_ok_latched: false,
            verdict: None,
            bytes_consumed: 0,
        }
    }

    /// Consume one byte of the current frame; `is_last` marks its final byte
    pub fn step(&mut self, byte: u8, is_last: bool) {
        let current = if self.phase.is_between_frames() {
            self.begin_frame();
            Phase::Idle
        } else {
            self.phase
        };
        self.bytes_consumed += 1;

        self.datapath.capture(current, self.byte_offset, byte);

        let (next, step_fault) = self.decide(current, byte, is_last);

        if let Some(fault) = step_fault {
            debug!(
                phase = %current,
                offset = self.byte_offset,
                "frame fault: {}",
                fault
            );
            self.fault.get_or_insert(fault);
        }
        let error_now = self.error_latched || step_fault.is_some();

        if next == Phase::Complete {
            let verdict = checksum::verify(
                &self.datapath.ip_header_buffer,
                self.datapath.ip_header_len,
                error_now,
            );
            trace!(
                carried = verdict.carried,
                computed = verdict.computed,
                ok = verdict.ok,
                "checksum verdict latched"
            );
            self.checksum_ok_latched = verdict.ok;
            self.verdict = Some(verdict);
        }

        self.error_latched = error_now;
        self.advance(current, next);
        self.prev_byte = byte;
    }

    /// Idle tick with no byte: a completed frame settles into `Idle`.
    ///
    /// Results stay readable. Any other phase is left untouched.
    pub fn idle_tick(&mut self) {
        if self.phase == Phase::Complete {
            trace!("complete -> idle");
            self.phase = Phase::Idle;
        }
    }

    /// Feed a whole frame, marking its last byte, and report the outcome.
    ///
    /// An empty slice leaves the parser untouched.
    pub fn feed(&mut self, frame: &[u8]) -> FrameReport {
        let last = frame.len().saturating_sub(1);
        for (i, &byte) in frame.iter().enumerate() {
            self.step(byte, i == last);
        }
        self.report()
    }

    fn begin_frame(&mut self) {
        self.byte_offset = 0;
        self.ethertype = None;
        self.error_latched = false;
        self.fault = None;
        self.bytes_consumed = 0;
        self.datapath.begin_frame();
    }

    /// Next phase for `current` and the fault raised by this byte
    fn decide(&mut self, current: Phase, byte: u8, is_last: bool) -> (Phase, Option<Fault>) {
        let offset = self.byte_offset;

        match current {
            Phase::Idle | Phase::Complete => {
                if is_last {
                    (Phase::Complete, Some(Fault::TruncatedEthernet))
                } else {
                    (Phase::EthernetHeader, None)
                }
            }
            Phase::EthernetHeader => {
                if offset == ETHERTYPE_LAST_OFFSET {
                    self.ethertype = Some(u16::from_be_bytes([self.prev_byte, byte]));
                }

                if is_last {
                    let fault =
                        (offset < ETHERTYPE_LAST_OFFSET).then_some(Fault::TruncatedEthernet);
                    (Phase::Complete, fault)
                } else if offset == ETHERTYPE_LAST_OFFSET {
                    if self.ethertype == Some(EtherType::IPv4.to_u16()) {
                        (Phase::IpHeader, None)
                    } else {
                        (Phase::DrainToEnd, None)
                    }
                } else {
                    (Phase::EthernetHeader, None)
                }
            }
            Phase::IpHeader => {
                let header_fault = if offset == 0 {
                    Self::check_version_ihl(byte)
                } else {
                    None
                };

                if is_last {
                    let truncated =
                        header_fault.is_none() && offset + 1 < self.datapath.ip_header_len;
                    let fault = header_fault.or(truncated.then_some(Fault::TruncatedIpHeader));
                    (Phase::Complete, fault)
                } else if header_fault.is_some() {
                    (Phase::DrainToEnd, header_fault)
                } else if self.datapath.is_last_header_byte(offset) {
                    match IpProtocol::from_u8(self.datapath.declared_protocol) {
                        IpProtocol::TCP | IpProtocol::UDP => (Phase::L4Ports, None),
                        _ => (Phase::DrainToEnd, None),
                    }
                } else {
                    (Phase::IpHeader, None)
                }
            }
            Phase::L4Ports => {
                if is_last {
                    let fault = (offset + 1 < PORT_BYTES).then_some(Fault::TruncatedPorts);
                    (Phase::Complete, fault)
                } else if offset + 1 == PORT_BYTES {
                    (Phase::DrainToEnd, None)
                } else {
                    (Phase::L4Ports, None)
                }
            }
            Phase::DrainToEnd => {
                if is_last {
                    (Phase::Complete, None)
                } else {
                    (Phase::DrainToEnd, None)
                }
            }
        }
    }

    fn check_version_ihl(byte: u8) -> Option<Fault> {
        let version = byte >> 4;
        let ihl = byte & 0x0F;
        if version != 4 {
            Some(Fault::BadVersion(version))
        } else if ihl < 5 {
            Some(Fault::BadHeaderLength(ihl))
        } else {
            None
        }
    }

    /// Commit the transition and the offset for the next byte
    fn advance(&mut self, current: Phase, next: Phase) {
        if next != current {
            trace!(from = %current, to = %next, "phase transition");
        }

        self.byte_offset = match (current, next) {
            // The byte that left Idle was Ethernet byte 0
            (Phase::Idle, Phase::EthernetHeader) => 1,
            (_, Phase::DrainToEnd) | (_, Phase::Complete) => 0,
            (from, to) if from != to => {
                if to == Phase::IpHeader {
                    self.datapath.enter_ip_header();
                }
                0
            }
            _ => self.byte_offset + 1,
        };
        self.phase = next;
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True exactly while the phase is `Complete`
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Sticky error flag of the current or last frame
    pub fn has_error(&self) -> bool {
        self.error_latched
    }

    /// Checksum verdict committed when the last frame completed
    pub fn checksum_ok(&self) -> bool {
        self.checksum_ok_latched
    }

    /// Fields latched for the current or last frame
    pub fn extracted_fields(&self) -> ExtractedFields {
        self.datapath.fields
    }

    /// First fault of the current or last frame
    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    /// Carried and computed checksum of the last completed frame
    pub fn checksum_verdict(&self) -> Option<ChecksumVerdict> {
        self.verdict
    }

    /// EtherType of the current or last frame, once both bytes were seen
    pub fn ethertype(&self) -> Option<u16> {
        self.ethertype
    }

    /// Raw IPv4 protocol byte of the current or last frame
    pub fn declared_protocol(&self) -> u8 {
        self.datapath.declared_protocol
    }

    /// Declared IPv4 header length in bytes (20 until parsed)
    pub fn ip_header_len(&self) -> usize {
        self.datapath.ip_header_len
    }

    /// Bytes consumed since the current or last frame started
    pub fn bytes_consumed(&self) -> usize {
        self.bytes_consumed
    }

    /// Owned snapshot of every query above
    pub fn report(&self) -> FrameReport {
        FrameReport {
            complete: self.is_complete(),
            error: self.error_latched,
            fault: self.fault,
            checksum_ok: self.checksum_ok_latched,
            verdict: self.verdict,
            fields: self.datapath.fields,
            ethertype: self.ethertype,
            declared_protocol: self.datapath.declared_protocol,
            ip_header_len: self.datapath.ip_header_len,
            bytes: self.bytes_consumed,
        }
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}
