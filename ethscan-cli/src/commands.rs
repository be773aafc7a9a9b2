//! Subcommand implementations

use crate::args::{GenArgs, ScanArgs};
use ethscan_core::{Error, Result};
use ethscan_feed::{
    format_hex_line, parse_hex_line, FeedConfig, FrameFeeder, FrameSource, HexDumpSource,
    ScanStats,
};
use ethscan_packet::{EtherType, FrameBuilder, IpProtocol, MacAddress};
use std::io::{self, Write};
use tracing::{debug, info};

/// NOP option byte
const IP_OPTION_NOP: u8 = 0x01;

impl ScanArgs {
    /// Feeder configuration for these arguments
    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            idle_between_frames: !self.no_idle,
            max_frame_len: self.max_frame_len,
            stop_on_source_error: !self.keep_going,
        }
    }
}

/// Scan the input named by `args`, writing one line per report to `out`
pub fn scan<W: Write>(args: &ScanArgs, out: &mut W) -> Result<ScanStats> {
    if args.input == "-" {
        let mut source = HexDumpSource::new("stdin", io::stdin().lock());
        scan_source(args, &mut source, out)
    } else {
        let mut source = HexDumpSource::open(&args.input)?;
        scan_source(args, &mut source, out)
    }
}

/// Scan an already open source
pub fn scan_source<W: Write>(
    args: &ScanArgs,
    source: &mut dyn FrameSource,
    out: &mut W,
) -> Result<ScanStats> {
    let mut feeder = FrameFeeder::new(args.feed_config()).with_filter(args.filter);
    let mut write_error: Option<io::Error> = None;

    let stats = feeder.run(source, |frame, report| {
        if write_error.is_none() {
            if let Err(e) = writeln!(out, "#{:<5} {}", frame.index, report) {
                write_error = Some(e);
            }
        }
    })?;

    if let Some(e) = write_error {
        return Err(e.into());
    }

    writeln!(out)?;
    writeln!(out, "{}", stats.format())?;
    Ok(stats)
}

/// Build the frame described by `args`
pub fn build_frame(args: &GenArgs) -> Result<Vec<u8>> {
    let payload = match &args.payload {
        Some(hex) => parse_hex_line(hex)
            .map_err(|reason| Error::invalid_parameter("payload", reason))?
            .map(|data| data.to_vec())
            .unwrap_or_default(),
        None => Vec::new(),
    };

    let builder = FrameBuilder::new();
    let builder = match (args.src_mac, args.dst_mac) {
        (None, None) => builder,
        (src, dst) => builder.ethernet(
            src.unwrap_or(MacAddress([0x02, 0x00, 0x00, 0x00, 0x00, 0x01])),
            dst.unwrap_or(MacAddress::BROADCAST),
            EtherType::IPv4,
        ),
    };

    let mut builder = builder
        .ipv4(args.src_ip, args.dst_ip)
        .ip_options(vec![IP_OPTION_NOP; args.options_len])
        .payload(payload);

    builder = match args.proto.to_lowercase().as_str() {
        "tcp" => builder.tcp(args.src_port, args.dst_port),
        "udp" => builder.udp(args.src_port, args.dst_port),
        "icmp" => builder.protocol(IpProtocol::ICMP),
        other => {
            let number = other.parse::<u8>().map_err(|_| {
                Error::invalid_parameter("proto", format!("unknown protocol '{}'", other))
            })?;
            builder.protocol(IpProtocol::from_u8(number))
        }
    };

    if args.corrupt_checksum {
        builder = builder.flip_checksum_bit(0);
    }

    let frame = builder.build()?;
    debug!(len = frame.len(), proto = %args.proto, "Built frame");
    Ok(frame)
}

/// Build a frame and write it to `out` as one hex dump line
pub fn generate<W: Write>(args: &GenArgs, out: &mut W) -> Result<()> {
    let frame = build_frame(args)?;
    info!(
        "Generated {} byte frame {} -> {}",
        frame.len(),
        args.src_ip,
        args.dst_ip
    );
    writeln!(out, "{}", format_hex_line(&frame))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethscan_feed::ReportFilter;
    use ethscan_parser::parse_frame;
    use std::io::Cursor;
    use std::net::Ipv4Addr;

    fn gen_args(proto: &str) -> GenArgs {
        GenArgs {
            src_ip: Ipv4Addr::new(192, 168, 0, 1),
            dst_ip: Ipv4Addr::new(192, 168, 0, 2),
            proto: proto.to_string(),
            src_port: 0x80,
            dst_port: 0x90,
            src_mac: None,
            dst_mac: None,
            options_len: 0,
            corrupt_checksum: false,
            payload: None,
        }
    }

    fn scan_args(filter: ReportFilter, keep_going: bool) -> ScanArgs {
        ScanArgs {
            input: "-".to_string(),
            filter,
            max_frame_len: 9018,
            keep_going,
            no_idle: false,
        }
    }

    fn scan_text(args: &ScanArgs, text: &str) -> (Result<ScanStats>, String) {
        let mut source = HexDumpSource::new("test", Cursor::new(text.as_bytes().to_vec()));
        let mut out = Vec::new();
        let result = scan_source(args, &mut source, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_build_tcp_frame() {
        let report = parse_frame(&build_frame(&gen_args("tcp")).unwrap());

        assert!(report.checksum_ok);
        assert!(report.fields.is_tcp);
        assert_eq!(report.fields.src_ip, 0xC0A80001);
        assert_eq!(report.fields.src_port, 0x80);
        assert_eq!(report.fields.dst_port, 0x90);
    }

    #[test]
    fn test_build_variants() {
        let mut args = gen_args("UDP");
        args.options_len = 6;
        args.payload = Some("de:ad:be:ef".to_string());
        let frame = build_frame(&args).unwrap();
        let report = parse_frame(&frame);
        assert!(report.fields.is_udp);
        assert_eq!(report.ip_header_len, 28);
        assert!(report.checksum_ok);

        let report = parse_frame(&build_frame(&gen_args("icmp")).unwrap());
        assert_eq!(report.declared_protocol, 1);
        assert!(!report.fields.has_ports());

        let report = parse_frame(&build_frame(&gen_args("47")).unwrap());
        assert_eq!(report.declared_protocol, 47);
    }

    #[test]
    fn test_build_custom_macs() {
        let mut args = gen_args("tcp");
        args.dst_mac = Some(MacAddress([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]));
        let frame = build_frame(&args).unwrap();

        assert_eq!(&frame[0..6], &[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        assert_eq!(&frame[6..12], &[0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
        assert!(parse_frame(&frame).checksum_ok);
    }

    #[test]
    fn test_build_corrupt_checksum() {
        let mut args = gen_args("tcp");
        args.corrupt_checksum = true;
        let report = parse_frame(&build_frame(&args).unwrap());

        assert!(!report.checksum_ok);
        assert!(!report.error);
    }

    #[test]
    fn test_build_rejects_bad_input() {
        assert!(build_frame(&gen_args("sctp")).is_err());
        assert!(build_frame(&gen_args("300")).is_err());

        let mut args = gen_args("tcp");
        args.options_len = 41;
        assert!(build_frame(&args).is_err());

        let mut args = gen_args("tcp");
        args.payload = Some("abc".to_string());
        assert!(matches!(
            build_frame(&args),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_gen_output_scans_cleanly() {
        let mut line = Vec::new();
        generate(&gen_args("udp"), &mut line).unwrap();
        let line = String::from_utf8(line).unwrap();
        assert!(line.ends_with('\n'));

        let (stats, out) = scan_text(&scan_args(ReportFilter::All, false), &line);
        let stats = stats.unwrap();
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.errors, 0);
        assert!(out.starts_with("#1"));
        assert!(out.contains("UDP 192.168.0.1:128 -> 192.168.0.2:144"));
        assert!(out.contains("checksum ok"));
        assert!(out.contains("Frames: 1"));
    }

    #[test]
    fn test_scan_filter() {
        let mut bad = gen_args("tcp");
        bad.corrupt_checksum = true;
        let text = format!(
            "{}\n{}\n",
            format_hex_line(&build_frame(&gen_args("tcp")).unwrap()),
            format_hex_line(&build_frame(&bad).unwrap())
        );

        let (stats, out) = scan_text(&scan_args(ReportFilter::BadChecksum, false), &text);
        assert_eq!(stats.unwrap().checksum_failures, 1);
        assert!(!out.contains("#1 "));
        assert!(out.contains("#2 "));
        assert!(out.contains("checksum BAD"));
    }

    #[test]
    fn test_scan_source_error() {
        let text = "00 11\nnot hex\n";

        let (result, _) = scan_text(&scan_args(ReportFilter::All, false), text);
        assert!(matches!(result, Err(Error::FrameSource { line: 2, .. })));

        let (result, out) = scan_text(&scan_args(ReportFilter::All, true), text);
        assert_eq!(result.unwrap().skipped, 1);
        assert!(out.contains("ERROR"));
    }

    #[test]
    fn test_feed_config() {
        let mut args = scan_args(ReportFilter::All, true);
        args.no_idle = true;
        let config = args.feed_config();

        assert!(!config.idle_between_frames);
        assert!(!config.stop_on_source_error);
        assert_eq!(config.max_frame_len, 9018);
    }
}
