//! CLI argument parsing

use clap::{Args, Parser, Subcommand};
use ethscan_feed::ReportFilter;
use ethscan_packet::MacAddress;
use std::net::Ipv4Addr;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "ethscan")]
#[command(version, about = "Streaming Ethernet/IPv4 frame scanner", long_about = None)]
pub struct Cli {
    /// Verbose output (-v, -vv, -vvv for increasing verbosity)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable color output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse frames from a hex dump, one frame per line
    Scan(ScanArgs),

    /// Build a frame and print it as a hex dump line
    Gen(GenArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Hex dump file, or "-" for stdin
    #[arg(value_name = "FILE")]
    pub input: String,

    /// Reports to print (all, tcp, udp, errors, bad-checksum, valid)
    #[arg(short, long, default_value = "all")]
    pub filter: ReportFilter,

    /// Skip frames longer than this many bytes
    #[arg(long, value_name = "BYTES", default_value = "9018")]
    pub max_frame_len: usize,

    /// Skip malformed input lines instead of aborting
    #[arg(short, long)]
    pub keep_going: bool,

    /// Feed frames back to back, without idle time in between
    #[arg(long)]
    pub no_idle: bool,
}

#[derive(Args, Debug, Clone)]
pub struct GenArgs {
    /// Source IPv4 address
    #[arg(long)]
    pub src_ip: Ipv4Addr,

    /// Destination IPv4 address
    #[arg(long)]
    pub dst_ip: Ipv4Addr,

    /// Transport protocol: tcp, udp, icmp or a protocol number
    #[arg(short, long, default_value = "tcp")]
    pub proto: String,

    /// Source port (tcp/udp)
    #[arg(long, default_value = "1024")]
    pub src_port: u16,

    /// Destination port (tcp/udp)
    #[arg(long, default_value = "80")]
    pub dst_port: u16,

    /// Source MAC address
    #[arg(long)]
    pub src_mac: Option<MacAddress>,

    /// Destination MAC address
    #[arg(long)]
    pub dst_mac: Option<MacAddress>,

    /// Bytes of IPv4 options (NOPs, padded to a multiple of 4, at most 40)
    #[arg(long, value_name = "BYTES", default_value = "0")]
    pub options_len: usize,

    /// Flip the lowest bit of the IPv4 header checksum
    #[arg(long)]
    pub corrupt_checksum: bool,

    /// Payload as hex octets
    #[arg(long, value_name = "HEX")]
    pub payload: Option<String>,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Maximum log level for the `-v` count
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}
