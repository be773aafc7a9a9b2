//! Scan statistics

use crate::filters::is_checksum_failure;
use ethscan_parser::FrameReport;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Statistics for one scan
#[derive(Debug, Clone, PartialEq)]
pub struct ScanStats {
    /// Frames run through the parser
    pub frames: u64,
    /// Bytes run through the parser
    pub bytes: u64,
    /// Frames with a structural error
    pub errors: u64,
    /// Erroneous frames that ended early, as opposed to malformed headers
    pub truncated: u64,
    /// IPv4 frames whose header checksum failed
    pub checksum_failures: u64,
    pub tcp: u64,
    pub udp: u64,
    /// Frames that were neither TCP nor UDP
    pub other: u64,
    /// Frames or input lines that never reached the parser
    pub skipped: u64,
    /// Scan duration
    pub duration: Duration,
    /// Frames per second
    pub frames_per_second: f64,
}

impl ScanStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self {
            frames: 0,
            bytes: 0,
            errors: 0,
            truncated: 0,
            checksum_failures: 0,
            tcp: 0,
            udp: 0,
            other: 0,
            skipped: 0,
            duration: Duration::from_secs(0),
            frames_per_second: 0.0,
        }
    }

    /// Error rate as percentage of parsed frames
    pub fn error_rate(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        (self.errors as f64 / self.frames as f64) * 100.0
    }

    /// Format statistics as human-readable string
    pub fn format(&self) -> String {
        format!(
            "Frames: {} ({} bytes)\n\
             Errors: {} ({:.2}%, {} truncated)\n\
             Checksum failures: {}\n\
             TCP: {}, UDP: {}, other: {}\n\
             Skipped: {}\n\
             Duration: {:.2}s ({:.2} frames/s)",
            self.frames,
            self.bytes,
            self.errors,
            self.error_rate(),
            self.truncated,
            self.checksum_failures,
            self.tcp,
            self.udp,
            self.other,
            self.skipped,
            self.duration.as_secs_f64(),
            self.frames_per_second
        )
    }
}

impl Default for ScanStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe statistics accumulator
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    frames: Arc<AtomicU64>,
    bytes: Arc<AtomicU64>,
    errors: Arc<AtomicU64>,
    truncated: Arc<AtomicU64>,
    checksum_failures: Arc<AtomicU64>,
    tcp: Arc<AtomicU64>,
    udp: Arc<AtomicU64>,
    skipped: Arc<AtomicU64>,
    start_time: Instant,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            bytes: Arc::new(AtomicU64::new(0)),
            errors: Arc::new(AtomicU64::new(0)),
            truncated: Arc::new(AtomicU64::new(0)),
            checksum_failures: Arc::new(AtomicU64::new(0)),
            tcp: Arc::new(AtomicU64::new(0)),
            udp: Arc::new(AtomicU64::new(0)),
            skipped: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    /// Record the report of one parsed frame
    pub fn record_report(&self, report: &FrameReport) {
        self.frames.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(report.bytes as u64, Ordering::Relaxed);

        if report.error {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        if report.fault.map_or(false, |fault| fault.is_truncation()) {
            self.truncated.fetch_add(1, Ordering::Relaxed);
        }
        if is_checksum_failure(report) {
            self.checksum_failures.fetch_add(1, Ordering::Relaxed);
        }
        if report.fields.is_tcp {
            self.tcp.fetch_add(1, Ordering::Relaxed);
        } else if report.fields.is_udp {
            self.udp.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a frame or input line that was not parsed
    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current statistics snapshot
    pub fn snapshot(&self) -> ScanStats {
        let frames = self.frames.load(Ordering::Relaxed);
        let tcp = self.tcp.load(Ordering::Relaxed);
        let udp = self.udp.load(Ordering::Relaxed);
        let duration = self.start_time.elapsed();

        let secs = duration.as_secs_f64();
        let frames_per_second = if secs > 0.0 {
            frames as f64 / secs
        } else {
            0.0
        };

        ScanStats {
            frames,
            bytes: self.bytes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            truncated: self.truncated.load(Ordering::Relaxed),
            checksum_failures: self.checksum_failures.load(Ordering::Relaxed),
            tcp,
            udp,
            other: frames.saturating_sub(tcp + udp),
            skipped: self.skipped.load(Ordering::Relaxed),
            duration,
            frames_per_second,
        }
    }
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethscan_packet::FrameBuilder;
    use ethscan_parser::parse_frame;
    use std::net::Ipv4Addr;
    use std::thread;

    fn report(builder: FrameBuilder) -> FrameReport {
        parse_frame(&builder.build().unwrap())
    }

    fn ipv4() -> FrameBuilder {
        FrameBuilder::new().ipv4(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2))
    }

    #[test]
    fn test_scan_stats_new() {
        let stats = ScanStats::new();
        assert_eq!(stats.frames, 0);
        assert_eq!(stats.error_rate(), 0.0);
        assert_eq!(stats, ScanStats::default());
    }

    #[test]
    fn test_error_rate() {
        let stats = ScanStats {
            frames: 200,
            errors: 10,
            ..ScanStats::new()
        };
        assert_eq!(stats.error_rate(), 5.0);
    }

    #[test]
    fn test_stats_format() {
        let stats = ScanStats {
            frames: 1000,
            bytes: 64000,
            errors: 50,
            truncated: 20,
            checksum_failures: 7,
            tcp: 600,
            udp: 300,
            other: 100,
            skipped: 3,
            duration: Duration::from_secs(10),
            frames_per_second: 100.0,
        };

        let formatted = stats.format();
        assert!(formatted.contains("Frames: 1000 (64000 bytes)"));
        assert!(formatted.contains("Errors: 50 (5.00%, 20 truncated)"));
        assert!(formatted.contains("Checksum failures: 7"));
        assert!(formatted.contains("TCP: 600, UDP: 300, other: 100"));
    }

    #[test]
    fn test_record_reports() {
        let acc = StatsAccumulator::new();

        acc.record_report(&report(ipv4().tcp(1, 2)));
        acc.record_report(&report(ipv4().udp(1, 2)));
        acc.record_report(&report(ipv4().udp(1, 2).flip_checksum_bit(0)));
        acc.record_report(&parse_frame(&[0u8; 9]));
        acc.record_report(&report(ipv4().tcp(1, 2).ip_version(6)));
        acc.record_skipped();

        let snapshot = acc.snapshot();
        assert_eq!(snapshot.frames, 5);
        assert_eq!(snapshot.bytes, 60 * 4 + 9);
        assert_eq!(snapshot.errors, 2);
        assert_eq!(snapshot.truncated, 1);
        assert_eq!(snapshot.checksum_failures, 1);
        assert_eq!(snapshot.tcp, 1);
        assert_eq!(snapshot.udp, 2);
        assert_eq!(snapshot.other, 2);
        assert_eq!(snapshot.skipped, 1);
    }

    #[test]
    fn test_thread_safety() {
        let acc = StatsAccumulator::new();
        let acc_clone = acc.clone();
        let tcp = report(ipv4().tcp(1, 2));

        let handle = thread::spawn(move || {
            for _ in 0..100 {
                acc_clone.record_report(&tcp);
            }
        });

        for _ in 0..100 {
            acc.record_skipped();
        }

        handle.join().unwrap();

        let snapshot = acc.snapshot();
        assert_eq!(snapshot.frames, 100);
        assert_eq!(snapshot.skipped, 100);
        assert_eq!(snapshot.tcp, 100);
    }
}
