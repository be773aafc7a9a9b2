//! Drives a [`FrameParser`] from a [`FrameSource`]

use crate::filters::ReportFilter;
use crate::source::FrameSource;
use crate::stats::{ScanStats, StatsAccumulator};
use ethscan_core::{Error, Frame, Result};
use ethscan_parser::{FrameParser, FrameReport};
use tracing::{debug, error, info, warn};

/// Jumbo frame size: 9000 bytes of payload plus header and FCS
const DEFAULT_MAX_FRAME_LEN: usize = 9018;

/// Configuration for a scan
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Return the parser to idle after every frame
    pub idle_between_frames: bool,
    /// Frames longer than this are skipped
    pub max_frame_len: usize,
    /// Abort on unreadable input instead of skipping it
    pub stop_on_source_error: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            idle_between_frames: true,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            stop_on_source_error: true,
        }
    }
}

/// Feeds frames into one parser, byte by byte
pub struct FrameFeeder {
    config: FeedConfig,
    filter: ReportFilter,
    parser: FrameParser,
    stats: StatsAccumulator,
}

impl FrameFeeder {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            config,
            filter: ReportFilter::All,
            parser: FrameParser::new(),
            stats: StatsAccumulator::new(),
        }
    }

    /// Only hand reports matching `filter` to the callback
    pub fn with_filter(mut self, filter: ReportFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Statistics accumulator, shareable with other threads
    pub fn stats(&self) -> &StatsAccumulator {
        &self.stats
    }

    /// Run every frame of `source` through the parser.
    ///
    /// Reports passing the filter go to `callback`. Statistics count every
    /// frame, filtered or not.
    ///
    /// # Errors
    ///
    /// Returns the source's error when it cannot be read. Malformed lines are
    /// skipped instead if `stop_on_source_error` is off.
    pub fn run<S, F>(&mut self, source: &mut S, mut callback: F) -> Result<ScanStats>
    where
        S: FrameSource + ?Sized,
        F: FnMut(&Frame, &FrameReport),
    {
        info!("Scanning {} (filter: {})", source.name(), self.filter);

        loop {
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e @ Error::FrameSource { .. }) if !self.config.stop_on_source_error => {
                    warn!("Skipping input: {}", e);
                    self.stats.record_skipped();
                    continue;
                }
                Err(e) => {
                    error!("Scan of {} aborted: {}", source.name(), e);
                    return Err(e);
                }
            };

            if let Some(report) = self.feed_frame(&frame) {
                if self.filter.matches(&report) {
                    callback(&frame, &report);
                }
            }
        }

        let stats = self.stats.snapshot();
        info!(
            frames = stats.frames,
            errors = stats.errors,
            skipped = stats.skipped,
            "Scan of {} finished",
            source.name()
        );
        Ok(stats)
    }

    /// Run one frame through the parser, unless it must be skipped
    pub fn feed_frame(&mut self, frame: &Frame) -> Option<FrameReport> {
        if frame.is_empty() {
            warn!(index = frame.index, "Skipping empty frame from {}", frame.origin);
            self.stats.record_skipped();
            return None;
        }
        if frame.len() > self.config.max_frame_len {
            let err = Error::FrameTooLarge {
                len: frame.len(),
                limit: self.config.max_frame_len,
            };
            warn!(index = frame.index, "Skipping frame: {}", err);
            self.stats.record_skipped();
            return None;
        }

        let report = self.parser.feed(frame.data());
        if self.config.idle_between_frames {
            self.parser.idle_tick();
        }

        debug!(index = frame.index, "{}", report);
        self.stats.record_report(&report);
        Some(report)
    }

    /// The parser, as left by the last frame
    pub fn parser(&self) -> &FrameParser {
        &self.parser
    }
}

impl Default for FrameFeeder {
    fn default() -> Self {
        Self::new(FeedConfig::default())
    }
}
