use crate::engine::{BatchSummary, ConsensusOutcome};
use std::fmt::Write;

const METRIC_PREFIX: &str = "assemblywatch_";

/// Counters and gauges describing the consensus pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsensusTelemetry {
    pub batches_total: u64,
    pub state_events_total: u64,
    pub part_frames_total: u64,
    pub state_evictions_total: u64,
    pub part_frame_evictions_total: u64,
    pub active_state_changes_total: u64,
    pub empty_window_total: u64,
    pub feed_rejections_total: u64,
    pub log_failures_total: u64,
    pub active_state: u32,
    pub active_state_confidence: f64,
}

impl ConsensusTelemetry {
    /// Accounts for one processed batch and the consensus run that followed it.
    pub fn record_batch(&mut self, summary: &BatchSummary, outcome: Option<&ConsensusOutcome>) {
        self.batches_total += 1;
        self.state_events_total += summary.state_events as u64;
        self.state_evictions_total += summary.state_evictions as u64;
        if summary.frame_recorded {
            self.part_frames_total += 1;
        }
        if summary.frame_evicted {
            self.part_frame_evictions_total += 1;
        }
        match outcome {
            Some(outcome) => {
                if outcome.changed {
                    self.active_state_changes_total += 1;
                }
                self.active_state = outcome.state_id;
                self.active_state_confidence = outcome.confidence;
            }
            None => self.empty_window_total += 1,
        }
    }

    pub fn record_feed_rejection(&mut self) {
        self.feed_rejections_total += 1;
    }

    /// Counts a log record that could not be written.
    pub fn record_log_failure(&mut self) {
        self.log_failures_total += 1;
    }

    /// Prometheus text exposition.
    pub fn render_metrics(&self) -> String {
        let counters = [
            ("batches_total", self.batches_total),
            ("state_events_total", self.state_events_total),
            ("part_frames_total", self.part_frames_total),
            ("state_evictions_total", self.state_evictions_total),
            ("part_frame_evictions_total", self.part_frame_evictions_total),
            ("active_state_changes_total", self.active_state_changes_total),
            ("empty_window_total", self.empty_window_total),
            ("feed_rejections_total", self.feed_rejections_total),
            ("log_failures_total", self.log_failures_total),
            ("active_state", u64::from(self.active_state)),
        ];
        let mut out = String::new();
        for (name, value) in counters {
            let _ = writeln!(out, "{METRIC_PREFIX}{name} {value}");
        }
        let _ = writeln!(
            out,
            "{METRIC_PREFIX}active_state_confidence {:.6}",
            self.active_state_confidence
        );
        out
    }
}
