//! Snapshot types passed between the stat source, the speed derivation and the sink.
//! Keep this module minimal and stable — it mirrors the CSV row layout.

use chrono::{DateTime, Local};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceCounters {
    pub name: String,
    // cumulative totals reported by the OS (diff two snapshots to get rates)
    pub received: u64,
    pub sent: u64,
}

impl InterfaceCounters {
    pub fn new(name: impl Into<String>, received: u64, sent: u64) -> Self {
        Self {
            name: name.into(),
            received,
            sent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessStats {
    pub cpu_percent: f32,
    pub rss_bytes: u64,
    pub threads: u64,
}

/// Bytes per second, inbound and outbound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetRates {
    pub in_bps: u64,
    pub out_bps: u64,
}

impl NetRates {
    pub fn in_kbps(&self) -> u64 {
        bytes_to_kbits(self.in_bps)
    }

    pub fn out_kbps(&self) -> u64 {
        bytes_to_kbits(self.out_bps)
    }
}

fn bytes_to_kbits(bps: u64) -> u64 {
    bps.saturating_mul(8) / 1024
}

#[derive(Debug, Clone)]
pub struct Sample {
    pub at: DateTime<Local>,
    pub process: ProcessStats,
    pub net: NetRates,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessMatch {
    pub pid: u32,
    pub name: String,
}
