//! Sampling loop: sleep, sample, derive rates against the previous tick, emit a row.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{ProbeError, Result, SpeedError};
use crate::output::{CsvSink, SyncWrite};
use crate::source::{interface_by_name, StatSource};
use crate::speed::calc_net_speed;
use crate::types::{InterfaceCounters, NetRates, Sample};

/// What the previous emitted row was derived from.
#[derive(Debug, Clone)]
pub struct LoopState {
    pub last_at: DateTime<Local>,
    // elapsed time between ticks is measured on the monotonic clock
    pub last_instant: Instant,
    pub last_counters: InterfaceCounters,
    pub last_rates: NetRates,
}

pub struct Sampler<S: StatSource> {
    source: S,
    pid: u32,
    iface: String,
    interval: Duration,
    state: LoopState,
}

impl<S: StatSource> Sampler<S> {
    /// Read the first interface snapshot and attach to `pid`.
    pub fn start(source: S, pid: u32, iface: &str, interval: Duration) -> Result<Self> {
        Self::start_at(source, pid, iface, interval, Local::now(), Instant::now())
    }

    pub fn start_at(
        mut source: S,
        pid: u32,
        iface: &str,
        interval: Duration,
        at: DateTime<Local>,
        instant: Instant,
    ) -> Result<Self> {
        let counters = interface_by_name(source.interface_counters()?, iface)?;
        // first refresh also sets the CPU usage baseline for the next tick
        source
            .sample_process(pid)
            .map_err(|e| ProbeError::ProcessUnavailable { pid, source: e })?;
        Ok(Self {
            source,
            pid,
            iface: iface.to_string(),
            interval,
            state: LoopState {
                last_at: at,
                last_instant: instant,
                last_counters: counters,
                last_rates: NetRates::default(),
            },
        })
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    /// Fixed-delay loop. Only returns on a fatal error.
    pub async fn run<W: SyncWrite>(mut self, sink: &mut CsvSink<W>) -> Result<()> {
        info!(
            pid = self.pid,
            iface = %self.iface,
            interval = ?self.interval,
            "sampling started"
        );
        loop {
            sleep(self.interval).await;
            self.tick(Local::now(), Instant::now(), sink)?;
        }
    }

    /// One tick: query, derive, write, then commit the state the row came from.
    pub fn tick<W: SyncWrite>(
        &mut self,
        at: DateTime<Local>,
        instant: Instant,
        sink: &mut CsvSink<W>,
    ) -> Result<Sample> {
        let process = self.source.sample_process(self.pid)?;
        let counters = interface_by_name(self.source.interface_counters()?, &self.iface)?;

        let elapsed = instant.saturating_duration_since(self.state.last_instant);
        let net = match calc_net_speed(&counters, &self.state.last_counters, elapsed) {
            Ok(rates) => rates,
            Err(e @ SpeedError::CounterRegression { .. }) => {
                warn!("calc net speed failed: {e}; reusing last rates");
                self.state.last_rates
            }
            Err(e) => return Err(e.into()),
        };

        let sample = Sample { at, process, net };
        sink.write_sample(&sample).map_err(ProbeError::Output)?;
        debug!(
            cpu = sample.process.cpu_percent,
            rss = sample.process.rss_bytes,
            threads = sample.process.threads,
            in_bps = net.in_bps,
            out_bps = net.out_bps,
            "row written"
        );

        self.state = LoopState {
            last_at: at,
            last_instant: instant,
            last_counters: counters,
            last_rates: net,
        };
        Ok(sample)
    }
}
