//! Stat source: process and interface counters via sysinfo (plus /proc on Linux).

#[cfg(target_os = "linux")]
use std::fs;

use sysinfo::{Networks, Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::error::{ProbeError, SourceError};
use crate::types::{InterfaceCounters, ProcessMatch, ProcessStats};

/// What the sampling loop needs from the OS.
pub trait StatSource {
    /// CPU% since the previous call for the same pid, RSS and thread count.
    fn sample_process(&mut self, pid: u32) -> Result<ProcessStats, SourceError>;

    /// Cumulative counters for every interface currently known to the OS.
    fn interface_counters(&mut self) -> Result<Vec<InterfaceCounters>, SourceError>;
}

/// Pick `name` out of a full interface listing, or report what exists.
pub fn interface_by_name(
    list: Vec<InterfaceCounters>,
    name: &str,
) -> Result<InterfaceCounters, ProbeError> {
    let available = list
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(",");
    list.into_iter()
        .find(|c| c.name == name)
        .ok_or_else(|| ProbeError::InterfaceNotFound {
            name: name.to_string(),
            available,
        })
}

/// Persistent sysinfo handles. CPU usage is relative to the previous refresh,
/// so the same `System` must be reused for every tick.
pub struct SysinfoSource {
    sys: System,
    networks: Networks,
}

impl SysinfoSource {
    pub fn new() -> Self {
        Self {
            sys: System::new(),
            networks: Networks::new_with_refreshed_list(),
        }
    }

    /// Processes whose executable name contains `needle`, excluding ourselves.
    pub fn find_processes(&mut self, needle: &str) -> Vec<ProcessMatch> {
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing(),
        );
        let own = std::process::id();
        let mut found: Vec<ProcessMatch> = self
            .sys
            .processes()
            .values()
            .filter(|p| p.pid().as_u32() != own)
            .filter_map(|p| {
                let name = p.name().to_string_lossy();
                name.contains(needle).then(|| ProcessMatch {
                    pid: p.pid().as_u32(),
                    name: name.into_owned(),
                })
            })
            .collect();
        found.sort_by_key(|m| m.pid);
        found
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StatSource for SysinfoSource {
    fn sample_process(&mut self, pid: u32) -> Result<ProcessStats, SourceError> {
        let spid = Pid::from_u32(pid);
        let kind = ProcessRefreshKind::nothing()
            .with_cpu()
            .with_memory()
            .with_tasks();
        self.sys
            .refresh_processes_specifics(ProcessesToUpdate::Some(&[spid]), true, kind);
        let p = self.sys.process(spid).ok_or(SourceError::ProcessGone(pid))?;

        #[cfg(target_os = "linux")]
        let threads = read_proc_threads(pid)?;
        #[cfg(not(target_os = "linux"))]
        let threads = p
            .tasks()
            .map(|t| t.len() as u64)
            .ok_or_else(|| SourceError::ProcessQuery {
                pid,
                what: "threads",
                reason: "task list not available on this platform".into(),
            })?;

        Ok(ProcessStats {
            cpu_percent: p.cpu_usage(),
            rss_bytes: p.memory(),
            threads,
        })
    }

    fn interface_counters(&mut self) -> Result<Vec<InterfaceCounters>, SourceError> {
        // drop interfaces that went away so a vanished iface is reported as such
        self.networks.refresh(true);
        let mut list: Vec<InterfaceCounters> = self
            .networks
            .iter()
            .map(|(name, data)| {
                InterfaceCounters::new(name.as_str(), data.total_received(), data.total_transmitted())
            })
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }
}

#[cfg(target_os = "linux")]
fn read_proc_threads(pid: u32) -> Result<u64, SourceError> {
    let path = format!("/proc/{pid}/stat");
    let s = fs::read_to_string(path).map_err(|e| SourceError::ProcessQuery {
        pid,
        what: "threads",
        reason: e.to_string(),
    })?;
    parse_stat_threads(&s).ok_or_else(|| SourceError::ProcessQuery {
        pid,
        what: "threads",
        reason: "malformed /proc stat line".into(),
    })
}

// num_threads is the 20th field of /proc/<pid>/stat. comm (field 2) may contain
// spaces and parens, so count from the last ')'.
#[cfg(any(target_os = "linux", test))]
fn parse_stat_threads(stat: &str) -> Option<u64> {
    let rpar = stat.rfind(')')?;
    let after = stat.get(rpar + 2..)?; // skip ") "
    after.split_whitespace().nth(17)?.parse().ok()
}
