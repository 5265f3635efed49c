//! Validated, immutable run configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::args::ParsedArgs;
use crate::error::ConfigError;
use crate::types::ProcessMatch;

/// Env override for the runtime worker pool size.
pub const WORKER_THREADS_ENV: &str = "PROCPROBE_WORKER_THREADS";
pub const DEFAULT_WORKER_THREADS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Pid(u32),
    /// Substring of the executable name; must match exactly one process.
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub target: Target,
    pub output: PathBuf,
    pub iface: String,
    pub interval: Duration,
    pub header: bool,
}

impl TryFrom<ParsedArgs> for ProbeConfig {
    type Error = ConfigError;

    fn try_from(a: ParsedArgs) -> Result<Self, Self::Error> {
        // an explicit pid wins over -name
        let target = match (a.pid, a.name) {
            (-1, Some(name)) if !name.is_empty() => Target::Name(name),
            (pid, _) => match u32::try_from(pid) {
                Ok(p) if p > 0 => Target::Pid(p),
                _ => return Err(ConfigError::InvalidPid(pid)),
            },
        };
        if a.output.is_empty() {
            return Err(ConfigError::MissingOutput);
        }
        // rates are divided by whole seconds of elapsed time
        if a.interval < Duration::from_secs(1) {
            return Err(ConfigError::IntervalTooShort(a.interval));
        }
        Ok(Self {
            target,
            output: PathBuf::from(a.output),
            iface: a.iface,
            interval: a.interval,
            header: a.header,
        })
    }
}

/// Narrow a name search down to a single pid.
pub fn resolve_target(name: &str, mut found: Vec<ProcessMatch>) -> Result<u32, ConfigError> {
    match found.len() {
        0 => Err(ConfigError::NoProcessMatch(name.to_string())),
        1 => Ok(found.remove(0).pid),
        _ => Err(ConfigError::AmbiguousProcess {
            name: name.to_string(),
            candidates: found
                .iter()
                .map(|m| format!("{}:{}", m.pid, m.name))
                .collect::<Vec<_>>()
                .join(","),
        }),
    }
}

pub fn worker_threads() -> usize {
    std::env::var(WORKER_THREADS_ENV)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_WORKER_THREADS)
}
