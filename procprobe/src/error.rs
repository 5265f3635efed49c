//! Error types. Everything except a counter regression ends the run.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::InterfaceCounters;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid pid {0}")]
    InvalidPid(i64),
    #[error("output path must be set with -output")]
    MissingOutput,
    #[error("invalid interval {0:?}: must be at least 1s")]
    IntervalTooShort(Duration),
    #[error("invalid duration {0:?}: expected a number with a unit, such as 5s")]
    BadDuration(String),
    #[error("invalid value {value:?} for flag -{flag}")]
    BadValue { flag: String, value: String },
    #[error("flag needs an argument: -{0}")]
    MissingValue(String),
    #[error("flag provided but not defined: {0}")]
    UnknownFlag(String),
    #[error("no process name contains {0:?}")]
    NoProcessMatch(String),
    #[error("process name {name:?} is ambiguous, candidates={candidates}")]
    AmbiguousProcess { name: String, candidates: String },
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("process {0} not found")]
    ProcessGone(u32),
    #[error("read {what} of pid {pid} failed: {reason}")]
    ProcessQuery {
        pid: u32,
        what: &'static str,
        reason: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpeedError {
    #[error("netstat expected to be increased, but actual is (now = {now:?}, last = {last:?})")]
    CounterRegression {
        now: InterfaceCounters,
        last: InterfaceCounters,
    },
    #[error("elapsed {0:?} is shorter than one second")]
    ElapsedTooShort(Duration),
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("open output file of path {path} failed: {source}")]
    OpenOutput {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("write output failed: {0}")]
    Output(#[source] std::io::Error),
    #[error("network interface not found: {name}, available={available}")]
    InterfaceNotFound { name: String, available: String },
    #[error("open process of pid {pid} failed: {source}")]
    ProcessUnavailable {
        pid: u32,
        #[source]
        source: SourceError,
    },
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("calc net speed failed: {0}")]
    Speed(#[from] SpeedError),
}

pub type Result<T, E = ProbeError> = std::result::Result<T, E>;
