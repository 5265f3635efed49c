//! procprobe: append one CSV row per interval with a process's CPU, memory and
//! thread count plus one network interface's throughput.

pub mod args;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod sampler;
pub mod source;
pub mod speed;
pub mod types;
