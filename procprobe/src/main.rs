//! Entry point for procprobe. Parses args, attaches to the target and samples until killed.

use anyhow::Context;
use procprobe::args::{parse_args, usage, ParsedArgs};
use procprobe::config::{resolve_target, worker_threads, ProbeConfig, Target};
use procprobe::error::ProbeError;
use procprobe::output::CsvSink;
use procprobe::sampler::Sampler;
use procprobe::source::SysinfoSource;
use std::env;
use tracing::{error, info};

fn main() {
    procprobe::logging::init();

    let prog = env::args().next().unwrap_or_else(|| "procprobe".into());
    let parsed = match parse_args(env::args()) {
        Ok(p) if p.help => {
            print!("{}", usage(&prog));
            return;
        }
        Ok(p) => p,
        Err(e) => {
            error!("{e}");
            eprint!("{}", usage(&prog));
            std::process::exit(2);
        }
    };

    if let Err(e) = run(parsed) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(parsed: ParsedArgs) -> anyhow::Result<()> {
    let config = ProbeConfig::try_from(parsed)?;
    let threads = worker_threads();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(threads)
        .max_blocking_threads(threads)
        .enable_time()
        .build()
        .context("build runtime")?;

    let mut source = SysinfoSource::new();
    let pid = match &config.target {
        Target::Pid(pid) => *pid,
        Target::Name(name) => {
            let pid = resolve_target(name, source.find_processes(name))?;
            info!(pid, name = %name, "resolved process by name");
            pid
        }
    };

    let mut sink = CsvSink::open(&config.output)?;
    let sampler = Sampler::start(source, pid, &config.iface, config.interval)?;
    if config.header {
        sink.write_header().map_err(ProbeError::Output)?;
    }
    info!(output = %config.output.display(), header = config.header, "writing samples");

    runtime.block_on(sampler.run(&mut sink))?;
    Ok(())
}
