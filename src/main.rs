//! a smooth cpu usage and temperature monitor.

use {
    anyhow::Context,
    calor::{App, Config},
    clap::Parser,
    std::time::Duration,
    tracing_subscriber::EnvFilter,
};

/// a smooth terminal cpu usage and temperature monitor.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// milliseconds between metric samples.
    #[arg(long, default_value_t = 500)]
    poll_ms: u64,

    /// frames drawn per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// never start the external load generator.
    #[arg(long)]
    no_stress: bool,
}

fn main() -> anyhow::Result<()> {
    // the dashboard owns stdout, so logs go to stderr and only show up
    // when it is redirected.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let Args {
        poll_ms,
        fps,
        no_stress,
    } = Args::parse();

    let config = Config {
        poll: Duration::from_millis(poll_ms.max(1)),
        frame: Duration::from_millis(u64::from(1000 / fps.clamp(1, 240))),
        stress: !no_stress,
    };

    App::new(config).run().context("monitor stopped")
}
