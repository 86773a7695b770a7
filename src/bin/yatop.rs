//! yatop: yet another top
//!
//! Per-core, per-process and per-thread CPU usage with a session history
//! histogram of the selected entity.
//!
//! Run: `yatop`, `yatop -p <pid>`, `yatop -1 > snapshot.txt`

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use yatop::collectors::{clock_ticks_per_second, ProcFsSource};
use yatop::logging::{self, LogSettings};
use yatop::{App, Config};

/// yatop: yet another top
#[derive(Parser, Debug)]
#[command(name = "yatop")]
#[command(version)]
#[command(about = "Process and thread CPU monitor with per-entity history", long_about = None)]
struct Cli {
    /// Filter to a given pid (or the process owning a tid) and select it
    #[arg(short, long)]
    pid: Option<u32>,

    /// One shot and then exit, like top -b
    #[arg(short = '1', long)]
    one: bool,

    /// Hide idle entities after this many inactive cycles
    #[arg(short, long)]
    ignore: Option<u32>,

    /// Delay between system samples, in seconds
    #[arg(short, long)]
    delay: Option<f64>,

    /// Include all processes, including idle ones
    #[arg(short, long)]
    all: bool,

    /// Disable color output
    #[arg(short = 'c', long)]
    no_color: bool,

    /// Disable the histogram
    #[arg(short = 'H', long)]
    no_histogram: bool,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// procfs mount to read from
    #[arg(long)]
    proc_root: Option<PathBuf>,

    /// Write debug logs (also enabled by YATOP_DEBUG=1)
    #[arg(long)]
    debug: bool,

    /// Debug log file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Layers the flags that were given over the loaded configuration.
    fn apply(&self, config: &mut Config) {
        if let Some(pid) = self.pid {
            config.pid = Some(pid);
        }
        if let Some(ignore) = self.ignore {
            config.ignore = ignore;
        }
        if let Some(delay) = self.delay {
            config.delay_secs = delay;
        }
        if let Some(root) = &self.proc_root {
            config.proc_root.clone_from(root);
        }
        config.one_shot |= self.one;
        config.show_all |= self.all;
        config.no_color |= self.no_color;
        config.no_histogram |= self.no_histogram;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogSettings::from_env(cli.debug, cli.log_file.clone()))
        .context("failed to set up debug logging")?;

    let mut config = Config::discover(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply(&mut config);
    config.validate()?;

    let source = ProcFsSource::new(&config.proc_root);
    let mut app = App::new(config, source, clock_ticks_per_second());

    if app.config().one_shot {
        app.run_once()?;
    } else {
        app.run()?;
    }
    Ok(())
}
