use clap::Parser;
use ringsim::{ConsoleObserver, Result, SimulationConfig, SimulationEngine};
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ringsim")]
#[command(about = "Dining philosophers on a ring of forks, with parity-ordered fork pickup")]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// Number of philosophers (and forks), at least 2
    number_of_agents: i64,
    /// Upper bound for a philosopher's thinking time, in milliseconds
    max_thinking_time: i64,
    /// Upper bound for a philosopher's eating time, in milliseconds
    max_eating_time: i64,
    /// Seed for reproducible timing
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after this many milliseconds instead of waiting for input
    #[arg(long, value_name = "MS")]
    run_for: Option<u64>,
    /// Let every philosopher stop by itself after this many cycles
    #[arg(long)]
    cycles: Option<u64>,
    /// Only print the final report
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn config(&self) -> SimulationConfig {
        let mut config = SimulationConfig::new(
            self.number_of_agents,
            self.max_thinking_time,
            self.max_eating_time,
        );
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(cycles) = self.cycles {
            config = config.with_max_cycles(cycles);
        }
        config
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut engine = SimulationEngine::new(&cli.config())?;
    let console = if cli.quiet {
        ConsoleObserver::quiet()
    } else {
        ConsoleObserver::new()
    };
    engine.add_observer(Arc::new(console));

    match (cli.run_for, cli.cycles) {
        (Some(ms), _) => {
            say(format_args!("Stopping after {}ms", ms))?;
            engine.run_until(|| {
                std::thread::sleep(Duration::from_millis(ms));
                say(format_args!("Stopping application..."))
            })?;
        }
        (None, Some(cycles)) => {
            // Every agent leaves its loop by itself, nothing to wait for
            say(format_args!("Running {} cycles per philosopher", cycles))?;
            engine.start()?;
            engine.join()?;
        }
        (None, None) => {
            say(format_args!("Enter any key to stop"))?;
            engine.run_until(|| {
                let mut line = String::new();
                std::io::stdin().read_line(&mut line)?;
                say(format_args!("Stopping application..."))
            })?;
        }
    }

    Ok(())
}

/// Print a line to stdout; a reader that went away is not an error
fn say(line: std::fmt::Arguments<'_>) -> Result<()> {
    match writeln!(std::io::stdout().lock(), "{}", line) {
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        other => Ok(other?),
    }
}
