// Potential step example
//
// Sends a one to three point step sequence and reports the device's
// status broadcasts while it runs.

use clap::Parser;
use ecipot_rs::{Potentiostat, ProtocolConfig, SentinelPolicy, StepCommand};
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "step_sequence")]
#[command(about = "Run a potential step sequence on a potentiostat")]
struct Args {
    /// Serial port of the potentiostat
    port: String,

    /// Step points as alternating seconds and volts, e.g. `1 0.1 2 0.2`
    #[arg(required = true, num_args = 2..=6, allow_negative_numbers = true)]
    points: Vec<f64>,

    /// Seconds to keep listening after the acknowledgment
    #[arg(short, long, default_value_t = 5)]
    listen: u64,

    /// Continue when the device does not acknowledge
    #[arg(long)]
    best_effort: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    if args.points.len() % 2 != 0 {
        eprintln!("Step points must come in (seconds, volts) pairs");
        std::process::exit(1);
    }

    let mut config = ProtocolConfig::default();
    if args.best_effort {
        config = config.with_sentinel_policy(SentinelPolicy::BestEffort);
    }

    let mut pot = Potentiostat::connect(&args.port, config)?;
    pot.cell_on()?;

    let mut pairs = args.points.chunks_exact(2);
    let first = pairs.next().ok_or("at least one step point is required")?;
    let step = pairs.fold(StepCommand::new(first[0], first[1]), |step, p| {
        step.then(p[0], p[1])
    });

    let acknowledged = pot.step(step)?;
    println!("Step acknowledged: {}", acknowledged);

    let listen = Duration::from_secs(args.listen);
    let start = Instant::now();
    while start.elapsed() < listen {
        match pot.poll_line()? {
            Some(line) if !line.is_empty() => println!("{}", line),
            _ => std::thread::sleep(Duration::from_millis(20)),
        }
    }

    pot.cell_off()?;
    pot.close()?;
    Ok(())
}
