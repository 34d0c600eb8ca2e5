// Cyclic ramp acquisition example
//
// Runs a ramp, collects one sample set per segment and prints a summary
// plus the combined polars DataFrame.

use clap::Parser;
use ecipot_rs::{ParsePolicy, Potentiostat, ProtocolConfig, RampCommand, SampleSet};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ramp_acquisition")]
#[command(about = "Cyclic voltammetry ramp on a potentiostat")]
struct Args {
    /// Serial port of the potentiostat
    port: String,

    /// Start potential in volts
    #[arg(long, default_value_t = -0.2, allow_negative_numbers = true)]
    start: f64,

    /// First vertex potential in volts
    #[arg(long, default_value_t = 0.2, allow_negative_numbers = true)]
    v1: f64,

    /// Second vertex potential in volts
    #[arg(long, default_value_t = -0.2, allow_negative_numbers = true)]
    v2: f64,

    /// Scan rate in V/s
    #[arg(short, long, default_value_t = 0.1)]
    rate: f64,

    /// Number of sweeps
    #[arg(short, long, default_value_t = 3)]
    segments: u32,

    /// Rows per segment buffer
    #[arg(long, default_value_t = 1000)]
    capacity: usize,

    /// Seconds allowed per segment
    #[arg(long, default_value_t = 600)]
    segment_timeout: u64,

    /// Fail on the first malformed data line
    #[arg(long)]
    strict: bool,

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

    let mut config = ProtocolConfig::default()
        .with_buffer_capacity(args.capacity)
        .with_segment_timeout(Duration::from_secs(args.segment_timeout));
    if args.strict {
        config = config.with_parse_policy(ParsePolicy::Strict);
    }

    let mut pot = Potentiostat::connect(&args.port, config)?;
    println!("Connected to {}", args.port);

    pot.cell_on()?;
    let ramp = RampCommand::new(args.start, args.v1, args.v2, args.rate, args.segments);
    let result = pot.ramp(ramp);
    // switch the cell off even if the acquisition failed
    if let Err(e) = pot.cell_off() {
        log::warn!("Failed to switch the cell off: {}", e);
    }
    let acquisition = result?;
    pot.close()?;

    print_summary("init", &acquisition.initialization);
    for (i, segment) in acquisition.segments.iter().enumerate() {
        print_summary(&format!("#{}", i), segment);
    }
    println!(
        "\n{} segments, {} samples, completed: {}, truncated: {}",
        acquisition.segments.len(),
        acquisition.total_samples(),
        acquisition.completed,
        acquisition.truncated
    );

    let df = acquisition.to_dataframe()?;
    println!("{}", df);

    Ok(())
}

fn print_summary(label: &str, set: &SampleSet) {
    match (set.first(), set.last()) {
        (Some(first), Some(last)) => println!(
            "{:>5}: {:4} samples, t {:.3}..{:.3} s, E {:.3}..{:.3} V",
            label,
            set.len(),
            first.time,
            last.time,
            first.channel_a,
            last.channel_a
        ),
        _ => println!("{:>5}: empty", label),
    }
}
