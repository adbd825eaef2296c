use anyhow::Context;
use gapbuf::cli;
use gapbuf::fuzz::Fuzzer;

/// Entry point of the randomized driver: parse arguments, resolve the
/// configuration, run the requested number of operations against a fresh
/// buffer and print a summary.
///
/// Exits with an error naming the failing step (and the seed to reproduce it)
/// if the buffer ever diverges from the reference model or breaks an
/// invariant.
fn main() -> anyhow::Result<()> {
    let cli_args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error parsing arguments: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logger (set RUST_LOG env var to control verbosity)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = cli_args
        .resolve_config()
        .context("loading driver configuration")?;

    let mut fuzzer = Fuzzer::new(config)?;
    let seed = fuzzer.seed();
    let report = fuzzer
        .run()
        .with_context(|| format!("fuzz run with seed {seed} failed"))?;

    println!("{report}");
    Ok(())
}
