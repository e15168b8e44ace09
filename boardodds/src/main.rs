use boardodds::cli::{Args, BaseCommand, Command};
use std::io;
use tracing::Level;

fn log_level(verbosity: usize) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Log to stderr so records never mix with command output. The library logs
/// through `log`; the subscriber's `tracing-log` bridge picks those up.
fn init_tracing(verbosity: usize) {
    // only fails if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_max_level(log_level(verbosity))
        .with_writer(io::stderr)
        .try_init();
}

fn main() {
    let mut args = pico_args::Arguments::from_env();

    let verbosity = if args.contains("-vv") {
        2
    } else if args.contains("-v") {
        1
    } else {
        0
    };
    init_tracing(verbosity);

    let args = Args::new(args);
    let result = BaseCommand::try_from_cli_args(args).and_then(|cmd| cmd.run());

    match result {
        Ok(output) => println!("{}", output),
        Err(err) => {
            eprintln!("error: {}", err);
            eprintln!("Try 'boardodds --help' for more information.");
            std::process::exit(1);
        }
    }
}
