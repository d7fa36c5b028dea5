use clap::{Parser, command};
use monitor::{CliError, MonitorOptions, handle_list, handle_monitor};

mod monitor;

#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
enum Cli {
    /// Watch a serial port and print each received line
    #[command(name = "monitor", alias = "m")]
    Monitor(MonitorOptions),

    /// List serial ports available on this system
    #[command(name = "list", alias = "l")]
    List,
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli {
        Cli::Monitor(opts) => handle_monitor(opts)?,
        Cli::List => handle_list()?,
    }

    Ok(())
}
