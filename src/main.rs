mod cli;

use tracing_subscriber::EnvFilter;

/// Logging goes to stderr so stdout carries nothing but JSON.
fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .init();

    let command_line_interface = cli::CommandLineInterface::load();
    command_line_interface.run()
}
