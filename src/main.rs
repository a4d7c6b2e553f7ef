use clap::{Parser, Subcommand};
use freetrade_cgt::cmd::{parse::ParseCommand, schema::SchemaCommand};

/// Normalise Freetrade exports for UK Capital Gains calculations
#[derive(Parser, Debug)]
#[command(name = "freetrade", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read a Freetrade export and print the normalised transactions
    Parse(ParseCommand),
    /// Print the accepted export columns or the output schema
    Schema(SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    // warn by default so a missing or empty export is reported
    let mut logger = pretty_env_logger::formatted_builder();
    logger.filter_level(log::LevelFilter::Warn);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        logger.parse_filters(&filters);
    }
    logger.init();

    let cli = Cli::parse();
    match cli.command {
        Command::Parse(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }
}
