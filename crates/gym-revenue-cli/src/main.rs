mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::commission::{AllocateArgs, SelectRuleArgs, SplitArgs};
use commands::conversion::ConvertArgs;
use commands::pricing::DiscountArgs;

/// Membership pricing and sales commission calculations
#[derive(Parser)]
#[command(
    name = "gymrev",
    version,
    about = "Membership pricing and sales commission calculations",
    long_about = "A CLI for the gym/studio revenue engine: resolve promotional \
                  discounts, select and apply commission rules, distribute split \
                  commissions, and assemble auditable ledger entries, all with \
                  decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a plan selection against an optional promotion
    Discount(DiscountArgs),
    /// Select the applicable commission rule for a salesperson
    SelectRule(SelectRuleArgs),
    /// Compute a commission amount from a rule and revenue basis
    Allocate(AllocateArgs),
    /// Distribute a commission amount across split shares
    Split(SplitArgs),
    /// Run the full conversion pipeline (discount, rule, allocation, ledger)
    Convert(ConvertArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Discount(args) => commands::pricing::run_discount(args),
        Commands::SelectRule(args) => commands::commission::run_select_rule(args),
        Commands::Allocate(args) => commands::commission::run_allocate(args),
        Commands::Split(args) => commands::commission::run_split(args),
        Commands::Convert(args) => commands::conversion::run_convert(args),
        Commands::Version => {
            println!("gymrev {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
