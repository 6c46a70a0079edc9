use clap::Args;
use serde_json::Value;

use gym_revenue_core::conversion::{process_conversion, ConversionInput};

use crate::input;

/// Arguments for the full conversion pipeline
#[derive(Args)]
pub struct ConvertArgs {
    /// Path to a JSON or YAML conversion document
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_convert(args: ConvertArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let conversion_input: ConversionInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file> or stdin required for a conversion".into());
    };

    let result = process_conversion(&conversion_input)?;
    Ok(serde_json::to_value(result)?)
}
