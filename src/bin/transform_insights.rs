//! Utility to replay a saved building insights document through the transformer.
//!
//! Usage: `transform_insights <insights.json> <monthly_bill>`

use solar_lead_relay::models::coerce_number;
use solar_lead_relay::transform::transform;
use std::env;
use std::process::ExitCode;

/// Reads the document, runs the transformation and prints the result as pretty JSON.
fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let (Some(path), Some(bill)) = (args.get(1), args.get(2)) else {
        eprintln!("Usage: transform_insights <insights.json> <monthly_bill>");
        return ExitCode::FAILURE;
    };

    let Some(monthly_bill) = coerce_number(&serde_json::Value::from(bill.as_str())) else {
        eprintln!("monthly_bill must be a number, got '{}'", bill);
        return ExitCode::FAILURE;
    };

    let insights = match std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|raw| {
            serde_json::from_str::<serde_json::Value>(&raw).map_err(|e| e.to_string())
        })
    {
        Ok(insights) => insights,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    let summary = transform(Some(&insights), monthly_bill);
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize summary: {}", e);
            ExitCode::FAILURE
        }
    }
}
