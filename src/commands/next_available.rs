//! `ddictl next-available` - query free ranges

use anyhow::Result;
use serde_json::Value;

use crate::Context;
use crate::cli::{NextAvailableArgs, NextAvailableKind, OutputFormat};
use crate::config::Settings;
use crate::ui;

pub fn run(ctx: &Context, args: NextAvailableArgs) -> Result<()> {
    let settings = Settings::load(ctx.overrides.clone())?;
    let client = settings.client()?;

    if args.contiguous && args.kind != NextAvailableKind::Ip {
        ui::warn("--contiguous only applies to ip, ignoring");
    }

    let results: Vec<Value> = match args.kind {
        NextAvailableKind::Ip => client
            .next_available_ips(&args.id, args.contiguous.then_some(true), args.count)?
            .into_iter()
            .map(Value::Object)
            .collect(),
        NextAvailableKind::Subnet => client
            .next_available_subnets(&args.id, args.cidr, args.count)?
            .into_iter()
            .map(Value::Object)
            .collect(),
        NextAvailableKind::AddressBlock => client
            .next_available_address_blocks(&args.id, args.cidr, args.count)?
            .into_iter()
            .map(Value::String)
            .collect(),
    };

    match args.format {
        OutputFormat::Json => ui::json(&results)?,
        OutputFormat::Human => {
            if results.is_empty() {
                ui::warn(&format!("No free ranges in {}", args.id));
            }
            for result in &results {
                println!("{}", summarize(result));
            }
        }
    }
    Ok(())
}

/// One line per result: `address/cidr` when both are present
fn summarize(result: &Value) -> String {
    match result {
        Value::String(address) => address.clone(),
        Value::Object(object) => {
            let address = object.get("address").and_then(Value::as_str);
            match (address, object.get("cidr")) {
                (Some(address), Some(cidr)) => format!("{address}/{cidr}"),
                (Some(address), None) => address.to_string(),
                _ => result.to_string(),
            }
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summarize() {
        assert_eq!(summarize(&json!("10.0.0.0")), "10.0.0.0");
        assert_eq!(
            summarize(&json!({"address": "10.0.1.0", "cidr": 24})),
            "10.0.1.0/24"
        );
        assert_eq!(summarize(&json!({"address": "10.0.0.7"})), "10.0.0.7");
        assert_eq!(summarize(&json!({"other": 1})), "{\"other\":1}");
    }
}
