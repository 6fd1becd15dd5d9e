//! `ddictl resources` - list the catalog

use anyhow::Result;
use colored::Colorize;
use declarative::{Resource, ResourceDescriptor};
use serde_json::{Value, json};

use crate::cli::{OutputFormat, ResourcesArgs};
use crate::ui;

pub fn run(args: ResourcesArgs) -> Result<()> {
    let catalog = ddi::catalog::all();
    match args.format {
        OutputFormat::Json => ui::json(&catalog.iter().map(|d| describe(d)).collect::<Vec<_>>()),
        OutputFormat::Human => {
            ui::header("Resource types");
            for descriptor in catalog {
                let readonly = if descriptor.readonly.is_empty() {
                    "-".to_string()
                } else {
                    descriptor.readonly.join(", ")
                };
                println!(
                    "  {:<20} {:<14} key: {:<22} readonly: {}",
                    descriptor.resource_type.bold(),
                    descriptor.kind,
                    descriptor.natural_key.join(", "),
                    readonly.dimmed()
                );
            }
            Ok(())
        }
    }
}

fn describe(descriptor: &ResourceDescriptor) -> Value {
    json!({
        "resource": descriptor.resource_type,
        "kind": descriptor.kind,
        "description": descriptor.description(),
        "natural_key": descriptor.natural_key,
        "readonly": descriptor.readonly,
        "required": descriptor.required_on_present(),
        "states": ["present", descriptor.absent_state()],
        "endpoint": format!("{}/{}", descriptor.api_prefix, descriptor.collection),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_join_token() {
        let value = describe(&ddi::catalog::INFRA_JOIN_TOKEN);
        assert_eq!(value["states"], json!(["present", "revoked"]));
        assert_eq!(value["endpoint"], json!("/api/infra/v1/jointoken"));
        assert_eq!(value["natural_key"], json!(["name"]));
        assert_eq!(value["description"], json!("JoinToken (by name)"));
    }

    #[test]
    fn test_describe_required_defaults_to_key() {
        let value = describe(&ddi::catalog::DNS_VIEW);
        assert_eq!(value["required"], json!(["name"]));
    }
}
