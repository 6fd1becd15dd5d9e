//! `ddictl info` - look up objects

use anyhow::{Result, bail};
use declarative::{FilterSpec, InfoOutcome, InfoRequest, Object, Resolver, Resource};
use serde_json::Value;

use crate::Context;
use crate::cli::{InfoArgs, OutputFormat};
use crate::config::Settings;
use crate::ui;

pub fn run(ctx: &Context, args: InfoArgs) -> Result<()> {
    let settings = Settings::load(ctx.overrides.clone())?;
    let descriptor = super::descriptor(&args.resource, settings.page_limit)?;

    let filter = FilterSpec::from_parts(parse_pairs(&args.filters)?, args.filter_query)?;
    let tag_filter =
        FilterSpec::from_parts(parse_pairs(&args.tag_filters)?, args.tag_filter_query)?;
    let request = InfoRequest::new(args.id, filter, tag_filter)?.with_fields(args.fields);

    let client = settings.client()?;
    let endpoint = client.resource(&descriptor);
    let outcome = Resolver::new(&endpoint, &descriptor).search(&request)?;

    match args.format {
        OutputFormat::Json => ui::json(&outcome)?,
        OutputFormat::Human => print_human(&descriptor, &outcome),
    }
    Ok(())
}

/// Parse repeated `key=value` arguments; no arguments means no filter
fn parse_pairs(pairs: &[String]) -> Result<Option<Object>> {
    if pairs.is_empty() {
        return Ok(None);
    }
    let mut object = Object::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("expected KEY=VALUE, got `{pair}`");
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("empty key in `{pair}`");
        }
        object.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(Some(object))
}

fn print_human(descriptor: &dyn Resource, outcome: &InfoOutcome) {
    let noun = if outcome.objects.len() == 1 { "object" } else { "objects" };
    ui::header(&format!(
        "{} ({} {noun})",
        descriptor.kind(),
        outcome.objects.len()
    ));
    for object in &outcome.objects {
        println!();
        match object.get(descriptor.id_field()).and_then(Value::as_str) {
            Some(id) => println!("{id}"),
            None => println!("-"),
        }
        for (key, value) in object {
            if key == descriptor.id_field() {
                continue;
            }
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            ui::kv(key, &rendered);
        }
    }
}
