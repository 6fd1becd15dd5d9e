//! `ddictl apply` - converge objects to a task file

use anyhow::{Context as _, Result, bail};
use colored::Colorize;
use declarative::{ExecuteOptions, ExecuteSummary, Job, Outcome, execute};
use serde_json::{Value, json};

use crate::Context;
use crate::cli::{ApplyArgs, OutputFormat};
use crate::config::Settings;
use crate::paths;
use crate::progress::BatchProgress;
use crate::task::{self, Task};
use crate::ui;

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let path = paths::expand(&args.file.to_string_lossy());
    let settings = Settings::load(ctx.overrides.clone())?;
    let specs = task::load(&path)?;
    let tasks = task::build(specs, args.check, settings.page_limit)
        .with_context(|| format!("Invalid task file {}", path.display()))?;

    if tasks.is_empty() {
        if args.format == OutputFormat::Human && !ctx.quiet {
            ui::info("No tasks to run.");
        }
        return Ok(());
    }

    let client = settings.client()?;
    let endpoints: Vec<_> = tasks
        .iter()
        .map(|task| client.resource(&task.descriptor))
        .collect();
    let jobs: Vec<Job<'_>> = tasks
        .iter()
        .zip(&endpoints)
        .map(|(task, endpoint)| Job {
            label: task.label.clone(),
            client: endpoint,
            resource: &task.descriptor,
            request: task.request.clone(),
        })
        .collect();

    log::info!(
        "Running {} tasks from {} against {}",
        jobs.len(),
        path.display(),
        client.base_url()
    );
    let show_progress = args.format == OutputFormat::Human && !ctx.quiet;
    let mut progress = BatchProgress::new(show_progress);
    let options = ExecuteOptions {
        jobs: usize::from(args.jobs.max(1)),
    };
    let results = execute(&jobs, &options, &mut progress);
    let summary = ExecuteSummary::from_results(&results);

    match args.format {
        OutputFormat::Json => ui::json(&report(&tasks, &results, &summary))?,
        OutputFormat::Human => print_human(ctx, &args, &tasks, &results, &summary),
    }

    if !summary.is_success() {
        bail!("{} of {} tasks failed", summary.failed, summary.total());
    }
    Ok(())
}

fn print_human(
    ctx: &Context,
    args: &ApplyArgs,
    tasks: &[Task],
    results: &[declarative::Result<Outcome>],
    summary: &ExecuteSummary,
) {
    if args.check && !ctx.quiet {
        ui::header("Check mode: nothing will be changed");
    }

    for (task, result) in tasks.iter().zip(results) {
        match result {
            Ok(outcome) => {
                if ctx.quiet && !outcome.changed {
                    continue;
                }
                ui::print_outcome(&task.label, outcome, args.check);
                if args.diff && outcome.changed {
                    ui::print_diff(outcome);
                }
            }
            Err(e) => {
                ui::error(&format!("{}: {e}", task.label));
                if ctx.verbose > 0 {
                    ui::dim(e.category().advice());
                }
            }
        }
    }

    if ctx.quiet {
        return;
    }
    println!();
    let verb = if args.check { "would change" } else { "changed" };
    println!(
        "{} {verb}, {} unchanged, {} failed",
        summary.changed.to_string().green(),
        summary.unchanged,
        if summary.failed > 0 {
            summary.failed.to_string().red()
        } else {
            summary.failed.to_string().normal()
        }
    );
}

/// Machine-readable report, one entry per task in file order
fn report(
    tasks: &[Task],
    results: &[declarative::Result<Outcome>],
    summary: &ExecuteSummary,
) -> Value {
    let entries: Vec<Value> = tasks
        .iter()
        .zip(results)
        .map(|(task, result)| match result {
            Ok(outcome) => json!({
                "task": task.label,
                "resource": task.descriptor.resource_type,
                "ok": true,
                "changed": outcome.changed,
                "id": outcome.id,
                "object": outcome.object,
                "diff": outcome.diff,
                "msg": outcome.msg,
            }),
            Err(e) => json!({
                "task": task.label,
                "resource": task.descriptor.resource_type,
                "ok": false,
                "error": e.to_string(),
                "category": e.category().description(),
            }),
        })
        .collect();
    json!({ "results": entries, "summary": summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{DesiredState, Error, ReconcileRequest};

    fn task(label: &str) -> Task {
        Task {
            label: label.to_string(),
            descriptor: ddi::catalog::DNS_VIEW,
            request: ReconcileRequest::new(DesiredState::new().with("name", label)),
        }
    }

    #[test]
    fn test_report_shape() {
        let tasks = vec![task("a"), task("b")];
        let results = vec![
            Ok(Outcome {
                changed: true,
                id: Some("dns/view/1".to_string()),
                msg: "View created".to_string(),
                ..Outcome::default()
            }),
            Err(Error::Selector("bad".to_string())),
        ];
        let summary = ExecuteSummary::from_results(&results);
        let value = report(&tasks, &results, &summary);

        assert_eq!(value["results"][0]["ok"], json!(true));
        assert_eq!(value["results"][0]["id"], json!("dns/view/1"));
        assert_eq!(value["results"][0]["resource"], json!("dns_view"));
        assert_eq!(value["results"][1]["ok"], json!(false));
        assert_eq!(value["results"][1]["error"], json!("invalid selector: bad"));
        assert_eq!(value["summary"]["failed"], json!(1));
        assert_eq!(value["summary"]["changed"], json!(1));
    }
}
