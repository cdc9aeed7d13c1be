//! Merge command - release the ready issues of a manifest

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, cross};
use anstream::println;
use dialoguer::Confirm;
use release_bot::clock::TokioSleeper;
use release_bot::config::ReleaseConfig;
use release_bot::error::{Error, Result};
use release_bot::merge::QueueDrainer;
use release_bot::pipeline::PipelineGate;
use release_bot::platform::parse_pull_request_number;
use release_bot::tracker::LoggingTracker;
use release_bot::workflow::{Admission, ReleaseSummary, ReleaseWorkflow, load_manifest};
use std::path::Path;
use std::process::ExitCode;

/// Options for the merge command
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Dry run - show what would be merged without making changes
    pub dry_run: bool,
    /// Preview plan and prompt for confirmation before executing
    pub confirm: bool,
}

/// Run the merge command
///
/// Exits non-zero when the release was stopped by a failed workflow.
pub async fn run_merge(
    manifest: &Path,
    config_path: Option<&Path>,
    options: MergeOptions,
) -> Result<ExitCode> {
    // =========================================================================
    // Phase 1: GATHER - config and manifest, no network
    // =========================================================================

    let (config, _) = ReleaseConfig::load(config_path)?;
    let pipeline_target = config.pipeline_target()?;
    let issues = load_manifest(manifest)?;
    let tracker = LoggingTracker;
    let workflow = ReleaseWorkflow::new(&config, &tracker);

    // =========================================================================
    // Phase 2: PLAN - admission is pure
    // =========================================================================

    let admission = workflow.admit(issues);

    if options.dry_run {
        report_release_plan(&admission, &config);
        println!("{}", "Run without --dry-run to execute.".muted());
        return Ok(ExitCode::SUCCESS);
    }

    if admission.queue.is_empty() {
        println!(
            "{}",
            format!(
                "No issues found to be merged! Have you moved them to the \"{}\" status?",
                config.statuses.ready
            )
            .warn()
        );
        return Ok(ExitCode::SUCCESS);
    }

    if options.confirm {
        report_release_plan(&admission, &config);
        if !Confirm::new()
            .with_prompt("Proceed with release?")
            .default(true)
            .interact()
            .map_err(|e| Error::Internal(format!("Failed to read confirmation: {e}")))?
        {
            println!("{}", "Aborted".muted());
            return Ok(ExitCode::SUCCESS);
        }
        println!();
    }

    // =========================================================================
    // Phase 3: EXECUTE - merge one issue at a time
    // =========================================================================

    let ctx = CommandContext::new(&config).await?;
    let merge_settings = config.merge_settings();
    let drain_options = config.drain_options();
    let sleeper = TokioSleeper;
    let progress = CliProgress;

    let mut drainer = QueueDrainer::new(
        &ctx.github,
        &tracker,
        &sleeper,
        &merge_settings,
        &drain_options,
    )
    .with_progress(&progress);

    if let (Some(service), Some(target)) = (&ctx.circleci, pipeline_target) {
        drainer = drainer.with_gate(PipelineGate::new(service, target));
    }

    println!(
        "{} {}",
        "Releasing".emphasis(),
        format!("{} issue(s)...", admission.queue.len()).accent()
    );

    let summary = workflow.release(admission, &mut drainer).await;
    print_release_summary(&summary);

    Ok(if summary.is_aborted() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Report what would be released
fn report_release_plan(admission: &Admission, config: &ReleaseConfig) {
    println!("{}:", "Release plan".emphasis());
    println!();

    if admission.queue.is_empty() {
        println!("  {}", "No issues to release".muted());
    }

    for issue in admission.queue.issues() {
        match issue.pull_request.as_deref().and_then(parse_pull_request_number) {
            Some(pr_number) => println!(
                "  {} PR #{}: {}",
                "✓ Would merge".success(),
                pr_number,
                issue.title
            ),
            None => {
                println!("  {} {}", "✗ Would fail".warn(), issue.title);
                println!("    - {}", "no pull request link".muted());
            }
        }
    }

    for rejected in &admission.rejected {
        if let Some(issue) = &rejected.issue {
            println!(
                "  {} {} ({})",
                "✗ Not ready".warn(),
                issue.title,
                issue.status.muted()
            );
        }
    }

    if !admission.deferred.is_empty() {
        println!(
            "  {}",
            format!(
                "{} ready issue(s) over max_task_count left for a later run",
                admission.deferred.len()
            )
            .muted()
        );
    }

    println!();
    if config.skip_circleci_checks {
        println!("{}", "Pipeline checks disabled.".muted());
    } else {
        println!(
            "Watching {} on {}",
            config.circleci.workflow_name.accent(),
            config.circleci.branch.accent()
        );
    }
}

/// Print the end-of-run summary
fn print_release_summary(summary: &ReleaseSummary) {
    let report = &summary.report;

    println!();
    if summary.is_aborted() {
        println!("{} Release stopped", cross());
    } else if report.failed.is_empty() && report.dropped.is_empty() {
        println!("{} Release complete!", check());
    } else {
        println!("{} Release partially complete", "⚠️".warn());
    }

    if !report.merged.is_empty() {
        let titles: Vec<&str> = report.merged.iter().map(|i| i.title.as_str()).collect();
        println!("   Merged: {}", titles.join(", ").accent());
    }

    if let Some(aborted) = &report.aborted {
        let title = aborted.issue.as_ref().map_or("unknown issue", |i| i.title.as_str());
        println!("   {} {} after {}", "Stopped:".warn(), aborted.kind, title.emphasis());
    }

    let failures: Vec<_> = summary.rejected.iter().chain(&report.failed).collect();
    if !failures.is_empty() {
        println!();
        println!("{}:", "Issues that failed to be merged".emphasis());
        for failure in failures {
            let title = failure.issue.as_ref().map_or("unknown issue", |i| i.title.as_str());
            let notified = failure
                .assignee()
                .and_then(|a| a.email.as_deref())
                .map_or_else(
                    || "no assignee to notify".to_string(),
                    |email| format!("notify {email}"),
                );
            println!("  {} {}", cross(), title);
            println!("    {} {}", failure.kind.warn(), format!("({notified})").muted());
        }
    }

    if !report.dropped.is_empty() {
        println!();
        println!("{}:", "Issues dropped after unexpected errors".emphasis());
        for issue in &report.dropped {
            println!("  - {}", issue.title);
        }
        println!("{}", "   See the log for details.".muted());
    }
}
