use anyhow::{Context, Result};
use clap::Parser;
use patchpilot::apply;
use patchpilot::collect;
use patchpilot::llm::LlmClient;
use patchpilot::outcome::RunOutcome;
use patchpilot::plan;
use patchpilot::prompt;
use patchpilot::publish;
use patchpilot::util::one_line;
use patchpilot::validate;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "patchpilot",
    about = "Diagnose a failed build with an LLM, apply the fix, validate it, open a PR",
    version
)]
struct Args {
    /// Path to the project to repair
    project_root: PathBuf,

    /// File containing the captured build/test failure output
    failure_report: PathBuf,

    /// Shell command that re-validates the project after patching
    validation_command: String,

    /// Upper bound for the validation command, in seconds
    #[arg(long, default_value_t = 900)]
    validation_timeout: u64,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match run(&args).await {
        Ok(outcome) => {
            println!("\nRun finished: {}", outcome.label());
            std::process::exit(outcome.exit_code());
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            std::process::exit(1);
        }
    }
}

/// The fix pipeline, start to finish. Strictly linear and one-shot:
/// collect, prompt, dispatch, parse, apply, validate, publish. Every
/// early return is a classified outcome.
async fn run(args: &Args) -> Result<RunOutcome> {
    let failure_text = fs::read_to_string(&args.failure_report).with_context(|| {
        format!(
            "Could not read failure report '{}'",
            args.failure_report.display()
        )
    })?;
    println!("Collected failure report: {}", args.failure_report.display());

    println!("Collecting source files...");
    let sources = collect::collect_sources(&args.project_root);
    println!("Found {} source files", sources.len());

    if sources.is_empty() {
        println!("No source files found in the specified directory");
        return Ok(RunOutcome::NoSourceFiles);
    }

    // Credential resolution happens before the prompt is even sent; a
    // missing key is a configuration error, not a dispatch failure.
    let client = LlmClient::from_env()?;

    println!("Analyzing error and requesting fix suggestions...");
    let user_prompt = prompt::build_fix_prompt(&sources, &failure_text);
    let payload = match client.request_fix(prompt::FIX_SYSTEM, &user_prompt).await {
        Ok(payload) => payload,
        Err(err) => {
            eprintln!("Failed to call the language-model service: {:#}", err);
            return Ok(RunOutcome::DispatchFailed);
        }
    };

    let fix_plan = match plan::parse_fix_plan(&payload) {
        Ok(p) => p,
        Err(err) => {
            eprintln!("Invalid fix response: {:#}", err);
            return Ok(RunOutcome::ParseFailed);
        }
    };

    println!("\nAnalysis");
    println!("{}", fix_plan.analysis);
    println!("\nRoot cause");
    println!("{}", fix_plan.root_cause);

    if fix_plan.files_to_fix.is_empty() {
        println!("No files to fix identified");
        return Ok(RunOutcome::NoEditsProposed);
    }

    println!(
        "\nApplying fixes to {} file(s)...",
        fix_plan.files_to_fix.len()
    );
    for edit in &fix_plan.files_to_fix {
        println!("  {} - {}", edit.file_path, one_line(&edit.explanation));
    }

    let report = apply::apply_plan(&args.project_root, &fix_plan.files_to_fix);
    if !report.fully_applied() {
        let (path, err) = report.failed.as_ref().map(|(p, e)| (p.as_str(), e.as_str())).unwrap_or(("?", "?"));
        eprintln!("Failed to fix {}: {}", path, err);
        eprintln!(
            "Apply step {}: {} file(s) written before the failure",
            report.status_label(),
            report.written.len()
        );
        return Ok(RunOutcome::PatchWriteFailed);
    }
    println!("All fixes applied successfully ({} file(s) written)", report.written.len());

    if !fix_plan.additional_notes.is_empty() {
        println!("\nAdditional notes: {}", fix_plan.additional_notes);
    }

    println!(
        "\nValidating the fixes using command '{}'...\n",
        args.validation_command
    );
    let verdict = validate::run_validation(
        &args.project_root,
        &args.validation_command,
        Duration::from_secs(args.validation_timeout),
    )
    .map_err(|e| anyhow::anyhow!(e))?;

    if !verdict.passed {
        if verdict.timed_out {
            eprintln!(
                "Validation timed out after {}s",
                args.validation_timeout
            );
        } else if !verdict.output_tail.is_empty() {
            eprintln!("{}", verdict.output_tail);
        }
        println!(
            "Fixes were applied but the project build is still failing. Sorry I could not help in this case :("
        );
        return Ok(RunOutcome::ValidationFailed);
    }

    println!("Fixes were applied and validated successfully!");
    println!("Opening pull request on GitHub...");

    match publish::publish_fix(&args.project_root, &fix_plan).await {
        Ok(pr_url) => {
            println!("Pull request created {}", pr_url);
            Ok(RunOutcome::Published { pr_url })
        }
        Err(err) => {
            eprintln!("Failed to publish fix: {:#}", err);
            Ok(RunOutcome::PublishFailed)
        }
    }
}
