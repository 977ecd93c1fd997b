use super::ExitStatus;
use crate::FmContext;
use crate::cli::ScanArgs;
use crate::coordinator::{self, ChangeEvent, CheckStatus, ScanOutcome};
use crate::output;
use crate::storage::locations;
use crate::utils::formatters::{format_created_at, format_file_count, format_mtime};
use anyhow::Result;
use colored::Colorize;
use std::io::{self, Write};

/// Checks `args.dirs` against the first loadable baseline location.
///
/// Returns [`ExitStatus::Failure`] when no baseline is available or a root
/// fails, [`ExitStatus::ChangesFound`] when anything changed.
///
/// # Errors
/// Returns an error if the scan roots cannot be resolved or stdout fails.
pub fn execute(ctx: &FmContext, args: &ScanArgs, reset_first: bool) -> Result<ExitStatus> {
    let roots = super::resolve_roots(&args.dirs)?;
    let exclusions = ctx.exclusion_set(&args.exclude);
    let sources = ctx.baseline_locations(&args.storage.baseline_files);

    if reset_first {
        super::reset::execute_before_scan(&sources);
    }

    output::info(&format!(
        "Checking for changes in: {}",
        args.dirs.join(" ")
    ));
    super::describe_exclusions(&exclusions);

    let baseline = match locations::load(&sources) {
        Ok(baseline) => baseline,
        Err(e) => {
            output::verbose(&e.to_string());
            super::print_error("Baseline file not found.");
            output::info("Please create a baseline first using the `baseline` command.");
            return Ok(ExitStatus::Failure);
        }
    };

    output::info(&format!(
        "Baseline loaded: {} (Created: {})",
        format_file_count(baseline.len()),
        baseline
            .created_at()
            .map_or_else(|| "unknown".to_string(), format_created_at)
    ));
    output::info("Processing...");

    let outcome = match coordinator::check(&roots, &exclusions, &baseline) {
        Ok(outcome) => outcome,
        Err(e) => {
            for failure in e.failures() {
                super::print_error(&format!("Directory scan error: {failure}"));
            }
            return Ok(ExitStatus::Failure);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_report(&mut out, &outcome)?;

    Ok(match outcome.status() {
        CheckStatus::Clean => ExitStatus::Success,
        CheckStatus::ChangesFound => ExitStatus::ChangesFound,
    })
}

/// Writes the change report: one block per event, sorted by path, then the
/// summary.
///
/// # Errors
/// Returns any error from the writer.
pub fn render_report<W: Write>(out: &mut W, outcome: &ScanOutcome) -> io::Result<()> {
    for event in outcome.sorted_events() {
        render_event(out, event)?;
    }

    writeln!(out)?;
    writeln!(out, "=== Result ===")?;
    match outcome.status() {
        CheckStatus::ChangesFound => writeln!(
            out,
            "Changes detected: {} file(s) changed",
            outcome.change_count()
        ),
        CheckStatus::Clean => writeln!(out, "No changes: No files were changed"),
    }
}

fn render_event<W: Write>(out: &mut W, event: &ChangeEvent) -> io::Result<()> {
    match event {
        ChangeEvent::Changed {
            path,
            modified_at,
            size_bytes,
            digest,
        } => {
            let header = format!("Change detected: {}", path.display());
            writeln!(out, "{}", header.yellow())?;
            if let Some(delta) = modified_at {
                writeln!(
                    out,
                    "  Modified time: {} -> {}",
                    format_mtime(delta.old),
                    format_mtime(delta.new)
                )?;
            }
            if let Some(delta) = size_bytes {
                writeln!(out, "  Size: {} -> {}", delta.old, delta.new)?;
            }
            if let Some(delta) = digest {
                writeln!(out, "  MD5 hash: {} -> {}", delta.old, delta.new)?;
            }
            Ok(())
        }
        ChangeEvent::New { path, digest } => {
            let line = format!("New file: {} (MD5: {digest})", path.display());
            writeln!(out, "{}", line.green())
        }
        ChangeEvent::Deleted { path } => {
            let line = format!("Deleted file: {}", path.display());
            writeln!(out, "{}", line.red())
        }
    }
}
