use super::ExitStatus;
use crate::FmContext;
use crate::cli::ScanArgs;
use crate::coordinator;
use crate::output;
use crate::storage::locations;
use crate::utils::formatters::format_file_count;
use anyhow::Result;

/// Builds a baseline of `args.dirs` and writes it to every location.
///
/// Nothing is written if any root could not be traversed. A failed location
/// does not stop the others but makes the command fail.
///
/// # Errors
/// Returns an error if the scan roots cannot be resolved.
pub fn execute(ctx: &FmContext, args: &ScanArgs, reset_first: bool) -> Result<ExitStatus> {
    let roots = super::resolve_roots(&args.dirs)?;
    let exclusions = ctx.exclusion_set(&args.exclude);
    let targets = ctx.baseline_locations(&args.storage.baseline_files);

    if reset_first {
        super::reset::execute_before_scan(&targets);
    }

    output::info(&format!(
        "Creating baseline for: {}",
        args.dirs.join(" ")
    ));
    super::describe_exclusions(&exclusions);
    output::info("Processing...");

    let baseline = match coordinator::build_baseline(&roots, &exclusions) {
        Ok(baseline) => baseline,
        Err(e) => {
            for failure in e.failures() {
                super::print_error(&format!("Directory scan error: {failure}"));
            }
            output::error("Baseline not saved");
            return Ok(ExitStatus::Failure);
        }
    };

    let results = locations::save(&baseline, &targets);
    for (path, result) in &results {
        match result {
            Ok(()) => {
                output::info(&format!("Created baseline file: {}", path.display()));
                super::print_success(&format!(
                    "Baseline saved: {}",
                    format_file_count(baseline.len())
                ));
            }
            Err(e) => super::print_error(&format!("Failed to create baseline file: {e}")),
        }
    }

    if locations::all_succeeded(&results) {
        Ok(ExitStatus::Success)
    } else {
        Ok(ExitStatus::Failure)
    }
}
