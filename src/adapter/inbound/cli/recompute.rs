//! `valuator recompute`: one pass, then exit.

use super::command::RecomputeArgs;
use super::output;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;
use crate::port::inbound::valuation::{PassReport, RecomputeValuations};

/// Run one valuation pass against the configured database.
///
/// # Errors
/// Returns the error that aborted the pass; nothing was written.
pub fn execute(config: &Config, args: &RecomputeArgs) -> Result<()> {
    let service = bootstrap::build_service(config)?;
    let report = service.recompute_now()?;

    if args.json {
        return output::json(&report);
    }
    print_report(&report);
    Ok(())
}

fn print_report(report: &PassReport) {
    if report.is_empty() {
        output::success("Nothing to value");
        return;
    }

    output::section("Valuation Pass");
    output::field("Participants", report.participants);
    output::field("Leaders", report.leaders);
    output::field("Components", report.components);
    output::field("Largest component", report.largest_component);
    if let Some(valued_at) = report.valued_at {
        output::field("Valued at", valued_at.to_rfc3339());
    }
    if report.halted_instruments > 0 {
        output::warning(&format!(
            "{} instrument(s) halted below the ask floor",
            report.halted_instruments
        ));
    }
    output::success("Valuation committed");
}
