use std::io::{self, Write};

use brood_api::TaskReport;

/// Render reports as `"<id> <STATUS>"` lines, ascending by id.
///
/// The sort is stable, so equal ids keep their collection order.
pub fn format_report(reports: &[TaskReport]) -> Vec<String> {
    let mut sorted = reports.to_vec();
    sorted.sort_by(TaskReport::cmp_by_id);
    sorted.iter().map(ToString::to_string).collect()
}

/// Write report lines, newline terminated, to `out`.
pub fn emit_report<W: Write>(lines: &[String], out: &mut W) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()
}
