//! Command implementations.

pub mod bulletin;
pub mod config;
pub mod login;
pub mod schedule;

use std::io::Write;

use crate::error::ClientResult;

/// Writes rows to stdout, one per line.
pub fn print_rows(rows: &[String]) -> ClientResult<()> {
    let stdout = std::io::stdout();
    write_rows(&mut stdout.lock(), rows)
}

/// Writes rows to `out`, one per line.
pub fn write_rows(out: &mut impl Write, rows: &[String]) -> ClientResult<()> {
    for row in rows {
        writeln!(out, "{}", row)?;
    }
    out.flush()?;
    Ok(())
}
