//! Human-readable output.

use std::io::Write;

use failure::Error;

use crate::repo::{Repository, Stats};

/// Write one repository per line, optionally followed by a breakdown of how
/// many were public, private or unknown.
pub fn print_repositories<W: Write>(
    writer: &mut W,
    repos: &[Repository],
    display_stats: bool,
) -> Result<(), Error> {
    for repo in repos {
        writeln!(writer, "{}", repo.full_name())?;
    }

    if display_stats {
        let stats = Stats::from_repositories(repos);

        writeln!(writer)?;
        writeln!(writer, "Repository stats")?;
        writeln!(writer, "Number of public repos identified: {}", stats.public)?;
        writeln!(writer, "Number of private repos identified: {}", stats.private)?;
        writeln!(writer, "Number of unknown repos identified: {}", stats.unknown)?;
        writeln!(writer, "Total number of repos identified: {}", stats.total())?;
    }

    Ok(())
}
