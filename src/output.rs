//! Diff listing formatting and display

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::diff::{DiffEntry, Status};

/// Print the entry list as pretty-printed JSON to stdout.
pub fn print_json(entries: &[DiffEntry]) -> io::Result<()> {
    let json = serde_json::to_string_pretty(entries).map_err(io::Error::other)?;
    println!("{}", json);
    Ok(())
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_color: true }
    }
}

/// Running tally of entry statuses, printed as the summary line and used
/// for the exit code.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusCounts {
    pub matching: usize,
    pub different: usize,
    pub left_only: usize,
    pub right_only: usize,
    pub unknown: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: Status) {
        match status {
            Status::Matching => self.matching += 1,
            Status::Different => self.different += 1,
            Status::LeftOnly => self.left_only += 1,
            Status::RightOnly => self.right_only += 1,
            Status::Unknown => self.unknown += 1,
        }
    }

    /// True when every counted entry was Matching.
    pub fn all_matching(&self) -> bool {
        self.different + self.left_only + self.right_only + self.unknown == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} matching, {} different, {} left-only, {} right-only, {} unknown",
            self.matching, self.different, self.left_only, self.right_only, self.unknown
        )
    }
}

pub struct DiffFormatter {
    config: OutputConfig,
}

impl DiffFormatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Open a stdout stream with the configured color choice.
    pub fn stdout(&self) -> StandardStream {
        let choice = if self.config.use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        StandardStream::stdout(choice)
    }

    /// Print one entry line: status code, both type codes, name. `depth`
    /// indents nested entries in recursive mode.
    pub fn print_entry(
        &self,
        out: &mut StandardStream,
        entry: &DiffEntry,
        depth: usize,
    ) -> io::Result<()> {
        if let Some(color) = status_color(entry.status) {
            out.set_color(ColorSpec::new().set_fg(Some(color)))?;
        }
        writeln!(
            out,
            "{}{} {} {}  {}",
            "    ".repeat(depth),
            entry.status.code(),
            entry.left.code(),
            entry.right.code(),
            entry.name.to_string_lossy()
        )?;
        if self.config.use_color {
            out.reset()?;
        }
        Ok(())
    }

    /// Print a whole entry list plus the count summary.
    pub fn print(&self, entries: &[DiffEntry]) -> io::Result<StatusCounts> {
        let mut out = self.stdout();
        let mut counts = StatusCounts::default();
        for entry in entries {
            self.print_entry(&mut out, entry, 0)?;
            counts.record(entry.status);
        }
        writeln!(out)?;
        writeln!(out, "{}", counts.summary())?;
        Ok(counts)
    }

    /// Format a whole entry list into a plain string (no colors).
    pub fn format(&self, entries: &[DiffEntry]) -> String {
        let mut output = String::new();
        let mut counts = StatusCounts::default();
        for entry in entries {
            output.push_str(&format!(
                "{} {} {}  {}\n",
                entry.status.code(),
                entry.left.code(),
                entry.right.code(),
                entry.name.to_string_lossy()
            ));
            counts.record(entry.status);
        }
        output.push('\n');
        output.push_str(&counts.summary());
        output.push('\n');
        output
    }
}

fn status_color(status: Status) -> Option<Color> {
    match status {
        Status::Matching => None,
        Status::Different => Some(Color::Yellow),
        Status::LeftOnly | Status::RightOnly => Some(Color::Green),
        Status::Unknown => Some(Color::Cyan),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_type::FileType;

    fn entry(name: &str, status: Status, left: FileType, right: FileType) -> DiffEntry {
        DiffEntry {
            name: name.into(),
            status,
            left,
            right,
        }
    }

    #[test]
    fn format_emits_codes_and_summary() {
        let entries = vec![
            entry("same", Status::Matching, FileType::File, FileType::File),
            entry("gone", Status::LeftOnly, FileType::File, FileType::Missing),
            entry(
                "changed",
                Status::Different,
                FileType::Directory,
                FileType::File,
            ),
        ];
        let formatter = DiffFormatter::new(OutputConfig { use_color: false });
        let output = formatter.format(&entries);
        assert!(output.contains("== fi fi  same"));
        assert!(output.contains("<< fi mi  gone"));
        assert!(output.contains("!= di fi  changed"));
        assert!(output.contains("1 matching, 1 different, 1 left-only, 0 right-only, 0 unknown"));
    }

    #[test]
    fn counts_track_all_statuses() {
        let mut counts = StatusCounts::default();
        counts.record(Status::Matching);
        counts.record(Status::Unknown);
        assert!(!counts.all_matching());
        assert_eq!(counts.matching, 1);
        assert_eq!(counts.unknown, 1);

        let mut clean = StatusCounts::default();
        clean.record(Status::Matching);
        assert!(clean.all_matching());
    }
}
