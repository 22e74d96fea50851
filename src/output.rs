// src/output.rs

use std::{
    fmt, fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use prettytable::{format::Alignment, Cell, Row, Table as PrettyTable};
use tracing::info;

use crate::{
    error::{Result, ScrapeError},
    jobs::Job,
    table::Table,
};

/// Where a job's table goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// One line per row, cells separated by a space.
    #[default]
    Plain,
    /// Boxed, left-aligned console table.
    Pretty,
    /// CSV file under the results directory.
    File,
}

impl OutputMode {
    /// `pretty` and `file` select those sinks; anything else is plain output.
    pub fn from_arg(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Self::Pretty,
            "file" => Self::File,
            _ => Self::Plain,
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Plain => "plain",
            Self::Pretty => "pretty",
            Self::File => "file",
        })
    }
}

/// Settings the file sink needs.
#[derive(Debug, Clone)]
pub struct FileSink<'a> {
    pub results_dir: &'a Path,
    pub datetime_format: &'a str,
}

/// Render `table` to stdout, or to a CSV file in file mode. Returns the file
/// path in file mode.
pub fn control_output(
    table: &Table,
    mode: OutputMode,
    job: Job,
    sink: &FileSink<'_>,
) -> Result<Option<PathBuf>> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Plain => {
            write_plain(table, &mut out).map_err(|e| ScrapeError::io("<stdout>", e))?;
            Ok(None)
        }
        OutputMode::Pretty => {
            write_pretty(table, &mut out).map_err(|e| ScrapeError::io("<stdout>", e))?;
            Ok(None)
        }
        OutputMode::File => {
            let path = write_file(table, job, sink, Local::now())?;
            info!(path = %path.display(), rows = table.len(), "results saved");
            Ok(Some(path))
        }
    }
}

pub fn write_plain<W: Write + ?Sized>(table: &Table, out: &mut W) -> io::Result<()> {
    for row in table.iter_all() {
        writeln!(out, "{}", row.join(" "))?;
    }
    Ok(())
}

pub fn write_pretty<W: Write + ?Sized>(table: &Table, out: &mut W) -> io::Result<()> {
    let mut pretty = PrettyTable::new();
    pretty.set_titles(Row::new(
        table
            .header()
            .iter()
            .map(|h| Cell::new_align(h, Alignment::LEFT))
            .collect(),
    ));
    for row in table.rows() {
        pretty.add_row(Row::new(
            row.iter()
                .map(|c| Cell::new_align(c, Alignment::LEFT))
                .collect(),
        ));
    }
    pretty.print(out)?;
    Ok(())
}

/// `<results_dir>/<job>_<timestamp>.csv`
pub fn file_path(sink: &FileSink<'_>, job: Job, now: DateTime<Local>) -> PathBuf {
    sink.results_dir.join(format!(
        "{}_{}.csv",
        job.name(),
        now.format(sink.datetime_format)
    ))
}

/// Header and rows as CSV: comma separated, `\n` terminated, quoted only when needed.
pub fn write_csv<W: Write>(table: &Table, out: W) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .quote_style(QuoteStyle::Necessary)
        .from_writer(out);
    for row in table.iter_all() {
        writer.write_record(row)?;
    }
    writer
        .flush()
        .map_err(|e| ScrapeError::io("<csv writer>", e))?;
    Ok(())
}

pub fn write_file(
    table: &Table,
    job: Job,
    sink: &FileSink<'_>,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    fs::create_dir_all(sink.results_dir).map_err(|e| ScrapeError::io(sink.results_dir, e))?;
    let path = file_path(sink, job, now);
    let file = fs::File::create(&path).map_err(|e| ScrapeError::io(&path, e))?;
    write_csv(table, file)?;
    Ok(path)
}
