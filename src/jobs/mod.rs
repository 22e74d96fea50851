// src/jobs/mod.rs

pub mod download;
pub mod latest_versions;
pub mod pep;
pub mod whats_new;

use std::fmt;

use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::error;

use crate::{
    config::Config,
    error::{Result, ScrapeError},
    fetch::PageSource,
    table::Table,
};

/// The fixed set of extraction jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Job {
    WhatsNew,
    LatestVersions,
    Download,
    Pep,
}

impl Job {
    pub const ALL: [Job; 4] = [Job::WhatsNew, Job::LatestVersions, Job::Download, Job::Pep];

    pub fn name(self) -> &'static str {
        match self {
            Job::WhatsNew => "whats-new",
            Job::LatestVersions => "latest-versions",
            Job::Download => "download",
            Job::Pep => "pep",
        }
    }

    /// Run the job once. `None` means there is nothing to render (the
    /// archive download).
    pub fn run(self, source: &dyn PageSource, config: &Config) -> Result<Option<Table>> {
        match self {
            Job::WhatsNew => whats_new::run(source, config).map(Some),
            Job::LatestVersions => latest_versions::run(source, config).map(Some),
            Job::Download => download::run(source, config).map(|_| None),
            Job::Pep => pep::run(source, config).map(Some),
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a per-item loop: what came through, and the items whose
/// fetch failed, in order.
#[derive(Debug)]
pub struct Harvest<T> {
    pub items: Vec<T>,
    pub failures: Vec<ScrapeError>,
}

impl<T> Harvest<T> {
    /// One error record for the whole batch of failed fetches.
    pub fn log_failures(&self, job: Job) {
        if self.failures.is_empty() {
            return;
        }
        let detail = self
            .failures
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        error!(
            %job,
            failed = self.failures.len(),
            "pages could not be loaded:\n{}",
            detail
        );
    }
}

/// Run `step` over every input in order. Transport failures are collected
/// and the loop carries on; any other error ends the job.
pub fn harvest<X, T>(
    job: Job,
    inputs: Vec<X>,
    mut step: impl FnMut(X) -> Result<T>,
) -> Result<Harvest<T>> {
    let bar = progress_bar(job, inputs.len());
    let mut out = Harvest {
        items: Vec::with_capacity(inputs.len()),
        failures: Vec::new(),
    };

    for input in inputs {
        let res = step(input);
        bar.inc(1);
        match res {
            Ok(item) => out.items.push(item),
            Err(e) if e.is_transport() => out.failures.push(e),
            Err(e) => {
                bar.abandon();
                return Err(e);
            }
        }
    }

    bar.finish_and_clear();
    out.log_failures(job);
    Ok(out)
}

fn progress_bar(job: Job, len: usize) -> ProgressBar {
    let style = ProgressStyle::with_template("{msg:>16} [{bar:40}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    ProgressBar::new(len as u64)
        .with_style(style)
        .with_message(job.name())
}
