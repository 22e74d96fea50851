// src/jobs/pep.rs

use tracing::info;
use url::Url;

use super::{harvest, Job};
use crate::{
    config::{Config, StatusCodeRule},
    error::Result,
    fetch::{Page, PageSource},
    locate::{attr, find, find_all, find_in, next_sibling, text, Query},
    table::Table,
};

pub const HEADER: [&str; 2] = ["Status", "Count"];
pub const TOTAL: &str = "Total";

/// Running count of proposal statuses. Known labels keep their configured
/// order; anything else is appended in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTally {
    counts: Vec<(String, u64)>,
    total: u64,
}

impl StatusTally {
    pub fn new(known: &[String]) -> Self {
        Self {
            counts: known.iter().map(|s| (s.clone(), 0)).collect(),
            total: 0,
        }
    }

    pub fn add(&mut self, status: &str) {
        match self.counts.iter_mut().find(|(label, _)| label == status) {
            Some((_, n)) => *n += 1,
            None => self.counts.push((status.to_string(), 1)),
        }
        self.total += 1;
    }

    pub fn count(&self, status: &str) -> u64 {
        self.counts
            .iter()
            .find(|(label, _)| label == status)
            .map_or(0, |(_, n)| *n)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// `(status, count)` rows followed by the `Total` row.
    pub fn into_table(self) -> Result<Table> {
        let mut table = Table::new(HEADER);
        for (label, n) in self.counts {
            table.push([label, n.to_string()])?;
        }
        table.push([TOTAL.to_string(), self.total.to_string()])?;
        Ok(table)
    }
}

/// A row of the proposal index.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Listing {
    code: String,
    url: Url,
}

/// Count proposals by the status their own page declares, cross-checking it
/// against the status code shown in the index.
pub fn run(source: &dyn PageSource, config: &Config) -> Result<Table> {
    let index = source.fetch(&config.peps_url)?;
    let listings = listings(&index, config.status_code_rule)?;

    let checked = harvest(Job::Pep, listings, |listing| {
        let status = declared_status(source, &listing.url)?;
        Ok((listing, status))
    })?;

    let mut tally = StatusTally::new(&config.known_statuses);
    let mut mismatches = Vec::new();
    for (listing, status) in &checked.items {
        if !config.expected_status.accepts(&listing.code, status) {
            mismatches.push(format!(
                "{}: status {:?}, expected {:?}",
                listing.url,
                status,
                config.expected_status.expected(&listing.code)
            ));
        }
        tally.add(status);
    }
    if !mismatches.is_empty() {
        info!(
            count = mismatches.len(),
            "mismatched statuses:\n{}",
            mismatches.join("\n")
        );
    }
    tally.into_table()
}

fn listings(index: &Page, rule: StatusCodeRule) -> Result<Vec<Listing>> {
    let doc = index.html();
    let section = find_in(&doc, &Query::tag("section").attr("id", "index-by-category"))?;

    let mut out = Vec::new();
    for tbody in find_all(section, &Query::tag("tbody")) {
        for row in find_all(tbody, &Query::tag("tr")) {
            let abbr = find(row, &Query::tag("abbr"))?;
            let a = find(row, &Query::tag("a"))?;
            out.push(Listing {
                code: rule.code(&text(abbr)),
                url: index.join(attr(a, "href")?)?,
            });
        }
    }
    Ok(out)
}

/// The `Status` field of a proposal page's header block; empty if the block
/// has no such field.
fn declared_status(source: &dyn PageSource, url: &Url) -> Result<String> {
    let page = source.fetch(url)?;
    let doc = page.html();
    let fields = find_in(&doc, &Query::tag("dl").attr("class", "rfc2822"))?;

    for dt in find_all(fields, &Query::tag("dt")) {
        if text(dt).contains("Status") {
            let dd = next_sibling(dt, "dd")?;
            return Ok(text(dd).trim().to_string());
        }
    }
    Ok(String::new())
}
