// src/jobs/latest_versions.rs

use regex::Regex;

use crate::{
    config::Config,
    error::{Result, ScrapeError},
    fetch::PageSource,
    locate::{attr, find_all, find_in, text, Query},
    table::Table,
};

pub const HEADER: [&str; 3] = ["Documentation link", "Version", "Status"];

/// The sidebar list of documentation versions, one row per link.
pub fn run(source: &dyn PageSource, config: &Config) -> Result<Table> {
    let page = source.fetch(&config.docs_url)?;
    let doc = page.html();

    let sidebar = find_in(&doc, &Query::tag("div").attr("class", "sphinxsidebarwrapper"))?;
    let versions = find_all(sidebar, &Query::tag("ul"))
        .into_iter()
        .find(|ul| text(*ul).contains(&config.versions_marker))
        .ok_or_else(|| ScrapeError::NothingToParse {
            what: format!("no sidebar list mentions {:?}", config.versions_marker),
        })?;

    let pattern = version_pattern(&config.product_name)?;
    let mut table = Table::new(HEADER);
    for a in find_all(versions, &Query::tag("a")) {
        let link = page.join(attr(a, "href")?)?;
        let (version, status) = split_version(&pattern, &text(a));
        table.push([link.to_string(), version, status])?;
    }
    Ok(table)
}

/// `<product> <major>.<minor> (<status>)`
pub fn version_pattern(product: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(
        r"{} (?P<version>\d\.\d+) \((?P<status>.*)\)",
        regex::escape(product)
    ))?)
}

/// Version and status from a link text; text that does not fit the pattern
/// is the version as-is, with an empty status.
pub fn split_version(pattern: &Regex, link_text: &str) -> (String, String) {
    match pattern.captures(link_text) {
        Some(caps) => (caps["version"].to_string(), caps["status"].to_string()),
        None => (link_text.trim().to_string(), String::new()),
    }
}
