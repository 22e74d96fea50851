// src/jobs/download.rs

use std::{
    fs,
    path::{Path, PathBuf},
};

use regex::Regex;
use tracing::info;
use url::Url;

use crate::{
    config::Config,
    error::{Result, ScrapeError},
    fetch::{join_url, Page, PageSource},
    locate::{attr, find, find_in, Query},
};

/// Find the A4 PDF archive on the downloads page and save it under
/// `downloads_dir`, keeping its original file name. Returns the saved path.
pub fn run(source: &dyn PageSource, config: &Config) -> Result<PathBuf> {
    let downloads_url = join_url(&config.docs_url, "download.html")?;
    let page = source.fetch(&downloads_url)?;
    let archive_url = archive_link(&page, &Regex::new(&config.archive_pattern)?)?;

    let body = source.fetch_bytes(&archive_url)?;
    let path = save(&config.downloads_dir, &archive_url, &body)?;
    info!(path = %path.display(), bytes = body.len(), "archive downloaded and saved");
    Ok(path)
}

fn archive_link(page: &Page, pattern: &Regex) -> Result<Url> {
    let doc = page.html();
    let main = find_in(&doc, &Query::tag("div").attr("role", "main"))?;
    let table = find(main, &Query::tag("table").attr("class", "docutils"))?;
    let a = find(table, &Query::tag("a").attr_matches("href", pattern.clone()))?;
    page.join(attr(a, "href")?)
}

/// Last path segment of the URL.
pub fn file_name(url: &Url) -> &str {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .unwrap_or("download.zip")
}

fn save(dir: &Path, url: &Url, body: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| ScrapeError::io(dir, e))?;
    let path = dir.join(file_name(url));
    fs::write(&path, body).map_err(|e| ScrapeError::io(&path, e))?;
    Ok(path)
}
