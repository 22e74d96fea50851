// src/jobs/whats_new.rs

use url::Url;

use super::{harvest, Job};
use crate::{
    config::Config,
    error::Result,
    fetch::{join_url, Page, PageSource},
    locate::{attr, find, find_all, find_in, text, Query},
    table::Table,
};

pub const HEADER: [&str; 3] = ["Article link", "Title", "Editor, author"];

/// One row per "What's New" article: link, page heading, and the flattened
/// editor/author definition list.
pub fn run(source: &dyn PageSource, config: &Config) -> Result<Table> {
    let index_url = join_url(&config.docs_url, "whatsnew/")?;
    let index = source.fetch(&index_url)?;
    let links = article_links(&index)?;

    let articles = harvest(Job::WhatsNew, links, |url| summarize(source, url))?;

    let mut table = Table::new(HEADER);
    for row in articles.items {
        table.push(row)?;
    }
    Ok(table)
}

fn article_links(index: &Page) -> Result<Vec<Url>> {
    let doc = index.html();
    let section = find_in(&doc, &Query::tag("section").attr("id", "what-s-new-in-python"))?;
    let toc = find(section, &Query::tag("div").attr("class", "toctree-wrapper"))?;

    find_all(toc, &Query::tag("li").attr("class", "toctree-l1"))
        .into_iter()
        .map(|li| {
            let a = find(li, &Query::tag("a"))?;
            index.join(attr(a, "href")?)
        })
        .collect()
}

fn summarize(source: &dyn PageSource, url: Url) -> Result<[String; 3]> {
    let page = source.fetch(&url)?;
    let doc = page.html();
    let h1 = find_in(&doc, &Query::tag("h1"))?;
    let dl = find_in(&doc, &Query::tag("dl"))?;

    Ok([
        url.to_string(),
        text(h1).trim().to_string(),
        text(dl).replace('\n', " ").trim().to_string(),
    ])
}
