// src/fetch/mod.rs

pub mod cache;
pub mod session;

pub use cache::ResponseCache;
pub use session::Session;

use scraper::Html;
use url::Url;

use crate::error::{Result, ScrapeError};

/// Body text is always read as this, whatever the server declares.
pub const FORCED_ENCODING: &str = "utf-8";

/// A fetched page, body already decoded.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub text: String,
    pub encoding: &'static str,
}

impl Page {
    pub fn from_bytes(url: Url, body: &[u8]) -> Self {
        Self {
            url,
            text: String::from_utf8_lossy(body).into_owned(),
            encoding: FORCED_ENCODING,
        }
    }

    pub fn html(&self) -> Html {
        Html::parse_document(&self.text)
    }

    /// Resolve a (possibly relative) href against this page's URL.
    pub fn join(&self, href: &str) -> Result<Url> {
        join_url(&self.url, href)
    }
}

/// Anything that can GET a URL. Transport problems surface as
/// `ScrapeError::Transport` or `ScrapeError::HttpStatus`, never as an empty body.
pub trait PageSource {
    fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>>;

    fn fetch(&self, url: &Url) -> Result<Page> {
        let body = self.fetch_bytes(url)?;
        Ok(Page::from_bytes(url.clone(), &body))
    }
}

pub fn join_url(base: &Url, href: &str) -> Result<Url> {
    base.join(href).map_err(|source| ScrapeError::InvalidUrl {
        url: href.to_string(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{cell::RefCell, collections::HashMap};

    use super::*;

    /// In-memory site: unknown URLs answer 404.
    #[derive(Default)]
    pub struct Fixture {
        pages: HashMap<String, Vec<u8>>,
        pub requests: RefCell<Vec<String>>,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
            self.pages.insert(url.to_string(), body.into());
            self
        }
    }

    impl PageSource for Fixture {
        fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>> {
            self.requests.borrow_mut().push(url.to_string());
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| ScrapeError::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::Fixture;
    use super::*;

    #[test]
    fn test_invalid_utf8_is_replaced_not_dropped() {
        let url = Url::parse("https://docs.python.org/3/").unwrap();
        let page = Page::from_bytes(url, b"caf\xe9 <b>ok</b>");
        assert_eq!(page.encoding, "utf-8");
        assert!(page.text.starts_with("caf\u{FFFD}"));
        assert!(page.text.ends_with("<b>ok</b>"));
    }

    #[test]
    fn test_join_relative_href() {
        let url = Url::parse("https://docs.python.org/3/whatsnew/").unwrap();
        let page = Page::from_bytes(url, b"");
        assert_eq!(
            page.join("3.12.html").unwrap().as_str(),
            "https://docs.python.org/3/whatsnew/3.12.html"
        );
        assert_eq!(
            page.join("../download.html").unwrap().as_str(),
            "https://docs.python.org/3/download.html"
        );
    }

    #[test]
    fn test_missing_page_is_transport_failure() {
        let site = Fixture::new();
        let url = Url::parse("https://peps.python.org/pep-0001/").unwrap();
        let err = site.fetch(&url).unwrap_err();
        assert!(err.is_transport());
        assert_eq!(site.requests.borrow().len(), 1);
    }
}
