// src/locate.rs
//
// Required-element lookup over a parsed page. The jobs are written against a
// fixed page skeleton, so a missing element stops the job right where the
// skeleton stopped matching.

use std::{backtrace::Backtrace, fmt};

use regex::Regex;
use scraper::{node::Element, ElementRef, Html};
use tracing::error;

use crate::error::{Result, ScrapeError};

/// One attribute condition of a [`Query`].
#[derive(Debug, Clone)]
pub enum AttrMatch {
    Present { name: String },
    Equals { name: String, value: String },
    Matches { name: String, pattern: Regex },
}

impl AttrMatch {
    fn test(&self, el: &Element) -> bool {
        match self {
            Self::Present { name } => el.attr(name).is_some(),
            Self::Equals { name, value } => el
                .attr(name)
                .is_some_and(|v| candidates(name, v).any(|c| c == value)),
            Self::Matches { name, pattern } => el
                .attr(name)
                .is_some_and(|v| candidates(name, v).any(|c| pattern.is_match(c))),
        }
    }
}

/// `class` is matched per token as well as whole, like a browser's class selector.
fn candidates<'v>(name: &str, value: &'v str) -> Box<dyn Iterator<Item = &'v str> + 'v> {
    if name == "class" {
        Box::new(std::iter::once(value).chain(value.split_whitespace()))
    } else {
        Box::new(std::iter::once(value))
    }
}

/// Tag name plus attribute conditions, all of which must hold.
#[derive(Debug, Clone)]
pub struct Query {
    tag: String,
    attrs: Vec<AttrMatch>,
}

impl Query {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push(AttrMatch::Equals {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn has_attr(mut self, name: impl Into<String>) -> Self {
        self.attrs.push(AttrMatch::Present { name: name.into() });
        self
    }

    pub fn attr_matches(mut self, name: impl Into<String>, pattern: Regex) -> Self {
        self.attrs.push(AttrMatch::Matches {
            name: name.into(),
            pattern,
        });
        self
    }

    pub fn matches(&self, el: &Element) -> bool {
        el.name().eq_ignore_ascii_case(&self.tag) && self.attrs.iter().all(|a| a.test(el))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)?;
        for a in &self.attrs {
            match a {
                AttrMatch::Present { name } => write!(f, "[{}]", name)?,
                AttrMatch::Equals { name, value } => write!(f, "[{}=\"{}\"]", name, value)?,
                AttrMatch::Matches { name, pattern } => {
                    write!(f, "[{}~=/{}/]", name, pattern.as_str())?
                }
            }
        }
        Ok(())
    }
}

/// Every matching descendant of `node` (not `node` itself), in document order.
pub fn find_all<'a>(node: ElementRef<'a>, query: &Query) -> Vec<ElementRef<'a>> {
    node.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|el| query.matches(el.value()))
        .collect()
}

/// First matching descendant of `node`. Absence is a `TagNotFound` error,
/// logged together with the query and the call stack.
pub fn find<'a>(node: ElementRef<'a>, query: &Query) -> Result<ElementRef<'a>> {
    let hit = node
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| query.matches(el.value()));

    hit.ok_or_else(|| not_found(query.to_string(), node))
}

fn not_found(query: String, within: ElementRef<'_>) -> ScrapeError {
    error!(
        %query,
        within = within.value().name(),
        backtrace = %Backtrace::force_capture(),
        "required tag not found"
    );
    ScrapeError::TagNotFound { query }
}

/// [`find`] from the top of a parsed document.
pub fn find_in<'a>(doc: &'a Html, query: &Query) -> Result<ElementRef<'a>> {
    let root = doc.root_element();
    if query.matches(root.value()) {
        return Ok(root);
    }
    find(root, query)
}

/// All text under `el`, concatenated in document order.
pub fn text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// The first following sibling element with the given tag name.
pub fn next_sibling<'a>(el: ElementRef<'a>, tag: &str) -> Result<ElementRef<'a>> {
    el.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sib| sib.value().name().eq_ignore_ascii_case(tag))
        .ok_or_else(|| not_found(format!("{} ~ {}", el.value().name(), tag), el))
}

/// Value of an attribute the element is required to carry.
pub fn attr<'a>(el: ElementRef<'a>, name: &str) -> Result<&'a str> {
    el.value()
        .attr(name)
        .ok_or_else(|| not_found(format!("{}[{}]", el.value().name(), name), el))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::capture_logs;

    const PAGE: &str = r#"<html><body>
        <div class="sphinxsidebar wrapper" id="side">
          <ul><li><a href="a.html">A</a></li></ul>
        </div>
        <div role="main">
          <table class="docutils">
            <tr><td><a href="x-pdf-letter.zip">letter</a></td></tr>
            <tr><td><a href="x-pdf-a4.zip">a4</a></td></tr>
          </table>
        </div>
        <dl><dt>Status</dt><!-- note --><dd>Final</dd></dl>
    </body></html>"#;

    #[test]
    fn test_find_by_tag_and_attr() {
        let doc = Html::parse_document(PAGE);
        let main = find_in(&doc, &Query::tag("div").attr("role", "main")).unwrap();
        let table = find(main, &Query::tag("table").attr("class", "docutils")).unwrap();
        assert_eq!(table.value().name(), "table");
    }

    #[test]
    fn test_class_token_match() {
        let doc = Html::parse_document(PAGE);
        let side = find_in(&doc, &Query::tag("div").attr("class", "wrapper")).unwrap();
        assert_eq!(side.value().attr("id"), Some("side"));
        let whole = find_in(&doc, &Query::tag("div").attr("class", "sphinxsidebar wrapper"));
        assert!(whole.is_ok());
    }

    #[test]
    fn test_regex_predicate() {
        let doc = Html::parse_document(PAGE);
        let q = Query::tag("a").attr_matches("href", Regex::new(r".+pdf-a4\.zip$").unwrap());
        let a = find_in(&doc, &q).unwrap();
        assert_eq!(text(a), "a4");
    }

    #[test]
    fn test_missing_tag_is_structural_error() {
        let doc = Html::parse_document(PAGE);
        let err = find_in(&doc, &Query::tag("section").attr("id", "index-by-category"))
            .unwrap_err();
        match err {
            ScrapeError::TagNotFound { query } => {
                assert_eq!(query, r#"section[id="index-by-category"]"#)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_tag_logs_query_and_stack() {
        let doc = Html::parse_document(PAGE);
        let main = find_in(&doc, &Query::tag("div").attr("role", "main")).unwrap();
        let (res, logs) = capture_logs(|| find(main, &Query::tag("abbr").has_attr("title")));
        assert!(res.is_err());

        assert_eq!(logs.matches("required tag not found").count(), 1);
        assert!(logs.contains("ERROR"));
        assert!(logs.contains("query=abbr[title]"));
        assert!(logs.contains("within=\"div\""));
        assert!(logs.contains("backtrace="));
    }

    #[test]
    fn test_find_excludes_self() {
        let doc = Html::parse_document(PAGE);
        let main = find_in(&doc, &Query::tag("div").attr("role", "main")).unwrap();
        assert!(find(main, &Query::tag("div").attr("role", "main")).is_err());
    }

    #[test]
    fn test_find_all_document_order() {
        let doc = Html::parse_document(PAGE);
        let links = find_all(doc.root_element(), &Query::tag("a"));
        let hrefs: Vec<_> = links.iter().filter_map(|a| a.value().attr("href")).collect();
        assert_eq!(hrefs, ["a.html", "x-pdf-letter.zip", "x-pdf-a4.zip"]);
    }

    #[test]
    fn test_next_sibling_skips_non_elements() {
        let doc = Html::parse_document(PAGE);
        let dt = find_in(&doc, &Query::tag("dt")).unwrap();
        let dd = next_sibling(dt, "dd").unwrap();
        assert_eq!(text(dd), "Final");
        assert!(next_sibling(dd, "dd").is_err());
    }

    #[test]
    fn test_presence_predicate_and_attr() {
        let doc = Html::parse_document(r#"<p><a name="top">x</a><a href="/y">y</a></p>"#);
        let a = find_in(&doc, &Query::tag("a").has_attr("href")).unwrap();
        assert_eq!(attr(a, "href").unwrap(), "/y");
        assert!(attr(a, "title").is_err());
        assert_eq!(Query::tag("a").has_attr("href").to_string(), "a[href]");
    }
}
