// src/config.rs

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{Result, ScrapeError};

const DOCS_URL: &str = "https://docs.python.org/3/";
const PEPS_URL: &str = "https://peps.python.org/";

/// How the one-character status code is read off a proposal's abbreviation
/// marker (e.g. `SF`, `IA`, `P`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCodeRule {
    /// Drop the leading type symbol and keep the rest: `SF` → `F`, `I` → ``.
    #[default]
    Tail,
    /// Second character only when the marker is exactly two characters long,
    /// otherwise the empty code.
    PairSecond,
}

impl StatusCodeRule {
    pub fn code(self, marker: &str) -> String {
        let marker = marker.trim();
        match self {
            Self::Tail => marker.chars().skip(1).collect(),
            Self::PairSecond => {
                let mut chars = marker.chars();
                match (chars.next(), chars.next(), chars.next()) {
                    (Some(_), Some(second), None) => second.to_string(),
                    _ => String::new(),
                }
            }
        }
    }
}

/// Status code → full status labels a proposal with that code may carry.
/// The empty code is a valid key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpectedStatusMap(BTreeMap<String, Vec<String>>);

impl ExpectedStatusMap {
    /// Labels accepted for `code`; unknown codes accept nothing.
    pub fn expected(&self, code: &str) -> &[String] {
        self.0.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn accepts(&self, code: &str, status: &str) -> bool {
        self.expected(code).iter().any(|s| s == status)
    }
}

impl Default for ExpectedStatusMap {
    fn default() -> Self {
        let entries: [(&str, &[&str]); 8] = [
            ("A", &["Active", "Accepted"]),
            ("D", &["Deferred"]),
            ("F", &["Final"]),
            ("P", &["Provisional"]),
            ("R", &["Rejected"]),
            ("S", &["Superseded"]),
            ("W", &["Withdrawn"]),
            ("", &["Draft", "Active"]),
        ];
        Self(
            entries
                .iter()
                .map(|(code, labels)| {
                    (
                        code.to_string(),
                        labels.iter().map(|l| l.to_string()).collect(),
                    )
                })
                .collect(),
        )
    }
}

/// Immutable run configuration, built once at startup and borrowed by every job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub docs_url: Url,
    pub peps_url: Url,
    pub downloads_dir: PathBuf,
    pub results_dir: PathBuf,
    pub cache_dir: PathBuf,
    /// strftime pattern for result file names.
    pub datetime_format: String,
    pub user_agent: String,
    /// Product name in sidebar links, as in `Python 3.12 (stable)`.
    pub product_name: String,
    /// Phrase identifying the sidebar list of documentation versions.
    pub versions_marker: String,
    /// Regex an archive href must match on the downloads page.
    pub archive_pattern: String,
    /// Tally order for the proposal status table.
    pub known_statuses: Vec<String>,
    pub expected_status: ExpectedStatusMap,
    pub status_code_rule: StatusCodeRule,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docs_url: Url::parse(DOCS_URL).expect("docs URL literal is valid"),
            peps_url: Url::parse(PEPS_URL).expect("peps URL literal is valid"),
            downloads_dir: PathBuf::from("downloads"),
            results_dir: PathBuf::from("results"),
            cache_dir: PathBuf::from(".http_cache"),
            datetime_format: "%Y-%m-%d_%H-%M-%S".to_string(),
            user_agent: concat!("docscrape/", env!("CARGO_PKG_VERSION")).to_string(),
            product_name: "Python".to_string(),
            versions_marker: "All versions".to_string(),
            archive_pattern: r".+pdf-a4\.zip$".to_string(),
            known_statuses: [
                "Active",
                "Accepted",
                "Deferred",
                "Final",
                "Provisional",
                "Rejected",
                "Superseded",
                "Withdrawn",
                "Draft",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            expected_status: ExpectedStatusMap::default(),
            status_code_rule: StatusCodeRule::default(),
        }
    }
}

impl Config {
    /// Defaults, overridden field by field from a YAML file when one is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|e| ScrapeError::io(path, e))?;
        let cfg = Self::from_yaml(&text).map_err(|source| ScrapeError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }
}
