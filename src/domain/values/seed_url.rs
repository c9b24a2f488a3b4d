use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which crawl a seed belongs to: the regular crawl or a named test variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SeedKind {
    Default,
    Test(String),
}

impl fmt::Display for SeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedKind::Default => write!(f, "default"),
            SeedKind::Test(variant) => write!(f, "test:{variant}"),
        }
    }
}

impl FromStr for SeedKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("default") {
            return Ok(SeedKind::Default);
        }
        match s.split_once(':') {
            Some((prefix, variant)) if prefix.eq_ignore_ascii_case("test") && !variant.trim().is_empty() => {
                Ok(SeedKind::Test(variant.trim().to_lowercase()))
            }
            _ => Err(format!("Unknown seed type: {s}")),
        }
    }
}

impl TryFrom<String> for SeedKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeedKind> for String {
    fn from(kind: SeedKind) -> Self {
        kind.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeedUrl {
    pub url: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: SeedKind,
}

fn default_kind() -> SeedKind {
    SeedKind::Default
}

impl SeedUrl {
    pub fn new(url: impl Into<String>, kind: SeedKind) -> Self {
        Self {
            url: url.into().trim().to_string(),
            kind,
        }
    }

    pub fn default_seed(url: impl Into<String>) -> Self {
        Self::new(url, SeedKind::Default)
    }
}
