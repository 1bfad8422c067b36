use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The analysis domain a clause is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Domain {
    Java,
    Pom,
    Text,
    Property,
    Yaml,
    Json,
}

impl Domain {
    pub const ALL: [Domain; 6] = [
        Domain::Java,
        Domain::Pom,
        Domain::Text,
        Domain::Property,
        Domain::Yaml,
        Domain::Json,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Java => "java",
            Domain::Pom => "pom",
            Domain::Text => "text",
            Domain::Property => "property",
            Domain::Yaml => "yaml",
            Domain::Json => "json",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown domain '{0}'")]
pub struct UnknownDomain(pub String);

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownDomain(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("JAVA".parse::<Domain>(), Ok(Domain::Java));
        assert_eq!("Pom".parse::<Domain>(), Ok(Domain::Pom));
        assert_eq!("json".parse::<Domain>(), Ok(Domain::Json));
    }

    #[test]
    fn rejects_unknown_keyword() {
        assert_eq!(
            "gradle".parse::<Domain>(),
            Err(UnknownDomain("gradle".into()))
        );
    }

    #[test]
    fn display_round_trips() {
        for d in Domain::ALL {
            assert_eq!(d.to_string().parse::<Domain>(), Ok(d));
        }
    }
}
