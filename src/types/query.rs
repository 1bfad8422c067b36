use std::fmt;
use std::hash::{Hash, Hasher};

use super::Domain;

/// Attribute map of a [`Query`].
///
/// Keeps insertion order for display, but compares and hashes as a map so
/// that `(a='1', b='2')` and `(b='2', a='1')` are the same query.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sorted(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self.iter().collect();
        entries.sort_unstable();
        entries
    }
}

impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.sorted() == other.sorted()
    }
}

impl Eq for Attributes {}

impl Hash for Attributes {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted().hash(state);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut attrs = Attributes::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

/// One typed clause of a condition: `domain.symbol is value`.
///
/// The symbol compares and hashes ASCII case-insensitively, the way routing
/// reads it, and displays as written.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Query {
    domain: Domain,
    symbol: Option<String>,
    attributes: Attributes,
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        let same_symbol = match (&self.symbol, &other.symbol) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false,
        };
        self.domain == other.domain && same_symbol && self.attributes == other.attributes
    }
}

impl Eq for Query {}

impl Hash for Query {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.domain.hash(state);
        self.symbol.as_deref().map(str::to_ascii_lowercase).hash(state);
        self.attributes.hash(state);
    }
}

/// Attribute name assigned to a bare quoted value, inferred from the symbol.
#[must_use]
pub fn default_attribute(symbol: Option<&str>) -> &'static str {
    const NAMED: [&str; 5] = ["annotation", "property", "class", "method", "field"];
    match symbol {
        Some(s) if s.eq_ignore_ascii_case("dependency") => "artifactId",
        Some(s) if NAMED.iter().any(|n| s.eq_ignore_ascii_case(n)) => "name",
        _ => "value",
    }
}

impl Query {
    #[must_use]
    pub fn new(domain: Domain, symbol: Option<&str>, attributes: Attributes) -> Self {
        Self {
            domain,
            symbol: symbol.map(str::to_owned),
            attributes,
        }
    }

    /// Build a query from the bare-value shorthand (`java.class is 'Foo'`).
    #[must_use]
    pub fn shorthand(domain: Domain, symbol: Option<&str>, value: impl Into<String>) -> Self {
        let mut attributes = Attributes::new();
        attributes.insert(default_attribute(symbol), value);
        Self::new(domain, symbol, attributes)
    }

    #[must_use]
    pub fn domain(&self) -> Domain {
        self.domain
    }

    #[must_use]
    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("'")?;
    for c in value.chars() {
        match c {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("'")
}

/// Renders as re-parseable condition text in the explicit pair form.
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.domain)?;
        if let Some(symbol) = &self.symbol {
            write!(f, ".{symbol}")?;
        }
        f.write_str(" is (")?;
        for (i, (k, v)) in self.attributes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}=")?;
            write_quoted(f, v)?;
        }
        f.write_str(")")
    }
}
