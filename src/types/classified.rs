use std::collections::HashSet;
use std::fmt;

use super::Query;

/// Insertion-ordered, deduplicating set of queries.
#[derive(Debug, Clone, Default)]
pub struct QuerySet {
    queries: Vec<Query>,
    seen: HashSet<Query>,
}

impl PartialEq for QuerySet {
    fn eq(&self, other: &Self) -> bool {
        self.queries == other.queries
    }
}

impl Eq for QuerySet {}

impl QuerySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if an equal query was already present.
    pub fn insert(&mut self, query: Query) -> bool {
        if !self.seen.insert(query.clone()) {
            return false;
        }
        self.queries.push(query);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Query> {
        self.queries.iter()
    }

    /// The only member, or the set back if it does not hold exactly one.
    pub(crate) fn into_single(mut self) -> Result<Query, Self> {
        if self.queries.len() == 1
            && let Some(q) = self.queries.pop()
        {
            return Ok(q);
        }
        Err(self)
    }
}

impl<'a> IntoIterator for &'a QuerySet {
    type Item = &'a Query;
    type IntoIter = std::slice::Iter<'a, Query>;

    fn into_iter(self) -> Self::IntoIter {
        self.queries.iter()
    }
}

impl FromIterator<Query> for QuerySet {
    fn from_iter<T: IntoIterator<Item = Query>>(iter: T) -> Self {
        let mut set = QuerySet::new();
        for q in iter {
            set.insert(q);
        }
        set
    }
}

/// The flattened evaluation shape of a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedCondition {
    Simple(Query),
    OrSet(QuerySet),
    AndSet(QuerySet),
}

impl ClassifiedCondition {
    /// Member queries in dispatch order.
    #[must_use]
    pub fn queries(&self) -> Vec<&Query> {
        match self {
            ClassifiedCondition::Simple(q) => vec![q],
            ClassifiedCondition::OrSet(set) | ClassifiedCondition::AndSet(set) => {
                set.iter().collect()
            }
        }
    }
}

impl fmt::Display for ClassifiedCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, set) = match self {
            ClassifiedCondition::Simple(q) => return write!(f, "simple[{q}]"),
            ClassifiedCondition::OrSet(set) => ("or", set),
            ClassifiedCondition::AndSet(set) => ("and", set),
        };
        write!(f, "{label}[")?;
        for (i, q) in set.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{q}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Domain;

    fn q(v: &str) -> Query {
        Query::shorthand(Domain::Java, Some("class"), v)
    }

    #[test]
    fn set_dedupes_and_keeps_order() {
        let set: QuerySet = [q("b"), q("a"), q("b"), q("c")].into_iter().collect();
        let order: Vec<_> = set.iter().map(|q| q.attribute("name")).collect();
        assert_eq!(order, vec![Some("b"), Some("a"), Some("c")]);
    }

    #[test]
    fn set_dedupes_symbol_spellings() {
        let upper = Query::shorthand(Domain::Java, Some("Class"), "X");
        let set: QuerySet = [upper, q("X")].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().and_then(Query::symbol), Some("Class"));
    }

    #[test]
    fn large_sets_stay_ordered() {
        let set: QuerySet = (0..5000).chain(0..5000).map(|i| q(&i.to_string())).collect();
        assert_eq!(set.len(), 5000);
        assert_eq!(set.iter().last().and_then(|q| q.attribute("name")), Some("4999"));
    }

    #[test]
    fn into_single_only_for_one_member() {
        let one: QuerySet = [q("a"), q("a")].into_iter().collect();
        assert_eq!(one.into_single(), Ok(q("a")));

        let two: QuerySet = [q("a"), q("b")].into_iter().collect();
        assert!(two.into_single().is_err());
    }

    #[test]
    fn display_lists_members() {
        let c = ClassifiedCondition::OrSet([q("a"), q("b")].into_iter().collect());
        assert_eq!(
            c.to_string(),
            "or[java.class is (name='a'); java.class is (name='b')]"
        );
    }
}
