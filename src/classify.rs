use crate::{ClassifiedCondition, ConditionExpression, QuerySet};

/// Flatten a condition tree into the shape the evaluator dispatches.
///
/// The connective at the root decides the group semantics and every leaf of
/// the tree, in left-to-right order and deduplicated, joins that group.
/// Nested structure below the root is not kept: `(A AND B) OR C` becomes
/// `OrSet{A, B, C}` and `A AND (B OR C)` becomes `AndSet{A, B, C}`.
/// A group that deduplicates to one query is `Simple`.
#[must_use]
pub fn classify(expr: &ConditionExpression) -> ClassifiedCondition {
    let wrap: fn(QuerySet) -> ClassifiedCondition = match expr {
        ConditionExpression::Clause(q) => return ClassifiedCondition::Simple(q.clone()),
        ConditionExpression::Or(..) => ClassifiedCondition::OrSet,
        ConditionExpression::And(..) => ClassifiedCondition::AndSet,
    };

    let set: QuerySet = expr.leaves().into_iter().cloned().collect();
    match set.into_single() {
        Ok(q) => ClassifiedCondition::Simple(q),
        Err(set) => wrap(set),
    }
}
