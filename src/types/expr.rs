use std::fmt;

use super::{Attributes, Domain, Query};

/// Boolean expression tree produced by the condition parser.
///
/// Leaves are typed clauses. The tree is never mutated after parsing; it is
/// flattened by [`classify`](crate::classify) before dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionExpression {
    Clause(Query),
    And(Box<ConditionExpression>, Box<ConditionExpression>),
    Or(Box<ConditionExpression>, Box<ConditionExpression>),
}

impl ConditionExpression {
    #[must_use]
    pub fn and(self, other: ConditionExpression) -> ConditionExpression {
        ConditionExpression::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: ConditionExpression) -> ConditionExpression {
        ConditionExpression::Or(Box::new(self), Box::new(other))
    }

    /// Leaf queries in left-to-right order, duplicates included.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Query> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            match expr {
                ConditionExpression::Clause(q) => out.push(q),
                ConditionExpression::And(a, b) | ConditionExpression::Or(a, b) => {
                    stack.push(b);
                    stack.push(a);
                }
            }
        }
        out
    }

    /// True when both `AND` and `OR` appear in the tree. Such trees lose
    /// their nesting when classified.
    #[must_use]
    pub fn mixes_connectives(&self) -> bool {
        let (mut and, mut or) = (false, false);
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            let (a, b) = match expr {
                ConditionExpression::Clause(_) => continue,
                ConditionExpression::And(a, b) => {
                    and = true;
                    (a, b)
                }
                ConditionExpression::Or(a, b) => {
                    or = true;
                    (a, b)
                }
            };
            if and && or {
                return true;
            }
            stack.push(b);
            stack.push(a);
        }
        false
    }
}

enum Piece<'a> {
    Expr(&'a ConditionExpression),
    Text(&'static str),
}

impl fmt::Display for ConditionExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![Piece::Expr(self)];
        while let Some(piece) = stack.pop() {
            let (a, op, b) = match piece {
                Piece::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Piece::Expr(ConditionExpression::Clause(q)) => {
                    write!(f, "{q}")?;
                    continue;
                }
                Piece::Expr(ConditionExpression::And(a, b)) => (a, " AND ", b),
                Piece::Expr(ConditionExpression::Or(a, b)) => (a, " OR ", b),
            };
            f.write_str("(")?;
            stack.extend([
                Piece::Text(")"),
                Piece::Expr(b),
                Piece::Text(op),
                Piece::Expr(a),
            ]);
        }
        Ok(())
    }
}

/// Clause with explicit attribute pairs.
#[must_use]
pub fn clause<'a>(
    domain: Domain,
    symbol: &str,
    attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> ConditionExpression {
    let attributes: Attributes = attributes.into_iter().collect();
    ConditionExpression::Clause(Query::new(domain, Some(symbol), attributes))
}

/// Clause using the bare-value shorthand and the inferred default attribute.
#[must_use]
pub fn shorthand(domain: Domain, symbol: &str, value: &str) -> ConditionExpression {
    ConditionExpression::Clause(Query::shorthand(domain, Some(symbol), value))
}
