use winnow::ascii::{Caseless, multispace0};
use winnow::combinator::{alt, cut_err, fail, not, opt, preceded, repeat, separated, terminated};
use winnow::error::{ContextError, ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, literal, one_of, take_while};

use crate::{ConditionExpression, Domain, Query};

// -- Whitespace & keywords --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    multispace0.void().parse_next(input)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Case-insensitive keyword that must not run into an identifier.
fn keyword<'i>(word: &'static str) -> impl Parser<&'i str, (), ErrMode<ContextError>> {
    terminated(literal(Caseless(word)), not(one_of(is_ident_char))).void()
}

// -- Identifiers ------------------------------------------------------------

fn identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (one_of(is_ident_start), take_while(0.., is_ident_char))
        .take()
        .parse_next(input)
}

fn attribute_key<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        one_of(is_ident_start),
        take_while(0.., |c: char| is_ident_char(c) || c == '.' || c == '-'),
    )
        .take()
        .parse_next(input)
}

fn domain(input: &mut &str) -> ModalResult<Domain> {
    take_while(1.., |c: char| c.is_ascii_alphabetic())
        .try_map(str::parse::<Domain>)
        .context(StrContext::Label("domain"))
        .context(StrContext::Expected(StrContextValue::Description(
            "one of java, pom, text, property, yaml, json",
        )))
        .parse_next(input)
}

// -- Values -----------------------------------------------------------------

/// Single- or double-quoted string. Only the quote characters and the
/// backslash are escapable; other backslash sequences are kept verbatim.
fn quoted_string(input: &mut &str) -> ModalResult<String> {
    let quote = one_of(['\'', '"']).parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = cut_err(any)
            .context(StrContext::Expected(StrContextValue::CharLiteral(quote)))
            .parse_next(input)?;
        match ch {
            c if c == quote => return Ok(s),
            '\\' => {
                let esc = cut_err(any)
                    .context(StrContext::Expected(StrContextValue::CharLiteral(quote)))
                    .parse_next(input)?;
                match esc {
                    '\'' | '"' | '\\' => s.push(esc),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn key_value(input: &mut &str) -> ModalResult<(String, String)> {
    let key = attribute_key
        .context(StrContext::Label("attribute key"))
        .parse_next(input)?;
    ws.parse_next(input)?;
    cut_err('=')
        .context(StrContext::Expected(StrContextValue::CharLiteral('=')))
        .parse_next(input)?;
    ws.parse_next(input)?;
    let value = cut_err(quoted_string)
        .context(StrContext::Expected(StrContextValue::Description(
            "quoted attribute value",
        )))
        .parse_next(input)?;
    Ok((key.to_owned(), value))
}

enum ClauseValue {
    Bare(String),
    Pairs(Vec<(String, String)>),
}

fn value_expr(input: &mut &str) -> ModalResult<ClauseValue> {
    alt((
        quoted_string.map(ClauseValue::Bare),
        preceded(
            ('(', ws),
            cut_err(terminated(
                separated(1.., key_value, (ws, ',', ws)),
                (ws, ')'),
            )),
        )
        .map(|pairs: Vec<(String, String)>| ClauseValue::Pairs(pairs)),
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "quoted value or (key='value', ...)",
    )))
    .parse_next(input)
}

// -- Clauses ----------------------------------------------------------------

fn clause(input: &mut &str) -> ModalResult<ConditionExpression> {
    let domain = cut_err(domain).parse_next(input)?;
    let symbol = opt(preceded(
        '.',
        cut_err(identifier).context(StrContext::Expected(StrContextValue::Description(
            "symbol name",
        ))),
    ))
    .parse_next(input)?;

    ws.parse_next(input)?;
    cut_err(keyword("is"))
        .context(StrContext::Expected(StrContextValue::StringLiteral("is")))
        .parse_next(input)?;
    ws.parse_next(input)?;

    let query = match cut_err(value_expr).parse_next(input)? {
        ClauseValue::Bare(value) => Query::shorthand(domain, symbol, value),
        ClauseValue::Pairs(pairs) => Query::new(domain, symbol, pairs.into_iter().collect()),
    };
    Ok(ConditionExpression::Clause(query))
}

// -- Expressions (precedence: OR < AND < primary) ---------------------------

/// Deepest parenthesized group accepted.
pub const MAX_NESTING: usize = 128;
/// Most clauses accepted in one condition.
pub const MAX_CLAUSES: usize = 4096;

/// Nesting depth and clause count so far. Both bound how deep the
/// resulting tree and the recursion over it can get.
#[derive(Default)]
struct Limits {
    depth: usize,
    clauses: usize,
}

fn over_limit(input: &mut &str, expected: &'static str) -> ModalResult<ConditionExpression> {
    cut_err(fail)
        .context(StrContext::Label("condition"))
        .context(StrContext::Expected(StrContextValue::Description(expected)))
        .parse_next(input)
}

fn primary(input: &mut &str, limits: &mut Limits) -> ModalResult<ConditionExpression> {
    ws.parse_next(input)?;
    if !input.starts_with('(') {
        if limits.clauses >= MAX_CLAUSES {
            return over_limit(input, "at most 4096 clauses");
        }
        limits.clauses += 1;
        return clause(input);
    }

    if limits.depth >= MAX_NESTING {
        return over_limit(input, "at most 128 nested groups");
    }
    limits.depth += 1;
    let expr = preceded('(', cut_err(|i: &mut &str| or_expr(i, limits))).parse_next(input)?;
    cut_err((ws, ')'))
        .context(StrContext::Expected(StrContextValue::CharLiteral(')')))
        .parse_next(input)?;
    limits.depth -= 1;
    Ok(expr)
}

/// Fold `first op r1 op r2 ...` into `op(first, op(r1, r2))`.
fn fold_right(
    first: ConditionExpression,
    rest: Vec<ConditionExpression>,
    join: fn(ConditionExpression, ConditionExpression) -> ConditionExpression,
) -> ConditionExpression {
    let mut tail = rest.into_iter().rev();
    match tail.next() {
        None => first,
        Some(last) => {
            let right = tail.fold(last, |acc, e| join(e, acc));
            join(first, right)
        }
    }
}

fn and_expr(input: &mut &str, limits: &mut Limits) -> ModalResult<ConditionExpression> {
    let first = primary(input, limits)?;
    let rest: Vec<ConditionExpression> = repeat(
        0..,
        preceded((ws, keyword("and")), cut_err(|i: &mut &str| primary(i, limits))),
    )
    .parse_next(input)?;
    Ok(fold_right(first, rest, ConditionExpression::and))
}

fn or_expr(input: &mut &str, limits: &mut Limits) -> ModalResult<ConditionExpression> {
    let first = and_expr(input, limits)?;
    let rest: Vec<ConditionExpression> = repeat(
        0..,
        preceded((ws, keyword("or")), cut_err(|i: &mut &str| and_expr(i, limits))),
    )
    .parse_next(input)?;
    Ok(fold_right(first, rest, ConditionExpression::or))
}

// -- Top-level parser -------------------------------------------------------

pub fn condition(input: &mut &str) -> ModalResult<ConditionExpression> {
    let expr = or_expr(input, &mut Limits::default())?;
    ws.parse_next(input)?;
    Ok(expr)
}
