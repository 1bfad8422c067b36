use std::time::Instant;

use crate::classify::classify;
use crate::registry::ScannerRegistry;
use crate::{
    ClassifiedCondition, Config, ConditionExpression, Diagnostic, Match, Query, QueryOutcome,
    QuerySet, Rule, RuleEvaluationResult, RuleIssue,
};

pub(crate) fn evaluate_rule(
    registry: &ScannerRegistry,
    rule: &Rule,
    config: &Config,
) -> RuleEvaluationResult {
    let start = Instant::now();

    let expr = match crate::parse::parse(&rule.condition) {
        Ok(expr) => expr,
        Err(err) => {
            tracing::warn!(rule = %rule.id, error = %err, "rule has no valid condition");
            return RuleEvaluationResult::new(
                rule.id.clone(),
                Vec::new(),
                false,
                Vec::new(),
                vec![Diagnostic::InvalidCondition(err)],
                start.elapsed(),
            );
        }
    };

    let mut diagnostics = Vec::new();
    if let Some(d) = flattening_diagnostic(rule, &expr) {
        tracing::warn!(rule = %rule.id, "mixed AND/OR condition flattened to its root connective");
        diagnostics.push(d);
    }

    let classified = classify(&expr);
    tracing::debug!(rule = %rule.id, shape = %classified, "classified condition");

    let mut matches = Vec::new();
    let mut outcomes = Vec::new();
    for query in classified.queries() {
        let (backend, found) = dispatch(registry, config, query, &mut diagnostics);
        outcomes.push(QueryOutcome::new(query.clone(), backend, found.len()));
        matches.extend(found);
    }

    let succeeded = match classified {
        ClassifiedCondition::Simple(_) | ClassifiedCondition::OrSet(_) => {
            outcomes.iter().any(QueryOutcome::matched)
        }
        ClassifiedCondition::AndSet(_) => outcomes.iter().all(QueryOutcome::matched),
    };

    tracing::debug!(
        rule = %rule.id,
        succeeded,
        matches = matches.len(),
        "rule evaluated"
    );

    RuleEvaluationResult::new(
        rule.id.clone(),
        matches,
        succeeded,
        outcomes,
        diagnostics,
        start.elapsed(),
    )
}

/// Run one query. A missing backend or a backend failure becomes a
/// diagnostic and zero matches; unresolved inputs become diagnostics next to
/// whatever did match.
fn dispatch(
    registry: &ScannerRegistry,
    config: &Config,
    query: &Query,
    diagnostics: &mut Vec<Diagnostic>,
) -> (Option<String>, Vec<Match>) {
    let backend = match registry.find_backend(query) {
        Ok(backend) => backend,
        Err(err) => {
            tracing::warn!(
                domain = %err.domain,
                symbol = err.symbol.as_deref().unwrap_or("*"),
                "no backend for clause, counting as zero matches"
            );
            diagnostics.push(Diagnostic::NoBackend(err));
            return (None, Vec::new());
        }
    };

    let name = backend.name().to_owned();
    match backend.execute(config, query) {
        Ok(output) => {
            tracing::debug!(
                backend = %name,
                %query,
                matches = output.matches.len(),
                unresolved = output.unresolved.len(),
                "query executed"
            );
            for input in output.unresolved {
                tracing::warn!(
                    backend = %name,
                    %query,
                    path = %input.path.display(),
                    error = %input.message,
                    "input could not be resolved, counting it as not found"
                );
                diagnostics.push(Diagnostic::ResolutionFailed {
                    backend: name.clone(),
                    query: query.clone(),
                    path: input.path,
                    message: input.message,
                });
            }
            (Some(name), output.matches)
        }
        Err(err) => {
            tracing::error!(backend = %name, %query, error = %err, "backend failed");
            diagnostics.push(Diagnostic::BackendFailed {
                backend: name.clone(),
                query: query.clone(),
                message: err.to_string(),
            });
            (Some(name), Vec::new())
        }
    }
}

fn flattening_diagnostic(rule: &Rule, expr: &ConditionExpression) -> Option<Diagnostic> {
    expr.mixes_connectives()
        .then(|| Diagnostic::FlattenedConnectives {
            condition: rule.condition.clone(),
        })
}

pub(crate) fn check_rules(registry: &ScannerRegistry, rules: &[Rule]) -> Vec<RuleIssue> {
    let mut issues = Vec::new();
    for rule in rules {
        let issue = |diagnostic| RuleIssue {
            rule_id: rule.id.clone(),
            diagnostic,
        };
        let expr = match crate::parse::parse(&rule.condition) {
            Ok(expr) => expr,
            Err(err) => {
                issues.push(issue(Diagnostic::InvalidCondition(err)));
                continue;
            }
        };
        if let Some(d) = flattening_diagnostic(rule, &expr) {
            issues.push(issue(d));
        }
        let queries: QuerySet = expr.leaves().into_iter().cloned().collect();
        for query in &queries {
            if let Err(err) = registry.find_backend(query) {
                issues.push(issue(Diagnostic::NoBackend(err)));
            }
        }
    }
    issues
}
