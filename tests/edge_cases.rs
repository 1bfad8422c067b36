use std::fs;

use ruleprobe::{
    BackendError, Capability, ClassifiedCondition, ConditionExpression, Config, Diagnostic, Domain,
    Query, Rule, RuleEngine, ScanOutput, ScannerBackend, classify, parse,
};
use ruleprobe::parse::{MAX_CLAUSES, MAX_NESTING};
use tempfile::TempDir;

struct Failing;

impl ScannerBackend for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::any(Domain::Text)]
    }

    fn execute(&self, _config: &Config, _query: &Query) -> Result<ScanOutput, BackendError> {
        Err(BackendError::External("grep exited with status 2".into()))
    }
}

#[test]
fn empty_condition_fails_rule() {
    let engine = RuleEngine::builder().build().unwrap();
    let result = engine.evaluate(&Rule::new("empty", ""), &Config::new("."));
    assert!(!result.succeeded());
    assert!(matches!(
        result.diagnostics(),
        [Diagnostic::InvalidCondition(_)]
    ));
}

#[test]
fn engine_without_backends_never_succeeds() {
    let engine = RuleEngine::builder().build().unwrap();
    assert!(engine.registry().is_empty());

    let result = engine.evaluate(
        &Rule::new("r", "java.class is 'A' OR pom.dependency is 'b'"),
        &Config::new("."),
    );
    assert!(!result.succeeded());
    assert_eq!(result.diagnostics().len(), 2);
    assert!(result.outcomes().iter().all(|o| o.backend().is_none()));
}

#[test]
fn failing_backend_becomes_diagnostic() {
    let engine = RuleEngine::builder().backend(Failing).build().unwrap();
    let result = engine.evaluate(&Rule::new("r", "text.line is 'TODO'"), &Config::new("."));

    assert!(!result.succeeded());
    match result.diagnostics() {
        [Diagnostic::BackendFailed { backend, message, .. }] => {
            assert_eq!(backend, "failing");
            assert!(message.contains("status 2"));
        }
        other => panic!("unexpected diagnostics: {other:?}"),
    }
    assert_eq!(result.outcomes()[0].backend(), Some("failing"));
}

#[test]
fn long_or_chain_flattens_in_order() {
    let input = (0..40)
        .map(|i| format!("java.class is 'C{i}'"))
        .collect::<Vec<_>>()
        .join(" OR ");
    let ClassifiedCondition::OrSet(set) = classify(&parse(&input).unwrap()) else {
        panic!("expected an OR group");
    };
    let names: Vec<_> = set.iter().filter_map(|q| q.attribute("name")).collect();
    let expected: Vec<_> = (0..40).map(|i| format!("C{i}")).collect();
    assert_eq!(names, expected);
}

#[test]
fn deeply_nested_parentheses() {
    let depth = 64;
    let input = format!("{}java.class is 'a'{}", "(".repeat(depth), ")".repeat(depth));
    assert!(matches!(
        classify(&parse(&input).unwrap()),
        ClassifiedCondition::Simple(_)
    ));
}

#[test]
fn nesting_past_the_limit_fails_the_rule_only() {
    let deep = format!("{}java.class is 'a'{}", "(".repeat(500), ")".repeat(500));
    let err = parse(&deep).unwrap_err();
    assert_eq!(err.offset(), MAX_NESTING);

    let engine = RuleEngine::builder().build().unwrap();
    let results = engine.evaluate_all(
        &[Rule::new("deep", deep.as_str()), Rule::new("flat", "text is 'x'")],
        &Config::new("."),
    );
    assert!(matches!(
        results[0].diagnostics(),
        [Diagnostic::InvalidCondition(_)]
    ));
    assert!(matches!(results[1].diagnostics(), [Diagnostic::NoBackend(_)]));

    let issues = engine.check_rules(&[Rule::new("deep", deep)]);
    assert!(matches!(
        issues.as_slice(),
        [issue] if matches!(issue.diagnostic, Diagnostic::InvalidCondition(_))
    ));
}

#[test]
fn longest_accepted_chain_evaluates() {
    let chain = |n: usize| {
        (0..n)
            .map(|i| format!("text.line is 'L{i}'"))
            .collect::<Vec<_>>()
            .join(" OR ")
    };
    let engine = RuleEngine::builder().backend(Failing).build().unwrap();

    let result = engine.evaluate(&Rule::new("long", chain(MAX_CLAUSES)), &Config::new("."));
    assert!(!result.succeeded());
    assert_eq!(result.outcomes().len(), MAX_CLAUSES);
    assert!(result.to_string().contains("4096 diagnostic(s)"));

    let result = engine.evaluate(&Rule::new("too-long", chain(20_000)), &Config::new("."));
    assert!(matches!(
        result.diagnostics(),
        [Diagnostic::InvalidCondition(err)] if err.message().contains("clauses")
    ));
}

#[test]
fn and_nested_under_or_is_flattened_with_diagnostic() {
    let expr = parse("(java.class is 'a' AND java.class is 'b') OR java.class is 'c'").unwrap();
    assert!(expr.mixes_connectives());
    assert!(matches!(
        classify(&expr),
        ClassifiedCondition::OrSet(set) if set.len() == 3
    ));

    let engine = RuleEngine::builder().build().unwrap();
    let issues = engine.check_rules(&[Rule::new(
        "mixed",
        "(java.class is 'a' AND java.class is 'b') OR java.class is 'c'",
    )]);
    assert!(
        issues
            .iter()
            .any(|i| matches!(i.diagnostic, Diagnostic::FlattenedConnectives { .. }))
    );
}

#[test]
fn unicode_values_survive() {
    let ConditionExpression::Clause(q) = parse("text.line is 'grüße 😀'").unwrap() else {
        panic!("expected clause");
    };
    assert_eq!(q.attribute("value"), Some("grüße 😀"));
}

#[test]
fn empty_repository_matches_nothing() {
    let dir = TempDir::new().unwrap();
    let engine = RuleEngine::builder()
        .backend(ruleprobe::MavenGavBackend::new())
        .build()
        .unwrap();
    let result = engine.evaluate(
        &Rule::new("r", "pom.dependency is 'quarkus-core'"),
        &Config::new(dir.path()),
    );
    assert!(!result.succeeded());
    assert!(result.diagnostics().is_empty());
}

#[test]
fn depth_limit_comes_from_config() {
    let dir = TempDir::new().unwrap();
    let levels = 5;
    // a0 <- a1 <- ... <- a4, each child one directory below its parent.
    let mut path = dir.path().to_path_buf();
    for i in 0..levels {
        let parent = if i == 0 {
            String::new()
        } else {
            format!(
                "<parent><groupId>g</groupId><artifactId>a{}</artifactId><version>1</version></parent>",
                i - 1
            )
        };
        let deps = if i == 0 {
            "<dependencies><dependency><groupId>x</groupId><artifactId>deep</artifactId></dependency></dependencies>"
        } else {
            ""
        };
        fs::create_dir_all(&path).unwrap();
        fs::write(
            path.join("pom.xml"),
            format!(
                "<project><groupId>g</groupId><artifactId>a{i}</artifactId><version>1</version>{parent}{deps}</project>"
            ),
        )
        .unwrap();
        path.push(format!("m{i}"));
    }

    let engine = RuleEngine::builder()
        .backend(ruleprobe::MavenGavBackend::new())
        .build()
        .unwrap();
    let rule = Rule::new("deep", "pom.dependency is 'deep'");

    let result = engine.evaluate(&rule, &Config::new(dir.path()));
    assert!(result.succeeded());
    assert_eq!(result.matches().len(), 1);

    // Too shallow for the deepest modules: they fail to resolve and are
    // reported, but the shallow ones still report the declaration.
    let shallow = Config::new(dir.path()).with_max_parent_depth(1);
    let result = engine.evaluate(&rule, &shallow);
    assert!(result.succeeded());
    assert_eq!(result.matches().len(), 1);
    assert!(!result.diagnostics().is_empty());
    assert!(result.diagnostics().iter().all(|d| matches!(
        d,
        Diagnostic::ResolutionFailed { message, .. } if message.contains("exceeds 1 levels")
    )));
}

#[test]
fn result_display_summarizes() {
    let engine = RuleEngine::builder().build().unwrap();
    let result = engine.evaluate(&Rule::new("r", "yaml.key is 'a'"), &Config::new("."));
    let text = result.to_string();
    assert!(text.starts_with("rule r: not matched, 0 match(es), 1 diagnostic(s)"), "{text}");
}
