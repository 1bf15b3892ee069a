//! Dependency pattern table
//!
//! Each [`PatternRule`] pairs one regex with the [`RuleAction`] that turns its
//! matches into referenced type names. The table is fixed; callers iterate
//! [`rules()`] and union the results.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Type-name suffixes that mark a class as an application collaborator.
pub const ROLE_SUFFIXES: &[&str] = &[
    "Service",
    "Controller",
    "Repository",
    "Manager",
    "Helper",
    "Util",
    "Component",
    "Bean",
    "DAO",
    "Handler",
    "Processor",
    "Factory",
    "Builder",
];

/// Imports containing any of these (case-insensitive) are test or mocking
/// infrastructure and never count as dependencies.
pub const EXCLUDED_KEYWORDS: &[&str] = &[
    "test",
    "junit",
    "mockito",
    "spring.test",
    "hamcrest",
    "assertj",
];

/// Field annotations that mark an injected collaborator.
pub const INJECTION_MARKERS: &[&str] = &[
    "MockBean",
    "SpyBean",
    "InjectMocks",
    "Autowired",
    "Inject",
    "Mock",
    "Spy",
    "Resource",
];

/// Annotations whose argument list names configuration classes.
pub const CONFIG_ANNOTATIONS: &[&str] = &["ContextConfiguration", "SpringBootTest", "Import"];

/// `Foo.class` inside an annotation argument list.
static CLASS_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Z][A-Za-z0-9_]+)\.class\b").expect("CLASS_LITERAL regex should compile")
});

/// What a rule contributes for each of its matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    /// Group 1 is a dotted import; kept unless it names test infrastructure
    Import,
    /// Group 1 is the type of an annotated field; generics are stripped
    InjectedField,
    /// Group 1 is the type of an unannotated field with a role suffix
    RoleField,
    /// Group 1 is an annotation argument list; every `X.class` yields `X`
    ConfigClassList,
    /// Group 1 is a call receiver; its declared type in the same text is used
    ReceiverCall,
}

impl std::fmt::Display for RuleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Import => write!(f, "import"),
            Self::InjectedField => write!(f, "injected_field"),
            Self::RoleField => write!(f, "role_field"),
            Self::ConfigClassList => write!(f, "config_class_list"),
            Self::ReceiverCall => write!(f, "receiver_call"),
        }
    }
}

/// One entry of the pattern table
#[derive(Debug)]
pub struct PatternRule {
    pub name: &'static str,
    pub action: RuleAction,
    pub regex: Regex,
}

impl PatternRule {
    fn new(name: &'static str, action: RuleAction, pattern: &str) -> Self {
        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(e) => panic!("pattern rule `{name}` should compile: {e}"),
        };
        Self {
            name,
            action,
            regex,
        }
    }

    /// Type names this rule contributes for `text`, in match order.
    pub fn apply(&self, text: &str) -> Vec<String> {
        let captured = self
            .regex
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()));

        match self.action {
            RuleAction::Import => captured
                .filter(|name| !is_excluded(name))
                .map(str::to_string)
                .collect(),
            RuleAction::InjectedField | RuleAction::RoleField => captured
                .map(strip_generics)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
            RuleAction::ConfigClassList => captured
                .flat_map(|args| {
                    CLASS_LITERAL
                        .captures_iter(args)
                        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
                        .collect::<Vec<_>>()
                })
                .collect(),
            RuleAction::ReceiverCall => {
                let mut seen: Vec<&str> = Vec::new();
                let mut types = Vec::new();
                for receiver in captured {
                    if seen.contains(&receiver) {
                        continue;
                    }
                    seen.push(receiver);
                    if let Some(declared) = declared_type(text, receiver) {
                        types.push(declared);
                    }
                }
                types
            }
        }
    }
}

static RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    let roles = ROLE_SUFFIXES.join("|");
    let markers = INJECTION_MARKERS.join("|");
    let config = CONFIG_ANNOTATIONS.join("|");

    vec![
        PatternRule::new(
            "role_import",
            RuleAction::Import,
            &format!(r"(?m)^\s*import\s+([\w.]*\.[A-Za-z0-9_]*(?:{roles}))\s*;"),
        ),
        PatternRule::new(
            "layer_import",
            RuleAction::Import,
            r"(?m)^\s*import\s+([\w.]*\.(?:service|controller|repository|util|model|config)\.[\w.]+)\s*;",
        ),
        PatternRule::new(
            "namespace_import",
            RuleAction::Import,
            r"(?m)^\s*import\s+((?:com|org|io|net)\.[\w.]+)\s*;",
        ),
        PatternRule::new(
            "injected_field",
            RuleAction::InjectedField,
            &format!(
                r"@(?:{markers})\b(?:\([^)]*\))?\s*(?:(?:private|protected|public)\s+)?(?:final\s+)?([A-Z][A-Za-z0-9_]*(?:<[^;=()]*?>)?)\s+\w+\s*[;=]"
            ),
        ),
        PatternRule::new(
            "role_field",
            RuleAction::RoleField,
            &format!(
                r"(?:private|protected|public)\s+(?:static\s+)?(?:final\s+)?([A-Z][A-Za-z0-9_]*(?:{roles}))\s+\w+\s*[;=]"
            ),
        ),
        PatternRule::new(
            "config_classes",
            RuleAction::ConfigClassList,
            &format!(r"@(?:{config})\s*\(([^)]*)\)"),
        ),
        PatternRule::new(
            "receiver_call",
            RuleAction::ReceiverCall,
            r"(\w+)\.\w+\s*\(",
        ),
    ]
});

/// The full pattern table, in application order.
pub fn rules() -> &'static [PatternRule] {
    &RULES
}

/// Whether an import names test or mocking infrastructure.
pub fn is_excluded(name: &str) -> bool {
    let lower = name.to_lowercase();
    EXCLUDED_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// `List<String>` -> `List`
pub fn strip_generics(type_token: &str) -> &str {
    type_token
        .split('<')
        .next()
        .unwrap_or(type_token)
        .trim()
}

/// Declared type of `field` in `text`, from the first `Type field ;|=`.
/// Type arguments are dropped: `Repository<Atm> repo;` gives `Repository`.
fn declared_type(text: &str, field: &str) -> Option<String> {
    let pattern = format!(
        r"(?:private|protected|public)?\s*([A-Z][A-Za-z0-9_]+)(?:<[^;=(){{}}]*>)?\s+{}\s*[;=]",
        regex::escape(field)
    );
    let decl = Regex::new(&pattern).ok()?;
    decl.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> &'static PatternRule {
        rules()
            .iter()
            .find(|r| r.name == name)
            .unwrap_or_else(|| panic!("missing rule {name}"))
    }

    #[test]
    fn test_table_shape() {
        let names: Vec<&str> = rules().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "role_import",
                "layer_import",
                "namespace_import",
                "injected_field",
                "role_field",
                "config_classes",
                "receiver_call"
            ]
        );
        assert_eq!(rule("config_classes").action, RuleAction::ConfigClassList);
        assert_eq!(RuleAction::ReceiverCall.to_string(), "receiver_call");
    }

    #[test]
    fn test_role_import() {
        let text = "import com.bank.search.AtmLocationService;\nimport java.util.List;\n";
        assert_eq!(
            rule("role_import").apply(text),
            vec!["com.bank.search.AtmLocationService"]
        );
    }

    #[test]
    fn test_layer_import() {
        let text = "import com.bank.model.Atm;\nimport com.bank.search.Query;\n";
        assert_eq!(rule("layer_import").apply(text), vec!["com.bank.model.Atm"]);
    }

    #[test]
    fn test_namespace_import_skips_test_infrastructure() {
        let text = "import org.junit.jupiter.api.Test;\n\
                    import org.mockito.Mockito;\n\
                    import org.assertj.core.api.Assertions;\n\
                    import org.hamcrest.Matchers;\n\
                    import com.bank.test.Fixtures;\n\
                    import io.app.Clock;\n";
        assert_eq!(rule("namespace_import").apply(text), vec!["io.app.Clock"]);
    }

    #[test]
    fn test_static_and_wildcard_imports_ignored() {
        let text = "import static com.bank.util.Money.cents;\nimport com.bank.service.*;\n";
        assert!(rule("namespace_import").apply(text).is_empty());
        assert!(rule("role_import").apply(text).is_empty());
    }

    #[test]
    fn test_injected_field_variants() {
        let text = r#"
            @Autowired
            private AtmLocationService atmLocationService;

            @MockBean AccountRepository repository;

            @Mock(name = "clock") protected final Clock clock = null;

            @InjectMocks
            SearchController controller;

            @Mock List<String> repo;

            @Mock
            Map<String, List<Atm>> index;
        "#;
        assert_eq!(
            rule("injected_field").apply(text),
            vec![
                "AtmLocationService",
                "AccountRepository",
                "Clock",
                "SearchController",
                "List",
                "Map"
            ]
        );
    }

    #[test]
    fn test_role_field_without_marker() {
        let text = "private final AuditHelper audit = new AuditHelper();\n\
                    private String name;\n\
                    public static UserDAO dao;\n";
        assert_eq!(rule("role_field").apply(text), vec!["AuditHelper", "UserDAO"]);
    }

    #[test]
    fn test_config_class_lists() {
        let text = "@ContextConfiguration(classes = {SearchConfig.class, AtmLocationService.class})\n\
                    @SpringBootTest(classes = App.class)\n\
                    @Import(ExtraConfig.class)\n";
        assert_eq!(
            rule("config_classes").apply(text),
            vec!["SearchConfig", "AtmLocationService", "App", "ExtraConfig"]
        );
    }

    #[test]
    fn test_receiver_call_resolves_declared_type_once() {
        let text = "private AtmLocationService service;\n\
                    void t() { service.search(1); service.search(2); unknown.call(); }\n";
        assert_eq!(rule("receiver_call").apply(text), vec!["AtmLocationService"]);
    }

    #[test]
    fn test_receiver_call_with_generic_declaration() {
        let text = "private Repository<Atm> repo;\n\
                    private final Map<String, List<Atm>> byZip = new HashMap<>();\n\
                    void t() { repo.save(atm); byZip.get(zip); }\n";
        assert_eq!(rule("receiver_call").apply(text), vec!["Repository", "Map"]);
    }

    #[test]
    fn test_helpers() {
        assert!(is_excluded("org.springframework.Test.Helper"));
        assert!(!is_excluded("com.bank.service.AtmLocationService"));
        assert_eq!(strip_generics("List<String>"), "List");
        assert_eq!(strip_generics("Clock"), "Clock");
    }
}
