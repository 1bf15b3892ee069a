use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use triage_core::{LocatorConfig, WindowConfig};

/// OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL; `/chat/completions` is appended.
    pub url: String,
    pub model: String,
    /// Bearer token. Never written back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_completion_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("TRIAGE_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080/v1".into()),
            model: std::env::var("TRIAGE_MODEL")
                .unwrap_or_else(|_| "mistralai/mistral-medium-2505".into()),
            api_key: std::env::var("TRIAGE_API_KEY").ok().filter(|k| !k.is_empty()),
            temperature: 0.1,
            max_completion_tokens: 16384,
            timeout_secs: env_parse("TRIAGE_TIMEOUT_SECS").unwrap_or(120),
        }
    }
}

/// Top-level triage configuration.
///
/// Layering, lowest to highest: built-in defaults, `TRIAGE_*` environment
/// variables, the TOML file, command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Directory holding `TEST-*.xml`
    pub reports_dir: PathBuf,
    /// Directory the JSON documents are written to
    pub output_dir: PathBuf,
    pub locator: LocatorConfig,
    pub window: WindowConfig,
    pub endpoint: EndpointConfig,
}

impl Default for TriageConfig {
    fn default() -> Self {
        let mut locator = LocatorConfig::default();
        if let Ok(base) = std::env::var("TRIAGE_BASE_DIR") {
            locator.base_dir = PathBuf::from(base);
        }
        Self {
            reports_dir: std::env::var("TRIAGE_REPORTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("bank/target/surefire-reports")),
            output_dir: std::env::var("TRIAGE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("output")),
            locator,
            window: WindowConfig::default(),
            endpoint: EndpointConfig::default(),
        }
    }
}

impl TriageConfig {
    /// Defaults plus environment, merged with `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                Self::from_toml(&text)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply command-line overrides.
    pub fn with_overrides(
        mut self,
        reports_dir: Option<PathBuf>,
        output_dir: Option<PathBuf>,
        base_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(dir) = reports_dir {
            self.reports_dir = dir;
        }
        if let Some(dir) = output_dir {
            self.output_dir = dir;
        }
        if let Some(dir) = base_dir {
            self.locator.base_dir = dir;
        }
        self
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join("error-summary.json")
    }

    pub fn context_path(&self) -> PathBuf {
        self.output_dir.join("failure-context.json")
    }

    pub fn fixes_path(&self) -> PathBuf {
        self.output_dir.join("suggested-fixes.json")
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_overrides_selected_fields() {
        let config = TriageConfig::from_toml(
            r#"
            reports_dir = "module/target/surefire-reports"

            [locator]
            test_roots = ["module/src/test/java"]

            [window]
            lines_after = 10

            [endpoint]
            model = "local-coder"
            "#,
        )
        .unwrap();

        assert_eq!(config.reports_dir, PathBuf::from("module/target/surefire-reports"));
        assert_eq!(config.locator.test_roots, vec!["module/src/test/java".to_string()]);
        assert_eq!(config.locator.source_extension, "java");
        assert_eq!(config.window.lines_after, 10);
        assert_eq!(config.window.lines_before, 5);
        assert_eq!(config.endpoint.model, "local-coder");
        assert_eq!(config.endpoint.max_completion_tokens, 16384);
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = TriageConfig::default().with_overrides(
            Some(PathBuf::from("reports")),
            None,
            Some(PathBuf::from("/repo")),
        );
        assert_eq!(config.reports_dir, PathBuf::from("reports"));
        assert_eq!(config.locator.base_dir, PathBuf::from("/repo"));
        assert_eq!(config.fixes_path(), config.output_dir.join("suggested-fixes.json"));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let err = TriageConfig::load(Some(Path::new("/no/such/triage.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_api_key_is_not_serialized() {
        let mut config = TriageConfig::default();
        config.endpoint.api_key = Some("secret".into());
        let text = toml::to_string(&config).unwrap();
        assert!(!text.contains("secret"));
    }
}
