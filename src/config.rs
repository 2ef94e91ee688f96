use crate::model::RoutingRule;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Runtime configuration for the extractor front ends
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExtractorConfig {
    /// Sender routing rules, walked in order
    #[serde(default)]
    pub routing: Vec<RoutingRule>,
    /// Reject bodies larger than this many bytes (unset = no cap)
    #[serde(default)]
    pub max_body_bytes: Option<usize>,
}

impl ExtractorConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with BOOKING_EXTRACT__ prefix
    /// 2. booking-extract.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: BOOKING_EXTRACT__MAX_BODY_BYTES
    pub fn load() -> Result<Self, ConfigError> {
        build(File::with_name("booking-extract").required(false), environment())
    }

    /// Load configuration from an explicit file, still honouring environment overrides
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        build(File::from(path).required(true), environment())
    }
}

// Use double underscore for nested keys
fn environment() -> Environment {
    Environment::with_prefix("BOOKING_EXTRACT")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn build<S>(file: S, env: Environment) -> Result<ExtractorConfig, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = Config::builder()
        .add_source(file)
        .add_source(env)
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParserKind;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ExtractorConfig::default();
        assert!(config.routing.is_empty());
        assert!(config.max_body_bytes.is_none());
    }

    #[test]
    fn test_load_routing_rules_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
max_body_bytes = 524288

[[routing]]
from_address = "no-reply@bokun.io"
parser = "html_table"

[[routing]]
from_address = "shop@example-tours.com"
parser = "website"
"#
        )
        .unwrap();

        let config = ExtractorConfig::load_from(file.path()).unwrap();
        assert_eq!(config.max_body_bytes, Some(524288));
        assert_eq!(
            config.routing,
            vec![
                RoutingRule::new("no-reply@bokun.io", ParserKind::HtmlTable),
                RoutingRule::new("shop@example-tours.com", ParserKind::PlainTextMultiOrder),
            ]
        );
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
max_body_bytes = 524288

[[routing]]
from_address = "no-reply@bokun.io"
parser = "bokun"
"#
        )
        .unwrap();

        let vars: config::Map<String, String> = [(
            "BOOKING_EXTRACT__MAX_BODY_BYTES".to_string(),
            "1024".to_string(),
        )]
        .into_iter()
        .collect();

        let config = build(
            File::from(file.path()).required(true),
            environment().source(Some(vars)),
        )
        .unwrap();
        assert_eq!(config.max_body_bytes, Some(1024));
        assert_eq!(config.routing.len(), 1);
    }

    #[test]
    fn test_unknown_parser_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[[routing]]
from_address = "a@example.com"
parser = "pdf"
"#
        )
        .unwrap();

        assert!(ExtractorConfig::load_from(file.path()).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(ExtractorConfig::load_from(Path::new("/nonexistent/booking-extract.toml")).is_err());
    }
}
