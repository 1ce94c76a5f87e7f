use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Environment variable read by [`RenderConfig::from_env()`].
pub const PLACEHOLDER_ENV: &str = "SQLWEAVE_PLACEHOLDER";

/// How placeholders are written in final SQL text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaceholderStyle {
    /// `?` for every argument.
    #[default]
    Question,
    /// `$1`, `$2`, ... as PostgreSQL expects.
    Dollar,
}

impl FromStr for PlaceholderStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "question" | "?" => Ok(PlaceholderStyle::Question),
            "dollar" | "$" => Ok(PlaceholderStyle::Dollar),
            other => Err(anyhow!("unknown placeholder style `{}`", other)),
        }
    }
}

/// Settings applied when an expression is turned into final SQL text.
///
/// Expression trees always use `?` internally. The style only changes what
/// [`Expression::sql_final_with()`] produces.
///
/// [`Expression::sql_final_with()`]: crate::sql::Expression::sql_final_with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub placeholder: PlaceholderStyle,
}

impl RenderConfig {
    pub fn with_placeholder(mut self, placeholder: PlaceholderStyle) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn from_json(value: Value) -> Result<Self> {
        serde_json::from_value(value).context("invalid render config")
    }

    /// Reads [`PLACEHOLDER_ENV`]. An unset variable gives the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_var(std::env::var(PLACEHOLDER_ENV).ok().as_deref())
    }

    fn from_var(var: Option<&str>) -> Result<Self> {
        let mut config = RenderConfig::default();
        if let Some(style) = var {
            config.placeholder = style
                .parse()
                .with_context(|| format!("reading {}", PLACEHOLDER_ENV))?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_json() {
        let config = RenderConfig::from_json(json!({ "placeholder": "dollar" })).unwrap();
        assert_eq!(config.placeholder, PlaceholderStyle::Dollar);

        let config = RenderConfig::from_json(json!({})).unwrap();
        assert_eq!(config, RenderConfig::default());

        assert!(RenderConfig::from_json(json!({ "placeholder": "colon" })).is_err());
    }

    #[test]
    fn test_from_var() {
        assert_eq!(RenderConfig::from_var(None).unwrap().placeholder, PlaceholderStyle::Question);
        assert_eq!(
            RenderConfig::from_var(Some(" Dollar ")).unwrap().placeholder,
            PlaceholderStyle::Dollar
        );

        let err = RenderConfig::from_var(Some("named")).unwrap_err();
        assert_eq!(err.to_string(), "reading SQLWEAVE_PLACEHOLDER");
        assert_eq!(err.root_cause().to_string(), "unknown placeholder style `named`");
    }
}
