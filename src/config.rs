//! Document configuration.

use serde::{Deserialize, Serialize};
use tessera_core::{AnnotationType, Error, Result, TypeRegistry};

// =============================================================================
// Configuration
// =============================================================================

/// Names of the annotation types the text algebra treats specially.
///
/// ```rust
/// use tessera::Config;
///
/// let config = Config::from_json_str(r#"{"token_type": "WORD"}"#).unwrap();
/// assert_eq!(config.token_type, "WORD");
/// assert_eq!(config.sentence_type, "SENTENCE");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Unit of `tokens()`, trimming, splitting, interleaving and `find` expansion
    pub token_type: String,
    /// Boundary for left and right context windows
    pub sentence_type: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token_type: "TOKEN".to_string(),
            sentence_type: "SENTENCE".to_string(),
        }
    }
}

impl Config {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.token_type.trim().is_empty() {
            return Err(Error::invalid_input("token_type must not be empty"));
        }
        if self.sentence_type.trim().is_empty() {
            return Err(Error::invalid_input("sentence_type must not be empty"));
        }
        Ok(())
    }

    pub(crate) fn resolve(&self, registry: &TypeRegistry) -> Result<Layers> {
        self.validate()?;
        Ok(Layers {
            token: registry.annotation_type_of(&self.token_type)?,
            sentence: registry.annotation_type_of(&self.sentence_type)?,
        })
    }
}

/// Resolved handles for [`Config`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Layers {
    pub(crate) token: AnnotationType,
    pub(crate) sentence: AnnotationType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::builtin;

    #[test]
    fn test_default_resolves_to_builtins() {
        let registry = TypeRegistry::new();
        let layers = Config::default().resolve(&registry).unwrap();
        assert_eq!(layers.token, builtin::TOKEN);
        assert_eq!(layers.sentence, builtin::SENTENCE);
    }

    #[test]
    fn test_unknown_type_name() {
        let registry = TypeRegistry::new();
        let config = Config {
            token_type: "WORD".into(),
            ..Config::default()
        };
        assert!(matches!(
            config.resolve(&registry),
            Err(Error::UnknownTypeName(_))
        ));

        let word = registry.make_annotation_type("word").unwrap();
        assert_eq!(config.resolve(&registry).unwrap().token, word);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Config::from_json_str("{\"token_type\": 3}"),
            Err(Error::Serialization(_))
        ));
        assert!(matches!(
            Config::from_json_str("{\"sentence_type\": \"  \"}"),
            Err(Error::InvalidInput(_))
        ));
    }
}
