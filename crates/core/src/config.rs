//! Service configuration.
//!
//! Configuration is resolved once at process startup and passed into the
//! operations layer by the host; nothing in the core reads environment
//! variables during request handling. The host checks incoming prefixes
//! against the configured allow-list before constructing operations — the
//! operations layer re-validates syntactically regardless.

use crate::error::{BarcodeError, BarcodeResult};
use crate::prefix::Prefix;
use serde::{Deserialize, Serialize};

/// A configured prefix with its human-readable description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixSpec {
    pub prefix: String,
    pub description: String,
}

/// Configuration for a barcode allocation service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    prefixes: Vec<PrefixSpec>,
    sequence_name: String,
    #[serde(default = "default_sequence_start")]
    sequence_start: u64,
}

fn default_sequence_start() -> u64 {
    1
}

impl ServiceConfig {
    /// Creates a validated `ServiceConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError::InvalidPrefix`] if any configured prefix is
    /// syntactically invalid, so a bad allow-list is caught at startup
    /// rather than on first use.
    pub fn new(
        prefixes: Vec<PrefixSpec>,
        sequence_name: &str,
        sequence_start: u64,
    ) -> BarcodeResult<Self> {
        for spec in &prefixes {
            if !Prefix::is_valid(&spec.prefix) {
                return Err(BarcodeError::InvalidPrefix {
                    prefix: spec.prefix.clone(),
                });
            }
        }

        Ok(Self {
            prefixes,
            sequence_name: sequence_name.to_lowercase(),
            sequence_start,
        })
    }

    /// Parses and validates configuration from a JSON document.
    pub fn from_json(input: &str) -> BarcodeResult<Self> {
        let parsed: Self = serde_json::from_str(input)?;
        Self::new(parsed.prefixes, &parsed.sequence_name, parsed.sequence_start)
    }

    /// The development preset: Sanger and Nire prefixes on the `heron`
    /// sequence, starting at 1.
    pub fn development() -> Self {
        Self {
            prefixes: vec![
                PrefixSpec {
                    prefix: "SANG".to_string(),
                    description: "Sanger barcodes".to_string(),
                },
                PrefixSpec {
                    prefix: "NIRE".to_string(),
                    description: "Nire barcodes".to_string(),
                },
            ],
            sequence_name: "heron".to_string(),
            sequence_start: 1,
        }
    }

    /// The configured prefixes with their descriptions.
    pub fn prefixes(&self) -> &[PrefixSpec] {
        &self.prefixes
    }

    /// The allow-list of prefix strings.
    pub fn valid_prefixes(&self) -> Vec<&str> {
        self.prefixes.iter().map(|p| p.prefix.as_str()).collect()
    }

    /// Returns true if `prefix` is on the allow-list.
    pub fn is_allowed(&self, prefix: &str) -> bool {
        self.prefixes.iter().any(|p| p.prefix == prefix)
    }

    pub fn sequence_name(&self) -> &str {
        &self.sequence_name
    }

    pub fn sequence_start(&self) -> u64 {
        self.sequence_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_preset() {
        let config = ServiceConfig::development();
        assert_eq!(config.valid_prefixes(), vec!["SANG", "NIRE"]);
        assert_eq!(config.sequence_name(), "heron");
        assert_eq!(config.sequence_start(), 1);
    }

    #[test]
    fn test_is_allowed() {
        let config = ServiceConfig::development();
        assert!(config.is_allowed("SANG"));
        assert!(!config.is_allowed("OTHR"));
    }

    #[test]
    fn test_new_rejects_invalid_configured_prefix() {
        let result = ServiceConfig::new(
            vec![PrefixSpec {
                prefix: "sang".to_string(),
                description: "lowercase is invalid".to_string(),
            }],
            "heron",
            1,
        );
        assert!(matches!(
            result,
            Err(BarcodeError::InvalidPrefix { prefix }) if prefix == "sang"
        ));
    }

    #[test]
    fn test_sequence_name_is_lowercased() {
        let config = ServiceConfig::new(Vec::new(), "Heron", 1).unwrap();
        assert_eq!(config.sequence_name(), "heron");
    }

    #[test]
    fn test_from_json() {
        let config = ServiceConfig::from_json(
            r#"{
                "prefixes": [{"prefix": "SANG", "description": "Sanger barcodes"}],
                "sequence_name": "heron",
                "sequence_start": 42
            }"#,
        )
        .unwrap();

        assert_eq!(config.valid_prefixes(), vec!["SANG"]);
        assert_eq!(config.sequence_start(), 42);
    }

    #[test]
    fn test_from_json_defaults_sequence_start() {
        let config = ServiceConfig::from_json(
            r#"{"prefixes": [], "sequence_name": "heron"}"#,
        )
        .unwrap();
        assert_eq!(config.sequence_start(), 1);
    }

    #[test]
    fn test_from_json_rejects_malformed_document() {
        assert!(matches!(
            ServiceConfig::from_json("not json"),
            Err(BarcodeError::ConfigParse(_))
        ));
    }
}
