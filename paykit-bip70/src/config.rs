//! Protocol configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::pki::algorithm;
use crate::{PaymentProtocolError, Result};

/// Settings for signing, decoding and chain validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// pkiType used when signing a request that has none.
    #[serde(default = "default_pki_type")]
    pub default_pki_type: String,

    /// Largest PaymentRequest accepted by the size-limited decoder, in bytes.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,

    /// Reject certificates outside their notBefore/notAfter window.
    #[serde(default = "default_true")]
    pub check_validity_period: bool,

    /// Require the chain to end at a trust anchor.
    #[serde(default)]
    pub require_trusted_root: bool,

    /// PEM bundle of trust anchors.
    #[serde(default)]
    pub trusted_roots_pem: Option<PathBuf>,
}

fn default_pki_type() -> String {
    "x509+sha256".to_string()
}

fn default_max_message_size() -> usize {
    50_000
}

fn default_true() -> bool {
    true
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            default_pki_type: default_pki_type(),
            max_message_size: default_max_message_size(),
            check_validity_period: true,
            require_trusted_root: false,
            trusted_roots_pem: None,
        }
    }
}

impl ProtocolConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PaymentProtocolError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            PaymentProtocolError::Config(format!("reading {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<()> {
        algorithm::resolve(&self.default_pki_type).map_err(|e| {
            PaymentProtocolError::Config(format!("default_pki_type: {e}"))
        })?;
        if self.max_message_size == 0 {
            return Err(PaymentProtocolError::Config(
                "max_message_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Set the pkiType used when signing requests without one.
    pub fn with_default_pki_type(mut self, pki_type: impl Into<String>) -> Self {
        self.default_pki_type = pki_type.into();
        self
    }

    /// Set the largest accepted encoded request.
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Enable or disable certificate validity period checks.
    pub fn with_validity_check(mut self, enabled: bool) -> Self {
        self.check_validity_period = enabled;
        self
    }

    /// Require chains to end at a trust anchor.
    pub fn with_require_trusted_root(mut self, required: bool) -> Self {
        self.require_trusted_root = required;
        self
    }

    /// Load trust anchors from this PEM bundle.
    pub fn with_trusted_roots_pem(mut self, path: impl Into<PathBuf>) -> Self {
        self.trusted_roots_pem = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ProtocolConfig::default();
        assert_eq!(config.default_pki_type, "x509+sha256");
        assert_eq!(config.max_message_size, 50_000);
        assert!(config.check_validity_period);
        assert!(!config.require_trusted_root);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ProtocolConfig::from_json(r#"{"require_trusted_root": true}"#).unwrap();
        assert!(config.require_trusted_root);
        assert_eq!(config.max_message_size, 50_000);
        assert_eq!(config.default_pki_type, "x509+sha256");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = ProtocolConfig::from_json(r#"{"default_pki_type": "x509+md5"}"#).unwrap_err();
        assert!(matches!(err, PaymentProtocolError::Config(_)));

        let err = ProtocolConfig::new().with_max_message_size(0).validate().unwrap_err();
        assert!(matches!(err, PaymentProtocolError::Config(_)));

        assert!(ProtocolConfig::from_json("{not json").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"default_pki_type": "x509+sha1", "max_message_size": 1024}}"#
        )
        .unwrap();
        let config = ProtocolConfig::from_file(file.path()).unwrap();
        assert_eq!(config.default_pki_type, "x509+sha1");
        assert_eq!(config.max_message_size, 1024);

        assert!(ProtocolConfig::from_file("/nonexistent/config.json").is_err());
    }

    #[test]
    fn test_builder() {
        let config = ProtocolConfig::new()
            .with_default_pki_type("x509+sha1")
            .with_validity_check(false)
            .with_require_trusted_root(true)
            .with_trusted_roots_pem("/etc/paykit/roots.pem");
        assert_eq!(
            config.trusted_roots_pem.as_deref(),
            Some(Path::new("/etc/paykit/roots.pem"))
        );
        assert!(!config.check_validity_period);
    }
}
