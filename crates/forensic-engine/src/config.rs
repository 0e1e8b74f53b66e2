//! TOML configuration for the forensic pipeline
//!
//! Every section is optional; a missing file section or key falls back to
//! the built-in defaults.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared_pdf::ImageFilter;
use shared_types::DocumentNature;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub revision: RevisionConfig,
    #[serde(default)]
    pub rescan: RescanConfig,
    #[serde(default)]
    pub document: DocumentConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }
}

/// External revision tool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionConfig {
    /// Executable name or path (default: pdfresurrect)
    #[serde(default = "default_tool")]
    pub tool: String,
    /// Subprocess timeout in milliseconds (default: 10000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Allowed gap between filesystem timestamps (default: 1.0)
    #[serde(default = "default_tolerance")]
    pub timestamp_tolerance_secs: f64,
}

fn default_tool() -> String {
    "pdfresurrect".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_tolerance() -> f64 {
    1.0
}

impl Default for RevisionConfig {
    fn default() -> Self {
        Self {
            tool: default_tool(),
            timeout_ms: default_timeout_ms(),
            timestamp_tolerance_secs: default_tolerance(),
        }
    }
}

impl RevisionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Image shape limits for the re-scan signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescanConfig {
    #[serde(default = "default_min_side")]
    pub min_width: u32,
    #[serde(default = "default_min_side")]
    pub min_height: u32,
    #[serde(default = "default_max_channels")]
    pub max_channels: u8,
}

fn default_min_side() -> u32 {
    100
}

fn default_max_channels() -> u8 {
    4
}

impl Default for RescanConfig {
    fn default() -> Self {
        Self {
            min_width: default_min_side(),
            min_height: default_min_side(),
            max_channels: default_max_channels(),
        }
    }
}

impl RescanConfig {
    pub fn image_filter(&self) -> ImageFilter {
        ImageFilter {
            min_width: self.min_width,
            min_height: self.min_height,
            max_channels: self.max_channels,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentConfig {
    #[serde(default)]
    pub nature: NatureMode,
}

/// How the document nature (and so the metadata blacklist) is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NatureMode {
    #[default]
    Scan,
    Native,
    /// Detect from the document's text / image content
    Auto,
}

impl NatureMode {
    /// The fixed nature for non-`Auto` modes
    pub fn fixed(&self) -> Option<DocumentNature> {
        match self {
            NatureMode::Scan => Some(DocumentNature::Scan),
            NatureMode::Native => Some(DocumentNature::Native),
            NatureMode::Auto => None,
        }
    }
}

#[derive(Error, Debug)]
#[error("Unknown nature mode '{0}' (expected scan, native or auto)")]
pub struct ParseNatureModeError(String);

impl FromStr for NatureMode {
    type Err = ParseNatureModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(NatureMode::Auto),
            other => match other.parse::<DocumentNature>() {
                Ok(DocumentNature::Scan) => Ok(NatureMode::Scan),
                Ok(DocumentNature::Native) => Ok(NatureMode::Native),
                Err(_) => Err(ParseNatureModeError(s.to_string())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.revision.tool, "pdfresurrect");
        assert_eq!(config.revision.timeout(), Duration::from_secs(10));
        assert_eq!(config.rescan.image_filter(), ImageFilter::default());
        assert_eq!(config.document.nature, NatureMode::Scan);
    }

    #[test]
    fn test_partial_sections() {
        let toml = r#"
            [revision]
            timeout_ms = 2500

            [rescan]
            min_width = 64

            [document]
            nature = "auto"
        "#;
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.revision.timeout_ms, 2500);
        assert_eq!(config.revision.tool, "pdfresurrect");
        assert_eq!(config.rescan.min_width, 64);
        assert_eq!(config.rescan.min_height, 100);
        assert_eq!(config.document.nature, NatureMode::Auto);
    }

    #[test]
    fn test_malformed_toml_is_error() {
        assert!(Config::from_str("[revision\ntool = ").is_err());
        assert!(Config::from_str("[document]\nnature = \"hybrid\"").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forensics.toml");
        std::fs::write(&path, "[revision]\ntool = \"/opt/bin/pdfresurrect\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.revision.tool, "/opt/bin/pdfresurrect");
        assert!(Config::from_file(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_nature_mode_parsing() {
        assert_eq!("AUTO".parse::<NatureMode>().unwrap(), NatureMode::Auto);
        assert_eq!("scanné".parse::<NatureMode>().unwrap(), NatureMode::Scan);
        assert_eq!("native".parse::<NatureMode>().unwrap(), NatureMode::Native);
        assert!("hybrid".parse::<NatureMode>().is_err());
        assert_eq!(NatureMode::Auto.fixed(), None);
    }
}
