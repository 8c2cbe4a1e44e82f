//! Configuration system

use std::path::Path;

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        match DocumentFormat::from_path(path) {
            Some(format) => format.parse(&contents),
            None => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Load from file, falling back to defaults when the file is missing
    fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match DocumentFormat::from_path(path) {
            Some(format) => format.render(self)?,
            None => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Text formats understood by [`Config`] and the scene loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl DocumentFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Some(Self::Toml),
            Some("ron") => Some(Self::Ron),
            _ => None,
        }
    }

    /// Deserialize a document in this format
    pub fn parse<T: for<'de> Deserialize<'de>>(self, contents: &str) -> Result<T, ConfigError> {
        match self {
            Self::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            // Optional fields may be written bare, as they are in TOML
            Self::Ron => ron::Options::default()
                .with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
                .from_str(contents)
                .map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Serialize a value in this format
    pub fn render<T: Serialize + ?Sized>(self, value: &T) -> Result<String, ConfigError> {
        match self {
            Self::Toml => {
                toml::to_string_pretty(value).map_err(|e| ConfigError::Serialize(e.to_string()))
            }
            Self::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        rate: u32,
    }

    impl Config for Sample {}

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a/b.toml")), Some(DocumentFormat::Toml));
        assert_eq!(DocumentFormat::from_path(Path::new("scene.ron")), Some(DocumentFormat::Ron));
        assert_eq!(DocumentFormat::from_path(Path::new("scene.json")), None);
    }

    #[test]
    fn test_ron_and_toml_parse_same_value() {
        let from_ron: Sample = DocumentFormat::Ron
            .parse(r#"(name: "demo", rate: 50)"#)
            .unwrap();
        let from_toml: Sample = DocumentFormat::Toml
            .parse("name = \"demo\"\nrate = 50\n")
            .unwrap();
        assert_eq!(from_ron, from_toml);
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Tagged {
        module: Option<String>,
        active: Option<bool>,
        material: Option<String>,
    }

    #[test]
    fn test_ron_accepts_bare_optional_values() {
        let bare: Tagged = DocumentFormat::Ron
            .parse(r#"(module: "demo", active: false)"#)
            .unwrap();
        let wrapped: Tagged = DocumentFormat::Ron
            .parse(r#"(module: Some("demo"), active: Some(false), material: None)"#)
            .unwrap();
        let from_toml: Tagged = DocumentFormat::Toml
            .parse("module = \"demo\"\nactive = false\n")
            .unwrap();

        assert_eq!(bare.module.as_deref(), Some("demo"));
        assert_eq!(bare.active, Some(false));
        assert_eq!(bare.material, None);
        assert_eq!(bare, wrapped);
        assert_eq!(bare, from_toml);
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let err = Sample::default().save_to_file("settings.ini").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
