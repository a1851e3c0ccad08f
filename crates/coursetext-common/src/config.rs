use serde::{Deserialize, Serialize};

use std::future::Future;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CoursetextError, ParseError, SerDeError};
use crate::types::Term;

/// Default rescan schedule for the portal layer, in milliseconds.
pub const DEFAULT_RESCAN_DELAYS_MS: [u64; 2] = [0, 2000];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Annotate glossary terms unless told otherwise per call.
    pub glossary: bool,
    /// Additions to the sanitizer allow-list.
    pub sanitizer: SanitizerConfig,
    /// Delays after each injection at which markers are scanned again.
    pub rescan_delays_ms: Vec<u64>,
}

impl Config {
    /// Loads the configuration from the provided loader.
    pub async fn load(loader: &impl Loader) -> Result<Self, CoursetextError> {
        let config = loader.load().await?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration using the provided saver.
    pub async fn save(&self, saver: &impl Saver) -> Result<(), CoursetextError> {
        saver.save(self).await
    }

    pub fn rescan_delays(&self) -> Vec<Duration> {
        self.rescan_delays_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }

    fn validate(&self) -> Result<(), CoursetextError> {
        for tag in &self.sanitizer.extra_tags {
            if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(CoursetextError::InvalidConfig(format!(
                    "sanitizer tag {tag:?} is not a valid element name"
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            glossary: true,
            sanitizer: SanitizerConfig::default(),
            rescan_delays_ms: DEFAULT_RESCAN_DELAYS_MS.to_vec(),
        }
    }
}

/// Extra tags and attributes let through by the sanitizer, on top of its
/// built-in allow-list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    pub extra_tags: Vec<String>,
    /// Attributes allowed on every element.
    pub extra_attributes: Vec<String>,
}

/// The trait for loading configuration data.
pub trait Loader {
    /// Loads the configuration data.
    fn load(&self) -> impl Future<Output = Result<Config, CoursetextError>> + Send;
}

/// The trait for saving configuration data.
pub trait Saver {
    /// Saves the configuration data.
    fn save(&self, config: &Config) -> impl Future<Output = Result<(), CoursetextError>> + Send;
}

/// An implementation of [`Loader`] and [`Saver`] that reads and writes a configuration file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a new [`FileStore`] with the given path.
    ///
    /// The format follows the file extension: `.json` or `.toml`.
    /// Loading a file that does not exist yields [`Config::default`].
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `<config dir>/coursetext/config.toml`, falling back to the working
    /// directory when the platform has no config dir.
    pub fn default_location() -> Self {
        let dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir.join("coursetext").join("config.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Loader for FileStore {
    async fn load(&self) -> Result<Config, CoursetextError> {
        let format = FileFormat::of(&self.path)?;
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        format.parse(&self.path, contents)
    }
}

impl Saver for FileStore {
    async fn save(&self, config: &Config) -> Result<(), CoursetextError> {
        let contents = match FileFormat::of(&self.path)? {
            FileFormat::Json => {
                serde_json::to_string_pretty(config).map_err(SerDeError::from)?
            }
            FileFormat::Toml => toml::to_string_pretty(config).map_err(SerDeError::from)?,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    fn of(path: &Path) -> Result<Self, CoursetextError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => Err(CoursetextError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    fn parse<T: serde::de::DeserializeOwned>(
        self,
        path: &Path,
        contents: String,
    ) -> Result<T, CoursetextError> {
        let name = path.display().to_string();
        match self {
            Self::Json => serde_json::from_str(&contents)
                .map_err(|err| ParseError::json(err, name, contents).into()),
            Self::Toml => toml::from_str(&contents)
                .map_err(|err| ParseError::toml(err, name, contents).into()),
        }
    }
}

/// On-disk glossary: either a bare JSON array of terms or a table with a
/// `terms` list (the only shape TOML allows).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GlossaryFile {
    List(Vec<Term>),
    Table { terms: Vec<Term> },
}

/// Read a glossary term list from a `.json` or `.toml` file.
pub fn load_glossary(path: impl AsRef<Path>) -> Result<Vec<Term>, CoursetextError> {
    let path = path.as_ref();
    let format = FileFormat::of(path)?;
    let contents = std::fs::read_to_string(path)?;
    let file: GlossaryFile = format.parse(path, contents).map_err(|err| match err {
        CoursetextError::Parse(parse) => CoursetextError::Parse(
            parse.with_advice("expected a list of {id, term, definition} entries"),
        ),
        other => other,
    })?;
    let terms = match file {
        GlossaryFile::List(terms) | GlossaryFile::Table { terms } => terms,
    };
    tracing::debug!(path = %path.display(), count = terms.len(), "loaded glossary");
    Ok(terms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("config.toml"));
        let config = Config::load(&store).await.unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(
            config.rescan_delays(),
            vec![Duration::from_millis(0), Duration::from_millis(2000)]
        );
    }

    #[tokio::test]
    async fn toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("config.toml"));
        let config = Config {
            glossary: false,
            sanitizer: SanitizerConfig {
                extra_tags: vec!["details".into()],
                extra_attributes: vec!["aria-label".into()],
            },
            rescan_delays_ms: vec![0, 500],
        };
        config.save(&store).await.unwrap();
        assert_eq!(Config::load(&store).await.unwrap(), config);
    }

    #[tokio::test]
    async fn partial_json_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"glossary": false}"#).unwrap();
        let config = Config::load(&FileStore::new(&path)).await.unwrap();
        assert!(!config.glossary);
        assert_eq!(config.rescan_delays_ms, DEFAULT_RESCAN_DELAYS_MS.to_vec());
    }

    #[tokio::test]
    async fn unknown_extension_is_rejected() {
        let err = Config::load(&FileStore::new("config.yaml")).await.unwrap_err();
        assert!(matches!(err, CoursetextError::UnsupportedFormat { .. }));
    }

    #[tokio::test]
    async fn invalid_sanitizer_tag_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sanitizer]\nextra_tags = [\"<script>\"]\n").unwrap();
        let err = Config::load(&FileStore::new(&path)).await.unwrap_err();
        assert!(matches!(err, CoursetextError::InvalidConfig(_)));
    }

    #[test]
    fn glossary_from_json_array_and_toml_table() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("terms.json");
        std::fs::write(
            &json,
            r#"[{"id":"term-1","term":"algorithm","definition":"A procedure."}]"#,
        )
        .unwrap();
        let terms = load_glossary(&json).unwrap();
        assert_eq!(terms, vec![Term::new("term-1", "algorithm", "A procedure.")]);

        let toml_path = dir.path().join("terms.toml");
        std::fs::write(
            &toml_path,
            "[[terms]]\nid = \"loop\"\nterm = \"loop\"\ndefinition = \"Repetition.\"\n",
        )
        .unwrap();
        let terms = load_glossary(&toml_path).unwrap();
        assert_eq!(terms[0].id, "loop");
    }

    #[test]
    fn broken_glossary_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("terms.json");
        std::fs::write(&json, "[{\"id\": 1}]").unwrap();
        let err = load_glossary(&json).unwrap_err();
        assert!(matches!(err, CoursetextError::Parse(_)));
    }
}
