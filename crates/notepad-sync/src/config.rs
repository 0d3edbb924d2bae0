use notepad_core::error::{NotepadError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration for the notepad sync process.
///
/// Loaded once at start-up from a JSON file. All fields use sensible
/// defaults if not specified, so an empty object is a valid configuration.
///
/// # Examples
///
/// ```
/// use notepad_sync::config::EditorConfig;
///
/// let json = r#"{
///     "storage": { "metadata_path": "/var/lib/notepad/metadata.json" },
///     "files": { "extension": ".note" }
/// }"#;
///
/// let config: EditorConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.files.extension, "note");
/// assert_eq!(config.files.fallback_extension, "txt");
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EditorConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub files: FilesConfig,
}

/// Where durable state lives.
///
/// # Defaults
///
/// - `metadata_path`: `"notepad-metadata.json"` (relative to the working directory)
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_metadata_path")]
    pub metadata_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            metadata_path: default_metadata_path(),
        }
    }
}

/// Document file naming.
///
/// # Defaults
///
/// - `extension`: `"ntp"` - appended to save destinations that lack it
/// - `fallback_extension`: `"txt"` - offered in dialogs only, same format
/// - `untitled_name`: `"Untitled"` - title of documents without a path
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    #[serde(
        default = "default_extension",
        deserialize_with = "deserialize_extension"
    )]
    pub extension: String,

    #[serde(
        default = "default_fallback_extension",
        deserialize_with = "deserialize_fallback_extension"
    )]
    pub fallback_extension: String,

    #[serde(default = "default_untitled_name")]
    pub untitled_name: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            fallback_extension: default_fallback_extension(),
            untitled_name: default_untitled_name(),
        }
    }
}

impl FilesConfig {
    /// Filters offered by save and open dialogs, canonical format first.
    pub fn dialog_filters(&self) -> Vec<FileFilter> {
        vec![
            FileFilter {
                name: "Notepad documents".to_string(),
                extensions: vec![self.extension.clone()],
            },
            FileFilter {
                name: "Text files".to_string(),
                extensions: vec![self.fallback_extension.clone()],
            },
        ]
    }
}

/// One entry of a file dialog's filter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl EditorConfig {
    /// Reads configuration from a JSON file.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| NotepadError::io(path, e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Reads configuration from `path` if given, falling back to defaults.
    pub async fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No configuration file given, using defaults");
            return Self::default();
        };

        match Self::load(path).await {
            Ok(config) => {
                tracing::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Invalid configuration, using defaults: {}", e);
                Self::default()
            }
        }
    }
}

// Default value functions
fn default_metadata_path() -> PathBuf {
    PathBuf::from("notepad-metadata.json")
}

fn default_extension() -> String {
    "ntp".to_string()
}

fn default_fallback_extension() -> String {
    "txt".to_string()
}

fn default_untitled_name() -> String {
    "Untitled".to_string()
}

/// Strips leading dots; an empty extension falls back to `default`.
fn validate_extension(raw: String, default: fn() -> String) -> String {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        let fallback = default();
        tracing::warn!("Empty file extension configured, using \"{}\"", fallback);
        fallback
    } else {
        trimmed.to_string()
    }
}

fn deserialize_extension<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(validate_extension(raw, default_extension))
}

fn deserialize_fallback_extension<'de, D>(
    deserializer: D,
) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(validate_extension(raw, default_fallback_extension))
}
