use kdl::KdlDocument;
use std::path::{Path, PathBuf};

/// Where `publish` puts uploaded images and the URL they are served from.
///
/// ```kdl
/// media-dir "/srv/www/media"
/// media-url "https://blog.example.com/media"
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    pub media_dir: Option<PathBuf>,
    pub media_url: Option<String>,
}

impl MediaConfig {
    /// Values from `other` win where set.
    pub fn merge(self, other: MediaConfig) -> MediaConfig {
        MediaConfig {
            media_dir: other.media_dir.or(self.media_dir),
            media_url: other.media_url.or(self.media_url),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("blockpress").join("config.kdl"))
}

/// Read the config file. A missing file is an empty config.
pub fn load_config(path: &Path) -> miette::Result<MediaConfig> {
    if !path.exists() {
        tracing::debug!("No config at {}", path.display());
        return Ok(MediaConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|err| miette::miette!("Failed to read {}: {}", path.display(), err))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> miette::Result<MediaConfig> {
    let doc: KdlDocument = content
        .parse()
        .map_err(|err| miette::miette!("Invalid config: {}", err))?;

    Ok(MediaConfig {
        media_dir: string_value(&doc, "media-dir").map(PathBuf::from),
        media_url: string_value(&doc, "media-url").map(str::to_string),
    })
}

fn string_value<'a>(doc: &'a KdlDocument, key: &str) -> Option<&'a str> {
    doc.get(key)?.entries().first()?.value().as_string()
}
