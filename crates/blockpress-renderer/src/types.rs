use serde::Serialize;
use std::path::Path;

/// Media library file name, normalized to URL-safe lower-case snake_case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[repr(transparent)]
pub struct AssetName(String);

impl AssetName {
    /// Build an asset name from a file name, keeping its extension.
    pub fn from_filename(filename: &str) -> AssetName {
        let path = Path::new(filename);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename);

        let mut name = String::with_capacity(filename.len());
        for c in stem.chars() {
            if c.is_ascii_alphanumeric() {
                name.push(c.to_ascii_lowercase());
            } else {
                name.push('_');
            }
        }
        if name.is_empty() {
            name.push_str("image");
        }

        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            name.push('.');
            name.push_str(&ext.to_ascii_lowercase());
        }
        AssetName(name)
    }

    /// `cover.png` -> `cover-2.png`, for picking a free name on collision.
    pub fn with_suffix(&self, n: u32) -> AssetName {
        match self.0.rsplit_once('.') {
            Some((stem, ext)) => AssetName(format!("{stem}-{n}.{ext}")),
            None => AssetName(format!("{}-{n}", self.0)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AssetName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for AssetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Location of an asset after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedAsset {
    pub url: String,
}

impl UploadedAsset {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_name_normalization() {
        assert_eq!(AssetName::from_filename("My Image.PNG").as_str(), "my_image.png");
        assert_eq!(AssetName::from_filename("test-file!@#.jpg").as_str(), "test_file___.jpg");
        assert_eq!(AssetName::from_filename("already_good").as_str(), "already_good");
        assert_eq!(AssetName::from_filename("CAPS.webp").as_str(), "caps.webp");
        assert_eq!(AssetName::from_filename("path (1).png").as_str(), "path__1_.png");
    }

    #[test]
    fn test_asset_name_suffix() {
        let name = AssetName::from_filename("Cover.PNG");
        assert_eq!(name.with_suffix(1).as_str(), "cover-1.png");
        assert_eq!(name.with_suffix(12).as_str(), "cover-12.png");
        assert_eq!(AssetName::from_filename("README").with_suffix(2).as_str(), "readme-2");
    }

    #[test]
    fn test_asset_name_hash_equality() {
        use std::collections::HashMap;

        let name1 = AssetName::from_filename("test.png");
        let name2 = AssetName::from_filename("test.png");

        let mut map = HashMap::new();
        map.insert(name1.clone(), "value");

        assert_eq!(map.get(&name2), Some(&"value"));
    }
}
