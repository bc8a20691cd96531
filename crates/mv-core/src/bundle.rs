use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum number of free-form extra references in a bundle
pub const MAX_EXTRAS: usize = 2;

/// Location of an uploaded asset, usually a public URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(String);

impl AssetRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn url(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetRef {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for AssetRef {
    fn from(url: String) -> Self {
        Self(url)
    }
}

/// Optional reference assets that condition every slot prompt of a job.
///
/// Built by the caller before the job starts and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBundle")]
pub struct ReferenceBundle {
    pub subject: Option<AssetRef>,
    pub style: Option<AssetRef>,
    pub scene: Option<AssetRef>,
    extras: Vec<AssetRef>,
}

impl ReferenceBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subject(mut self, asset: impl Into<AssetRef>) -> Self {
        self.subject = Some(asset.into());
        self
    }

    pub fn with_style(mut self, asset: impl Into<AssetRef>) -> Self {
        self.style = Some(asset.into());
        self
    }

    pub fn with_scene(mut self, asset: impl Into<AssetRef>) -> Self {
        self.scene = Some(asset.into());
        self
    }

    pub fn with_extra(mut self, asset: impl Into<AssetRef>) -> Result<Self> {
        if self.extras.len() >= MAX_EXTRAS {
            return Err(Error::TooManyExtras { max: MAX_EXTRAS });
        }
        self.extras.push(asset.into());
        Ok(self)
    }

    pub fn extras(&self) -> &[AssetRef] {
        &self.extras
    }

    pub fn is_empty(&self) -> bool {
        self.subject.is_none()
            && self.style.is_none()
            && self.scene.is_none()
            && self.extras.is_empty()
    }

    /// Every present reference URL: subject, style, scene, then extras
    pub fn urls(&self) -> Vec<String> {
        [&self.subject, &self.style, &self.scene]
            .into_iter()
            .flatten()
            .chain(self.extras.iter())
            .map(|asset| asset.url().to_string())
            .collect()
    }
}

#[derive(Deserialize)]
struct RawBundle {
    #[serde(default)]
    subject: Option<AssetRef>,
    #[serde(default)]
    style: Option<AssetRef>,
    #[serde(default)]
    scene: Option<AssetRef>,
    #[serde(default)]
    extras: Vec<AssetRef>,
}

impl TryFrom<RawBundle> for ReferenceBundle {
    type Error = Error;

    fn try_from(raw: RawBundle) -> Result<Self> {
        if raw.extras.len() > MAX_EXTRAS {
            return Err(Error::TooManyExtras { max: MAX_EXTRAS });
        }
        Ok(Self {
            subject: raw.subject,
            style: raw.style,
            scene: raw.scene,
            extras: raw.extras,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bundle() {
        let bundle = ReferenceBundle::new();
        assert!(bundle.is_empty());
        assert!(bundle.urls().is_empty());
    }

    #[test]
    fn test_urls_follow_fixed_order() {
        let bundle = ReferenceBundle::new()
            .with_extra("https://cdn/x1.png")
            .unwrap()
            .with_scene("https://cdn/scene.png")
            .with_subject("https://cdn/subject.png");

        assert_eq!(
            bundle.urls(),
            vec![
                "https://cdn/subject.png".to_string(),
                "https://cdn/scene.png".to_string(),
                "https://cdn/x1.png".to_string(),
            ]
        );
    }

    #[test]
    fn test_extras_are_capped() {
        let bundle = ReferenceBundle::new()
            .with_extra("a")
            .and_then(|b| b.with_extra("b"))
            .unwrap();
        assert_eq!(bundle.extras().len(), MAX_EXTRAS);
        assert_eq!(
            bundle.with_extra("c").unwrap_err(),
            Error::TooManyExtras { max: MAX_EXTRAS }
        );
    }

    #[test]
    fn test_deserialize_validates_extras() {
        let ok: ReferenceBundle =
            serde_json::from_str(r#"{"style":"s.png","extras":["a.png"]}"#).unwrap();
        assert_eq!(ok.style, Some(AssetRef::new("s.png")));
        assert_eq!(ok.extras().len(), 1);

        let too_many =
            serde_json::from_str::<ReferenceBundle>(r#"{"extras":["a","b","c"]}"#);
        assert!(too_many.is_err());
    }
}
