use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Named thumbnail target. The resized image's longest side equals [`ThumbnailBucket::max_dimension`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailBucket {
    Xs,
    Sm,
    Md,
    Lg,
}

impl ThumbnailBucket {
    pub const ALL: [ThumbnailBucket; 4] = [
        ThumbnailBucket::Xs,
        ThumbnailBucket::Sm,
        ThumbnailBucket::Md,
        ThumbnailBucket::Lg,
    ];

    pub fn max_dimension(self) -> u32 {
        match self {
            ThumbnailBucket::Xs => 60,
            ThumbnailBucket::Sm => 360,
            ThumbnailBucket::Md => 720,
            ThumbnailBucket::Lg => 1440,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThumbnailBucket::Xs => "xs",
            ThumbnailBucket::Sm => "sm",
            ThumbnailBucket::Md => "md",
            ThumbnailBucket::Lg => "lg",
        }
    }
}

impl fmt::Display for ThumbnailBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported thumbnail size '{0}'")]
pub struct UnsupportedBucket(pub String);

impl FromStr for ThumbnailBucket {
    type Err = UnsupportedBucket;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xs" => Ok(ThumbnailBucket::Xs),
            "sm" => Ok(ThumbnailBucket::Sm),
            "md" => Ok(ThumbnailBucket::Md),
            "lg" => Ok(ThumbnailBucket::Lg),
            other => Err(UnsupportedBucket(other.to_string())),
        }
    }
}
