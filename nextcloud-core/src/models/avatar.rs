//! Conversation avatar parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NextcloudError;

// ============================================================================
// Avatar Size
// ============================================================================

/// Sizes the federated avatar proxy accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AvatarSize {
    /// 64 × 64 pixels.
    #[default]
    Small,
    /// 512 × 512 pixels.
    Large,
}

impl AvatarSize {
    /// Edge length in pixels.
    pub fn pixels(&self) -> u32 {
        match self {
            Self::Small => 64,
            Self::Large => 512,
        }
    }
}

impl TryFrom<u32> for AvatarSize {
    type Error = NextcloudError;

    fn try_from(pixels: u32) -> Result<Self, Self::Error> {
        match pixels {
            64 => Ok(Self::Small),
            512 => Ok(Self::Large),
            other => Err(NextcloudError::InvalidArgument(format!(
                "avatar size must be 64 or 512, got {other}"
            ))),
        }
    }
}

impl fmt::Display for AvatarSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pixels())
    }
}

// ============================================================================
// Avatar Color
// ============================================================================

/// Background color of an emoji avatar: six hex digits, no leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AvatarColor(String);

impl AvatarColor {
    /// Returns the color as sent to the server.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AvatarColor {
    type Err = NextcloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(hex.to_ascii_uppercase()))
        } else {
            Err(NextcloudError::InvalidArgument(format!(
                "avatar color must be six hex digits, got {s:?}"
            )))
        }
    }
}

impl TryFrom<String> for AvatarColor {
    type Error = NextcloudError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AvatarColor> for String {
    fn from(color: AvatarColor) -> Self {
        color.0
    }
}

impl fmt::Display for AvatarColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avatar_size_from_pixels() {
        assert_eq!(AvatarSize::try_from(64).unwrap(), AvatarSize::Small);
        assert_eq!(AvatarSize::try_from(512).unwrap(), AvatarSize::Large);
        assert!(AvatarSize::try_from(128).is_err());
        assert_eq!(AvatarSize::Large.to_string(), "512");
    }

    #[test]
    fn test_color_parse() {
        assert_eq!("ff00aa".parse::<AvatarColor>().unwrap().as_str(), "FF00AA");
        assert_eq!("#0082c9".parse::<AvatarColor>().unwrap().as_str(), "0082C9");
        assert!("fff".parse::<AvatarColor>().is_err());
        assert!("gg0000".parse::<AvatarColor>().is_err());
        assert!("".parse::<AvatarColor>().is_err());
    }
}
