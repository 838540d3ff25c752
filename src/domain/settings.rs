//! Display preferences

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(format!("Invalid theme: '{}'. Valid themes: light, dark", s)),
        }
    }
}

/// Body font size in pixels, always within [`FontSize::MIN`, `FontSize::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FontSize(u8);

impl FontSize {
    pub const MIN: u8 = 12;
    pub const MAX: u8 = 24;
    pub const DEFAULT: u8 = 16;

    /// Clamp any integer into the allowed range.
    pub fn clamped(raw: i64) -> Self {
        FontSize(raw.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn increased(self) -> Self {
        Self::clamped(self.0 as i64 + 1)
    }

    pub fn decreased(self) -> Self {
        Self::clamped(self.0 as i64 - 1)
    }
}

impl Default for FontSize {
    fn default() -> Self {
        FontSize(Self::DEFAULT)
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px", self.0)
    }
}

impl<'de> Deserialize<'de> for FontSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Older exports may carry fractional sizes.
        let raw = f64::deserialize(deserializer)?;
        // Zero was written for "unset".
        if raw == 0.0 {
            return Ok(FontSize::default());
        }
        if !raw.is_finite() {
            return Err(serde::de::Error::custom("fontSize must be a finite number"));
        }
        Ok(FontSize::clamped(raw.round() as i64))
    }
}

/// Deserialize an optional field, treating `null` like a missing value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The singleton settings record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default, deserialize_with = "null_as_default")]
    pub theme: Theme,
    #[serde(rename = "fontSize", default, deserialize_with = "null_as_default")]
    pub font_size: FontSize,
}
