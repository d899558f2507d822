use crate::codec::BinaryLayout;
use crate::core::UuidError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// UUID version minted for generated keys (1-5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct UuidVersion(u8);

impl UuidVersion {
    pub const V1: Self = Self(1);
    pub const V3: Self = Self(3);
    pub const V4: Self = Self(4);
    pub const V5: Self = Self(5);

    pub fn new(version: u8) -> Result<Self, UuidError> {
        Self::try_from(version)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Version 2 (DCE security) is valid in stored keys but never minted
    pub fn can_generate(self) -> bool {
        self.0 != 2
    }
}

impl Default for UuidVersion {
    fn default() -> Self {
        Self::V4
    }
}

impl TryFrom<u8> for UuidVersion {
    type Error = UuidError;

    fn try_from(version: u8) -> Result<Self, Self::Error> {
        if (1..=5).contains(&version) {
            Ok(Self(version))
        } else {
            Err(UuidError::UnsupportedVersion(version))
        }
    }
}

impl From<UuidVersion> for u8 {
    fn from(version: UuidVersion) -> Self {
        version.0
    }
}

impl fmt::Display for UuidVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// One layer of UUID settings
///
/// Every key is optional; `merge` lets the upper layer win key by key,
/// the same way defaults, entity settings and column settings stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detect_columns: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<UuidVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generate_on_insert: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_uuid_column: Option<bool>,
}

impl SettingsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detect_columns(mut self, detect: bool) -> Self {
        self.detect_columns = Some(detect);
        self
    }

    pub fn optimize(mut self, optimize: bool) -> Self {
        self.optimize = Some(optimize);
        self
    }

    pub fn version(mut self, version: UuidVersion) -> Self {
        self.version = Some(version);
        self
    }

    pub fn generate_on_insert(mut self, generate: bool) -> Self {
        self.generate_on_insert = Some(generate);
        self
    }

    pub fn is_uuid_column(mut self, is_uuid: bool) -> Self {
        self.is_uuid_column = Some(is_uuid);
        self
    }

    /// Keys set in `upper` replace ours
    pub fn merge(self, upper: &SettingsPatch) -> Self {
        Self {
            detect_columns: upper.detect_columns.or(self.detect_columns),
            optimize: upper.optimize.or(self.optimize),
            version: upper.version.or(self.version),
            generate_on_insert: upper.generate_on_insert.or(self.generate_on_insert),
            is_uuid_column: upper.is_uuid_column.or(self.is_uuid_column),
        }
    }

    pub fn without_detect_columns(mut self) -> Self {
        self.detect_columns = None;
        self
    }
}

/// Effective settings for one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UuidSettings {
    pub detect_columns: bool,
    pub optimize: bool,
    pub version: UuidVersion,
    pub generate_on_insert: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_uuid_column: Option<bool>,
}

impl Default for UuidSettings {
    fn default() -> Self {
        Self {
            detect_columns: true,
            optimize: false,
            version: UuidVersion::V4,
            generate_on_insert: false,
            is_uuid_column: None,
        }
    }
}

impl UuidSettings {
    pub fn layout(&self) -> BinaryLayout {
        BinaryLayout::from_optimize(self.optimize)
    }

    /// Every key set, so merging over this yields a complete layer
    pub fn as_patch(&self) -> SettingsPatch {
        SettingsPatch {
            detect_columns: Some(self.detect_columns),
            optimize: Some(self.optimize),
            version: Some(self.version),
            generate_on_insert: Some(self.generate_on_insert),
            is_uuid_column: self.is_uuid_column,
        }
    }
}

// Missing flags read as off; a missing version falls back to v4
impl From<SettingsPatch> for UuidSettings {
    fn from(patch: SettingsPatch) -> Self {
        Self {
            detect_columns: patch.detect_columns.unwrap_or(false),
            optimize: patch.optimize.unwrap_or(false),
            version: patch.version.unwrap_or_default(),
            generate_on_insert: patch.generate_on_insert.unwrap_or(false),
            is_uuid_column: patch.is_uuid_column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_range() {
        assert!(UuidVersion::new(0).is_err());
        assert_eq!(UuidVersion::new(1).unwrap().get(), 1);
        assert_eq!(UuidVersion::new(5).unwrap(), UuidVersion::V5);
        assert!(matches!(UuidVersion::new(6), Err(UuidError::UnsupportedVersion(6))));
    }

    #[test]
    fn test_merge_upper_wins() {
        let lower = SettingsPatch::new().optimize(false).generate_on_insert(true);
        let upper = SettingsPatch::new().optimize(true);

        let merged = lower.merge(&upper);
        assert_eq!(merged.optimize, Some(true));
        assert_eq!(merged.generate_on_insert, Some(true));
        assert_eq!(merged.version, None);
    }

    #[test]
    fn test_stripped_detect_reads_as_off() {
        let patch = UuidSettings::default().as_patch().without_detect_columns();
        let settings = UuidSettings::from(patch);
        assert!(!settings.detect_columns);
        assert_eq!(settings.version, UuidVersion::V4);
    }

    #[test]
    fn test_patch_rejects_unknown_keys() {
        let err = serde_json::from_str::<SettingsPatch>(r#"{"optimise": true}"#);
        assert!(err.is_err());

        let err = serde_json::from_str::<SettingsPatch>(r#"{"version": 9}"#);
        assert!(err.is_err());
    }
}
