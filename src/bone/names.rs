use super::id::BoneId;
use crate::error::MplError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Which name of a bone to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Canonical DSL key
    #[default]
    Key,
    English,
    Japanese,
}

impl Locale {
    /// Accepts `key`, `en`/`english`, `ja`/`jp`/`japanese`
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "key" => Some(Locale::Key),
            "en" | "english" => Some(Locale::English),
            "ja" | "jp" | "japanese" => Some(Locale::Japanese),
            _ => None,
        }
    }
}

impl BoneId {
    /// Localized display name
    pub fn display_name(self, locale: Locale) -> &'static str {
        let def = self.def();
        match locale {
            Locale::Key => def.key,
            Locale::English => def.name_en,
            Locale::Japanese => def.name_ja,
        }
    }

    /// Case-insensitive lookup by canonical key
    pub fn from_key(key: &str) -> Option<Self> {
        BoneId::ALL
            .into_iter()
            .find(|bone| bone.key().eq_ignore_ascii_case(key))
    }

    /// Lookup by key, English or Japanese name
    pub fn from_display_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::from_key(name).or_else(|| {
            BoneId::ALL.into_iter().find(|bone| {
                let def = bone.def();
                def.name_en.eq_ignore_ascii_case(name) || def.name_ja == name
            })
        })
    }
}

impl fmt::Display for BoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for BoneId {
    type Err = MplError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| MplError::UnknownBone {
            bone: s.to_string(),
        })
    }
}

impl Serialize for BoneId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for BoneId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        BoneId::from_display_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown bone {}", name)))
    }
}
