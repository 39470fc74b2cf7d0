use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

/// A supported league, identified upstream by its slug.
///
/// Slugs outside the known set are carried through as [`League::Other`] so a
/// feed can be scoped to leagues we have never heard of.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum League {
    EmeaMasters,
    FirstStand,
    Lck,
    Lcs,
    Lec,
    Lpl,
    Msi,
    Worlds,
    #[strum(default)]
    Other(String),
}

impl League {
    /// Every league the feed covers when none are configured.
    pub fn defaults() -> Vec<League> {
        vec![
            League::EmeaMasters,
            League::FirstStand,
            League::Lck,
            League::Lcs,
            League::Lec,
            League::Lpl,
            League::Msi,
            League::Worlds,
        ]
    }

    /// Human-readable name used in event titles.
    pub fn display_name(&self) -> &str {
        match self {
            League::EmeaMasters => "EMEA Masters",
            League::FirstStand => "First Stand",
            League::Lck => "LCK",
            League::Lcs => "LCS",
            League::Lec => "LEC",
            League::Lpl => "LPL",
            League::Msi => "MSI",
            League::Worlds => "Worlds",
            League::Other(slug) => slug,
        }
    }
}

impl Serialize for League {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for League {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(League::from_str(&raw).unwrap_or_else(|_| League::Other(raw)))
    }
}
