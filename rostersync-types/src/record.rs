//! Detail records fetched per roster entry.
//!
//! A `DetailRecord` is created by the fetch stage, handed to the store in a
//! put batch, and never mutated in between. Field names on the wire match
//! the attribute names the store persists.

use crate::{Entity, Error, RecordKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highscore category a `Position` belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ScoreCategory {
    Total,
    Economy,
    Research,
    Military,
    MilitaryBuilt,
    MilitaryDestroyed,
    MilitaryLost,
    Honor,
}

impl ScoreCategory {
    /// All categories in wire order.
    pub const ALL: [ScoreCategory; 8] = [
        ScoreCategory::Total,
        ScoreCategory::Economy,
        ScoreCategory::Research,
        ScoreCategory::Military,
        ScoreCategory::MilitaryBuilt,
        ScoreCategory::MilitaryDestroyed,
        ScoreCategory::MilitaryLost,
        ScoreCategory::Honor,
    ];

    /// Returns the numeric type code used by the remote API.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl From<ScoreCategory> for u8 {
    fn from(category: ScoreCategory) -> Self {
        category.code()
    }
}

impl TryFrom<u8> for ScoreCategory {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(Error::UnknownCategory(code))
    }
}

impl fmt::Display for ScoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScoreCategory::Total => "total",
            ScoreCategory::Economy => "economy",
            ScoreCategory::Research => "research",
            ScoreCategory::Military => "military",
            ScoreCategory::MilitaryBuilt => "military_built",
            ScoreCategory::MilitaryDestroyed => "military_destroyed",
            ScoreCategory::MilitaryLost => "military_lost",
            ScoreCategory::Honor => "honor",
        };
        f.write_str(name)
    }
}

/// One highscore entry of a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    #[serde(rename = "Type")]
    pub category: ScoreCategory,
    #[serde(rename = "Score")]
    pub score: i64,
    #[serde(rename = "Ranking")]
    pub ranking: u32,
    /// Only reported for the military category.
    #[serde(rename = "Ships", default, skip_serializing_if = "Option::is_none")]
    pub ships: Option<u64>,
}

/// Enriched per-entity record, persisted under `(ID, Username)`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetailRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "ServerId", default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    /// Unix seconds of the remote snapshot.
    #[serde(rename = "Timestamp", default)]
    pub timestamp: i64,
    #[serde(rename = "Positions", default)]
    pub positions: Vec<Position>,
    #[serde(rename = "PlanetCount", default)]
    pub planet_count: u32,
    #[serde(rename = "AllianceId", default, skip_serializing_if = "Option::is_none")]
    pub alliance_id: Option<String>,
}

impl DetailRecord {
    /// Returns the composite store key of this record.
    #[must_use]
    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.id, &self.username)
    }

    /// Stamps the identity of the roster entry that produced this record.
    ///
    /// Whatever identity the remote payload carried is discarded so the
    /// record's key always matches `entity.key()`.
    #[must_use]
    pub fn with_identity(mut self, entity: &Entity) -> Self {
        self.id.clone_from(&entity.id);
        self.username.clone_from(&entity.name);
        self
    }

    /// Returns the position for a category, if the payload reported one.
    pub fn position(&self, category: ScoreCategory) -> Option<&Position> {
        self.positions.iter().find(|p| p.category == category)
    }
}
