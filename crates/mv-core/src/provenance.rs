use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::angle::SlotOrdinal;
use crate::bundle::AssetRef;

pub const GUEST: &str = "guest";

/// Identity that provenance writes are scoped to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OwnerKey {
    Guest,
    Wallet(String),
}

impl OwnerKey {
    /// Blank input and the literal `guest` map to [`OwnerKey::Guest`]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(GUEST) {
            Self::Guest
        } else {
            Self::Wallet(trimmed.to_string())
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Guest => GUEST,
            Self::Wallet(address) => address,
        }
    }

    /// Leading part of project identifiers
    pub fn prefix(&self) -> String {
        match self {
            Self::Guest => GUEST.to_string(),
            Self::Wallet(address) => address.chars().take(8).collect::<String>().to_lowercase(),
        }
    }
}

impl Default for OwnerKey {
    fn default() -> Self {
        Self::Guest
    }
}

impl fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for OwnerKey {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<OwnerKey> for String {
    fn from(owner: OwnerKey) -> String {
        owner.as_str().to_string()
    }
}

/// Audit entry written once per successfully completed slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    pub owner: OwnerKey,
    pub project_id: String,
    pub slot: SlotOrdinal,
    pub prompt: String,
    pub reference_urls: Vec<String>,
    pub result_url: String,
    pub created_at: DateTime<Utc>,
}

impl ProvenanceRecord {
    pub fn new(
        owner: OwnerKey,
        project_id: impl Into<String>,
        slot: SlotOrdinal,
        prompt: impl Into<String>,
        reference_urls: Vec<String>,
        result: &AssetRef,
    ) -> Self {
        Self {
            owner,
            project_id: project_id.into(),
            slot,
            prompt: prompt.into(),
            reference_urls,
            result_url: result.url().to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Where a provenance record ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageTier {
    Primary,
    Fallback,
}
