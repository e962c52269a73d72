//! # Types
//!
//! Shared data structures used across all modules of the crowdfunding engine.
//!
//! ## Design decisions
//!
//! ### Config / State split
//!
//! A campaign is internally stored as two separate records:
//!
//! - [`CampaignConfig`] — written once at creation; never mutated.
//! - [`CampaignState`] — written on every donation and on finalization.
//!
//! The public API exposes the reconstructed [`Campaign`] struct for convenience.
//!
//! ### Status is derived, not stored
//!
//! [`CampaignStatus`] is computed from `finalized` and the clock:
//!
//! ```text
//! Open ──(now >= deadline)──► Expired ──(finalize)──► Finalized
//! ```
//!
//! Withdrawal does not change the status: a campaign stays `Finalized`
//! forever, and whether its escrow was released is tracked by the custodian.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Amount in the smallest unit of the base currency (18 decimals).
pub type Amount = i128;

/// Sequential campaign identifier, starting at 0.
pub type CampaignId = u64;

/// Opaque caller identity used for authorization checks.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Principal {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Lifecycle status of a campaign at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Accepting donations.
    Open,
    /// Deadline reached; awaiting finalization. Donations are rejected.
    Expired,
    /// Closed for good; the creator may withdraw.
    Finalized,
}

/// Immutable campaign configuration, written once at creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignConfig {
    pub id: CampaignId,
    pub title: String,
    pub goal: Amount,
    pub deadline: u64,
    pub creator: Principal,
}

/// Mutable campaign state, updated on donations and finalization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignState {
    pub total_raised: Amount,
    pub finalized: bool,
}

/// Full representation of a funding campaign.
///
/// Used as the public read type; reconstructed from the split
/// `CampaignConfig` + `CampaignState` records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    /// Unique identifier (auto-incremented, never reused).
    pub id: CampaignId,
    /// Human readable title; never empty.
    pub title: String,
    /// Principal that created the campaign and may withdraw its funds.
    pub creator: Principal,
    /// Target amount. Informational only: finalization does not require it.
    pub goal: Amount,
    /// Unix timestamp (seconds) at which donations close.
    pub deadline: u64,
    /// Sum of all accepted donations.
    pub total_raised: Amount,
    /// One-way flag set by finalization.
    pub finalized: bool,
    /// Distinguishes a stored record from "never created"; id 0 is valid.
    pub exists: bool,
}

impl Campaign {
    pub(crate) fn from_parts(config: &CampaignConfig, state: &CampaignState) -> Self {
        Self {
            id: config.id,
            title: config.title.clone(),
            creator: config.creator.clone(),
            goal: config.goal,
            deadline: config.deadline,
            total_raised: state.total_raised,
            finalized: state.finalized,
            exists: true,
        }
    }

    /// Status of this campaign as observed at `now`.
    pub fn status_at(&self, now: u64) -> CampaignStatus {
        if self.finalized {
            CampaignStatus::Finalized
        } else if now >= self.deadline {
            CampaignStatus::Expired
        } else {
            CampaignStatus::Open
        }
    }

    /// True iff the campaign still accepts donations at `now`.
    pub fn is_active_at(&self, now: u64) -> bool {
        self.status_at(now) == CampaignStatus::Open
    }

    /// True once `total_raised` has reached `goal`.
    pub fn goal_reached(&self) -> bool {
        self.total_raised >= self.goal
    }
}
