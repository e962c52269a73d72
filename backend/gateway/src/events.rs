//! Event rows indexed from the crowdfunding engine journal.
//!
//! These flatten `charity_crowdfunding::ContractEvent` into a fixed set of
//! columns; the full event is kept as JSON in `payload`.

use charity_crowdfunding::{ContractEvent, JournalEntry};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// All event kinds emitted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A new campaign was opened (`created` topic).
    CampaignCreated,
    /// A donation was accepted (`donated` topic).
    DonationReceived,
    /// A campaign was closed (`finalized` topic).
    CampaignFinalized,
    /// Escrow was paid to the creator (`withdrawn` topic).
    FundsWithdrawn,
    /// CTK was credited to a donor (`credited` topic).
    RewardCredited,
}

impl EventKind {
    /// Parse a journal topic symbol into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Option<Self> {
        match topic {
            "created" => Some(Self::CampaignCreated),
            "donated" => Some(Self::DonationReceived),
            "finalized" => Some(Self::CampaignFinalized),
            "withdrawn" => Some(Self::FundsWithdrawn),
            "credited" => Some(Self::RewardCredited),
            _ => None,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CampaignCreated => "campaign_created",
            Self::DonationReceived => "donation_received",
            Self::CampaignFinalized => "campaign_finalized",
            Self::FundsWithdrawn => "funds_withdrawn",
            Self::RewardCredited => "reward_credited",
        }
    }

    pub fn of(event: &ContractEvent) -> Self {
        match event {
            ContractEvent::CampaignCreated(_) => Self::CampaignCreated,
            ContractEvent::DonationReceived(_) => Self::DonationReceived,
            ContractEvent::CampaignFinalized(_) => Self::CampaignFinalized,
            ContractEvent::FundsWithdrawn(_) => Self::FundsWithdrawn,
            ContractEvent::RewardCredited(_) => Self::RewardCredited,
        }
    }
}

/// A decoded journal entry, ready to be stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedEvent {
    pub seq: i64,
    pub op_id: i64,
    pub event_type: String,
    pub campaign_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub reward: Option<String>,
    pub timestamp: i64,
    pub payload: String,
}

impl IndexedEvent {
    pub fn from_entry(entry: &JournalEntry) -> Result<Self> {
        let (actor, amount, reward) = match &entry.event {
            ContractEvent::CampaignCreated(e) => {
                (Some(e.creator.to_string()), Some(e.goal.to_string()), None)
            }
            ContractEvent::DonationReceived(e) => (
                Some(e.donor.to_string()),
                Some(e.amount.to_string()),
                Some(e.reward_credited.to_string()),
            ),
            ContractEvent::CampaignFinalized(_) => (None, None, None),
            ContractEvent::FundsWithdrawn(e) => {
                (Some(e.creator.to_string()), Some(e.amount.to_string()), None)
            }
            ContractEvent::RewardCredited(e) => {
                (Some(e.principal.to_string()), None, Some(e.amount.to_string()))
            }
        };

        Ok(Self {
            seq: entry.seq as i64,
            op_id: entry.op_id as i64,
            event_type: EventKind::of(&entry.event).as_str().to_string(),
            campaign_id: entry.event.campaign_id().map(|id| id.to_string()),
            actor,
            amount,
            reward,
            timestamp: entry.timestamp as i64,
            payload: serde_json::to_string(&entry.event)?,
        })
    }
}

/// An event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub run_id: String,
    pub seq: i64,
    pub op_id: i64,
    pub event_type: String,
    pub campaign_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub reward: Option<String>,
    pub timestamp: i64,
    pub payload: String,
    pub created_at: i64,
}
