//! # Events
//!
//! Observations published by the engine for external indexers.
//!
//! | Topic       | Payload               | Emitted by           |
//! |-------------|-----------------------|----------------------|
//! | `created`   | [`CampaignCreated`]   | `create_campaign`    |
//! | `credited`  | [`RewardCredited`]    | `donate`             |
//! | `donated`   | [`DonationReceived`]  | `donate`             |
//! | `finalized` | [`CampaignFinalized`] | `finalize_campaign`  |
//! | `withdrawn` | [`FundsWithdrawn`]    | `withdraw_funds`     |
//!
//! Events land in an append-only [`EventJournal`]. Each entry carries a
//! global sequence number and the id of the operation that produced it, so
//! a reader can page through the journal with a simple cursor and group the
//! events of one operation together.

use serde::{Deserialize, Serialize};

use crate::types::{Amount, CampaignId, Principal};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignCreated {
    pub campaign_id: CampaignId,
    pub title: String,
    pub creator: Principal,
    pub goal: Amount,
    pub deadline: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationReceived {
    pub campaign_id: CampaignId,
    pub donor: Principal,
    pub amount: Amount,
    pub reward_credited: Amount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignFinalized {
    pub campaign_id: CampaignId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundsWithdrawn {
    pub campaign_id: CampaignId,
    pub creator: Principal,
    pub amount: Amount,
}

/// Published by the reward ledger side of a donation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardCredited {
    pub principal: Principal,
    pub amount: Amount,
    pub balance: Amount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContractEvent {
    CampaignCreated(CampaignCreated),
    DonationReceived(DonationReceived),
    CampaignFinalized(CampaignFinalized),
    FundsWithdrawn(FundsWithdrawn),
    RewardCredited(RewardCredited),
}

impl ContractEvent {
    /// Short topic symbol identifying the event kind.
    pub fn topic(&self) -> &'static str {
        match self {
            Self::CampaignCreated(_) => "created",
            Self::DonationReceived(_) => "donated",
            Self::CampaignFinalized(_) => "finalized",
            Self::FundsWithdrawn(_) => "withdrawn",
            Self::RewardCredited(_) => "credited",
        }
    }

    /// Campaign the event refers to, if any.
    pub fn campaign_id(&self) -> Option<CampaignId> {
        match self {
            Self::CampaignCreated(e) => Some(e.campaign_id),
            Self::DonationReceived(e) => Some(e.campaign_id),
            Self::CampaignFinalized(e) => Some(e.campaign_id),
            Self::FundsWithdrawn(e) => Some(e.campaign_id),
            Self::RewardCredited(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Position in the journal, starting at 0.
    pub seq: u64,
    /// Operation that produced the event; shared by events of one call.
    pub op_id: u64,
    /// Clock reading of that operation (Unix seconds).
    pub timestamp: u64,
    pub event: ContractEvent,
}

#[derive(Debug, Default)]
pub struct EventJournal {
    entries: Vec<JournalEntry>,
    next_op: u64,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the events of one successful operation under a fresh op id.
    pub fn record(&mut self, timestamp: u64, events: Vec<ContractEvent>) -> u64 {
        let op_id = self.next_op;
        self.next_op += 1;
        for event in events {
            let seq = self.entries.len() as u64;
            self.entries.push(JournalEntry {
                seq,
                op_id,
                timestamp,
                event,
            });
        }
        op_id
    }

    /// Up to `limit` entries starting at sequence number `start`.
    pub fn from(&self, start: u64, limit: usize) -> Vec<JournalEntry> {
        let start = usize::try_from(start).unwrap_or(usize::MAX);
        self.entries
            .iter()
            .skip(start)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
