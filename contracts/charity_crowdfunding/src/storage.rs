//! # Storage
//!
//! [`CampaignStore`] owns every campaign and contribution record.
//!
//! ## Layout
//!
//! | Field           | Type                                 | Description                          |
//! |-----------------|--------------------------------------|--------------------------------------|
//! | `configs`       | `Vec<CampaignConfig>`                | Immutable config, index = id         |
//! | `states`        | `Vec<CampaignState>`                 | Mutable state, index = id            |
//! | `contributions` | `HashMap<(CampaignId, Principal), _>`| Cumulative amount per donor          |
//!
//! Ids are arena indices: the next id is always `configs.len()`, so ids are
//! sequential from 0 and never reused. Records are never deleted.
//!
//! The store is a pure data-integrity layer. It rejects non-positive amounts
//! and arithmetic overflow, but all authorization and lifecycle checks belong
//! to the caller.

use std::collections::HashMap;

use crate::errors::{Error, Result};
use crate::types::{Amount, Campaign, CampaignConfig, CampaignId, CampaignState, Principal};

/// Fields supplied when inserting a new campaign; the store assigns the id.
#[derive(Clone, Debug)]
pub struct NewCampaign {
    pub title: String,
    pub goal: Amount,
    pub deadline: u64,
    pub creator: Principal,
}

#[derive(Debug, Default)]
pub struct CampaignStore {
    configs: Vec<CampaignConfig>,
    states: Vec<CampaignState>,
    contributions: HashMap<(CampaignId, Principal), Amount>,
}

impl CampaignStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new record and return its id.
    pub fn insert(&mut self, record: NewCampaign) -> CampaignId {
        let id = self.configs.len() as CampaignId;
        self.configs.push(CampaignConfig {
            id,
            title: record.title,
            goal: record.goal,
            deadline: record.deadline,
            creator: record.creator,
        });
        self.states.push(CampaignState::default());
        id
    }

    /// Load the full campaign by combining config and state.
    pub fn get(&self, id: CampaignId) -> Option<Campaign> {
        let idx = usize::try_from(id).ok()?;
        let config = self.configs.get(idx)?;
        let state = self.states.get(idx)?;
        Some(Campaign::from_parts(config, state))
    }

    pub fn count(&self) -> u64 {
        self.configs.len() as u64
    }

    /// All campaigns in id order.
    pub fn all(&self) -> Vec<Campaign> {
        self.configs
            .iter()
            .zip(&self.states)
            .map(|(config, state)| Campaign::from_parts(config, state))
            .collect()
    }

    /// Validate that `add_contribution(id, who, amount)` would succeed,
    /// without touching any record.
    pub fn check_contribution(
        &self,
        id: CampaignId,
        who: &Principal,
        amount: Amount,
    ) -> Result<()> {
        self.next_totals(id, who, amount).map(|_| ())
    }

    /// Add `amount` to the campaign total and to the donor's slot.
    pub fn add_contribution(
        &mut self,
        id: CampaignId,
        who: &Principal,
        amount: Amount,
    ) -> Result<Amount> {
        let (total, slot) = self.next_totals(id, who, amount)?;
        // next_totals proved the index exists.
        if let Some(state) = self.states.get_mut(id as usize) {
            state.total_raised = total;
        }
        self.contributions.insert((id, who.clone()), slot);
        Ok(total)
    }

    /// Set `finalized = true`. Guarding against repeated finalization is the
    /// caller's job.
    pub fn mark_finalized(&mut self, id: CampaignId) -> Result<()> {
        let state = usize::try_from(id)
            .ok()
            .and_then(|idx| self.states.get_mut(idx))
            .ok_or(Error::NotFound(id))?;
        state.finalized = true;
        Ok(())
    }

    /// Cumulative amount `who` gave to campaign `id`; 0 when none.
    pub fn contribution_of(&self, id: CampaignId, who: &Principal) -> Amount {
        self.contributions
            .get(&(id, who.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn next_totals(
        &self,
        id: CampaignId,
        who: &Principal,
        amount: Amount,
    ) -> Result<(Amount, Amount)> {
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        let state = usize::try_from(id)
            .ok()
            .and_then(|idx| self.states.get(idx))
            .ok_or(Error::NotFound(id))?;
        let total = state
            .total_raised
            .checked_add(amount)
            .ok_or(Error::AmountOverflow)?;
        let slot = self
            .contribution_of(id, who)
            .checked_add(amount)
            .ok_or(Error::AmountOverflow)?;
        Ok((total, slot))
    }
}
