//! # Charity Crowdfunding Engine
//!
//! Anyone may open a campaign with a goal and a deadline, anyone may donate
//! until the deadline, and once it has passed the creator withdraws the
//! escrowed funds exactly once. Every donor is credited 100 CTK per unit of
//! value donated in the companion [`reward`] ledger.
//!
//! | Phase        | Entry Point(s)                                            |
//! |--------------|-----------------------------------------------------------|
//! | Bootstrap    | [`CharityCrowdfunding::new`]                              |
//! | Registration | [`CharityCrowdfunding::create_campaign`]                  |
//! | Funding      | [`CharityCrowdfunding::donate`]                           |
//! | Closing      | [`CharityCrowdfunding::finalize_campaign`]                |
//! | Payout       | [`CharityCrowdfunding::withdraw_funds`]                   |
//! | Queries      | `get_campaign`, `get_donation`, `is_active`, `campaign_count`, `reward_balance_of`, `events_from` |
//!
//! ## Architecture
//!
//! Records live in [`storage`], escrow in [`custody`], reward balances in
//! [`reward`]. This file holds the entry points and event emission only.
//!
//! All state sits behind one mutex, so operations are applied in a single
//! total order. Each operation reads the clock once, validates everything it
//! is going to touch, and only then commits; the value-rail transfer is the
//! first commit step and the only one that can still fail, so a rejected
//! operation leaves no trace.
//!
//! Finalization is permissionless once the deadline has passed. Withdrawal is
//! restricted to the creator. The goal is never a precondition for either.

use parking_lot::Mutex;
use tracing::{debug, info};

pub mod clock;
pub mod custody;
pub mod errors;
pub mod events;
pub mod reward;
pub mod storage;
pub mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_contributions;
#[cfg(test)]
mod test_events;

pub use clock::{Clock, ManualClock, SystemClock};
pub use custody::{FundCustodian, InMemoryValueLedger, TransferRequest, ValueLedger};
pub use errors::{Error, Result};
pub use events::{
    CampaignCreated, CampaignFinalized, ContractEvent, DonationReceived, FundsWithdrawn,
    JournalEntry, RewardCredited,
};
pub use reward::{RewardLedger, TokenInfo, REWARD_RATE};
pub use types::{Amount, Campaign, CampaignId, CampaignStatus, Principal};

use events::EventJournal;
use storage::{CampaignStore, NewCampaign};

struct Inner {
    store: CampaignStore,
    custodian: FundCustodian,
    rewards: RewardLedger,
    journal: EventJournal,
}

pub struct CharityCrowdfunding<L, C> {
    contract: Principal,
    ledger: L,
    clock: C,
    inner: Mutex<Inner>,
}

impl<L: ValueLedger, C: Clock> CharityCrowdfunding<L, C> {
    // ─────────────────────────────────────────────────────────
    // Bootstrap
    // ─────────────────────────────────────────────────────────

    /// Build the engine and bind `contract` as the reward issuer.
    ///
    /// `contract` doubles as the custody account on `ledger`. Fails with
    /// `AlreadyBound` if `rewards` already has an issuer.
    pub fn new(
        contract: Principal,
        mut rewards: RewardLedger,
        ledger: L,
        clock: C,
    ) -> Result<Self> {
        rewards.bind_issuer(contract.clone())?;
        info!(%contract, "crowdfunding engine initialised");
        Ok(Self {
            inner: Mutex::new(Inner {
                store: CampaignStore::new(),
                custodian: FundCustodian::new(contract.clone()),
                rewards,
                journal: EventJournal::new(),
            }),
            contract,
            ledger,
            clock,
        })
    }

    // ─────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────

    /// Open a new campaign owned by `caller`. Returns its id.
    pub fn create_campaign(
        &self,
        caller: &Principal,
        title: impl Into<String>,
        goal: Amount,
        deadline: u64,
    ) -> Result<CampaignId> {
        let title = title.into();
        let mut inner = self.inner.lock();
        let now = self.clock.now();

        if title.is_empty() {
            return Err(rejected("create", Error::EmptyTitle));
        }
        if goal <= 0 {
            return Err(rejected("create", Error::InvalidGoal));
        }
        if deadline <= now {
            return Err(rejected("create", Error::PastDeadline));
        }
        // Escrow is paid out of the engine's own account; it cannot also be
        // the payee.
        if *caller == self.contract {
            return Err(rejected("create", Error::Unauthorized));
        }

        let id = inner.store.insert(NewCampaign {
            title: title.clone(),
            goal,
            deadline,
            creator: caller.clone(),
        });

        inner.journal.record(
            now,
            vec![ContractEvent::CampaignCreated(CampaignCreated {
                campaign_id: id,
                title,
                creator: caller.clone(),
                goal,
                deadline,
            })],
        );
        info!(campaign_id = id, creator = %caller, goal, deadline, "campaign created");
        Ok(id)
    }

    /// Donate `amount` from `caller` to a campaign that is still open.
    ///
    /// Moves the value into escrow, adds it to the campaign total and the
    /// donor's slot, and credits `amount * REWARD_RATE` CTK to the donor.
    pub fn donate(
        &self,
        caller: &Principal,
        campaign_id: CampaignId,
        amount: Amount,
    ) -> Result<DonationReceived> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let now = self.clock.now();

        let campaign = inner
            .store
            .get(campaign_id)
            .ok_or_else(|| rejected("donate", Error::NotFound(campaign_id)))?;
        if amount <= 0 {
            return Err(rejected("donate", Error::InvalidAmount));
        }
        if campaign.finalized {
            return Err(rejected("donate", Error::AlreadyFinalized));
        }
        if now >= campaign.deadline {
            return Err(rejected("donate", Error::DeadlinePassed));
        }
        if *caller == self.contract {
            return Err(rejected("donate", Error::Unauthorized));
        }

        // Pre-flight: nothing below the transfer may fail.
        let reward = reward::reward_for(amount).map_err(|e| rejected("donate", e))?;
        inner
            .store
            .check_contribution(campaign_id, caller, amount)
            .and_then(|_| inner.custodian.check_deposit(campaign_id, amount))
            .and_then(|_| inner.rewards.check_credit(&self.contract, caller, reward))
            .map_err(|e| rejected("donate", e))?;

        inner
            .custodian
            .deposit(&self.ledger, caller, campaign_id, amount)
            .map_err(|e| rejected("donate", e))?;
        let total_raised = inner.store.add_contribution(campaign_id, caller, amount)?;
        let balance = inner.rewards.credit(&self.contract, caller, reward)?;

        let received = DonationReceived {
            campaign_id,
            donor: caller.clone(),
            amount,
            reward_credited: reward,
        };
        inner.journal.record(
            now,
            vec![
                ContractEvent::RewardCredited(RewardCredited {
                    principal: caller.clone(),
                    amount: reward,
                    balance,
                }),
                ContractEvent::DonationReceived(received.clone()),
            ],
        );
        info!(campaign_id, donor = %caller, amount, reward, total_raised, "donation received");
        Ok(received)
    }

    /// Close a campaign whose deadline has passed. Anyone may call this.
    pub fn finalize_campaign(&self, caller: &Principal, campaign_id: CampaignId) -> Result<()> {
        let mut inner = self.inner.lock();
        let now = self.clock.now();

        let campaign = inner
            .store
            .get(campaign_id)
            .ok_or_else(|| rejected("finalize", Error::NotFound(campaign_id)))?;
        if now < campaign.deadline {
            return Err(rejected("finalize", Error::DeadlineNotPassed));
        }
        if campaign.finalized {
            return Err(rejected("finalize", Error::AlreadyFinalized));
        }

        inner.store.mark_finalized(campaign_id)?;
        inner.journal.record(
            now,
            vec![ContractEvent::CampaignFinalized(CampaignFinalized { campaign_id })],
        );
        info!(
            campaign_id,
            by = %caller,
            total_raised = campaign.total_raised,
            goal_reached = campaign.goal_reached(),
            "campaign finalized"
        );
        Ok(())
    }

    /// Pay the campaign's escrow to its creator. Succeeds at most once.
    pub fn withdraw_funds(&self, caller: &Principal, campaign_id: CampaignId) -> Result<Amount> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let now = self.clock.now();

        let campaign = inner
            .store
            .get(campaign_id)
            .ok_or_else(|| rejected("withdraw", Error::NotFound(campaign_id)))?;
        if *caller != campaign.creator {
            return Err(rejected("withdraw", Error::NotCreator));
        }
        if !campaign.finalized {
            return Err(rejected("withdraw", Error::NotFinalized));
        }
        if campaign.total_raised > 0 && inner.custodian.balance_of(campaign_id) == 0 {
            return Err(rejected("withdraw", Error::AlreadyWithdrawn));
        }

        let amount = inner
            .custodian
            .release(&self.ledger, campaign_id, caller)
            .map_err(|e| rejected("withdraw", e))?;

        inner.journal.record(
            now,
            vec![ContractEvent::FundsWithdrawn(FundsWithdrawn {
                campaign_id,
                creator: caller.clone(),
                amount,
            })],
        );
        info!(campaign_id, creator = %caller, amount, "funds withdrawn");
        Ok(amount)
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    /// True iff the campaign exists, is not finalized and its deadline is
    /// still ahead. Unknown ids are simply inactive.
    pub fn is_active(&self, campaign_id: CampaignId) -> bool {
        let inner = self.inner.lock();
        let now = self.clock.now();
        inner
            .store
            .get(campaign_id)
            .map(|c| c.is_active_at(now))
            .unwrap_or(false)
    }

    pub fn get_campaign(&self, campaign_id: CampaignId) -> Result<Campaign> {
        self.inner
            .lock()
            .store
            .get(campaign_id)
            .ok_or(Error::NotFound(campaign_id))
    }

    pub fn campaign_status(&self, campaign_id: CampaignId) -> Result<CampaignStatus> {
        let inner = self.inner.lock();
        let now = self.clock.now();
        inner
            .store
            .get(campaign_id)
            .map(|c| c.status_at(now))
            .ok_or(Error::NotFound(campaign_id))
    }

    /// All campaigns, in id order.
    pub fn campaigns(&self) -> Vec<Campaign> {
        self.inner.lock().store.all()
    }

    /// Cumulative amount `who` donated to the campaign; 0 if none.
    pub fn get_donation(&self, campaign_id: CampaignId, who: &Principal) -> Amount {
        self.inner.lock().store.contribution_of(campaign_id, who)
    }

    pub fn campaign_count(&self) -> u64 {
        self.inner.lock().store.count()
    }

    pub fn custody_balance(&self, campaign_id: CampaignId) -> Amount {
        self.inner.lock().custodian.balance_of(campaign_id)
    }

    pub fn reward_balance_of(&self, who: &Principal) -> Amount {
        self.inner.lock().rewards.balance_of(who)
    }

    pub fn reward_token(&self) -> TokenInfo {
        self.inner.lock().rewards.info()
    }

    /// Balance of `who` on the value rail.
    pub fn value_balance_of(&self, who: &Principal) -> Amount {
        self.ledger.balance(who)
    }

    /// Up to `limit` journal entries starting at sequence number `start`.
    pub fn events_from(&self, start: u64, limit: usize) -> Vec<JournalEntry> {
        self.inner.lock().journal.from(start, limit)
    }

    pub fn event_count(&self) -> u64 {
        self.inner.lock().journal.len()
    }

    /// Principal of the engine itself: reward issuer and custody account.
    pub fn contract(&self) -> &Principal {
        &self.contract
    }
}

fn rejected(op: &'static str, err: Error) -> Error {
    debug!(op, code = err.code(), "operation rejected: {err}");
    err
}
