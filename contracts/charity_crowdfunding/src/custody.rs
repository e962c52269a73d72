//! Fund custody and the value rail it moves money over.
//!
//! [`FundCustodian`] keeps one escrow balance per campaign. Value only enters
//! escrow through [`FundCustodian::deposit`], which performs the rail transfer
//! from the donor to the custody account in the same step, and only leaves
//! through [`FundCustodian::release`], which pays out the whole balance and
//! zeroes it. A zeroed escrow can never be released again.
//!
//! The rail itself is abstracted by [`ValueLedger`] so the engine can run
//! against an in-memory ledger in tests or any real payment backend.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::types::{Amount, CampaignId, Principal};

/// A single movement of value on the rail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from: Principal,
    pub to: Principal,
    pub amount: Amount,
}

/// Payment rail. A transfer either moves the full amount or fails without
/// effect.
pub trait ValueLedger: Send + Sync {
    fn transfer(&self, request: &TransferRequest) -> Result<()>;

    fn balance(&self, who: &Principal) -> Amount;
}

/// Shared in-memory rail. Clones are handles onto the same balances.
#[derive(Clone, Debug, Default)]
pub struct InMemoryValueLedger {
    balances: Arc<Mutex<HashMap<Principal, Amount>>>,
}

impl InMemoryValueLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` out of thin air for `to`; returns the new balance.
    pub fn mint(&self, to: &Principal, amount: Amount) -> Result<Amount> {
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        let mut balances = self.balances.lock();
        let entry = balances.entry(to.clone()).or_insert(0);
        *entry = entry.checked_add(amount).ok_or(Error::AmountOverflow)?;
        Ok(*entry)
    }
}

impl ValueLedger for InMemoryValueLedger {
    fn transfer(&self, request: &TransferRequest) -> Result<()> {
        if request.amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        let mut balances = self.balances.lock();
        let available = balances.get(&request.from).copied().unwrap_or(0);
        if available < request.amount {
            return Err(Error::InsufficientFunds {
                principal: request.from.clone(),
                available,
                requested: request.amount,
            });
        }
        if request.from == request.to {
            return Ok(());
        }
        let credited = balances
            .get(&request.to)
            .copied()
            .unwrap_or(0)
            .checked_add(request.amount)
            .ok_or(Error::AmountOverflow)?;
        balances.insert(request.from.clone(), available - request.amount);
        balances.insert(request.to.clone(), credited);
        Ok(())
    }

    fn balance(&self, who: &Principal) -> Amount {
        self.balances.lock().get(who).copied().unwrap_or(0)
    }
}

/// Per-campaign escrow held in the custody account.
#[derive(Debug)]
pub struct FundCustodian {
    account: Principal,
    escrow: HashMap<CampaignId, Amount>,
}

impl FundCustodian {
    /// `account` is the rail account that physically holds escrowed value.
    pub fn new(account: Principal) -> Self {
        Self {
            account,
            escrow: HashMap::new(),
        }
    }

    pub fn account(&self) -> &Principal {
        &self.account
    }

    /// Validate that a deposit of `amount` would fit into the escrow.
    pub fn check_deposit(&self, campaign_id: CampaignId, amount: Amount) -> Result<()> {
        self.next_balance(campaign_id, amount).map(|_| ())
    }

    /// Pull `amount` from `from` into this campaign's escrow.
    ///
    /// The custody account itself cannot deposit: the transfer would not move
    /// any value.
    pub fn deposit<L: ValueLedger + ?Sized>(
        &mut self,
        rail: &L,
        from: &Principal,
        campaign_id: CampaignId,
        amount: Amount,
    ) -> Result<Amount> {
        if *from == self.account {
            return Err(Error::Unauthorized);
        }
        let balance = self.next_balance(campaign_id, amount)?;
        rail.transfer(&TransferRequest {
            from: from.clone(),
            to: self.account.clone(),
            amount,
        })?;
        self.escrow.insert(campaign_id, balance);
        Ok(balance)
    }

    /// Pay the whole escrow of `campaign_id` to `to` and zero it.
    pub fn release<L: ValueLedger + ?Sized>(
        &mut self,
        rail: &L,
        campaign_id: CampaignId,
        to: &Principal,
    ) -> Result<Amount> {
        if *to == self.account {
            return Err(Error::Unauthorized);
        }
        let amount = self.balance_of(campaign_id);
        if amount == 0 {
            return Err(Error::NothingToRelease(campaign_id));
        }
        rail.transfer(&TransferRequest {
            from: self.account.clone(),
            to: to.clone(),
            amount,
        })?;
        self.escrow.insert(campaign_id, 0);
        Ok(amount)
    }

    pub fn balance_of(&self, campaign_id: CampaignId) -> Amount {
        self.escrow.get(&campaign_id).copied().unwrap_or(0)
    }

    /// Sum of all escrow balances; equals the custody account's rail balance
    /// when nothing else pays into it.
    pub fn total_held(&self) -> Amount {
        self.escrow.values().sum()
    }

    fn next_balance(&self, campaign_id: CampaignId, amount: Amount) -> Result<Amount> {
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        self.balance_of(campaign_id)
            .checked_add(amount)
            .ok_or(Error::AmountOverflow)
    }
}
