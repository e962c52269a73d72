//! CharityToken (CTK) reward ledger.
//!
//! A fungible credit ledger with a single issuer. The issuer is bound once
//! and can never change; only the issuer may credit, and nothing in this
//! crate ever decreases a balance.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Error, Result};
use crate::types::{Amount, Principal};

pub const NAME: &str = "CharityToken";
pub const SYMBOL: &str = "CTK";
pub const DECIMALS: u8 = 18;

/// Reward units credited per unit of donated value, at equal precision.
/// One whole base-currency unit (1e18) earns 100 CTK (100e18).
pub const REWARD_RATE: Amount = 100;

/// Reward owed for a donation of `amount`.
pub fn reward_for(amount: Amount) -> Result<Amount> {
    amount.checked_mul(REWARD_RATE).ok_or(Error::AmountOverflow)
}

/// Token metadata for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Amount,
}

#[derive(Debug, Default)]
pub struct RewardLedger {
    issuer: Option<Principal>,
    balances: HashMap<Principal, Amount>,
    total_supply: Amount,
}

impl RewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the only principal allowed to credit. Callable once.
    pub fn bind_issuer(&mut self, issuer: Principal) -> Result<()> {
        if self.issuer.is_some() {
            return Err(Error::AlreadyBound);
        }
        debug!(%issuer, "reward issuer bound");
        self.issuer = Some(issuer);
        Ok(())
    }

    pub fn issuer(&self) -> Option<&Principal> {
        self.issuer.as_ref()
    }

    /// Validate that `credit(caller, to, amount)` would succeed.
    pub fn check_credit(&self, caller: &Principal, to: &Principal, amount: Amount) -> Result<()> {
        self.next_balances(caller, to, amount).map(|_| ())
    }

    /// Increase `to`'s balance by `amount`; returns the new balance.
    pub fn credit(&mut self, caller: &Principal, to: &Principal, amount: Amount) -> Result<Amount> {
        let (balance, supply) = self.next_balances(caller, to, amount)?;
        self.balances.insert(to.clone(), balance);
        self.total_supply = supply;
        Ok(balance)
    }

    pub fn balance_of(&self, who: &Principal) -> Amount {
        self.balances.get(who).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn info(&self) -> TokenInfo {
        TokenInfo {
            name: NAME.to_string(),
            symbol: SYMBOL.to_string(),
            decimals: DECIMALS,
            total_supply: self.total_supply,
        }
    }

    fn next_balances(
        &self,
        caller: &Principal,
        to: &Principal,
        amount: Amount,
    ) -> Result<(Amount, Amount)> {
        if self.issuer.as_ref() != Some(caller) {
            return Err(Error::Unauthorized);
        }
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(Error::AmountOverflow)?;
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(Error::AmountOverflow)?;
        Ok((balance, supply))
    }
}
