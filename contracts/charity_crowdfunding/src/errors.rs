//! Error taxonomy of the crowdfunding engine.
//!
//! Every failure is a rejected operation: state is left untouched and the
//! error is surfaced verbatim to the caller. Codes are stable and safe to
//! expose to external clients.

use thiserror::Error;

use crate::types::{Amount, CampaignId, Principal};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    // Creation-time validation
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("goal must be greater than 0")]
    InvalidGoal,
    #[error("deadline must be in the future")]
    PastDeadline,

    #[error("campaign {0} does not exist")]
    NotFound(CampaignId),
    #[error("amount must be greater than 0")]
    InvalidAmount,

    // Lifecycle conflicts
    #[error("campaign has been finalized")]
    AlreadyFinalized,
    #[error("campaign deadline has passed")]
    DeadlinePassed,
    #[error("campaign deadline has not passed")]
    DeadlineNotPassed,
    #[error("only the creator can withdraw")]
    NotCreator,
    #[error("campaign not finalized yet")]
    NotFinalized,
    #[error("funds already withdrawn")]
    AlreadyWithdrawn,

    // Reward issuer misuse
    #[error("only the reward issuer can credit")]
    Unauthorized,
    #[error("reward issuer already bound")]
    AlreadyBound,

    // Custody and value rail
    #[error("nothing to release for campaign {0}")]
    NothingToRelease(CampaignId),
    #[error("insufficient funds: {principal} holds {available}, needs {requested}")]
    InsufficientFunds {
        principal: Principal,
        available: Amount,
        requested: Amount,
    },
    #[error("amount overflow")]
    AmountOverflow,
}

impl Error {
    /// Stable numeric code for this error kind.
    pub fn code(&self) -> u32 {
        match self {
            Error::EmptyTitle => 1,
            Error::InvalidGoal => 2,
            Error::PastDeadline => 3,
            Error::NotFound(_) => 4,
            Error::InvalidAmount => 5,
            Error::AlreadyFinalized => 6,
            Error::DeadlinePassed => 7,
            Error::DeadlineNotPassed => 8,
            Error::NotCreator => 9,
            Error::NotFinalized => 10,
            Error::AlreadyWithdrawn => 11,
            Error::Unauthorized => 12,
            Error::AlreadyBound => 13,
            Error::NothingToRelease(_) => 14,
            Error::InsufficientFunds { .. } => 15,
            Error::AmountOverflow => 16,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
