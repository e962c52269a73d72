#![allow(dead_code)]

use crate::types::{Amount, Campaign, CampaignStatus};

/// INV-1: Campaign total must never be negative.
pub fn assert_total_non_negative(campaign: &Campaign) {
    assert!(
        campaign.total_raised >= 0,
        "INV-1 violated: campaign {} has negative total ({})",
        campaign.id,
        campaign.total_raised
    );
}

/// INV-2: Campaign goal must always be positive.
pub fn assert_goal_positive(campaign: &Campaign) {
    assert!(
        campaign.goal > 0,
        "INV-2 violated: campaign {} has non-positive goal ({})",
        campaign.id,
        campaign.goal
    );
}

/// INV-3: Title must never be empty.
pub fn assert_title_present(campaign: &Campaign) {
    assert!(
        !campaign.title.is_empty(),
        "INV-3 violated: campaign {} has an empty title",
        campaign.id
    );
}

/// INV-4: Every stored campaign carries the `exists` sentinel.
pub fn assert_exists(campaign: &Campaign) {
    assert!(
        campaign.exists,
        "INV-4 violated: campaign {} returned without exists flag",
        campaign.id
    );
}

/// INV-5: After a donation of `amount`, the total grows by exactly `amount`.
pub fn assert_donation_invariant(total_before: Amount, total_after: Amount, amount: Amount) {
    assert_eq!(
        total_after,
        total_before + amount,
        "INV-5 violated: donation invariant broken: {} + {} != {}",
        total_before,
        amount,
        total_after
    );
}

/// INV-6: Campaign ids are sequential starting from 0.
pub fn assert_sequential_ids(campaigns: &[Campaign]) {
    for (i, campaign) in campaigns.iter().enumerate() {
        assert_eq!(
            campaign.id, i as u64,
            "INV-6 violated: expected id {}, got {}",
            i, campaign.id
        );
    }
}

/// INV-7: Status only moves forward:
///   Open    -> Expired | Finalized is never skipped backwards
///   Expired -> Finalized
///   Finalized -> (none)
pub fn assert_valid_status_transition(from: CampaignStatus, to: CampaignStatus) {
    let valid = matches!(
        (from, to),
        (CampaignStatus::Open, CampaignStatus::Open)
            | (CampaignStatus::Open, CampaignStatus::Expired)
            | (CampaignStatus::Expired, CampaignStatus::Expired)
            | (CampaignStatus::Expired, CampaignStatus::Finalized)
            | (CampaignStatus::Finalized, CampaignStatus::Finalized)
    );

    assert!(
        valid,
        "INV-7 violated: invalid status transition from {:?} to {:?}",
        from, to
    );
}

/// INV-8: Fields fixed at creation never change.
pub fn assert_campaign_immutable_fields(original: &Campaign, current: &Campaign) {
    assert_eq!(original.id, current.id, "INV-8 violated: campaign id changed");
    assert_eq!(
        original.title, current.title,
        "INV-8 violated: campaign title changed"
    );
    assert_eq!(
        original.creator, current.creator,
        "INV-8 violated: campaign creator changed"
    );
    assert_eq!(
        original.goal, current.goal,
        "INV-8 violated: campaign goal changed"
    );
    assert_eq!(
        original.deadline, current.deadline,
        "INV-8 violated: campaign deadline changed"
    );
}

/// INV-9: Contribution slots and reward balances never decrease.
pub fn assert_monotonic(label: &str, before: Amount, after: Amount) {
    assert!(
        after >= before,
        "INV-9 violated: {} decreased from {} to {}",
        label,
        before,
        after
    );
}

/// INV-10: Once finalized, always finalized.
pub fn assert_finalized_is_sticky(before: &Campaign, after: &Campaign) {
    if before.finalized {
        assert!(
            after.finalized,
            "INV-10 violated: campaign {} was un-finalized",
            after.id
        );
    }
}

/// Run all stateless campaign invariants.
pub fn assert_all_campaign_invariants(campaign: &Campaign) {
    assert_total_non_negative(campaign);
    assert_goal_positive(campaign);
    assert_title_present(campaign);
    assert_exists(campaign);
}
