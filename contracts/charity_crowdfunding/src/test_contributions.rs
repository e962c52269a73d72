use std::sync::Arc;

use crate::invariants::{assert_donation_invariant, assert_monotonic};
use crate::{
    Amount, CharityCrowdfunding, InMemoryValueLedger, ManualClock, Principal, RewardLedger,
    ValueLedger,
};

const ONE: Amount = 1_000_000_000_000_000_000;
const HALF: Amount = ONE / 2;
const START: u64 = 1_700_000_000;
const DAY: u64 = 86_400;

type Engine = CharityCrowdfunding<InMemoryValueLedger, Arc<ManualClock>>;

fn setup() -> (Engine, InMemoryValueLedger, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(START));
    let rail = InMemoryValueLedger::new();
    let engine = CharityCrowdfunding::new(
        Principal::new("charity-crowdfunding"),
        RewardLedger::new(),
        rail.clone(),
        Arc::clone(&clock),
    )
    .unwrap();
    (engine, rail, clock)
}

fn donor(rail: &InMemoryValueLedger, name: &str) -> Principal {
    let who = Principal::new(name);
    rail.mint(&who, 100 * ONE).unwrap();
    who
}

#[test]
fn test_donations_from_multiple_donors() {
    let (engine, rail, _) = setup();
    let donor1 = donor(&rail, "donor1");
    let donor2 = donor(&rail, "donor2");
    let id = engine
        .create_campaign(&Principal::new("owner"), "Whales", ONE, START + DAY)
        .unwrap();

    engine.donate(&donor1, id, HALF).unwrap();
    engine.donate(&donor2, id, HALF).unwrap();

    assert_eq!(engine.get_campaign(id).unwrap().total_raised, ONE);
    assert_eq!(engine.get_donation(id, &donor1), HALF);
    assert_eq!(engine.get_donation(id, &donor2), HALF);
    assert_eq!(engine.reward_balance_of(&donor1), 50 * ONE);
    assert_eq!(engine.reward_balance_of(&donor2), 50 * ONE);
}

#[test]
fn test_total_equals_sum_of_accepted_donations() {
    let (engine, rail, clock) = setup();
    let donors: Vec<Principal> = (0..4).map(|i| donor(&rail, &format!("donor{i}"))).collect();
    let id = engine
        .create_campaign(&Principal::new("owner"), "Whales", 10 * ONE, START + DAY)
        .unwrap();

    let amounts: [Amount; 7] = [ONE, 3, HALF, 0, ONE / 3, -7, 2 * ONE];
    let mut accepted: Amount = 0;
    let mut per_donor: Vec<Amount> = vec![0; donors.len()];

    for (i, &amount) in amounts.iter().enumerate() {
        let who = i % donors.len();
        let before = engine.get_campaign(id).unwrap().total_raised;
        let slot_before = engine.get_donation(id, &donors[who]);
        let reward_before = engine.reward_balance_of(&donors[who]);

        if engine.donate(&donors[who], id, amount).is_ok() {
            accepted += amount;
            per_donor[who] += amount;
            let after = engine.get_campaign(id).unwrap().total_raised;
            assert_donation_invariant(before, after, amount);
            assert_eq!(
                engine.reward_balance_of(&donors[who]) - reward_before,
                amount * 100
            );
        }
        assert_monotonic("contribution", slot_before, engine.get_donation(id, &donors[who]));
        assert_monotonic("reward", reward_before, engine.reward_balance_of(&donors[who]));
    }

    // One more donation right at the deadline is rejected and changes nothing.
    clock.set(START + DAY);
    assert!(engine.donate(&donors[0], id, ONE).is_err());

    let campaign = engine.get_campaign(id).unwrap();
    assert_eq!(campaign.total_raised, accepted);
    assert_eq!(engine.custody_balance(id), accepted);
    assert_eq!(rail.balance(engine.contract()), accepted);
    for (i, who) in donors.iter().enumerate() {
        assert_eq!(engine.get_donation(id, who), per_donor[i]);
    }
}

#[test]
fn test_contribution_slots_are_per_campaign() {
    let (engine, rail, _) = setup();
    let donor1 = donor(&rail, "donor1");
    let owner = Principal::new("owner");
    let a = engine.create_campaign(&owner, "A", ONE, START + DAY).unwrap();
    let b = engine.create_campaign(&owner, "B", ONE, START + DAY).unwrap();

    engine.donate(&donor1, a, ONE).unwrap();
    engine.donate(&donor1, b, HALF).unwrap();

    assert_eq!(engine.get_donation(a, &donor1), ONE);
    assert_eq!(engine.get_donation(b, &donor1), HALF);
    // Rewards are global to the donor, not per campaign.
    assert_eq!(engine.reward_balance_of(&donor1), 150 * ONE);
}

#[test]
fn test_creator_may_donate_to_own_campaign() {
    let (engine, rail, clock) = setup();
    let owner = donor(&rail, "owner");
    let id = engine
        .create_campaign(&owner, "Self funded", ONE, START + DAY)
        .unwrap();

    engine.donate(&owner, id, ONE).unwrap();
    assert_eq!(engine.reward_balance_of(&owner), 100 * ONE);

    clock.advance(DAY);
    engine.finalize_campaign(&owner, id).unwrap();
    engine.withdraw_funds(&owner, id).unwrap();
    assert_eq!(rail.balance(&owner), 100 * ONE);
}

#[test]
fn test_unknown_donor_has_zero_slot() {
    let (engine, _, _) = setup();
    let id = engine
        .create_campaign(&Principal::new("owner"), "Whales", ONE, START + DAY)
        .unwrap();
    assert_eq!(engine.get_donation(id, &Principal::new("stranger")), 0);
    assert_eq!(engine.reward_balance_of(&Principal::new("stranger")), 0);
}
