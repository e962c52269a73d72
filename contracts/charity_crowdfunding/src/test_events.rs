use std::sync::Arc;

use crate::{
    Amount, CampaignCreated, CampaignFinalized, CharityCrowdfunding, ContractEvent,
    DonationReceived, FundsWithdrawn, InMemoryValueLedger, ManualClock, Principal, RewardCredited,
    RewardLedger,
};

const ONE: Amount = 1_000_000_000_000_000_000;
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

fn last_event(engine: &Engine) -> crate::JournalEntry {
    let count = engine.event_count();
    assert!(count > 0, "No events found");
    engine.events_from(count - 1, 1).remove(0)
}

#[test]
fn test_campaign_created_event() {
    let (engine, _, _) = setup();
    let creator = Principal::new("creator");

    let id = engine
        .create_campaign(&creator, "Save Blue Whales", ONE, START + DAY)
        .unwrap();

    let entry = last_event(&engine);
    assert_eq!(entry.event.topic(), "created");
    assert_eq!(entry.timestamp, START);
    assert_eq!(
        entry.event,
        ContractEvent::CampaignCreated(CampaignCreated {
            campaign_id: id,
            title: "Save Blue Whales".into(),
            creator,
            goal: ONE,
            deadline: START + DAY,
        })
    );
}

#[test]
fn test_donation_emits_credit_then_donation() {
    let (engine, rail, _) = setup();
    let donor = Principal::new("donor1");
    rail.mint(&donor, ONE).unwrap();
    let id = engine
        .create_campaign(&Principal::new("creator"), "Whales", ONE, START + DAY)
        .unwrap();

    engine.donate(&donor, id, ONE).unwrap();

    let entries = engine.events_from(1, 10);
    assert_eq!(entries.len(), 2);
    // Both events belong to the same operation.
    assert_eq!(entries[0].op_id, entries[1].op_id);
    assert_eq!(
        entries[0].event,
        ContractEvent::RewardCredited(RewardCredited {
            principal: donor.clone(),
            amount: 100 * ONE,
            balance: 100 * ONE,
        })
    );
    assert_eq!(
        entries[1].event,
        ContractEvent::DonationReceived(DonationReceived {
            campaign_id: id,
            donor,
            amount: ONE,
            reward_credited: 100 * ONE,
        })
    );
}

#[test]
fn test_finalized_event() {
    let (engine, _, clock) = setup();
    let id = engine
        .create_campaign(&Principal::new("creator"), "Whales", ONE, START + DAY)
        .unwrap();

    clock.set(START + DAY + 1);
    engine
        .finalize_campaign(&Principal::new("anyone"), id)
        .unwrap();

    let entry = last_event(&engine);
    assert_eq!(entry.timestamp, START + DAY + 1);
    assert_eq!(
        entry.event,
        ContractEvent::CampaignFinalized(CampaignFinalized { campaign_id: id })
    );
}

#[test]
fn test_funds_withdrawn_event() {
    let (engine, rail, clock) = setup();
    let creator = Principal::new("creator");
    let donor = Principal::new("donor1");
    rail.mint(&donor, ONE).unwrap();
    let id = engine
        .create_campaign(&creator, "Whales", ONE, START + DAY)
        .unwrap();
    engine.donate(&donor, id, ONE).unwrap();

    clock.set(START + DAY + 1);
    engine.finalize_campaign(&creator, id).unwrap();
    engine.withdraw_funds(&creator, id).unwrap();

    let entry = last_event(&engine);
    assert_eq!(entry.event.topic(), "withdrawn");
    assert_eq!(
        entry.event,
        ContractEvent::FundsWithdrawn(FundsWithdrawn {
            campaign_id: id,
            creator,
            amount: ONE,
        })
    );
}

#[test]
fn test_rejected_operations_emit_nothing() {
    let (engine, rail, clock) = setup();
    let creator = Principal::new("creator");
    let donor = Principal::new("donor1");
    rail.mint(&donor, ONE).unwrap();
    let id = engine
        .create_campaign(&creator, "Whales", ONE, START + DAY)
        .unwrap();
    let before = engine.event_count();

    let _ = engine.create_campaign(&creator, "", ONE, START + DAY);
    let _ = engine.donate(&donor, id, 0);
    let _ = engine.finalize_campaign(&creator, id);
    let _ = engine.withdraw_funds(&creator, id);
    clock.set(START + DAY);
    let _ = engine.donate(&donor, id, ONE);

    assert_eq!(engine.event_count(), before);
}

#[test]
fn test_journal_is_an_audit_trail_of_donations() {
    let (engine, rail, _) = setup();
    let donor = Principal::new("donor1");
    rail.mint(&donor, 3 * ONE).unwrap();
    let id = engine
        .create_campaign(&Principal::new("creator"), "Whales", 3 * ONE, START + DAY)
        .unwrap();

    for amount in [ONE / 4, ONE / 2, ONE] {
        engine.donate(&donor, id, amount).unwrap();
    }

    // The contribution slot only keeps the sum ...
    assert_eq!(engine.get_donation(id, &donor), ONE / 4 + ONE / 2 + ONE);

    // ... the journal keeps every individual donation.
    let donations: Vec<Amount> = engine
        .events_from(0, 100)
        .into_iter()
        .filter_map(|e| match e.event {
            ContractEvent::DonationReceived(d) => Some(d.amount),
            _ => None,
        })
        .collect();
    assert_eq!(donations, vec![ONE / 4, ONE / 2, ONE]);
}
