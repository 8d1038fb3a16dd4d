use std::str::FromStr;
use std::sync::Arc;

use gavel::notifier::ChannelNotifier;
use gavel::orchestrator::Auctioneer;
use gavel::settlement::SaleMode;
use gavel::store::{AuctionStore, MemoryStore};
use gavel::types::{AuctionError, AuctionEvent, CallerClaims, Lot, LotStatus, Team};
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

struct Room {
    auctioneer: Auctioneer,
    store: Arc<MemoryStore>,
    notifier: Arc<ChannelNotifier>,
}

async fn room(store: MemoryStore) -> Room {
    let store = Arc::new(store);
    let notifier = Arc::new(ChannelNotifier::new());
    Room {
        auctioneer: Auctioneer::new(store.clone(), notifier.clone()),
        store,
        notifier,
    }
}

async fn seed_lot(room: &Room, name: &str, base: &str) -> Lot {
    let lot = Lot::new(name, "furniture", dec(base));
    room.store.insert_lot(&lot).await.unwrap();
    lot
}

async fn seed_team(room: &Room, name: &str, budget: &str) -> Team {
    let team = Team::new(name, dec(budget));
    room.store.insert_team(&team).await.unwrap();
    team
}

// ═══════════════════════════════════════════════════════════════════════════
// END-TO-END AUCTION FLOW
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_full_auction_round() {
    let room = room(MemoryStore::new()).await;
    let lot = seed_lot(&room, "Lamp", "5.0").await;
    let team_x = seed_team(&room, "Ravens", "100").await;
    let team_y = seed_team(&room, "Owls", "100").await;

    let admin = CallerClaims::admin("ops");
    let cap_x = CallerClaims::captain("cap_x", &team_x.id);
    let cap_y = CallerClaims::captain("cap_y", &team_y.id);

    // Activation
    let live = room.auctioneer.start_auction(&admin, &lot.id).await.unwrap();
    assert_eq!(live.status, LotStatus::InAuction);

    // Opening bid lands at the base price exactly.
    let after_x = room.auctioneer.place_bid(&cap_x).await.unwrap();
    assert_eq!(after_x.bid_history.len(), 1);
    assert_eq!(after_x.bid_history[0].amount, dec("5.0"));
    assert_eq!(after_x.leading_team_id(), Some(team_x.id.as_str()));

    // The leading team may not raise itself, however fast it clicks.
    let self_raise = room.auctioneer.place_bid(&cap_x).await;
    assert!(matches!(self_raise, Err(AuctionError::Conflict(_))));

    // The rival team ratchets the price.
    let after_y = room.auctioneer.place_bid(&cap_y).await.unwrap();
    assert_eq!(after_y.bid_history.len(), 2);
    assert_eq!(after_y.bid_history[1].amount, dec("5.5"));

    // Hammer falls.
    let outcome = room
        .auctioneer
        .sell_lot(&admin, &lot.id, &team_y.id, dec("5.5"))
        .await
        .unwrap();
    assert_eq!(outcome.mode, SaleMode::Transaction);
    assert_eq!(outcome.lot.status, LotStatus::Sold);
    assert_eq!(outcome.lot.final_price, Some(dec("5.5")));
    assert_eq!(outcome.lot.owner_team_id.as_deref(), Some(team_y.id.as_str()));
    assert_eq!(outcome.team.budget, dec("94.5"));
    assert!(outcome.team.roster.contains(&lot.id));

    // The bid history survives the sale as historical record.
    assert_eq!(outcome.lot.bid_history.len(), 2);
}

#[tokio::test]
async fn test_full_round_over_saga_store() {
    let room = room(MemoryStore::without_transactions()).await;
    let lot = seed_lot(&room, "Clock", "4.75").await;
    let team = seed_team(&room, "Ravens", "20").await;

    let admin = CallerClaims::admin("ops");
    let cap = CallerClaims::captain("cap", &team.id);

    room.auctioneer.start_auction(&admin, &lot.id).await.unwrap();
    room.auctioneer.place_bid(&cap).await.unwrap();

    let outcome = room
        .auctioneer
        .sell_lot(&admin, &lot.id, &team.id, dec("4.75"))
        .await
        .unwrap();
    assert_eq!(outcome.mode, SaleMode::Saga);
    assert_eq!(outcome.team.budget, dec("15.25"));

    let persisted = room.store.lot(&lot.id).await.unwrap().unwrap();
    assert_eq!(persisted.status, LotStatus::Sold);
}

// ═══════════════════════════════════════════════════════════════════════════
// COMMAND PRECONDITIONS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_sale_never_drives_budget_negative() {
    let room = room(MemoryStore::new()).await;
    let lot = seed_lot(&room, "Lamp", "5.0").await;
    let poor = seed_team(&room, "Sparrows", "10").await;
    let admin = CallerClaims::admin("ops");

    room.auctioneer.start_auction(&admin, &lot.id).await.unwrap();

    let result = room
        .auctioneer
        .sell_lot(&admin, &lot.id, &poor.id, dec("15"))
        .await;
    assert!(matches!(
        result,
        Err(AuctionError::InsufficientFunds { .. })
    ));

    let lot_after = room.store.lot(&lot.id).await.unwrap().unwrap();
    let team_after = room.store.team(&poor.id).await.unwrap().unwrap();
    assert_eq!(lot_after.status, LotStatus::InAuction);
    assert_eq!(team_after.budget, dec("10"));
    assert!(team_after.roster.is_empty());
}

#[tokio::test]
async fn test_mark_unsold_blocked_after_first_bid() {
    let room = room(MemoryStore::new()).await;
    let lot = seed_lot(&room, "Lamp", "5.0").await;
    let team = seed_team(&room, "Ravens", "100").await;
    let admin = CallerClaims::admin("ops");
    let cap = CallerClaims::captain("cap", &team.id);

    room.auctioneer.start_auction(&admin, &lot.id).await.unwrap();

    // While no bid has landed, the lot can be walked back.
    room.auctioneer.mark_unsold(&admin, &lot.id).await.unwrap();
    room.auctioneer.start_auction(&admin, &lot.id).await.unwrap();

    // Immediately after the sole bid, it cannot.
    room.auctioneer.place_bid(&cap).await.unwrap();
    assert!(matches!(
        room.auctioneer.mark_unsold(&admin, &lot.id).await,
        Err(AuctionError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_sold_lot_cannot_be_reauctioned_or_resold() {
    let room = room(MemoryStore::new()).await;
    let lot = seed_lot(&room, "Lamp", "5.0").await;
    let team = seed_team(&room, "Ravens", "100").await;
    let admin = CallerClaims::admin("ops");

    room.auctioneer.start_auction(&admin, &lot.id).await.unwrap();
    room.auctioneer
        .sell_lot(&admin, &lot.id, &team.id, dec("5.0"))
        .await
        .unwrap();

    assert!(matches!(
        room.auctioneer.start_auction(&admin, &lot.id).await,
        Err(AuctionError::Conflict(_))
    ));
    assert!(matches!(
        room.auctioneer
            .sell_lot(&admin, &lot.id, &team.id, dec("5.0"))
            .await,
        Err(AuctionError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_admin_commands_reject_other_roles() {
    let room = room(MemoryStore::new()).await;
    let lot = seed_lot(&room, "Lamp", "5.0").await;
    let team = seed_team(&room, "Ravens", "100").await;
    let cap = CallerClaims::captain("cap", &team.id);
    let viewer = CallerClaims::viewer("guest");

    for claims in [&cap, &viewer] {
        assert!(matches!(
            room.auctioneer.start_auction(claims, &lot.id).await,
            Err(AuctionError::Authorization(_))
        ));
        assert!(matches!(
            room.auctioneer
                .sell_lot(claims, &lot.id, &team.id, dec("5.0"))
                .await,
            Err(AuctionError::Authorization(_))
        ));
        assert!(matches!(
            room.auctioneer.mark_unsold(claims, &lot.id).await,
            Err(AuctionError::Authorization(_))
        ));
    }

    // And bidding is captains-only.
    let admin = CallerClaims::admin("ops");
    room.auctioneer.start_auction(&admin, &lot.id).await.unwrap();
    assert!(matches!(
        room.auctioneer.place_bid(&admin).await,
        Err(AuctionError::Authorization(_))
    ));
}

// ═══════════════════════════════════════════════════════════════════════════
// EVENT STREAM
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_every_accepted_transition_is_broadcast() {
    let room = room(MemoryStore::new()).await;
    let lot = seed_lot(&room, "Lamp", "5.0").await;
    let team = seed_team(&room, "Ravens", "100").await;
    let admin = CallerClaims::admin("ops");
    let cap = CallerClaims::captain("cap", &team.id);

    let mut events = room.notifier.subscribe();

    room.auctioneer.start_auction(&admin, &lot.id).await.unwrap();
    room.auctioneer.place_bid(&cap).await.unwrap();
    room.auctioneer
        .sell_lot(&admin, &lot.id, &team.id, dec("5.0"))
        .await
        .unwrap();

    assert!(matches!(
        events.recv().await.unwrap(),
        AuctionEvent::LotActivated { .. }
    ));
    assert!(matches!(
        events.recv().await.unwrap(),
        AuctionEvent::BidAccepted { .. }
    ));
    match events.recv().await.unwrap() {
        AuctionEvent::LotSold { lot: sold, team: settled } => {
            assert_eq!(sold.id, lot.id);
            assert_eq!(settled.budget, dec("95.0"));
        }
        other => panic!("expected LotSold, got {other:?}"),
    }
}

#[tokio::test]
async fn test_activation_demotes_and_announces_previous_lot() {
    let room = room(MemoryStore::new()).await;
    let first = seed_lot(&room, "Lamp", "5.0").await;
    let second = seed_lot(&room, "Clock", "3.0").await;
    let admin = CallerClaims::admin("ops");

    room.auctioneer.start_auction(&admin, &first.id).await.unwrap();

    let mut events = room.notifier.subscribe();
    room.auctioneer.start_auction(&admin, &second.id).await.unwrap();

    // The demoted lot is announced before the new activation.
    match events.recv().await.unwrap() {
        AuctionEvent::LotUnsold { lot } => assert_eq!(lot.id, first.id),
        other => panic!("expected LotUnsold, got {other:?}"),
    }
    match events.recv().await.unwrap() {
        AuctionEvent::LotActivated { lot } => assert_eq!(lot.id, second.id),
        other => panic!("expected LotActivated, got {other:?}"),
    }

    let live = room.auctioneer.current_lot().await.unwrap().unwrap();
    assert_eq!(live.id, second.id);
}

#[tokio::test]
async fn test_rejections_are_unicast_not_broadcast() {
    let room = room(MemoryStore::new()).await;
    seed_lot(&room, "Lamp", "5.0").await;
    let team = seed_team(&room, "Ravens", "100").await;
    let cap = CallerClaims::captain("cap", &team.id);

    let mut events = room.notifier.subscribe();
    let mut rejections = room.notifier.register_caller("cap");

    // No lot is live, so this bid is rejected.
    room.auctioneer.place_bid(&cap).await.unwrap_err();

    match rejections.try_recv().unwrap() {
        AuctionEvent::BidRejected { reason } => assert!(reason.contains("no active lot")),
        other => panic!("expected BidRejected, got {other:?}"),
    }
    assert!(events.try_recv().is_err());
}

// ═══════════════════════════════════════════════════════════════════════════
// EVENT REPLAY SAFETY
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_events_are_full_state_replacements() {
    let room = room(MemoryStore::new()).await;
    let lot = seed_lot(&room, "Lamp", "5.0").await;
    let team_x = seed_team(&room, "Ravens", "100").await;
    let team_y = seed_team(&room, "Owls", "100").await;
    let admin = CallerClaims::admin("ops");

    let mut events = room.notifier.subscribe();

    room.auctioneer.start_auction(&admin, &lot.id).await.unwrap();
    room.auctioneer
        .place_bid(&CallerClaims::captain("cap_x", &team_x.id))
        .await
        .unwrap();
    room.auctioneer
        .place_bid(&CallerClaims::captain("cap_y", &team_y.id))
        .await
        .unwrap();

    // Replaying any single BidAccepted snapshot reconstructs the whole lot
    // state; an observer that missed earlier events loses nothing.
    let mut last_snapshot = None;
    while let Ok(event) = events.try_recv() {
        if let AuctionEvent::BidAccepted { lot, latest } = event {
            assert_eq!(lot.bid_history.last(), Some(&latest));
            last_snapshot = Some(lot);
        }
    }
    let snapshot = last_snapshot.expect("no BidAccepted events seen");
    assert_eq!(snapshot.bid_history.len(), 2);
    assert_eq!(snapshot.bid_history[1].amount, dec("5.5"));
}
