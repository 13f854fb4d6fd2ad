//! Domain tests over an in-memory database: event recording and retrieval,
//! the friend graph invariants, and the visibility rules.

use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use grudge_core::events::EventLog;
use grudge_core::friends::FriendGraph;
use grudge_core::visibility::VisibilityGate;
use grudge_core::{Error, week};
use grudge_db::{Database, time};
use grudge_types::api::FriendAction;
use grudge_types::models::{Category, EventKind};

fn db() -> Database {
    Database::open_in_memory().unwrap()
}

fn mk_user(db: &Database, username: &str) -> Uuid {
    let id = Uuid::new_v4();
    db.create_user(
        &id.to_string(),
        &format!("{username}@example.com"),
        username,
        username,
        "$argon2-hash-placeholder",
        &time::encode(Utc::now()),
    )
    .unwrap();
    id
}

#[test]
fn record_event_stamps_monday_week_start() {
    let db = db();
    let alice = mk_user(&db, "alice");

    // Wednesday Dec 25 2024 with no prior events.
    let now = Utc.with_ymd_and_hms(2024, 12, 25, 14, 0, 0).unwrap();
    let event = EventLog::new(&db)
        .record_event_at(
            alice,
            EventKind::Disrespect,
            Category::CreditTheft,
            None,
            false,
            now,
        )
        .unwrap();

    let monday = Utc.with_ymd_and_hms(2024, 12, 23, 0, 0, 0).unwrap();
    assert_eq!(event.week_start, monday);
    assert_eq!(event.created_at, now);
    assert_eq!(week::week_label(event.week_start), "Week of Dec 23");
}

#[test]
fn record_event_rejects_cross_kind_categories() {
    let db = db();
    let alice = mk_user(&db, "alice");
    let log = EventLog::new(&db);

    let err = log
        .record_event(
            alice,
            EventKind::Disrespect,
            Category::ClutchMoment,
            None,
            false,
        )
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = log
        .record_event(alice, EventKind::Win, Category::Ghosted, None, false)
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn blank_notes_are_dropped() {
    let db = db();
    let alice = mk_user(&db, "alice");

    let event = EventLog::new(&db)
        .record_event(
            alice,
            EventKind::Win,
            Category::RealTalk,
            Some("   ".into()),
            false,
        )
        .unwrap();
    assert_eq!(event.note, None);
}

#[test]
fn list_own_events_applies_lookback_window() {
    let db = db();
    let alice = mk_user(&db, "alice");
    let log = EventLog::new(&db);

    let now = Utc.with_ymd_and_hms(2024, 12, 25, 12, 0, 0).unwrap();
    let this_week = now - Duration::hours(1);
    let last_week = now - Duration::days(7);
    let long_ago = now - Duration::days(70);

    for t in [this_week, last_week, long_ago] {
        log.record_event_at(
            alice,
            EventKind::Disrespect,
            Category::Ghosted,
            None,
            false,
            t,
        )
        .unwrap();
    }

    // weeks_back = 0: current week only.
    let events = log
        .list_own_events_at(alice, EventKind::Disrespect, 0, now)
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].created_at, this_week);

    // Default window picks up last week but not ten weeks ago.
    let events = log
        .list_own_events_at(alice, EventKind::Disrespect, 8, now)
        .unwrap();
    assert_eq!(events.len(), 2);
    // Newest first.
    assert_eq!(events[0].created_at, this_week);
    assert_eq!(events[1].created_at, last_week);

    // A huge window returns everything.
    let events = log
        .list_own_events_at(alice, EventKind::Disrespect, 5200, now)
        .unwrap();
    assert_eq!(events.len(), 3);

    // Even a window reaching past the calendar's start; weeks is
    // client-controlled, so the maximum must not error.
    let events = log
        .list_own_events_at(alice, EventKind::Disrespect, u32::MAX, now)
        .unwrap();
    assert_eq!(events.len(), 3);
}

#[test]
fn list_own_events_filters_by_kind() {
    let db = db();
    let alice = mk_user(&db, "alice");
    let log = EventLog::new(&db);

    log.record_event(alice, EventKind::Win, Category::GoatBehavior, None, false)
        .unwrap();
    log.record_event(
        alice,
        EventKind::Disrespect,
        Category::CreditTheft,
        None,
        false,
    )
    .unwrap();

    let wins = log.list_own_events(alice, EventKind::Win, 8).unwrap();
    assert_eq!(wins.len(), 1);
    assert_eq!(wins[0].category, Category::GoatBehavior);
}

#[test]
fn duplicate_requests_fail_in_both_directions() {
    let db = db();
    let alice = mk_user(&db, "alice");
    let bob = mk_user(&db, "bob");
    let graph = FriendGraph::new(&db);

    let target = graph.send_request(alice, bob).unwrap();
    assert_eq!(target.username, "bob");

    assert!(matches!(
        graph.send_request(alice, bob).unwrap_err(),
        Error::AlreadyExists
    ));
    assert!(matches!(
        graph.send_request(bob, alice).unwrap_err(),
        Error::AlreadyExists
    ));
}

#[test]
fn cannot_request_self_or_missing_user() {
    let db = db();
    let alice = mk_user(&db, "alice");
    let graph = FriendGraph::new(&db);

    assert!(matches!(
        graph.send_request(alice, alice).unwrap_err(),
        Error::Validation(_)
    ));
    assert!(matches!(
        graph.send_request(alice, Uuid::new_v4()).unwrap_err(),
        Error::NotFound("user")
    ));
}

#[test]
fn only_the_target_may_respond() {
    let db = db();
    let alice = mk_user(&db, "alice");
    let bob = mk_user(&db, "bob");
    let graph = FriendGraph::new(&db);

    graph.send_request(alice, bob).unwrap();
    let pending = graph.list_pending(bob).unwrap();
    let request = &pending[0];
    assert_eq!(request.from.username, "alice");

    // The requester may not accept their own request.
    assert!(matches!(
        graph
            .respond(request.id, alice, FriendAction::Accept)
            .unwrap_err(),
        Error::NotFound("friendship")
    ));
    assert!(!graph.are_friends(alice, bob).unwrap());

    graph.respond(request.id, bob, FriendAction::Accept).unwrap();
    assert!(graph.are_friends(alice, bob).unwrap());
    assert!(graph.are_friends(bob, alice).unwrap());
    assert!(graph.list_pending(bob).unwrap().is_empty());
}

#[test]
fn reject_deletes_the_row_and_allows_a_re_request() {
    let db = db();
    let alice = mk_user(&db, "alice");
    let bob = mk_user(&db, "bob");
    let graph = FriendGraph::new(&db);

    graph.send_request(alice, bob).unwrap();
    let request_id = graph.list_pending(bob).unwrap()[0].id;
    graph
        .respond(request_id, bob, FriendAction::Reject)
        .unwrap();

    assert!(!graph.are_friends(alice, bob).unwrap());
    assert!(graph.list_pending(bob).unwrap().is_empty());

    // No residual AlreadyExists after rejection.
    graph.send_request(alice, bob).unwrap();
}

#[test]
fn pending_friendship_does_not_grant_visibility() {
    let db = db();
    let alice = mk_user(&db, "alice");
    let bob = mk_user(&db, "bob");

    FriendGraph::new(&db).send_request(alice, bob).unwrap();

    let gate = VisibilityGate::new(&db);
    assert!(!gate.is_visible(alice, bob).unwrap());
    assert!(gate.is_visible(alice, alice).unwrap());
}

#[test]
fn shared_events_are_gated_and_filtered() {
    let db = db();
    let alice = mk_user(&db, "alice");
    let bob = mk_user(&db, "bob");
    let log = EventLog::new(&db);
    let graph = FriendGraph::new(&db);

    log.record_event(
        bob,
        EventKind::Disrespect,
        Category::ThrownUnderBus,
        Some("sprint review".into()),
        true,
    )
    .unwrap();
    log.record_event(
        bob,
        EventKind::Disrespect,
        Category::Ghosted,
        None,
        false,
    )
    .unwrap();

    // Not friends yet: forbidden.
    assert!(matches!(
        log.list_shared_events(alice, bob, EventKind::Disrespect, 8)
            .unwrap_err(),
        Error::Forbidden
    ));

    graph.send_request(alice, bob).unwrap();
    let request_id = graph.list_pending(bob).unwrap()[0].id;
    graph
        .respond(request_id, bob, FriendAction::Accept)
        .unwrap();

    // Friends: shared events only, never the unshared one.
    let events = log
        .list_shared_events(alice, bob, EventKind::Disrespect, 8)
        .unwrap();
    assert_eq!(events.len(), 1);
    assert!(events[0].is_shared);
    assert_eq!(events[0].category, Category::ThrownUnderBus);
}

#[test]
fn list_friends_sees_both_directions() {
    let db = db();
    let alice = mk_user(&db, "alice");
    let bob = mk_user(&db, "bob");
    let carol = mk_user(&db, "carol");
    let graph = FriendGraph::new(&db);

    // alice -> bob, carol -> alice; both accepted.
    graph.send_request(alice, bob).unwrap();
    let id = graph.list_pending(bob).unwrap()[0].id;
    graph.respond(id, bob, FriendAction::Accept).unwrap();

    graph.send_request(carol, alice).unwrap();
    let id = graph.list_pending(alice).unwrap()[0].id;
    graph.respond(id, alice, FriendAction::Accept).unwrap();

    let mut names: Vec<String> = graph
        .list_friends(alice)
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    names.sort();
    assert_eq!(names, vec!["bob", "carol"]);
}

#[test]
fn invite_redemption_creates_an_accepted_friendship() {
    let db = db();
    let alice = mk_user(&db, "alice");
    let graph = FriendGraph::new(&db);

    let now = Utc::now();
    let invite = graph.create_invite(alice, now).unwrap();

    let inviter = graph.invite_info(&invite.token, now).unwrap();
    assert_eq!(inviter.username, "alice");

    let bob = mk_user(&db, "bob");
    graph
        .redeem_invite(&invite.token, bob, now + Duration::days(1))
        .unwrap();

    // Accepted without any respond step, visible in both directions.
    assert!(graph.are_friends(alice, bob).unwrap());
    assert!(graph.list_pending(bob).unwrap().is_empty());
}

#[test]
fn expired_or_unknown_invites_fail() {
    let db = db();
    let alice = mk_user(&db, "alice");
    let bob = mk_user(&db, "bob");
    let graph = FriendGraph::new(&db);

    let now = Utc::now();
    let invite = graph.create_invite(alice, now).unwrap();
    let after_expiry = now + Duration::days(8);

    assert!(matches!(
        graph.invite_info(&invite.token, after_expiry).unwrap_err(),
        Error::Expired("invite")
    ));
    assert!(matches!(
        graph
            .redeem_invite(&invite.token, bob, after_expiry)
            .unwrap_err(),
        Error::Expired("invite")
    ));
    assert!(matches!(
        graph.invite_info("no-such-token", now).unwrap_err(),
        Error::NotFound("invite")
    ));
    assert!(!graph.are_friends(alice, bob).unwrap());
}

#[test]
fn search_status_maps_both_directions() {
    let db = db();
    let alice = mk_user(&db, "alice");
    let bob = mk_user(&db, "bob");
    let carol = mk_user(&db, "carol");
    let dave = mk_user(&db, "dave");
    let graph = FriendGraph::new(&db);

    graph.send_request(alice, bob).unwrap();
    graph.send_request(carol, alice).unwrap();

    let status = graph
        .search_status(alice, &[bob, carol, dave])
        .unwrap();
    assert_eq!(
        status.get(&bob),
        Some(&grudge_types::models::FriendshipStatus::Pending)
    );
    assert_eq!(
        status.get(&carol),
        Some(&grudge_types::models::FriendshipStatus::Pending)
    );
    assert_eq!(status.get(&dave), None);
}
