//! Deployments backed by a SQLite file survive reopening.

use std::sync::Arc;

use tally_dispatch::{Dispatcher, ManualClock};
use tally_storage::{MemoryStore, SqliteStore};
use tally_types::{CallError, LedgerEvent, ProposalId, Timestamp};

use crate::common::{DAY, Harness, T0, admin, alice, bob, registry};

#[test]
fn state_and_events_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    let (address, v2) = {
        let mut h = Harness::with_store(SqliteStore::open(&path).unwrap());
        let id = h.client(alice()).create_proposal("Fund research", DAY).unwrap();
        h.client(bob()).vote(id).unwrap();
        (h.dispatcher.address(), h.v2)
    };

    let (registry, v1, _) = registry();
    let clock = Arc::new(ManualClock::new(Timestamp::from_secs(T0 + 10)));
    let mut dispatcher =
        Dispatcher::open(SqliteStore::open(&path).unwrap(), registry, clock).unwrap();
    assert_eq!(dispatcher.address(), address);
    assert_eq!(dispatcher.implementation().unwrap(), v1);
    assert_eq!(dispatcher.admin().unwrap(), admin());

    let one = ProposalId::new(1);
    let mut client = dispatcher.client(alice());
    assert_eq!(client.proposal(one).unwrap().vote_count, 1);
    assert!(client.has_voted(bob(), one).unwrap());
    assert_eq!(
        client.as_caller(bob()).vote(one).unwrap_err(),
        CallError::AlreadyVoted { voter: bob(), id: one }
    );

    dispatcher.client(admin()).upgrade_to(v2).unwrap();
    assert_eq!(dispatcher.client(alice()).get_version().unwrap(), 2);

    let events = dispatcher.events_since(None).unwrap();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0].event, LedgerEvent::ProposalCreated { .. }));
    assert_eq!(
        events[1].event,
        LedgerEvent::Voted {
            voter: bob(),
            proposal_id: one,
        }
    );
}

#[test]
fn reverted_call_is_not_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    {
        let mut h = Harness::with_store(SqliteStore::open(&path).unwrap());
        let id = h.client(alice()).create_proposal("p", DAY).unwrap();
        h.client(bob()).vote(id).unwrap();
        assert!(h.client(bob()).vote(id).is_err());
        assert!(h.client(alice()).create_proposal("bad", 0).is_err());
    }

    let store = SqliteStore::open(&path).unwrap();
    let (registry, _, _) = registry();
    let clock = Arc::new(ManualClock::new(Timestamp::from_secs(T0)));
    let mut dispatcher = Dispatcher::open(store, registry, clock).unwrap();
    let mut client = dispatcher.client(alice());
    assert_eq!(client.proposal_count().unwrap(), 1);
    assert_eq!(client.proposal(ProposalId::new(1)).unwrap().vote_count, 1);
    assert_eq!(dispatcher.events_since(None).unwrap().len(), 2);
}

#[test]
fn opening_an_empty_store_is_not_initialized() {
    let (registry, _, _) = registry();
    let clock = Arc::new(ManualClock::default());
    let err = Dispatcher::open(MemoryStore::new(), registry, clock).err().unwrap();
    assert_eq!(err, CallError::NotInitialized);
}

#[test]
fn deploying_over_an_existing_deployment_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");
    drop(Harness::with_store(SqliteStore::open(&path).unwrap()));

    let (code, v1, _) = registry();
    let clock = Arc::new(ManualClock::default());
    let err = Dispatcher::deploy(SqliteStore::open(&path).unwrap(), code, clock, alice(), v1)
        .err()
        .unwrap();
    assert_eq!(err, CallError::AlreadyInitialized);

    let (code, _, _) = registry();
    let clock = Arc::new(ManualClock::default());
    let dispatcher = Dispatcher::open(SqliteStore::open(&path).unwrap(), code, clock).unwrap();
    assert_eq!(dispatcher.admin().unwrap(), admin());
}
