//! Vote and close preconditions, in the order they are reported.

use tally_types::{CallError, ProposalId, Timestamp};

use crate::common::{DAY, Harness, T0, alice, bob, voter};

fn open_proposal(h: &mut Harness) -> ProposalId {
    h.client(alice()).create_proposal("proposal", DAY).unwrap()
}

#[test]
fn second_vote_always_fails() {
    let mut h = Harness::new();
    let id = open_proposal(&mut h);
    h.client(bob()).vote(id).unwrap();
    for _ in 0..3 {
        assert_eq!(
            h.client(bob()).vote(id).unwrap_err(),
            CallError::AlreadyVoted { voter: bob(), id }
        );
    }
    assert_eq!(h.client(bob()).proposal(id).unwrap().vote_count, 1);
}

#[test]
fn votes_are_counted_per_distinct_voter() {
    let mut h = Harness::new();
    let id = open_proposal(&mut h);
    for n in 0..10 {
        h.client(voter(n)).vote(id).unwrap();
    }
    assert_eq!(h.client(alice()).proposal(id).unwrap().vote_count, 10);
    assert!((0..10).all(|n| h.client(alice()).has_voted(voter(n), id).unwrap()));
    assert!(!h.client(alice()).has_voted(voter(10), id).unwrap());
}

#[test]
fn vote_records_are_per_proposal() {
    let mut h = Harness::new();
    let first = open_proposal(&mut h);
    let second = open_proposal(&mut h);
    h.client(bob()).vote(first).unwrap();
    h.client(bob()).vote(second).unwrap();
    assert_eq!(h.client(bob()).proposal(second).unwrap().vote_count, 1);
}

#[test]
fn deadline_second_is_still_open() {
    let mut h = Harness::new();
    let id = open_proposal(&mut h);
    h.clock.set(Timestamp::from_secs(T0 + DAY as u64));
    h.client(bob()).vote(id).unwrap();
    assert!(matches!(
        h.client(alice()).close_vote(id).unwrap_err(),
        CallError::NotYetExpired { .. }
    ));

    h.advance(1);
    assert_eq!(
        h.client(alice()).vote(id).unwrap_err(),
        CallError::Expired {
            id,
            deadline: Timestamp::from_secs(T0 + DAY as u64)
        }
    );
}

#[test]
fn already_voted_is_reported_before_expiry() {
    let mut h = Harness::new();
    let id = open_proposal(&mut h);
    h.client(bob()).vote(id).unwrap();
    h.advance(DAY + 1);
    assert!(matches!(
        h.client(bob()).vote(id).unwrap_err(),
        CallError::AlreadyVoted { .. }
    ));
}

#[test]
fn already_voted_is_reported_before_closed() {
    let mut h = Harness::new();
    let id = open_proposal(&mut h);
    h.client(bob()).vote(id).unwrap();
    h.advance(DAY + 1);
    h.client(alice()).close_vote(id).unwrap();
    assert!(matches!(
        h.client(bob()).vote(id).unwrap_err(),
        CallError::AlreadyVoted { .. }
    ));
}

#[test]
fn close_before_deadline_always_fails() {
    let mut h = Harness::new();
    let id = open_proposal(&mut h);
    for step in [0, 1, DAY - 2, 1] {
        h.advance(step);
        let now = h.now();
        assert_eq!(
            h.client(alice()).close_vote(id).unwrap_err(),
            CallError::NotYetExpired {
                id,
                deadline: Timestamp::from_secs(T0 + DAY as u64),
                now,
            }
        );
    }
    assert!(!h.client(alice()).proposal(id).unwrap().closed);
}

#[test]
fn close_after_deadline_succeeds_once() {
    let mut h = Harness::new();
    let id = open_proposal(&mut h);
    h.advance(DAY + 1);
    h.client(bob()).close_vote(id).unwrap();
    for caller in [alice(), bob(), voter(1)] {
        assert_eq!(
            h.client(caller).close_vote(id).unwrap_err(),
            CallError::AlreadyClosed { id }
        );
    }
    assert!(h.client(bob()).proposal(id).unwrap().closed);
}

#[test]
fn not_found_comes_first() {
    let mut h = Harness::new();
    let missing = ProposalId::new(2);
    open_proposal(&mut h);
    h.advance(DAY + 1);
    assert_eq!(
        h.client(bob()).vote(missing).unwrap_err(),
        CallError::NotFound { id: missing }
    );
    assert_eq!(
        h.client(bob()).close_vote(ProposalId::NONE).unwrap_err(),
        CallError::NotFound {
            id: ProposalId::NONE
        }
    );
}
