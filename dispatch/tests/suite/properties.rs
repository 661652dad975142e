//! Invariants under arbitrary call sequences from many callers.

use std::collections::BTreeSet;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use tally_types::{CallError, ProposalId};

use crate::common::{Harness, voter};

const VOTERS: u8 = 6;

#[derive(Debug, Clone)]
enum Op {
    Create { duration: i64 },
    Vote { voter: u8, proposal: u64 },
    Close { caller: u8, proposal: u64 },
    Advance { secs: u64 },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-5i64..3_000).prop_map(|duration| Op::Create { duration }),
        (0..VOTERS, 0u64..6).prop_map(|(voter, proposal)| Op::Vote { voter, proposal }),
        (0..VOTERS, 0u64..6).prop_map(|(voter, proposal)| Op::Vote { voter, proposal }),
        (0..VOTERS, 0u64..6).prop_map(|(caller, proposal)| Op::Close { caller, proposal }),
        (0u64..2_000).prop_map(|secs| Op::Advance { secs }),
    ]
}

fn apply(h: &mut Harness, op: &Op) -> Result<(), CallError> {
    match *op {
        Op::Create { duration } => h
            .client(voter(0))
            .create_proposal("generated", duration)
            .map(drop),
        Op::Vote {
            voter: n,
            proposal,
        } => h.client(voter(n)).vote(ProposalId::new(proposal)),
        Op::Close { caller, proposal } => {
            h.client(voter(caller)).close_vote(ProposalId::new(proposal))
        }
        Op::Advance { secs } => {
            h.clock.advance(secs);
            Ok(())
        }
    }
}

/// `voteCount` equals the number of voters with a record, per proposal.
fn check_counts(h: &mut Harness) -> Result<(), TestCaseError> {
    let proposals = h.client(voter(0)).get_proposals().unwrap();
    for proposal in proposals {
        let records = (0..VOTERS)
            .filter(|&n| h.client(voter(0)).has_voted(voter(n), proposal.id).unwrap())
            .count() as u64;
        prop_assert_eq!(proposal.vote_count, records, "drift on proposal {}", proposal.id);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn vote_count_never_drifts(ops in prop::collection::vec(arb_op(), 1..40)) {
        let mut h = Harness::new();
        for op in &ops {
            let _ = apply(&mut h, op);
            check_counts(&mut h)?;
        }
    }

    #[test]
    fn repeated_vote_never_succeeds(ops in prop::collection::vec(arb_op(), 1..40)) {
        let mut h = Harness::new();
        for op in &ops {
            let voted_before = match *op {
                Op::Vote { voter: n, proposal } => h
                    .client(voter(0))
                    .has_voted(voter(n), ProposalId::new(proposal))
                    .unwrap(),
                _ => false,
            };
            let result = apply(&mut h, op);
            if voted_before {
                let is_already_voted = matches!(result, Err(CallError::AlreadyVoted { .. }));
                prop_assert!(is_already_voted, "{:?} returned {:?}", op, result);
            }
        }
    }

    #[test]
    fn failed_calls_change_nothing(ops in prop::collection::vec(arb_op(), 1..40)) {
        let mut h = Harness::new();
        for op in &ops {
            let before = h.snapshot();
            let events_before = h.dispatcher.events_since(None).unwrap().len();
            if apply(&mut h, op).is_err() {
                prop_assert_eq!(h.snapshot(), before);
                prop_assert_eq!(h.dispatcher.events_since(None).unwrap().len(), events_before);
            }
        }
    }

    #[test]
    fn closed_is_permanent(ops in prop::collection::vec(arb_op(), 1..40)) {
        let mut h = Harness::new();
        let mut closed = BTreeSet::new();
        for op in &ops {
            let _ = apply(&mut h, op);
            let proposals = h.client(voter(0)).get_proposals().unwrap();
            for proposal in &proposals {
                if closed.contains(&proposal.id) {
                    prop_assert!(proposal.closed);
                }
            }
            closed.extend(proposals.iter().filter(|p| p.closed).map(|p| p.id));
        }
    }
}
