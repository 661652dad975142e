//! Deployment, initialization and the proposal lifecycle end to end.

use serde_json::json;
use tally_types::{CallData, CallError, LedgerEvent, Proposal, ProposalId, Timestamp, method};

use crate::common::{DAY, Harness, T0, WEEK, admin, alice, bob};

#[test]
fn fund_research_walkthrough() {
    let mut h = Harness::new();
    let one = ProposalId::new(1);

    let id = h.client(admin()).create_proposal("Fund research", DAY).unwrap();
    assert_eq!(id, one);
    let proposal = h.client(alice()).proposal(one).unwrap();
    assert_eq!(proposal.deadline, Timestamp::from_secs(T0 + DAY as u64));

    h.client(alice()).vote(one).unwrap();
    assert_eq!(h.client(bob()).proposal(one).unwrap().vote_count, 1);
    assert!(h.client(bob()).has_voted(alice(), one).unwrap());

    let err = h.client(alice()).vote(one).unwrap_err();
    assert_eq!(err, CallError::AlreadyVoted { voter: alice(), id: one });
    assert_eq!(h.client(bob()).proposal(one).unwrap().vote_count, 1);

    h.advance(DAY + 1);
    h.client(bob()).close_vote(one).unwrap();
    assert!(h.client(bob()).proposal(one).unwrap().closed);

    let err = h.client(bob()).vote(one).unwrap_err();
    assert_eq!(err, CallError::Closed { id: one });
    assert_eq!(h.client(bob()).proposal(one).unwrap().vote_count, 1);
}

#[test]
fn expired_but_unclosed_proposal_reports_expired() {
    let mut h = Harness::new();
    let id = h.client(alice()).create_proposal("p", DAY).unwrap();
    h.advance(DAY + 1);

    let err = h.client(bob()).vote(id).unwrap_err();
    assert!(matches!(err, CallError::Expired { id: got, .. } if got == id));

    h.client(alice()).close_vote(id).unwrap();
    assert_eq!(h.client(bob()).vote(id).unwrap_err(), CallError::Closed { id });
}

#[test]
fn create_sets_deadline_from_call_time() {
    let mut h = Harness::new();
    h.client(alice()).create_proposal("earlier", DAY).unwrap();
    h.advance(500);

    let before = h.client(alice()).proposal_count().unwrap();
    let now = h.now();
    let id = h.client(bob()).create_proposal("X", WEEK).unwrap();
    assert_eq!(id.value(), before + 1);

    let proposal = h.client(bob()).proposal(id).unwrap();
    assert_eq!(
        proposal,
        Proposal {
            id,
            description: "X".to_string(),
            vote_count: 0,
            deadline: Timestamp::from_secs(now.as_secs() + WEEK as u64),
            closed: false,
        }
    );
}

#[test]
fn invalid_duration_leaves_state_untouched() {
    let mut h = Harness::new();
    let before = h.snapshot();
    for duration in [0, -1, i64::MIN] {
        let err = h.client(alice()).create_proposal("bad", duration).unwrap_err();
        assert_eq!(err, CallError::InvalidDuration { seconds: duration });
    }
    assert_eq!(h.snapshot(), before);
    assert_eq!(h.client(alice()).proposal_count().unwrap(), 0);
    assert!(h.dispatcher.events_since(None).unwrap().is_empty());
}

#[test]
fn get_proposals_lists_in_creation_order() {
    let mut h = Harness::new();
    for name in ["alpha", "beta", "gamma"] {
        h.client(alice()).create_proposal(name, DAY).unwrap();
    }
    let all = h.client(bob()).get_proposals().unwrap();
    let ids: Vec<u64> = all.iter().map(|p| p.id.value()).collect();
    assert_eq!(ids, [1, 2, 3]);
    assert_eq!(all[2].description, "gamma");
}

#[test]
fn missing_proposal_is_zero_valued_for_reads_and_not_found_for_writes() {
    let mut h = Harness::new();
    let ghost = ProposalId::new(42);
    assert_eq!(h.client(alice()).proposal(ghost).unwrap(), Proposal::default());
    assert!(!h.client(alice()).has_voted(alice(), ghost).unwrap());
    assert_eq!(
        h.client(alice()).vote(ghost).unwrap_err(),
        CallError::NotFound { id: ghost }
    );
    assert_eq!(
        h.client(alice()).close_vote(ghost).unwrap_err(),
        CallError::NotFound { id: ghost }
    );
}

#[test]
fn each_mutation_emits_exactly_one_event() {
    let mut h = Harness::new();
    let create = CallData::new(
        method::CREATE_PROPOSAL,
        json!({ "description": "Fund research", "durationSeconds": DAY }),
    );
    let receipt = h.dispatcher.execute(alice(), &create).unwrap();
    assert_eq!(receipt.output, json!(1));
    assert_eq!(receipt.events.len(), 1);
    assert_eq!(
        receipt.events[0].event,
        LedgerEvent::ProposalCreated {
            id: ProposalId::new(1),
            description: "Fund research".to_string(),
            deadline: Timestamp::from_secs(T0 + DAY as u64),
        }
    );

    let vote = CallData::new(method::VOTE, json!({ "proposalId": 1 }));
    let receipt = h.dispatcher.execute(bob(), &vote).unwrap();
    assert_eq!(
        receipt.events.iter().map(|e| &e.event).collect::<Vec<_>>(),
        [&LedgerEvent::Voted {
            voter: bob(),
            proposal_id: ProposalId::new(1),
        }]
    );

    // A rejected vote records nothing.
    assert!(h.dispatcher.execute(bob(), &vote).is_err());
    let log = h.dispatcher.events_since(None).unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].emitted_at, Timestamp::from_secs(T0));

    let tail = h.dispatcher.events_since(Some(log[0].seq)).unwrap();
    assert_eq!(tail.len(), 1);
}

#[test]
fn closing_does_not_emit() {
    let mut h = Harness::new();
    let id = h.client(alice()).create_proposal("p", 10).unwrap();
    h.advance(11);
    let before = h.dispatcher.events_since(None).unwrap().len();
    h.client(bob()).close_vote(id).unwrap();
    assert_eq!(h.dispatcher.events_since(None).unwrap().len(), before);
}

#[test]
fn create_and_close_are_open_to_any_caller() {
    let mut h = Harness::new();
    let id = h.client(bob()).create_proposal("from a non-admin", 10).unwrap();
    h.advance(11);
    h.client(alice()).close_vote(id).unwrap();
}

#[test]
fn second_initialize_fails_and_keeps_admin() {
    let mut h = Harness::new();
    for caller in [admin(), alice()] {
        assert_eq!(
            h.client(caller).initialize().unwrap_err(),
            CallError::AlreadyInitialized
        );
    }
    assert_eq!(h.client(bob()).get_admin().unwrap(), admin());
}

#[test]
fn initialize_does_not_reset_existing_proposals() {
    let mut h = Harness::new();
    h.client(alice()).create_proposal("kept", DAY).unwrap();
    assert!(h.client(alice()).initialize().is_err());
    assert_eq!(h.client(alice()).proposal_count().unwrap(), 1);
}

#[test]
fn unknown_and_malformed_calls_revert() {
    let mut h = Harness::new();
    let err = h.dispatcher.call(alice(), &CallData::bare("selfDestruct")).unwrap_err();
    assert_eq!(
        err,
        CallError::UnknownFunction {
            method: "selfDestruct".to_string()
        }
    );

    let bad = CallData::new(method::CREATE_PROPOSAL, json!({ "description": 7 }));
    let err = h.dispatcher.call(alice(), &bad).unwrap_err();
    assert!(matches!(err, CallError::MalformedCall { ref method, .. } if method == "createProposal"));
}

#[test]
fn version_one_is_active_after_deploy() {
    let mut h = Harness::new();
    let v1 = h.v1;
    assert_eq!(h.client(alice()).get_version().unwrap(), 1);
    assert_eq!(h.client(alice()).get_implementation().unwrap(), v1);
}
