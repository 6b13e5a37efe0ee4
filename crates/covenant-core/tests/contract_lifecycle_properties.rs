use std::sync::{Arc, Mutex};

use covenant_core::lifecycle::{LifecycleError, LifecycleManager};
use covenant_model::{ContractStatus, CriteriaBinding, StatusChange};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Create,
    Activate,
    Finalize,
    Breach,
    Cancel,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Create),
        Just(Op::Activate),
        Just(Op::Finalize),
        Just(Op::Breach),
        Just(Op::Cancel),
    ]
}

/// Reference transition table, kept deliberately separate from the
/// implementation under test.
fn expected_next(status: ContractStatus, op: Op) -> Option<ContractStatus> {
    match (status, op) {
        (ContractStatus::Uninitialized, Op::Create) => Some(ContractStatus::Initiating),
        (ContractStatus::Initiating, Op::Activate) => Some(ContractStatus::Active),
        (ContractStatus::Active, Op::Finalize) => Some(ContractStatus::Finalized),
        (ContractStatus::Active, Op::Breach) => Some(ContractStatus::Breached),
        (ContractStatus::Initiating, Op::Cancel) | (ContractStatus::Active, Op::Cancel) => {
            Some(ContractStatus::Cancelled)
        }
        _ => None,
    }
}

fn apply(
    manager: &mut LifecycleManager,
    handle: covenant_model::ContractHandle,
    op: Op,
) -> Result<bool, LifecycleError> {
    match op {
        Op::Create => manager.create(handle, "actor:prop"),
        Op::Activate => manager.activate(handle),
        Op::Finalize => manager.finalize(handle),
        Op::Breach => manager.breach(handle),
        Op::Cancel => manager.cancel(handle),
    }
}

proptest! {
    #[test]
    fn status_only_moves_along_table_edges(ops in proptest::collection::vec(op_strategy(), 0..48)) {
        let mut manager = LifecycleManager::new();
        let handle = manager.register(CriteriaBinding::default());

        let observed = Arc::new(Mutex::new(Vec::<StatusChange>::new()));
        let sink = Arc::clone(&observed);
        manager.subscribe(move |change| sink.lock().expect("lock").push(*change));

        let mut model = ContractStatus::Uninitialized;
        let mut successes = 0_usize;

        for op in ops {
            let applied = apply(&mut manager, handle, op).expect("known handle");
            match expected_next(model, op) {
                Some(next) => {
                    prop_assert!(applied, "table edge {model:?} --{op:?}--> {next:?} must apply");
                    model = next;
                    successes += 1;
                }
                None => prop_assert!(!applied, "off-table op {op:?} from {model:?} must be rejected"),
            }

            let actual = manager.record(handle).expect("record exists").status;
            prop_assert_eq!(actual, model);
        }

        // One notification per successful transition, carrying the exact
        // (previous, new) pair, in order.
        let observed = observed.lock().expect("lock");
        prop_assert_eq!(observed.len(), successes);
        prop_assert_eq!(manager.changes().len(), successes);
        let mut replay = ContractStatus::Uninitialized;
        for change in observed.iter() {
            prop_assert_eq!(change.previous, replay);
            replay = change.new;
        }
        if let Some(last) = observed.last() {
            prop_assert_eq!(last.new, model);
        }
    }

    #[test]
    fn terminal_states_admit_no_further_transitions(ops in proptest::collection::vec(op_strategy(), 0..48)) {
        let mut manager = LifecycleManager::new();
        let handle = manager.register(CriteriaBinding::default());

        let mut terminal_since = None::<usize>;
        for (index, op) in ops.iter().enumerate() {
            let applied = apply(&mut manager, handle, *op).expect("known handle");
            let status = manager.record(handle).expect("record exists").status;
            if let Some(since) = terminal_since {
                prop_assert!(!applied, "op {op:?} at {index} applied after terminal at {since}");
            } else if status.is_terminal() {
                terminal_since = Some(index);
            }
        }
    }

    #[test]
    fn owner_binds_exactly_once(ops in proptest::collection::vec(op_strategy(), 1..32)) {
        let mut manager = LifecycleManager::new();
        let handle = manager.register(CriteriaBinding::default());

        let mut created = false;
        for op in ops {
            apply(&mut manager, handle, op).expect("known handle");
            created |= op == Op::Create && manager.record(handle).expect("record").owning_contractor.is_some();
        }

        let record = manager.record(handle).expect("record exists");
        if created {
            assert_eq!(record.owning_contractor.as_deref(), Some("actor:prop"));
        } else {
            assert!(record.owning_contractor.is_none());
        }
    }
}

#[test]
fn scenario_full_happy_path_emits_three_changes() {
    let mut manager = LifecycleManager::new();
    let handle = manager.register(CriteriaBinding::new(
        ["basic-oath-broken"],
        ["basic-term-elapsed"],
    ));

    assert_eq!(manager.create(handle, "actor:darya"), Ok(true));
    assert_eq!(manager.activate(handle), Ok(true));
    assert_eq!(manager.finalize(handle), Ok(true));

    let changes = manager.changes();
    assert_eq!(changes.len(), 3);
    assert_eq!(changes[0].previous, ContractStatus::Uninitialized);
    assert_eq!(changes[2].new, ContractStatus::Finalized);
}
