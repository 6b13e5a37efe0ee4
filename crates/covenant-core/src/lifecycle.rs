//! Contract lifecycle manager: owns the arena of contract records, the
//! legal transition table, and synchronous status-change notification.
//!
//! The table is forward-only and branch-limited: no edge returns to an
//! earlier non-terminal state, and terminal states have no outgoing edges.
//! Every successful transition emits exactly one `StatusChange`, delivered
//! to all observers in the same call stack before the operation returns,
//! so an observer always sees the record already reflecting the new status.

use std::collections::BTreeMap;
use std::fmt;

use covenant_model::{
    ContractHandle, ContractRecord, ContractStatus, CriteriaBinding, StatusChange,
};

/// Caller-misuse failures. A transition attempted from the wrong state is
/// not an error — those are signaled by `Ok(false)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    UnknownContract(ContractHandle),
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownContract(handle) => write!(f, "unknown contract: {handle}"),
        }
    }
}

impl std::error::Error for LifecycleError {}

type StatusObserver = Box<dyn FnMut(&StatusChange) + Send>;

pub struct LifecycleManager {
    contracts: BTreeMap<ContractHandle, ContractRecord>,
    next_handle: u64,
    observers: Vec<StatusObserver>,
    change_log: Vec<StatusChange>,
}

impl fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("contracts", &self.contracts)
            .field("next_handle", &self.next_handle)
            .field("observer_count", &self.observers.len())
            .field("change_log", &self.change_log)
            .finish()
    }
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self {
            contracts: BTreeMap::new(),
            next_handle: 1,
            observers: Vec::new(),
            change_log: Vec::new(),
        }
    }

    /// Instantiate a record in `Uninitialized`, bound to no owner. The
    /// returned handle is the only way to address the record afterwards.
    pub fn register(&mut self, criteria: CriteriaBinding) -> ContractHandle {
        let handle = ContractHandle(self.next_handle);
        self.next_handle += 1;
        self.contracts
            .insert(handle, ContractRecord::uninitialized(criteria));
        handle
    }

    /// Attach a status-change observer. Delivery is synchronous and in
    /// registration order.
    pub fn subscribe(&mut self, observer: impl FnMut(&StatusChange) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Append-only log of every successful transition, oldest first.
    pub fn changes(&self) -> &[StatusChange] {
        &self.change_log
    }

    pub fn record(&self, handle: ContractHandle) -> Option<&ContractRecord> {
        self.contracts.get(&handle)
    }

    pub fn handles(&self) -> Vec<ContractHandle> {
        self.contracts.keys().copied().collect()
    }

    pub fn contracts(&self) -> impl Iterator<Item = (ContractHandle, &ContractRecord)> {
        self.contracts.iter().map(|(handle, record)| (*handle, record))
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Uninitialized -> Initiating. The only edge out of `Uninitialized`,
    /// and the operation that binds the owning contractor.
    pub fn create(
        &mut self,
        handle: ContractHandle,
        owner: impl Into<String>,
    ) -> Result<bool, LifecycleError> {
        self.transition(
            handle,
            &[ContractStatus::Uninitialized],
            ContractStatus::Initiating,
            Some(owner.into()),
        )
    }

    /// Initiating -> Active.
    pub fn activate(&mut self, handle: ContractHandle) -> Result<bool, LifecycleError> {
        self.transition(
            handle,
            &[ContractStatus::Initiating],
            ContractStatus::Active,
            None,
        )
    }

    /// Active -> Finalized. The criteria engine's "conditions met" verdict.
    pub fn finalize(&mut self, handle: ContractHandle) -> Result<bool, LifecycleError> {
        self.transition(
            handle,
            &[ContractStatus::Active],
            ContractStatus::Finalized,
            None,
        )
    }

    /// Active -> Breached. The criteria engine's "conditions violated"
    /// verdict.
    pub fn breach(&mut self, handle: ContractHandle) -> Result<bool, LifecycleError> {
        self.transition(
            handle,
            &[ContractStatus::Active],
            ContractStatus::Breached,
            None,
        )
    }

    /// Initiating or Active -> Cancelled.
    pub fn cancel(&mut self, handle: ContractHandle) -> Result<bool, LifecycleError> {
        self.transition(
            handle,
            &[ContractStatus::Initiating, ContractStatus::Active],
            ContractStatus::Cancelled,
            None,
        )
    }

    /// Attach a sub-contractor while the contract is still open. Not a
    /// status transition; emits no notification.
    pub fn add_sub_contractor(
        &mut self,
        handle: ContractHandle,
        actor_id: impl Into<String>,
    ) -> Result<bool, LifecycleError> {
        let record = self
            .contracts
            .get_mut(&handle)
            .ok_or(LifecycleError::UnknownContract(handle))?;
        if !matches!(
            record.status,
            ContractStatus::Initiating | ContractStatus::Active
        ) {
            return Ok(false);
        }
        record.sub_contractors.push(actor_id.into());
        Ok(true)
    }

    /// Guarded transition: verifies the current status is one of
    /// `allowed_from`, then performs the mutation and notification
    /// atomically with respect to the executing turn. `Ok(false)` means
    /// the precondition failed and nothing changed.
    fn transition(
        &mut self,
        handle: ContractHandle,
        allowed_from: &[ContractStatus],
        to: ContractStatus,
        bind_owner: Option<String>,
    ) -> Result<bool, LifecycleError> {
        let record = self
            .contracts
            .get_mut(&handle)
            .ok_or(LifecycleError::UnknownContract(handle))?;
        if !allowed_from.contains(&record.status) {
            return Ok(false);
        }

        let previous = record.status;
        record.status = to;
        if let Some(owner) = bind_owner {
            record.owning_contractor = Some(owner);
        }

        let change = StatusChange {
            handle,
            previous,
            new: to,
        };
        self.change_log.push(change);
        for observer in &mut self.observers {
            observer(&change);
        }
        Ok(true)
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn manager_with_contract() -> (LifecycleManager, ContractHandle) {
        let mut manager = LifecycleManager::new();
        let handle = manager.register(CriteriaBinding::default());
        (manager, handle)
    }

    #[test]
    fn create_binds_owner_and_moves_to_initiating() {
        let (mut manager, handle) = manager_with_contract();
        assert_eq!(manager.create(handle, "actor:darya"), Ok(true));

        let record = manager.record(handle).expect("record exists");
        assert_eq!(record.status, ContractStatus::Initiating);
        assert_eq!(record.owning_contractor.as_deref(), Some("actor:darya"));
        assert_eq!(
            manager.changes(),
            &[StatusChange {
                handle,
                previous: ContractStatus::Uninitialized,
                new: ContractStatus::Initiating,
            }]
        );
    }

    #[test]
    fn second_create_is_rejected_without_rebinding_owner() {
        let (mut manager, handle) = manager_with_contract();
        assert_eq!(manager.create(handle, "actor:darya"), Ok(true));
        assert_eq!(manager.create(handle, "actor:kess"), Ok(false));

        let record = manager.record(handle).expect("record exists");
        assert_eq!(record.owning_contractor.as_deref(), Some("actor:darya"));
        assert_eq!(manager.changes().len(), 1);
    }

    #[test]
    fn activate_only_succeeds_once() {
        let (mut manager, handle) = manager_with_contract();
        manager.create(handle, "actor:darya").expect("create");

        assert_eq!(manager.activate(handle), Ok(true));
        assert_eq!(
            manager.record(handle).map(|record| record.status),
            Some(ContractStatus::Active)
        );
        assert_eq!(manager.activate(handle), Ok(false));
        assert_eq!(
            manager.record(handle).map(|record| record.status),
            Some(ContractStatus::Active)
        );
        assert_eq!(manager.changes().len(), 2);
    }

    #[test]
    fn breach_then_finalize_is_rejected() {
        let (mut manager, handle) = manager_with_contract();
        manager.create(handle, "actor:darya").expect("create");
        manager.activate(handle).expect("activate");

        assert_eq!(manager.breach(handle), Ok(true));
        assert_eq!(manager.finalize(handle), Ok(false));
        assert_eq!(
            manager.record(handle).map(|record| record.status),
            Some(ContractStatus::Breached)
        );
        let last = manager.changes().last().expect("change emitted");
        assert_eq!(last.previous, ContractStatus::Active);
        assert_eq!(last.new, ContractStatus::Breached);
    }

    #[test]
    fn finalize_twice_succeeds_once_with_one_notification() {
        let (mut manager, handle) = manager_with_contract();
        manager.create(handle, "actor:darya").expect("create");
        manager.activate(handle).expect("activate");

        assert_eq!(manager.finalize(handle), Ok(true));
        let count = manager.changes().len();
        assert_eq!(manager.finalize(handle), Ok(false));
        assert_eq!(manager.changes().len(), count);
    }

    #[test]
    fn cancel_from_initiating_closes_the_contract() {
        let (mut manager, handle) = manager_with_contract();
        manager.create(handle, "actor:darya").expect("create");

        assert_eq!(manager.cancel(handle), Ok(true));
        assert_eq!(
            manager.record(handle).map(|record| record.status),
            Some(ContractStatus::Cancelled)
        );
        assert_eq!(manager.activate(handle), Ok(false));
    }

    #[test]
    fn cancel_from_active_records_the_old_status() {
        let (mut manager, handle) = manager_with_contract();
        manager.create(handle, "actor:darya").expect("create");
        manager.activate(handle).expect("activate");

        assert_eq!(manager.cancel(handle), Ok(true));
        let last = manager.changes().last().expect("change emitted");
        assert_eq!(last.previous, ContractStatus::Active);
        assert_eq!(last.new, ContractStatus::Cancelled);
    }

    #[test]
    fn cancel_is_rejected_in_terminal_states() {
        let (mut manager, handle) = manager_with_contract();
        manager.create(handle, "actor:darya").expect("create");
        manager.activate(handle).expect("activate");
        manager.finalize(handle).expect("finalize");

        assert_eq!(manager.cancel(handle), Ok(false));
        assert_eq!(manager.breach(handle), Ok(false));
    }

    #[test]
    fn unknown_handle_is_an_error_not_a_rejection() {
        let mut manager = LifecycleManager::new();
        let missing = ContractHandle(99);
        assert_eq!(
            manager.activate(missing),
            Err(LifecycleError::UnknownContract(missing))
        );
    }

    #[test]
    fn observers_see_the_record_already_in_the_new_status() {
        let mut manager = LifecycleManager::new();
        let handle = manager.register(CriteriaBinding::default());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        manager.subscribe(move |change| {
            sink.lock().expect("lock").push(*change);
        });

        manager.create(handle, "actor:darya").expect("create");
        manager.activate(handle).expect("activate");
        manager.activate(handle).expect("rejected is not an error");

        let seen = seen.lock().expect("lock");
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].previous, ContractStatus::Uninitialized);
        assert_eq!(seen[0].new, ContractStatus::Initiating);
        assert_eq!(seen[1].previous, ContractStatus::Initiating);
        assert_eq!(seen[1].new, ContractStatus::Active);
    }

    #[test]
    fn sub_contractors_attach_only_while_open() {
        let (mut manager, handle) = manager_with_contract();
        assert_eq!(manager.add_sub_contractor(handle, "actor:kess"), Ok(false));

        manager.create(handle, "actor:darya").expect("create");
        assert_eq!(manager.add_sub_contractor(handle, "actor:kess"), Ok(true));
        manager.activate(handle).expect("activate");
        assert_eq!(manager.add_sub_contractor(handle, "actor:brin"), Ok(true));
        manager.finalize(handle).expect("finalize");
        assert_eq!(manager.add_sub_contractor(handle, "actor:late"), Ok(false));

        let record = manager.record(handle).expect("record exists");
        assert_eq!(record.sub_contractors, vec!["actor:kess", "actor:brin"]);
    }

    #[test]
    fn contracts_are_independent() {
        let mut manager = LifecycleManager::new();
        let first = manager.register(CriteriaBinding::default());
        let second = manager.register(CriteriaBinding::default());
        manager.create(first, "actor:darya").expect("create");
        manager.create(second, "actor:kess").expect("create");
        manager.activate(first).expect("activate");
        manager.breach(first).expect("breach");

        assert_eq!(
            manager.record(second).map(|record| record.status),
            Some(ContractStatus::Initiating)
        );
        assert_eq!(manager.activate(second), Ok(true));
    }
}
