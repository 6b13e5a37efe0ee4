//! Operator console: the facade human operators (and the admin API) drive.
//!
//! Owns the lifecycle manager plus its injected collaborators — preset
//! catalog, criteria registry, identity directory — and exposes the
//! `create`/`list` command surface and name completion. Invalid arguments
//! surface as operator-facing text and never mutate state.

use std::fmt;

use covenant_model::{
    ContractHandle, ContractSnapshot, CriteriaBinding, ErrorCode, SCHEMA_VERSION_V1,
};

use crate::criteria::{CriteriaRegistry, FactView, SweepOutcome};
use crate::identity::IdentityDirectory;
use crate::lifecycle::LifecycleManager;
use crate::preset::PresetCatalog;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    PresetNotFound(String),
    NotAContractPreset(String),
    UnknownIdentity(String),
    MindRequired(String),
    InvalidArguments { usage: &'static str },
    UnknownCommand(String),
}

impl ConsoleError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::PresetNotFound(_) => ErrorCode::PresetNotFound,
            Self::NotAContractPreset(_) => ErrorCode::InvalidCommand,
            Self::UnknownIdentity(_) => ErrorCode::UnknownIdentity,
            Self::MindRequired(_) => ErrorCode::MindRequired,
            Self::InvalidArguments { .. } => ErrorCode::InvalidCommand,
            Self::UnknownCommand(_) => ErrorCode::InvalidCommand,
        }
    }
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PresetNotFound(preset_id) => write!(f, "unknown preset: {preset_id}"),
            Self::NotAContractPreset(preset_id) => {
                write!(f, "preset does not declare the contract capability: {preset_id}")
            }
            Self::UnknownIdentity(name) => write!(f, "no such identity: {name}"),
            Self::MindRequired(name) => {
                write!(f, "identity has no mind attached: {name}")
            }
            Self::InvalidArguments { usage } => write!(f, "usage: {usage}"),
            Self::UnknownCommand(command) => write!(f, "unknown command: {command}"),
        }
    }
}

impl std::error::Error for ConsoleError {}

#[derive(Debug)]
pub struct OperatorConsole {
    manager: LifecycleManager,
    presets: PresetCatalog,
    criteria: CriteriaRegistry,
    identities: IdentityDirectory,
}

impl OperatorConsole {
    pub fn new(
        presets: PresetCatalog,
        criteria: CriteriaRegistry,
        identities: IdentityDirectory,
    ) -> Self {
        Self {
            manager: LifecycleManager::new(),
            presets,
            criteria,
            identities,
        }
    }

    /// Console over the shipped preset catalog and criteria registry.
    pub fn with_defaults(identities: IdentityDirectory) -> Self {
        Self::new(
            crate::preset::default_catalog(),
            crate::criteria::default_registry(),
            identities,
        )
    }

    pub fn manager(&self) -> &LifecycleManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut LifecycleManager {
        &mut self.manager
    }

    pub fn criteria(&self) -> &CriteriaRegistry {
        &self.criteria
    }

    /// Resolve a preset and owner, then register and create the contract.
    /// The new contract is left in Initiating; activation is a separate,
    /// explicit step.
    pub fn create(
        &mut self,
        preset_id: &str,
        owner_name: &str,
    ) -> Result<ContractHandle, ConsoleError> {
        let preset = self
            .presets
            .get(preset_id)
            .ok_or_else(|| ConsoleError::PresetNotFound(preset_id.to_string()))?;
        if !preset.declares_contract() {
            return Err(ConsoleError::NotAContractPreset(preset_id.to_string()));
        }

        let entry = self
            .identities
            .resolve(owner_name)
            .ok_or_else(|| ConsoleError::UnknownIdentity(owner_name.to_string()))?;
        if !entry.has_mind {
            return Err(ConsoleError::MindRequired(owner_name.to_string()));
        }
        let owner_id = entry.actor_id.clone();

        // A contract-capable preset without a template is a content
        // defect, not a runtime condition. Fatal in development; in
        // release the contract proceeds with an empty binding.
        debug_assert!(
            preset.contract.is_some(),
            "preset {preset_id} declares the contract capability but carries no template"
        );
        let binding = preset
            .contract
            .as_ref()
            .map(|template| template.binding())
            .unwrap_or_else(CriteriaBinding::default);

        let handle = self.manager.register(binding);
        let created = self.manager.create(handle, owner_id).unwrap_or(false);
        debug_assert!(created, "freshly registered contract must accept create");
        Ok(handle)
    }

    /// Listing view of one contract, with criterion identifiers resolved
    /// to descriptions; unresolvable identifiers are silently skipped.
    pub fn snapshot(&self, handle: ContractHandle) -> Option<ContractSnapshot> {
        let record = self.manager.record(handle)?;
        Some(ContractSnapshot {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            handle,
            status: record.status,
            owner_label: record
                .owning_contractor
                .as_deref()
                .map(|actor_id| self.identities.label(actor_id)),
            sub_contractor_labels: record
                .sub_contractors
                .iter()
                .map(|actor_id| self.identities.label(actor_id))
                .collect(),
            breaching_descriptions: record
                .criteria
                .breaching
                .iter()
                .filter_map(|criterion_id| self.criteria.display(criterion_id))
                .map(str::to_string)
                .collect(),
            finalizing_descriptions: record
                .criteria
                .finalizing
                .iter()
                .filter_map(|criterion_id| self.criteria.display(criterion_id))
                .map(str::to_string)
                .collect(),
        })
    }

    pub fn snapshots(&self) -> Vec<ContractSnapshot> {
        self.manager
            .handles()
            .into_iter()
            .filter_map(|handle| self.snapshot(handle))
            .collect()
    }

    /// One line per contract, for the operator's `list` command.
    pub fn render_list(&self) -> String {
        let snapshots = self.snapshots();
        if snapshots.is_empty() {
            return "no contracts".to_string();
        }
        snapshots
            .iter()
            .map(|snapshot| {
                format!(
                    "{} {} owner={} subs=[{}] breach=[{}] finalize=[{}]",
                    snapshot.handle,
                    snapshot.status,
                    snapshot.owner_label.as_deref().unwrap_or("-"),
                    snapshot.sub_contractor_labels.join(", "),
                    snapshot.breaching_descriptions.join("; "),
                    snapshot.finalizing_descriptions.join("; "),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Completion candidates for the `create` command: argument 0 is the
    /// contract-capable preset ids, argument 1 the connected identity
    /// names. Both sorted lexicographically; pure suggestion, no state
    /// effect.
    pub fn complete(&self, arg_index: usize, prefix: &str) -> Vec<String> {
        let candidates: Vec<&str> = match arg_index {
            0 => self.presets.contract_preset_ids(),
            1 => self.identities.connected_names(),
            _ => Vec::new(),
        };
        candidates
            .into_iter()
            .filter(|candidate| candidate.starts_with(prefix))
            .map(str::to_string)
            .collect()
    }

    /// Run one criteria evaluation pass over all contracts.
    pub fn sweep(&mut self, facts: &FactView) -> SweepOutcome {
        self.criteria.sweep(&mut self.manager, facts)
    }

    /// Parse and execute one operator command line.
    pub fn execute(&mut self, line: &str) -> Result<String, ConsoleError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["create", preset_id, owner_name] => {
                let handle = self.create(preset_id, owner_name)?;
                let owner_label = self
                    .snapshot(handle)
                    .and_then(|snapshot| snapshot.owner_label)
                    .unwrap_or_else(|| "-".to_string());
                Ok(format!(
                    "created {handle} status=initiating owner={owner_label}"
                ))
            }
            ["create", ..] => Err(ConsoleError::InvalidArguments {
                usage: "create <preset_id> <owner>",
            }),
            ["list"] => Ok(self.render_list()),
            ["list", ..] => Err(ConsoleError::InvalidArguments { usage: "list" }),
            [] => Err(ConsoleError::UnknownCommand(String::new())),
            [command, ..] => Err(ConsoleError::UnknownCommand((*command).to_string())),
        }
    }
}
