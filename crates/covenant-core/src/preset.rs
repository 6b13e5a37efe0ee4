//! Preset catalog: registry of creatable entity presets with capability
//! tags and, for contract-capable presets, the criteria template seeded
//! into a new contract's binding.

use std::collections::BTreeMap;

use covenant_model::CriteriaBinding;

/// Capability tag a preset must declare to be creatable as a contract.
pub const CONTRACT_CAPABILITY: &str = "contract";

#[derive(Debug, Clone)]
pub struct ContractTemplate {
    pub breaching: Vec<String>,
    pub finalizing: Vec<String>,
}

impl ContractTemplate {
    pub fn binding(&self) -> CriteriaBinding {
        CriteriaBinding {
            breaching: self.breaching.clone(),
            finalizing: self.finalizing.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PresetDef {
    pub preset_id: String,
    pub display_name: String,
    pub capabilities: Vec<String>,
    pub contract: Option<ContractTemplate>,
}

impl PresetDef {
    pub fn declares_contract(&self) -> bool {
        self.capabilities
            .iter()
            .any(|capability| capability == CONTRACT_CAPABILITY)
    }
}

#[derive(Debug, Default)]
pub struct PresetCatalog {
    by_id: BTreeMap<String, PresetDef>,
}

impl PresetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a preset definition. Panics on duplicate preset_id.
    pub fn register(&mut self, preset: PresetDef) {
        assert!(
            !self.by_id.contains_key(&preset.preset_id),
            "duplicate preset_id: {}",
            preset.preset_id
        );
        self.by_id.insert(preset.preset_id.clone(), preset);
    }

    pub fn get(&self, preset_id: &str) -> Option<&PresetDef> {
        self.by_id.get(preset_id)
    }

    pub fn presets(&self) -> impl Iterator<Item = &PresetDef> {
        self.by_id.values()
    }

    /// Preset ids declaring the contract capability, lexicographically
    /// sorted. This is the completion candidate list.
    pub fn contract_preset_ids(&self) -> Vec<&str> {
        self.by_id
            .values()
            .filter(|preset| preset.declares_contract())
            .map(|preset| preset.preset_id.as_str())
            .collect()
    }
}

// ---- helper to build a PresetDef concisely ----

fn preset(
    id: &str,
    display: &str,
    capabilities: Vec<&str>,
    contract: Option<(Vec<&str>, Vec<&str>)>,
) -> PresetDef {
    PresetDef {
        preset_id: id.to_string(),
        display_name: display.to_string(),
        capabilities: capabilities.into_iter().map(str::to_string).collect(),
        contract: contract.map(|(breaching, finalizing)| ContractTemplate {
            breaching: breaching.into_iter().map(str::to_string).collect(),
            finalizing: finalizing.into_iter().map(str::to_string).collect(),
        }),
    }
}

/// Build the default preset catalog.
pub fn default_catalog() -> PresetCatalog {
    let mut catalog = PresetCatalog::new();

    catalog.register(preset(
        "contract-basic",
        "Basic Contract",
        vec![CONTRACT_CAPABILITY],
        Some((vec!["basic-oath-broken"], vec!["basic-term-elapsed"])),
    ));
    catalog.register(preset(
        "contract-escort",
        "Escort Contract",
        vec![CONTRACT_CAPABILITY],
        Some((vec!["escort-charge-lost"], vec!["escort-arrived"])),
    ));
    catalog.register(preset(
        "contract-delivery",
        "Delivery Contract",
        vec![CONTRACT_CAPABILITY],
        Some((vec!["delivery-window-expired"], vec!["delivery-received"])),
    ));
    catalog.register(preset(
        "bounty-standard",
        "Standard Bounty",
        vec![CONTRACT_CAPABILITY],
        Some((vec!["bounty-mark-escaped"], vec!["bounty-mark-slain"])),
    ));
    // Non-contract presets: visible to the wider simulation, filtered out
    // of contract completion.
    catalog.register(preset("caravan-standard", "Trade Caravan", vec!["caravan"], None));
    catalog.register(preset("patrol-roadwatch", "Road Watch Patrol", vec!["patrol"], None));

    catalog
}
