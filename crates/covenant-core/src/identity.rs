//! In-memory identity directory: the minimal query surface the operator
//! console needs over the surrounding simulation's actor identities.

use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct IdentityEntry {
    pub actor_id: String,
    pub label: String,
    /// Whether a mind/controller is attached. Contracts can only be bound
    /// to controllable actors.
    pub has_mind: bool,
    /// Whether the identity is currently connected; only connected names
    /// appear in completion.
    pub connected: bool,
}

#[derive(Debug, Default)]
pub struct IdentityDirectory {
    by_name: BTreeMap<String, IdentityEntry>,
}

impl IdentityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: IdentityEntry) {
        self.by_name.insert(name.into(), entry);
    }

    pub fn resolve(&self, name: &str) -> Option<&IdentityEntry> {
        self.by_name.get(name)
    }

    /// Display label for an actor id, falling back to the raw id when the
    /// actor is not (or no longer) known to the directory.
    pub fn label(&self, actor_id: &str) -> String {
        self.by_name
            .values()
            .find(|entry| entry.actor_id == actor_id)
            .map(|entry| entry.label.clone())
            .unwrap_or_else(|| actor_id.to_string())
    }

    /// Connected identity names, lexicographically sorted.
    pub fn connected_names(&self) -> Vec<&str> {
        self.by_name
            .iter()
            .filter(|(_, entry)| entry.connected)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

fn entry(actor_id: &str, label: &str, has_mind: bool, connected: bool) -> IdentityEntry {
    IdentityEntry {
        actor_id: actor_id.to_string(),
        label: label.to_string(),
        has_mind,
        connected,
    }
}

/// Small fixed directory used by the CLI demo and the default admin
/// surface; real deployments populate the directory from the simulation.
pub fn demo_directory() -> IdentityDirectory {
    let mut directory = IdentityDirectory::new();
    directory.insert("darya", entry("actor:darya", "Darya Venn", true, true));
    directory.insert("kess", entry("actor:kess", "Kess of Saltmere", true, true));
    directory.insert("brin", entry("actor:brin", "Brin Halloway", true, false));
    // A body with no mind attached; resolvable but not contract-capable.
    directory.insert("husk", entry("actor:husk", "Abandoned Husk", false, true));
    directory
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_and_label_round_trip() {
        let directory = demo_directory();
        let darya = directory.resolve("darya").expect("known identity");
        assert_eq!(darya.actor_id, "actor:darya");
        assert_eq!(directory.label("actor:darya"), "Darya Venn");
    }

    #[test]
    fn unknown_actor_label_falls_back_to_raw_id() {
        let directory = demo_directory();
        assert_eq!(directory.label("actor:stranger"), "actor:stranger");
    }

    #[test]
    fn connected_names_are_sorted_and_exclude_offline() {
        let directory = demo_directory();
        assert_eq!(directory.connected_names(), vec!["darya", "husk", "kess"]);
    }
}
