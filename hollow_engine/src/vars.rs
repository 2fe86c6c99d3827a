use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Session-wide game variables, keyed by integer id.
///
/// Reads of unset keys yield zero; there are no other implicit defaults.
/// The store lives for the whole session and is mutated only through the
/// explicit accessors below, so writes are visible to every subsequent read
/// within the same tick. The full mapping is the save/restore payload for the
/// external persistence layer.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableStore {
    values: BTreeMap<u32, u32>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: u32) -> u32 {
        self.values.get(&key).copied().unwrap_or(0)
    }

    pub fn set(&mut self, key: u32, value: u32) {
        self.values.insert(key, value);
    }

    pub fn add(&mut self, key: u32, delta: u32) {
        let value = self.get(key).wrapping_add(delta);
        self.values.insert(key, value);
    }

    pub fn toggle(&mut self, key: u32) {
        let value = if self.get(key) == 0 { 1 } else { 0 };
        self.values.insert(key, value);
    }

    /// Full key/value mapping, for the persistence layer.
    pub fn snapshot(&self) -> BTreeMap<u32, u32> {
        self.values.clone()
    }

    pub fn restore(snapshot: BTreeMap<u32, u32>) -> Self {
        VariableStore { values: snapshot }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::VariableStore;

    #[test]
    fn unset_keys_read_as_zero() {
        let vars = VariableStore::new();
        assert_eq!(vars.get(1000), 0);
    }

    #[test]
    fn add_accumulates_from_zero() {
        let mut vars = VariableStore::new();
        vars.add(7, 1);
        vars.add(7, 1);
        assert_eq!(vars.get(7), 2);
    }

    #[test]
    fn toggle_flips_between_zero_and_one() {
        let mut vars = VariableStore::new();
        vars.toggle(3);
        assert_eq!(vars.get(3), 1);
        vars.toggle(3);
        assert_eq!(vars.get(3), 0);
    }

    #[test]
    fn snapshot_round_trips() {
        let mut vars = VariableStore::new();
        vars.set(1, 10);
        vars.set(2, 20);
        let restored = VariableStore::restore(vars.snapshot());
        assert_eq!(restored, vars);
    }
}
