//! In-process hive engine.
//!
//! Keeps the key tree in memory, applies the regf name collation and saves a
//! JSON snapshot of the logical content instead of a binary hive. Scenario
//! tests run against it, and `--engine memory` uses it on hosts without the
//! Offline Registry Library.
use super::{EngineError, HiveEngine, KeyOptions, OsVersion, ValueType};
use crate::collation::{compare_names, names_equal};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Handle to an open key of a [`MemoryHive`].
#[derive(Debug)]
pub struct MemoryKey {
    id: usize,
    node: usize,
}

#[derive(Debug)]
struct Node {
    name: String,
    parent: Option<usize>,
    // Kept sorted by collation, the order a regf subkey list uses.
    subkeys: Vec<usize>,
    values: Vec<ValueSnapshot>,
}

#[derive(Debug, Default)]
struct State {
    nodes: Vec<Node>,
    open: BTreeMap<usize, usize>,
    next_handle: usize,
    #[cfg(test)]
    close_log: Vec<String>,
}

impl State {
    fn node_of(&self, handle: &MemoryKey) -> Result<usize, EngineError> {
        match self.open.get(&handle.id) {
            Some(&node) if node == handle.node => Ok(node),
            _ => Err(EngineError::UnknownHandle(handle.id)),
        }
    }

    fn open_handle(&mut self, node: usize) -> MemoryKey {
        let id = self.next_handle;
        self.next_handle += 1;
        self.open.insert(id, node);
        MemoryKey { id, node }
    }

    fn path_of(&self, mut node: usize) -> String {
        let mut parts = Vec::new();
        while let Some(parent) = self.nodes[node].parent {
            parts.push(self.nodes[node].name.as_str());
            node = parent;
        }
        parts.reverse();
        parts.join("\\")
    }

    fn snapshot(&self, node: usize) -> KeySnapshot {
        let node = &self.nodes[node];
        KeySnapshot {
            name: node.name.clone(),
            values: node.values.clone(),
            subkeys: node
                .subkeys
                .iter()
                .map(|&child| self.snapshot(child))
                .collect(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryHive {
    state: RefCell<State>,
}

impl MemoryHive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles not yet closed.
    #[cfg(test)]
    pub fn open_handles(&self) -> usize {
        self.state.borrow().open.len()
    }

    /// Backslash-separated paths of closed keys, in close order.
    ///
    /// Root handles are logged as an empty path.
    #[cfg(test)]
    pub fn close_log(&self) -> Vec<String> {
        self.state.borrow().close_log.clone()
    }

    /// Logical content of the tree below `root`.
    pub fn snapshot(&self, root: &MemoryKey, version: OsVersion) -> Result<HiveSnapshot, EngineError> {
        let state = self.state.borrow();
        let node = state.node_of(root)?;
        Ok(HiveSnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            os_version: version,
            root: state.snapshot(node),
        })
    }
}

impl HiveEngine for MemoryHive {
    type Handle = MemoryKey;

    fn name(&self) -> &'static str {
        "memory"
    }

    fn create_hive(&self) -> Result<MemoryKey, EngineError> {
        let mut state = self.state.borrow_mut();
        let node = state.nodes.len();
        state.nodes.push(Node {
            name: String::new(),
            parent: None,
            subkeys: Vec::new(),
            values: Vec::new(),
        });
        Ok(state.open_handle(node))
    }

    fn create_key(
        &self,
        parent: &MemoryKey,
        name: &str,
        _options: KeyOptions,
    ) -> Result<MemoryKey, EngineError> {
        if name.contains('\0') {
            return Err(EngineError::InvalidName(name.to_string()));
        }
        let mut state = self.state.borrow_mut();
        let parent = state.node_of(parent)?;

        let position = state.nodes[parent]
            .subkeys
            .binary_search_by(|&child| compare_names(&state.nodes[child].name, name));
        let node = match position {
            Ok(index) => state.nodes[parent].subkeys[index],
            Err(index) => {
                let node = state.nodes.len();
                state.nodes.push(Node {
                    name: name.to_string(),
                    parent: Some(parent),
                    subkeys: Vec::new(),
                    values: Vec::new(),
                });
                state.nodes[parent].subkeys.insert(index, node);
                node
            }
        };
        Ok(state.open_handle(node))
    }

    fn set_value(
        &self,
        key: &MemoryKey,
        name: &str,
        value_type: ValueType,
        data: &[u8],
    ) -> Result<(), EngineError> {
        if name.contains('\0') {
            return Err(EngineError::InvalidName(name.to_string()));
        }
        let mut state = self.state.borrow_mut();
        let node = state.node_of(key)?;
        let value = ValueSnapshot {
            name: name.to_string(),
            value_type,
            data: data.to_vec(),
        };
        let values = &mut state.nodes[node].values;
        match values
            .iter_mut()
            .find(|existing| names_equal(&existing.name, name))
        {
            Some(existing) => *existing = value,
            None => values.push(value),
        }
        Ok(())
    }

    fn close_key(&self, handle: MemoryKey) -> Result<(), EngineError> {
        let mut state = self.state.borrow_mut();
        let node = state.node_of(&handle)?;
        state.open.remove(&handle.id);
        let path = state.path_of(node);
        tracing::trace!(key = %path, "closed key");
        #[cfg(test)]
        state.close_log.push(path);
        Ok(())
    }

    fn save_hive(
        &self,
        root: &MemoryKey,
        path: &Path,
        version: OsVersion,
    ) -> Result<(), EngineError> {
        let snapshot = self.snapshot(root, version)?;
        let json = serde_json::to_vec_pretty(&snapshot).map_err(std::io::Error::from)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Logical content of a saved hive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiveSnapshot {
    pub schema_version: u32,
    pub os_version: OsVersion,
    pub root: KeySnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySnapshot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ValueSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subkeys: Vec<KeySnapshot>,
}

#[cfg(test)]
impl KeySnapshot {
    pub fn subkey(&self, name: &str) -> Option<&KeySnapshot> {
        self.subkeys
            .iter()
            .find(|subkey| names_equal(&subkey.name, name))
    }

    /// Resolves a backslash-separated path below this key.
    pub fn subpath(&self, path: &str) -> Option<&KeySnapshot> {
        path.split('\\')
            .filter(|component| !component.is_empty())
            .try_fold(self, |key, component| key.subkey(component))
    }

    pub fn value(&self, name: &str) -> Option<&ValueSnapshot> {
        self.values.iter().find(|value| names_equal(&value.name, name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSnapshot {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        BASE64.decode(encoded.as_bytes()).map_err(de::Error::custom)
    }
}
