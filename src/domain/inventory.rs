//! Static node inventory, indexed by every identity key a node carries.
//!
//! A node may be identified by a stable `id`, a transient `uuid`, or both.
//! The index stores the same record under each key that is present, so a
//! streaming record can be matched through either one.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::warn;

use crate::client::MonitorClient;
use crate::domain::key_string;

pub type StaticRecord = Map<String, Value>;

#[derive(Debug, Default)]
pub struct Inventory {
    index: HashMap<String, StaticRecord>,
    /// Distinct nodes, as opposed to index entries.
    node_count: usize,
}

impl Inventory {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: &[Map<String, Value>]) -> Self {
        let mut index = HashMap::new();
        for node in nodes {
            for key_field in ["id", "uuid"] {
                if let Some(key) = node.get(key_field).and_then(key_string) {
                    index.insert(key, node.clone());
                }
            }
        }
        Self {
            index,
            node_count: nodes.len(),
        }
    }

    pub fn lookup(&self, key: &str) -> Option<&StaticRecord> {
        self.index.get(key)
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Fetch the inventory for one invocation. A failure here is non-fatal to
/// the realtime flow — it only means backfill finds no matches — so it is
/// logged and an empty index returned.
pub async fn fetch(client: &MonitorClient) -> Inventory {
    match client.nodes().await {
        Ok(nodes) => {
            let inventory = Inventory::from_nodes(&nodes);
            if inventory.is_empty() {
                warn!("static inventory contains no addressable nodes");
            }
            inventory
        }
        Err(e) => {
            warn!(error = %e, "static inventory fetch failed, telemetry will not be backfilled");
            Inventory::empty()
        }
    }
}
