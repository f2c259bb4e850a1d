//! Per-zone, per-class counters and the shared read-only view of them.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::counting::zone::{ZoneKind, ZoneRegistry};

/// `zone index -> class label -> count`.
///
/// Serializes to the same JSON object shape the live counts endpoint
/// returns: `{"0": {"Auto": 3, "Colectivo": 0}, "1": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CountsTable {
    zones: BTreeMap<usize, BTreeMap<String, u64>>,
}

impl CountsTable {
    /// Zero counter for every eligible class of every zone.
    pub fn for_registry(registry: &ZoneRegistry) -> Self {
        let zones = registry
            .iter()
            .map(|(index, zone)| {
                let classes = zone
                    .eligible_classes()
                    .map(|label| (label.to_string(), 0))
                    .collect();
                (index, classes)
            })
            .collect();
        Self { zones }
    }

    /// Add one to a cell. Returns false if the cell was never initialised,
    /// i.e. the class is not eligible for that zone.
    pub(crate) fn increment(&mut self, zone: usize, class: &str) -> bool {
        match self.zones.get_mut(&zone).and_then(|z| z.get_mut(class)) {
            Some(count) => {
                *count += 1;
                true
            }
            None => false,
        }
    }

    /// Count for `class` in `zone`; `None` when the zone does not count that class.
    pub fn get(&self, zone: usize, class: &str) -> Option<u64> {
        self.zones.get(&zone)?.get(class).copied()
    }

    /// Counts of one zone, by class.
    pub fn zone(&self, zone: usize) -> Option<&BTreeMap<String, u64>> {
        self.zones.get(&zone)
    }

    /// Sum over all zones and classes.
    pub fn total(&self) -> u64 {
        self.zones.values().flat_map(|z| z.values()).sum()
    }

    /// Zones in index order with their per-class counts.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeMap<String, u64>)> {
        self.zones.iter().map(|(index, classes)| (*index, classes))
    }
}

/// Cloneable live view of a session's counts.
///
/// The engine publishes a new snapshot after each frame that changed a
/// counter; readers only ever see whole frames.
#[derive(Debug, Clone, Default)]
pub struct CountsHandle {
    current: Arc<RwLock<Arc<CountsTable>>>,
}

impl CountsHandle {
    /// Create a handle publishing `initial` as the first snapshot.
    pub fn new(initial: CountsTable) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// Latest published counts.
    pub fn snapshot(&self) -> Arc<CountsTable> {
        self.current.read().clone()
    }

    pub(crate) fn publish(&self, table: CountsTable) {
        *self.current.write() = Arc::new(table);
    }
}

/// One row of a [`CountsReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneCounts {
    pub index: usize,
    pub name: String,
    pub kind: ZoneKind,
    pub counts: BTreeMap<String, u64>,
    pub total: u64,
}

/// Counts joined with zone names, one row per zone in registry order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountsReport {
    pub zones: Vec<ZoneCounts>,
    pub total: u64,
}

impl CountsReport {
    /// Join `table` with the zone names and kinds of `registry`.
    pub fn new(registry: &ZoneRegistry, table: &CountsTable) -> Self {
        let zones: Vec<ZoneCounts> = registry
            .iter()
            .map(|(index, zone)| {
                let counts = table.zone(index).cloned().unwrap_or_default();
                let total = counts.values().sum();
                ZoneCounts {
                    index,
                    name: zone.name().to_string(),
                    kind: zone.kind(),
                    counts,
                    total,
                }
            })
            .collect();
        let total = zones.iter().map(|z| z.total).sum();
        Self { zones, total }
    }
}
