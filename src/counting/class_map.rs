use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Semantic class label such as `"Auto"`. Cloning only bumps a refcount.
pub type ClassLabel = Arc<str>;

/// Mapping from tracker class indices to the labels zones count by.
///
/// Detections whose class index is not in the map are ignored by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<u32, String>", into = "BTreeMap<u32, String>")]
pub struct ClassMap {
    labels: BTreeMap<u32, ClassLabel>,
}

impl ClassMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            labels: BTreeMap::new(),
        }
    }

    /// Map `index` to `label`, replacing any previous label.
    pub fn with(mut self, index: u32, label: &str) -> Self {
        self.labels.insert(index, Arc::from(label));
        self
    }

    /// Label for a tracker class index.
    #[inline]
    pub fn label(&self, index: u32) -> Option<&ClassLabel> {
        self.labels.get(&index)
    }

    /// Whether any index maps to `label`.
    pub fn contains_label(&self, label: &str) -> bool {
        self.labels.values().any(|l| l.as_ref() == label)
    }

    /// Number of mapped class indices.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether no class index is mapped.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// COCO indices of the road users the counter cares about, labelled the
/// way the zone editor names them in each zone's `classes`.
impl Default for ClassMap {
    fn default() -> Self {
        Self::new()
            .with(0, "Peaton")
            .with(1, "Bicicleta")
            .with(2, "Auto")
            .with(3, "Moto")
            .with(5, "Colectivo")
            .with(7, "Camion")
    }
}

impl From<BTreeMap<u32, String>> for ClassMap {
    fn from(map: BTreeMap<u32, String>) -> Self {
        Self {
            labels: map
                .into_iter()
                .map(|(index, label)| (index, Arc::from(label)))
                .collect(),
        }
    }
}

impl From<ClassMap> for BTreeMap<u32, String> {
    fn from(map: ClassMap) -> Self {
        map.labels
            .into_iter()
            .map(|(index, label)| (index, label.to_string()))
            .collect()
    }
}
