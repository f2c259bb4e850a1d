//! Zone definitions and the validated, immutable zone registry.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::counting::class_map::ClassLabel;
use crate::counting::geometry::Point;

/// Shape of a counting zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneKind {
    /// Counts tracks whose trajectory crosses a segment.
    Line,
    /// Counts tracks whose anchor point is inside a closed polygon.
    Polygon,
}

/// Vertex as it appears in zone configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZonePoint {
    pub x: f32,
    pub y: f32,
}

/// One zone as uploaded by the user.
///
/// ```json
/// { "name": "North exit", "type": "Line",
///   "points": [{"x": 0, "y": 10}, {"x": 100, "y": 10}],
///   "classes": ["Auto", "Colectivo"] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: ZoneKind,
    pub points: Vec<ZonePoint>,
    #[serde(default)]
    pub classes: Vec<String>,
}

/// Rejected zone configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("zone {zone}: a line needs exactly 2 points, got {got}")]
    LineArity { zone: usize, got: usize },
    #[error("zone {zone}: a polygon needs at least 3 points, got {got}")]
    PolygonTooSmall { zone: usize, got: usize },
    #[error("zone {zone}: point {point} has a non-finite coordinate")]
    NonFiniteCoordinate { zone: usize, point: usize },
    #[error("invalid zone configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A validated zone.
#[derive(Debug, Clone)]
pub struct Zone {
    name: String,
    kind: ZoneKind,
    boundary: Vec<Point>,
    eligible: BTreeSet<ClassLabel>,
}

impl Zone {
    fn from_spec(index: usize, spec: &ZoneSpec) -> Result<Self, ConfigError> {
        let got = spec.points.len();
        match spec.kind {
            ZoneKind::Line if got != 2 => return Err(ConfigError::LineArity { zone: index, got }),
            ZoneKind::Polygon if got < 3 => {
                return Err(ConfigError::PolygonTooSmall { zone: index, got });
            }
            _ => {}
        }
        if let Some(point) = spec
            .points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(ConfigError::NonFiniteCoordinate { zone: index, point });
        }

        let name = spec
            .name
            .clone()
            .unwrap_or_else(|| format!("Zone {}", index + 1));
        let eligible: BTreeSet<ClassLabel> =
            spec.classes.iter().map(|c| ClassLabel::from(c.as_str())).collect();
        if eligible.is_empty() {
            warn!(zone = index, %name, "zone has no eligible classes and will never count");
        }

        Ok(Self {
            name,
            kind: spec.kind,
            boundary: spec.points.iter().map(|p| Point::new(p.x, p.y)).collect(),
            eligible,
        })
    }

    /// Display name, `Zone N` when none was given.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is a line or a polygon.
    pub fn kind(&self) -> ZoneKind {
        self.kind
    }

    /// Two points for a line, three or more for a polygon.
    pub fn boundary(&self) -> &[Point] {
        &self.boundary
    }

    /// Labels this zone counts, sorted.
    pub fn eligible_classes(&self) -> impl Iterator<Item = &ClassLabel> {
        self.eligible.iter()
    }

    /// Whether this zone counts objects of class `label`.
    #[inline]
    pub fn accepts(&self, label: &str) -> bool {
        self.eligible.contains(label)
    }
}

/// Ordered, immutable list of zones for one session.
///
/// A zone's position in the registry is its index in the counts table.
#[derive(Debug, Clone, Default)]
pub struct ZoneRegistry {
    zones: Vec<Zone>,
}

impl ZoneRegistry {
    /// Validate every spec, keeping configuration order.
    pub fn from_specs(specs: &[ZoneSpec]) -> Result<Self, ConfigError> {
        let zones = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| Zone::from_spec(index, spec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { zones })
    }

    /// Parse a JSON array of zone specs and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let specs: Vec<ZoneSpec> = serde_json::from_str(json)?;
        Self::from_specs(&specs)
    }

    /// Zone at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Zone> {
        self.zones.get(index)
    }

    /// Zones with their indices, in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Zone)> {
        self.zones.iter().enumerate()
    }

    /// Number of zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether the registry has no zones.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
