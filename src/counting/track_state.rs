use std::collections::{BTreeSet, HashMap};

use crate::counting::class_map::ClassLabel;
use crate::counting::geometry::Point;

/// Identifier assigned by the external tracker.
pub type TrackId = u64;

/// Everything the counter remembers about one track.
#[derive(Debug, Clone)]
pub struct TrackState {
    /// Anchor point from the most recent observation
    last_position: Point,
    /// One label per frame the track was seen, in arrival order
    class_history: Vec<ClassLabel>,
    /// Per-label frequency in first-seen order
    tallies: Vec<(ClassLabel, u32)>,
    /// Zones this track has already been counted in
    credited_zones: BTreeSet<usize>,
}

impl TrackState {
    fn new(position: Point) -> Self {
        Self {
            last_position: position,
            class_history: Vec::new(),
            tallies: Vec::new(),
            credited_zones: BTreeSet::new(),
        }
    }

    fn push_label(&mut self, label: ClassLabel) {
        match self.tallies.iter_mut().find(|(l, _)| *l == label) {
            Some((_, count)) => *count += 1,
            None => self.tallies.push((label.clone(), 1)),
        }
        self.class_history.push(label);
    }

    /// Anchor point at the most recent observation.
    pub fn last_position(&self) -> Point {
        self.last_position
    }

    /// Every label observed for this track, oldest first.
    pub fn class_history(&self) -> &[ClassLabel] {
        &self.class_history
    }

    /// Indices of the zones this track has been counted in.
    pub fn credited_zones(&self) -> impl Iterator<Item = usize> + '_ {
        self.credited_zones.iter().copied()
    }

    /// Most frequent label so far.
    ///
    /// On a tie the label that first appeared earliest in the history wins.
    /// `None` only before the first observation.
    pub fn majority_class(&self) -> Option<&ClassLabel> {
        let mut best: Option<&(ClassLabel, u32)> = None;
        for tally in &self.tallies {
            if best.is_none_or(|b| tally.1 > b.1) {
                best = Some(tally);
            }
        }
        best.map(|(label, _)| label)
    }
}

/// Per-session store of track state, keyed by tracker id.
///
/// Entries are never evicted: memory grows with the number of distinct ids
/// the tracker emits and with each track's lifetime in frames.
#[derive(Debug, Default)]
pub struct TrackStore {
    tracks: HashMap<TrackId, TrackState>,
}

impl TrackStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation and return the position stored before it.
    ///
    /// A track seen for the first time returns its current position, so its
    /// first trajectory segment is a single point.
    pub fn observe(&mut self, track_id: TrackId, position: Point, label: ClassLabel) -> Point {
        let track = self
            .tracks
            .entry(track_id)
            .or_insert_with(|| TrackState::new(position));
        let previous = track.last_position;
        track.push_label(label);
        track.last_position = position;
        previous
    }

    /// Mark `zone` as counted for `track_id`. Idempotent.
    pub fn credit(&mut self, track_id: TrackId, zone: usize) {
        if let Some(track) = self.tracks.get_mut(&track_id) {
            track.credited_zones.insert(zone);
        }
    }

    /// Whether `track_id` has already been counted in `zone`.
    pub fn is_credited(&self, track_id: TrackId, zone: usize) -> bool {
        self.tracks
            .get(&track_id)
            .is_some_and(|t| t.credited_zones.contains(&zone))
    }

    /// Majority class of a track; see [`TrackState::majority_class`].
    pub fn resolve_majority_class(&self, track_id: TrackId) -> Option<&ClassLabel> {
        self.tracks.get(&track_id)?.majority_class()
    }

    /// State of a track, if it has been observed.
    pub fn get(&self, track_id: TrackId) -> Option<&TrackState> {
        self.tracks.get(&track_id)
    }

    /// Number of tracks observed.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether no track has been observed.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
