//! The GC model: ordered top-level events plus running aggregates.
//!
//! Aggregates are updated as events are added, so every query is a lookup.
//! Top-level events count towards the overall figures and their own category;
//! their children count towards the child's category only.

use super::event::{Category, Event};
use super::stats::Stats;
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregates for one event category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryStats {
    /// Pause durations of every event in the category
    pub pause: Stats,

    /// Known, non-zero total heap sizes in KB
    pub heap_total: Stats,

    /// Pause durations keyed by event type name
    pub by_type: BTreeMap<String, Stats>,
}

impl CategoryStats {
    fn record(&mut self, event: &Event) {
        let pause = event.pause.unwrap_or(0.0);
        self.pause.add(pause);
        self.by_type.entry(event.type_name()).or_default().add(pause);
        if let Some(total) = event.total_kb.filter(|t| *t > 0) {
            self.heap_total.add(total as f64);
        }
    }

    /// Number of distinct event types observed
    pub fn type_count(&self) -> usize {
        self.by_type.len()
    }

    /// Number of events observed
    pub fn occurrences(&self) -> usize {
        self.pause.n()
    }
}

/// Ordered collection of GC events
///
/// **Public** - filled by one of the readers, read by everything else
#[derive(Debug, Clone, PartialEq)]
pub struct GcModel {
    events: Vec<Event>,
    pause: Stats,
    heap_allocated: Stats,
    categories: BTreeMap<Category, CategoryStats>,
}

impl GcModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            pause: Stats::new(),
            heap_allocated: Stats::new(),
            categories: Category::ALL
                .iter()
                .map(|c| (*c, CategoryStats::default()))
                .collect(),
        }
    }

    /// Append a finalized top-level event
    pub fn add(&mut self, event: Event) {
        trace!("Adding event: {} at {}s", event.type_name(), event.timestamp);

        self.pause.add(event.pause.unwrap_or(0.0));
        if let Some(total) = event.total_kb.filter(|t| *t > 0) {
            self.heap_allocated.add(total as f64);
        }
        self.category_mut(event.category()).record(&event);
        for child in &event.children {
            self.category_mut(child.category()).record(child);
        }

        self.events.push(event);
    }

    fn category_mut(&mut self, category: Category) -> &mut CategoryStats {
        self.categories.entry(category).or_default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Top-level event at `index`, in insertion order
    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    pub fn last_event_added(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn events(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Aggregates for `category`
    pub fn category(&self, category: Category) -> &CategoryStats {
        // every category is inserted by new()
        &self.categories[&category]
    }

    /// Stop-the-world pauses by type
    pub fn gc_event_pauses(&self) -> &BTreeMap<String, Stats> {
        &self.category(Category::Pause).by_type
    }

    pub fn full_gc_event_pauses(&self) -> &BTreeMap<String, Stats> {
        &self.category(Category::FullGc).by_type
    }

    pub fn concurrent_event_pauses(&self) -> &BTreeMap<String, Stats> {
        &self.category(Category::Concurrent).by_type
    }

    /// Phases nested under stop-the-world pauses, by type
    pub fn gc_event_phases(&self) -> &BTreeMap<String, Stats> {
        &self.category(Category::PausePhase).by_type
    }

    pub fn gc_pause(&self) -> &Stats {
        &self.category(Category::Pause).pause
    }

    pub fn full_gc_pause(&self) -> &Stats {
        &self.category(Category::FullGc).pause
    }

    pub fn concurrent_pause(&self) -> &Stats {
        &self.category(Category::Concurrent).pause
    }

    /// Every top-level pause, whatever its category
    pub fn pause(&self) -> &Stats {
        &self.pause
    }

    /// Total heap sizes (KB) of top-level events
    pub fn heap_allocated_sizes(&self) -> &Stats {
        &self.heap_allocated
    }

    /// Condense the aggregates for reporting
    ///
    /// **Public** - used by the JSON report and the text summary
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            event_count: self.len(),
            pause: self.pause.clone(),
            heap_allocated: self.heap_allocated.clone(),
            categories: self
                .categories
                .iter()
                .map(|(category, stats)| {
                    (
                        *category,
                        CategorySummary {
                            type_count: stats.type_count(),
                            occurrences: stats.occurrences(),
                            pause: stats.pause.clone(),
                            heap_total: stats.heap_total.clone(),
                        },
                    )
                })
                .collect(),
        }
    }
}

impl Default for GcModel {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a GcModel {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Serializable digest of a model's aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub event_count: usize,
    pub pause: Stats,
    pub heap_allocated: Stats,
    pub categories: BTreeMap<Category, CategorySummary>,
}

/// Per-category part of a [`ModelSummary`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub type_count: usize,
    pub occurrences: usize,
    pub pause: Stats,
    pub heap_total: Stats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::event::EventKind;

    #[test]
    fn test_empty_model() {
        let model = GcModel::new();
        assert!(model.is_empty());
        assert!(model.last_event_added().is_none());
        assert!(model.gc_event_pauses().is_empty());
        assert_eq!(model.pause().n(), 0);
    }

    #[test]
    fn test_children_count_in_their_own_category() {
        let mut cycle = Event::new(EventKind::ZgcGarbageCollection, 0.0).with_pause(0.003);
        cycle.add(Event::new(EventKind::ZgcPauseMarkStart, 0.0).with_pause(0.001));
        cycle.add(Event::new(EventKind::ZgcPauseMarkEnd, 0.0).with_pause(0.002));

        let mut model = GcModel::new();
        model.add(cycle);

        assert_eq!(model.len(), 1);
        assert_eq!(model.gc_pause().n(), 1);
        assert_eq!(model.gc_event_phases().len(), 2);
        assert_eq!(model.category(Category::PausePhase).occurrences(), 2);
        // child pauses are not counted twice in the overall figures
        assert_eq!(model.pause().n(), 1);
    }

    #[test]
    fn test_unknown_pause_counts_as_zero() {
        let mut model = GcModel::new();
        model.add(Event::new(EventKind::AllocationFailure, 0.0));
        assert_eq!(model.gc_pause().n(), 1);
        assert_eq!(model.gc_pause().sum(), 0.0);
    }

    #[test]
    fn test_heap_sizes_skip_unknown_and_zero() {
        let mut model = GcModel::new();
        model.add(Event::new(EventKind::FullGc, 0.0).with_memory(10, 5, 0));
        model.add(Event::new(EventKind::FullGc, 1.0));
        model.add(Event::new(EventKind::FullGc, 2.0).with_memory(10, 5, 4096));

        assert_eq!(model.heap_allocated_sizes().n(), 1);
        assert_eq!(model.heap_allocated_sizes().max(), 4096.0);
        assert_eq!(model.category(Category::FullGc).heap_total.n(), 1);
    }

    #[test]
    fn test_summary_lists_every_category() {
        let model = GcModel::new();
        let summary = model.summary();
        assert_eq!(summary.categories.len(), Category::ALL.len());
        assert_eq!(summary.event_count, 0);
    }
}
