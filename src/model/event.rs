//! GC event types.
//!
//! An [`Event`] is one measured collection or phase. Composite events own
//! their detail/phase children; nothing else points at a child.

use serde::{Deserialize, Serialize};

/// Statistics grouping of an event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Stop-the-world pause
    Pause,
    /// Full (global) collection
    FullGc,
    /// Work done alongside application threads
    Concurrent,
    /// Stop-the-world sub-phase nested under a pause
    PausePhase,
    /// Young/old generation breakdown nested under a collection
    GenerationDetail,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Pause,
        Category::FullGc,
        Category::Concurrent,
        Category::PausePhase,
        Category::GenerationDetail,
    ];
}

/// Heap generation an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Generation {
    Young,
    Tenured,
    Unknown,
}

/// Kind of GC event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    FullGc,
    /// Collection attempt that was not classified as global
    AllocationFailure,
    YoungGenDetail,
    OldGenDetail,
    // ZGC (unified logging)
    ZgcGarbageCollection,
    ZgcPauseMarkStart,
    ZgcPauseMarkEnd,
    ZgcPauseRelocateStart,
    ZgcConcurrentMark,
    ZgcConcurrentMarkFree,
    ZgcConcurrentNonref,
    ZgcConcurrentResetRelocSet,
    ZgcConcurrentDetachedPages,
    ZgcConcurrentSelectRelocSet,
    ZgcConcurrentPrepareRelocSet,
    ZgcConcurrentRelocate,
    ZgcAllocationStall,
    ZgcRelocationStall,
}

impl EventKind {
    /// ZGC phase lines, each written as "<name> <duration>ms"
    pub const ZGC_PHASES: [EventKind; 13] = [
        EventKind::ZgcPauseMarkStart,
        EventKind::ZgcPauseMarkEnd,
        EventKind::ZgcPauseRelocateStart,
        EventKind::ZgcConcurrentMark,
        EventKind::ZgcConcurrentMarkFree,
        EventKind::ZgcConcurrentNonref,
        EventKind::ZgcConcurrentResetRelocSet,
        EventKind::ZgcConcurrentDetachedPages,
        EventKind::ZgcConcurrentSelectRelocSet,
        EventKind::ZgcConcurrentPrepareRelocSet,
        EventKind::ZgcConcurrentRelocate,
        EventKind::ZgcAllocationStall,
        EventKind::ZgcRelocationStall,
    ];

    /// Name as it appears in the log
    pub fn name(&self) -> &'static str {
        match self {
            Self::FullGc => "Full GC",
            Self::AllocationFailure => "GC",
            Self::YoungGenDetail => "Young Generation",
            Self::OldGenDetail => "Old Generation",
            Self::ZgcGarbageCollection => "Garbage Collection",
            Self::ZgcPauseMarkStart => "Pause Mark Start",
            Self::ZgcPauseMarkEnd => "Pause Mark End",
            Self::ZgcPauseRelocateStart => "Pause Relocate Start",
            Self::ZgcConcurrentMark => "Concurrent Mark",
            Self::ZgcConcurrentMarkFree => "Concurrent Mark Free",
            Self::ZgcConcurrentNonref => "Concurrent Process Non-Strong References",
            Self::ZgcConcurrentResetRelocSet => "Concurrent Reset Relocation Set",
            Self::ZgcConcurrentDetachedPages => "Concurrent Destroy Detached Pages",
            Self::ZgcConcurrentSelectRelocSet => "Concurrent Select Relocation Set",
            Self::ZgcConcurrentPrepareRelocSet => "Concurrent Prepare Relocation Set",
            Self::ZgcConcurrentRelocate => "Concurrent Relocate",
            Self::ZgcAllocationStall => "Allocation Stall",
            Self::ZgcRelocationStall => "Relocation Stall",
        }
    }

    /// Statistics grouping for this kind
    pub fn category(&self) -> Category {
        match self {
            Self::FullGc => Category::FullGc,
            Self::AllocationFailure
            | Self::ZgcGarbageCollection
            | Self::ZgcAllocationStall
            | Self::ZgcRelocationStall => Category::Pause,
            Self::YoungGenDetail | Self::OldGenDetail => Category::GenerationDetail,
            Self::ZgcPauseMarkStart | Self::ZgcPauseMarkEnd | Self::ZgcPauseRelocateStart => {
                Category::PausePhase
            }
            Self::ZgcConcurrentMark
            | Self::ZgcConcurrentMarkFree
            | Self::ZgcConcurrentNonref
            | Self::ZgcConcurrentResetRelocSet
            | Self::ZgcConcurrentDetachedPages
            | Self::ZgcConcurrentSelectRelocSet
            | Self::ZgcConcurrentPrepareRelocSet
            | Self::ZgcConcurrentRelocate => Category::Concurrent,
        }
    }

    /// Generation an event of this kind describes by default
    pub fn generation(&self) -> Generation {
        match self {
            Self::YoungGenDetail => Generation::Young,
            Self::AllocationFailure => Generation::Unknown,
            _ => Generation::Tenured,
        }
    }

    pub fn is_stop_the_world(&self) -> bool {
        matches!(
            self.category(),
            Category::Pause | Category::FullGc | Category::PausePhase
        )
    }
}

/// One GC occurrence or phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,

    /// Trigger cause or stalled thread, if the log names one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,

    /// Seconds since the start of the parse session
    pub timestamp: f64,

    /// Pause (or concurrent work) duration in seconds
    pub pause: Option<f64>,

    pub pre_used_kb: Option<i64>,
    pub post_used_kb: Option<i64>,
    pub total_kb: Option<i64>,

    pub generation: Generation,

    /// Detail or phase events owned by this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Event>,
}

impl Event {
    /// Create a leaf event with every figure unknown
    pub fn new(kind: EventKind, timestamp: f64) -> Self {
        Self {
            kind,
            cause: None,
            timestamp,
            pause: None,
            pre_used_kb: None,
            post_used_kb: None,
            total_kb: None,
            generation: kind.generation(),
            children: Vec::new(),
        }
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn with_pause(mut self, seconds: f64) -> Self {
        self.pause = Some(seconds);
        self
    }

    pub fn with_memory(mut self, pre_used_kb: i64, post_used_kb: i64, total_kb: i64) -> Self {
        self.pre_used_kb = Some(pre_used_kb);
        self.post_used_kb = Some(post_used_kb);
        self.total_kb = Some(total_kb);
        self
    }

    /// Append a detail/phase event
    pub fn add(&mut self, child: Event) {
        self.children.push(child);
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// Name used to group events of the same type, e.g. "Garbage Collection (Warmup)"
    pub fn type_name(&self) -> String {
        match &self.cause {
            Some(cause) => format!("{} ({})", self.kind.name(), cause),
            None => self.kind.name().to_string(),
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Sum of the known child pauses
    pub fn children_pause(&self) -> f64 {
        self.children.iter().filter_map(|c| c.pause).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_name_with_cause() {
        let event = Event::new(EventKind::ZgcGarbageCollection, 0.0).with_cause("Warmup");
        assert_eq!(event.type_name(), "Garbage Collection (Warmup)");

        let plain = Event::new(EventKind::ZgcConcurrentMark, 0.0);
        assert_eq!(plain.type_name(), "Concurrent Mark");
    }

    #[test]
    fn test_categories() {
        assert_eq!(EventKind::FullGc.category(), Category::FullGc);
        assert_eq!(EventKind::ZgcPauseMarkEnd.category(), Category::PausePhase);
        assert_eq!(EventKind::ZgcConcurrentMarkFree.category(), Category::Concurrent);
        assert_eq!(EventKind::OldGenDetail.category(), Category::GenerationDetail);
        assert!(EventKind::ZgcAllocationStall.is_stop_the_world());
        assert!(!EventKind::ZgcConcurrentRelocate.is_stop_the_world());
    }

    #[test]
    fn test_generation_defaults() {
        assert_eq!(Event::new(EventKind::YoungGenDetail, 0.0).generation, Generation::Young);
        assert_eq!(Event::new(EventKind::OldGenDetail, 0.0).generation, Generation::Tenured);
        assert_eq!(
            Event::new(EventKind::AllocationFailure, 0.0).generation,
            Generation::Unknown
        );
    }

    #[test]
    fn test_children_pause() {
        let mut cycle = Event::new(EventKind::ZgcGarbageCollection, 1.0);
        cycle.add(Event::new(EventKind::ZgcPauseMarkStart, 1.0).with_pause(0.5));
        cycle.add(Event::new(EventKind::ZgcPauseMarkEnd, 1.0));
        cycle.add(Event::new(EventKind::ZgcPauseRelocateStart, 1.0).with_pause(0.25));

        assert!(cycle.has_children());
        assert_eq!(cycle.children_pause(), 0.75);
    }
}
