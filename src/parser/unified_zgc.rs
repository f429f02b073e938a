//! Reader for ZGC output in OpenJDK unified logging (`-Xlog:gc*`).
//!
//! Every line is `[decorations] GC(<id>) <message>`. Pause phases become
//! children of the current cycle; concurrent phases and stalls are
//! standalone events. The cycle itself is emitted when its heap summary
//! line arrives.
//!
//! ```text
//! [0.973s][info][gc,start    ] GC(0) Garbage Collection (Metadata GC Threshold)
//! [0.973s][info][gc,phases   ] GC(0) Pause Mark Start 1.279ms
//! [0.979s][info][gc,phases   ] GC(0) Concurrent Mark 5.216ms
//! [0.988s][info][gc,heap     ] GC(0)  Capacity:   194560M (100%) ...
//! [0.988s][info][gc          ] GC(0) Garbage Collection (Metadata GC Threshold) 10620M(5%)->8800M(4%)
//! ```

use super::text::{parse_decimal_comma, parse_long, ElapsedClock};
use crate::model::{Category, Event, EventKind, GcModel};
use crate::utils::config::{BYTES_PER_KB, MS_PER_SECOND};
use crate::utils::error::ReaderWarning;
use chrono::DateTime;
use log::{debug, trace, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<decorations>(?:\[[^\]]*\]\s*)*)(?:GC\((?P<gc_id>\d+)\)\s+)?(?P<message>.*?)\s*$")
        .expect("valid line regex")
});

static DECORATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]").expect("valid decoration regex"));

static UPTIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<value>\d+(?:[.,]\d+)?)(?P<unit>s|ms)\s*$").expect("valid uptime regex")
});

static HEAP_SUMMARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^Garbage Collection \((?P<cause>.+?)\)\s+(?P<before>\d+)(?P<before_unit>[KMG])\((?P<before_pct>\d+)%\)->(?P<after>\d+)(?P<after_unit>[KMG])\((?P<after_pct>\d+)%\)$",
    )
    .expect("valid heap summary regex")
});

static BANNER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Garbage Collection \((?P<cause>.+)\)$").expect("valid banner regex")
});

static CAPACITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Capacity:\s+(?P<size>\d+)(?P<unit>[KMG])").expect("valid capacity regex")
});

static PHASE_REST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\((?P<cause>[^)]*)\)\s*)?(?P<ms>\d+(?:[.,]\d+)?)ms$")
        .expect("valid phase regex")
});

// "Concurrent Mark Free" must be tried before "Concurrent Mark"
static PHASES_LONGEST_FIRST: Lazy<Vec<EventKind>> = Lazy::new(|| {
    let mut phases = EventKind::ZGC_PHASES.to_vec();
    phases.sort_by_key(|k| std::cmp::Reverse(k.name().len()));
    phases
});

/// Convert a unified logging size to KB, `None` if it does not fit
fn to_kb(value: i64, unit: &str) -> Option<i64> {
    match unit {
        "K" => Some(value),
        "M" => value.checked_mul(BYTES_PER_KB),
        "G" => value.checked_mul(BYTES_PER_KB * BYTES_PER_KB),
        _ => Some(value / BYTES_PER_KB),
    }
}

/// Split a message into a known phase and the text after its name
fn match_phase(message: &str) -> Option<(EventKind, &str)> {
    PHASES_LONGEST_FIRST.iter().find_map(|kind| {
        let rest = message.strip_prefix(kind.name())?;
        rest.starts_with(char::is_whitespace)
            .then(|| (*kind, rest.trim()))
    })
}

fn ids_match(a: Option<u64>, b: Option<u64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// GC cycle being assembled between its banner and its heap summary
#[derive(Debug)]
struct ActiveCycle {
    gc_id: Option<u64>,
    event: Event,
    capacity_kb: Option<i64>,
}

impl ActiveCycle {
    fn new(gc_id: Option<u64>, timestamp: f64, cause: Option<&str>) -> Self {
        let mut event = Event::new(EventKind::ZgcGarbageCollection, timestamp);
        event.cause = cause.map(str::to_string);
        Self {
            gc_id,
            event,
            capacity_kb: None,
        }
    }

    /// The cycle pauses for as long as its pause phases together
    fn into_event(self) -> Event {
        let mut event = self.event;
        event.pause = Some(event.children_pause());
        event
    }
}

/// Line-oriented reader for ZGC unified logging
///
/// **Public** - feed it lines in file order, then call [`finish`](Self::finish)
#[derive(Debug, Default)]
pub struct UnifiedZgcReader {
    cycle: Option<ActiveCycle>,
    clock: ElapsedClock,
    line_number: usize,
    warnings: Vec<ReaderWarning>,
}

impl UnifiedZgcReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings collected so far, in order
    pub fn warnings(&self) -> &[ReaderWarning] {
        &self.warnings
    }

    /// Whether a cycle is waiting for its heap summary
    pub fn in_cycle(&self) -> bool {
        self.cycle.is_some()
    }

    /// Handle one line of log output
    pub fn read_line(&mut self, line: &str, model: &mut GcModel) {
        self.line_number += 1;

        let Some(caps) = LINE.captures(line) else {
            return;
        };
        let message = caps.name("message").map_or("", |m| m.as_str());
        if message.is_empty() {
            return;
        }
        let timestamp = self.timestamp(caps.name("decorations").map_or("", |m| m.as_str()));
        let gc_id = caps
            .name("gc_id")
            .and_then(|m| m.as_str().parse::<u64>().ok());

        if let Some(summary) = HEAP_SUMMARY.captures(message) {
            self.complete_cycle(&summary, gc_id, timestamp, model);
        } else if let Some(banner) = BANNER.captures(message) {
            self.open_cycle(gc_id, timestamp, Some(&banner["cause"]), model);
        } else if let Some(capacity) = CAPACITY.captures(message) {
            self.record_capacity(&capacity, gc_id);
        } else if let Some((kind, rest)) = match_phase(message) {
            self.handle_phase(kind, rest, gc_id, timestamp, model);
        } else {
            trace!("Ignoring line {}: {}", self.line_number, message);
        }
    }

    /// Feed a sequence of lines, then flush the pending cycle
    pub fn read_lines<I, S>(&mut self, lines: I, model: &mut GcModel)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.read_line(line.as_ref(), model);
        }
        self.finish(model);
    }

    /// End of input: a pending cycle with phases is kept, an empty one dropped
    pub fn finish(&mut self, model: &mut GcModel) {
        if let Some(cycle) = self.cycle.take() {
            if cycle.event.has_children() {
                debug!("Flushing unfinished GC cycle {:?}", cycle.gc_id);
                model.add(cycle.into_event());
            } else {
                debug!("Dropping empty GC cycle {:?}", cycle.gc_id);
            }
        }
    }

    /// Seconds from the uptime decoration, else from a time decoration
    fn timestamp(&mut self, decorations: &str) -> f64 {
        let mut wall_clock = None;
        for decoration in DECORATION.captures_iter(decorations) {
            let text = decoration[1].trim();
            if let Some(uptime) = UPTIME.captures(text) {
                if let Ok(value) = parse_decimal_comma(&uptime["value"]) {
                    return match &uptime["unit"] {
                        "ms" => value / MS_PER_SECOND,
                        _ => value,
                    };
                }
            } else if wall_clock.is_none() {
                wall_clock = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.3f%z").ok();
            }
        }

        wall_clock
            .map(|time| self.clock.elapsed_seconds(time.naive_utc()) as f64)
            .unwrap_or(0.0)
    }

    fn open_cycle(
        &mut self,
        gc_id: Option<u64>,
        timestamp: f64,
        cause: Option<&str>,
        model: &mut GcModel,
    ) {
        if let Some(previous) = self.cycle.take() {
            self.abandon(previous, model);
        }
        self.cycle = Some(ActiveCycle::new(gc_id, timestamp, cause));
    }

    /// Replace a cycle that never got its heap summary
    fn abandon(&mut self, cycle: ActiveCycle, model: &mut GcModel) {
        self.warn(ReaderWarning::AbandonedCycle {
            gc_id: cycle.gc_id,
            line: self.line_number,
        });
        if cycle.event.has_children() {
            model.add(cycle.into_event());
        }
    }

    fn complete_cycle(
        &mut self,
        summary: &Captures,
        gc_id: Option<u64>,
        timestamp: f64,
        model: &mut GcModel,
    ) {
        let cause = &summary["cause"];
        let before_kb = self.size_kb(&summary["before"], &summary["before_unit"]);
        let after_kb = self.size_kb(&summary["after"], &summary["after_unit"]);
        let after_pct = self.number(&summary["after_pct"]);
        let pct_total = match (after_kb, after_pct) {
            (Some(kb), Some(pct)) if pct > 0 => {
                let total = (kb / pct).checked_mul(100);
                if total.is_none() {
                    self.warn(heap_warning(&summary["after"]));
                }
                total
            }
            _ => None,
        };

        let cycle = match self.cycle.take() {
            Some(cycle) if ids_match(cycle.gc_id, gc_id) => Some(cycle),
            Some(other) => {
                self.abandon(other, model);
                None
            }
            None => None,
        };

        let mut event = match cycle {
            Some(cycle) => {
                let capacity = cycle.capacity_kb;
                let mut event = cycle.into_event();
                event.cause = Some(cause.to_string());
                event.total_kb = capacity.or(pct_total);
                event
            }
            None => {
                let mut event = Event::new(EventKind::ZgcGarbageCollection, timestamp)
                    .with_cause(cause)
                    .with_pause(0.0);
                event.total_kb = pct_total;
                event
            }
        };
        event.pre_used_kb = before_kb;
        event.post_used_kb = after_kb;

        model.add(event);
    }

    fn record_capacity(&mut self, capacity: &Captures, gc_id: Option<u64>) {
        let Some(size_kb) = self.size_kb(&capacity["size"], &capacity["unit"]) else {
            return;
        };
        match self.cycle.as_mut() {
            Some(cycle) if ids_match(cycle.gc_id, gc_id) => {
                cycle.capacity_kb = Some(size_kb);
            }
            _ => trace!("Capacity outside of a GC cycle at line {}", self.line_number),
        }
    }

    fn handle_phase(
        &mut self,
        kind: EventKind,
        rest: &str,
        gc_id: Option<u64>,
        timestamp: f64,
        model: &mut GcModel,
    ) {
        let Some(caps) = PHASE_REST.captures(rest) else {
            trace!("No duration for {} at line {}", kind.name(), self.line_number);
            return;
        };
        let ms = match parse_decimal_comma(&caps["ms"]) {
            Ok(ms) => ms,
            Err(_) => {
                self.warn(ReaderWarning::NumberFormat {
                    element: kind.name().to_string(),
                    attribute: "duration".to_string(),
                    value: caps["ms"].to_string(),
                });
                return;
            }
        };

        let mut event = Event::new(kind, timestamp).with_pause(ms / MS_PER_SECOND);
        event.cause = caps.name("cause").map(|m| m.as_str().to_string());

        if kind.category() == Category::PausePhase {
            let matches_active = self
                .cycle
                .as_ref()
                .is_some_and(|cycle| ids_match(cycle.gc_id, gc_id));
            if !matches_active {
                self.open_cycle(gc_id, timestamp, None, model);
            }
            if let Some(cycle) = self.cycle.as_mut() {
                cycle.event.add(event);
            }
        } else {
            model.add(event);
        }
    }

    fn number(&mut self, text: &str) -> Option<i64> {
        match parse_long(text) {
            Ok(value) => Some(value),
            Err(_) => {
                self.warn(heap_warning(text));
                None
            }
        }
    }

    /// Heap size in KB; too large for the arithmetic warns and stays unknown
    fn size_kb(&mut self, text: &str, unit: &str) -> Option<i64> {
        let value = self.number(text)?;
        let kb = to_kb(value, unit);
        if kb.is_none() {
            self.warn(heap_warning(&format!("{}{}", text, unit)));
        }
        kb
    }

    fn warn(&mut self, warning: ReaderWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}

fn heap_warning(value: &str) -> ReaderWarning {
    ReaderWarning::NumberFormat {
        element: "Garbage Collection".to_string(),
        attribute: "heap".to_string(),
        value: value.to_string(),
    }
}
