//! Reader for IBM J9 verbose GC output (`-Xgcpolicy:optthruput`).
//!
//! The log is XML. An external tag decoder pushes start/end elements into
//! [`IbmJ9Reader`]; one allocation failure record is accumulated between the
//! `<af>` start and end tags and turned into a (possibly composite) event.
//!
//! ```text
//! <af type="tenured" id="1" timestamp="Thu Aug 30 14:23:10 2007" intervalms="0.000">
//!   <tenured freebytes="4480" totalbytes="52428800" percent="0" >
//!     <soa freebytes="0" totalbytes="49807360" percent="0" />
//!     <loa freebytes="4480" totalbytes="2621440" percent="0" />
//!   </tenured>
//!   <gc type="global" id="1" totalid="1" intervalms="0.000">
//!     <timesms mark="15.443" sweep="1.166" compact="0.000" total="16.871" />
//!     <tenured freebytes="44383728" totalbytes="52428800" percent="84" > ...
//!   </gc>
//!   <tenured freebytes="43859440" totalbytes="52428800" percent="83" > ...
//!   <time totalms="18.055" />
//! </af>
//! ```

use super::text::{parse_double, parse_long, ElapsedClock, TimestampParser};
use crate::model::{Event, EventKind, GcModel};
use crate::utils::config::{
    AF_ELEMENT_NAMES, BYTES_PER_KB, EXPECTED_AF_TYPE, GLOBAL_GC_TYPE, MS_PER_SECOND,
    TENURED_AFTER_VISIT, TENURED_BEFORE_VISIT,
};
use crate::utils::error::ReaderWarning;
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};

/// Attribute lookup for a start element
///
/// Implemented for the maps and pair lists a tag decoder typically hands out.
pub trait Attributes {
    fn value(&self, name: &str) -> Option<&str>;
}

impl Attributes for HashMap<String, String> {
    fn value(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl Attributes for BTreeMap<String, String> {
    fn value(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl<'a> Attributes for [(&'a str, &'a str)] {
    fn value(&self, name: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
    }
}

impl<'a, const N: usize> Attributes for [(&'a str, &'a str); N] {
    fn value(&self, name: &str) -> Option<&str> {
        self.as_slice().value(name)
    }
}

/// One decoded tag
#[derive(Debug, Clone, PartialEq)]
pub enum TagEvent {
    Start {
        name: String,
        attributes: HashMap<String, String>,
    },
    End {
        name: String,
    },
}

impl TagEvent {
    /// Convenience constructor for a start element
    pub fn start(name: &str, attributes: &[(&str, &str)]) -> Self {
        Self::Start {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn end(name: &str) -> Self {
        Self::End {
            name: name.to_string(),
        }
    }
}

/// Free/total bytes of one heap area at one point in time
#[derive(Debug, Clone, Copy, Default)]
struct AreaSnapshot {
    free: Option<i64>,
    total: Option<i64>,
}

impl AreaSnapshot {
    fn used_kb(&self) -> Option<i64> {
        self.total?
            .checked_sub(self.free?)
            .map(|used| used / BYTES_PER_KB)
    }

    fn total_kb(&self) -> Option<i64> {
        self.total.map(|t| t / BYTES_PER_KB)
    }
}

/// Before and after snapshots of one heap area
#[derive(Debug, Clone, Copy, Default)]
struct AreaSnapshots {
    before: AreaSnapshot,
    after: AreaSnapshot,
}

impl AreaSnapshots {
    fn slot_mut(&mut self, visit: u8) -> Option<&mut AreaSnapshot> {
        match visit {
            TENURED_BEFORE_VISIT => Some(&mut self.before),
            TENURED_AFTER_VISIT => Some(&mut self.after),
            _ => None,
        }
    }

    /// (before used, after used, after total) if all four byte counts are known
    fn complete_kb(&self) -> Option<(i64, i64, i64)> {
        Some((
            self.before.used_kb()?,
            self.after.used_kb()?,
            self.after.total_kb()?,
        ))
    }
}

/// Allocation failure record, alive between `<af>` and `</af>`
#[derive(Debug, Default)]
struct AllocationFailure {
    id: Option<String>,
    af_type: Option<String>,
    elapsed: Option<i64>,
    total_time: Option<f64>,
    gc_type: Option<String>,
    mark_ms: Option<f64>,
    sweep_ms: Option<f64>,
    tenured: AreaSnapshots,
    soa: AreaSnapshots,
    loa: AreaSnapshots,
}

impl AllocationFailure {
    /// Build the top-level event, with young/old detail children when complete
    fn into_event(self) -> Event {
        let timestamp = self.elapsed.unwrap_or(0) as f64;

        let kind = if self.gc_type.as_deref() == Some(GLOBAL_GC_TYPE) {
            EventKind::FullGc
        } else {
            EventKind::AllocationFailure
        };

        let mut event = Event::new(kind, timestamp);
        event.pre_used_kb = self.tenured.before.used_kb();
        event.post_used_kb = self.tenured.after.used_kb();
        event.total_kb = self.tenured.after.total_kb();
        event.pause = self.total_time;

        if let Some((pre, post, total)) = self.soa.complete_kb() {
            event.add(Event::new(EventKind::YoungGenDetail, timestamp).with_memory(pre, post, total));
        }
        if let Some((pre, post, total)) = self.loa.complete_kb() {
            event.add(Event::new(EventKind::OldGenDetail, timestamp).with_memory(pre, post, total));
        }

        event
    }
}

/// Push-style reader for IBM J9 verbose GC XML
///
/// **Public** - feed it elements in document order
#[derive(Debug, Default)]
pub struct IbmJ9Reader {
    timestamps: TimestampParser,
    clock: ElapsedClock,
    current: Option<AllocationFailure>,
    tenured_visits: u8,
    warnings: Vec<ReaderWarning>,
}

impl IbmJ9Reader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings collected so far, in order
    pub fn warnings(&self) -> &[ReaderWarning] {
        &self.warnings
    }

    /// Whether an allocation failure record is open
    pub fn in_record(&self) -> bool {
        self.current.is_some()
    }

    /// Handle one start element
    ///
    /// Start elements only fill the open record; events reach the model
    /// when the record is closed by [`end_element`](Self::end_element).
    pub fn start_element<A>(&mut self, name: &str, attrs: &A)
    where
        A: Attributes + ?Sized,
    {
        if self.current.is_none() {
            if AF_ELEMENT_NAMES.contains(&name) {
                self.open_record(name, attrs);
            }
            return;
        }

        match name {
            "time" => {
                if let Some(ms) = self.double_attr(name, attrs, "totalms") {
                    self.record().total_time = Some(ms / MS_PER_SECOND);
                }
            }
            "gc" => {
                self.record().gc_type = attrs.value("type").map(str::to_string);
            }
            "timesms" => {
                if attrs.value("mark").is_some() && attrs.value("sweep").is_some() {
                    let mark = self.double_attr(name, attrs, "mark");
                    let sweep = self.double_attr(name, attrs, "sweep");
                    // kept only as a pair
                    if let (Some(mark), Some(sweep)) = (mark, sweep) {
                        let record = self.record();
                        record.mark_ms = Some(mark);
                        record.sweep_ms = Some(sweep);
                    }
                }
            }
            "tenured" => {
                self.tenured_visits = self.tenured_visits.saturating_add(1);
                let snapshot = self.area_snapshot(name, attrs);
                let visit = self.tenured_visits;
                if let Some(slot) = self.record().tenured.slot_mut(visit) {
                    *slot = snapshot;
                }
            }
            "soa" => {
                let snapshot = self.area_snapshot(name, attrs);
                let visit = self.tenured_visits;
                if let Some(slot) = self.record().soa.slot_mut(visit) {
                    *slot = snapshot;
                }
            }
            "loa" => {
                let snapshot = self.area_snapshot(name, attrs);
                let visit = self.tenured_visits;
                if let Some(slot) = self.record().loa.slot_mut(visit) {
                    *slot = snapshot;
                }
            }
            _ => self.warn(ReaderWarning::UnexpectedElement {
                element: name.to_string(),
            }),
        }
    }

    /// Handle one end element; closing `<af>` emits the event
    pub fn end_element(&mut self, name: &str, model: &mut GcModel) {
        if !AF_ELEMENT_NAMES.contains(&name) {
            return;
        }

        let Some(record) = self.current.take() else {
            self.warn(ReaderWarning::UnmatchedClose {
                element: name.to_string(),
            });
            return;
        };
        self.tenured_visits = 0;

        if record.af_type.as_deref() != Some(EXPECTED_AF_TYPE) {
            self.warn(ReaderWarning::UnexpectedAfType {
                af_type: record.af_type.clone(),
            });
        }
        if record.gc_type.as_deref() != Some(GLOBAL_GC_TYPE) {
            self.warn(ReaderWarning::UnexpectedGcType {
                gc_type: record.gc_type.clone(),
            });
        }
        if let (Some(mark), Some(sweep)) = (record.mark_ms, record.sweep_ms) {
            debug!(
                "AF {}: mark {}ms, sweep {}ms",
                record.id.as_deref().unwrap_or("?"),
                mark,
                sweep
            );
        }

        model.add(record.into_event());
    }

    /// Handle one decoded tag
    pub fn feed(&mut self, tag: &TagEvent, model: &mut GcModel) {
        match tag {
            TagEvent::Start { name, attributes } => self.start_element(name, attributes),
            TagEvent::End { name } => self.end_element(name, model),
        }
    }

    /// Feed a whole tag sequence
    pub fn read_tags<'a, I>(&mut self, tags: I, model: &mut GcModel)
    where
        I: IntoIterator<Item = &'a TagEvent>,
    {
        for tag in tags {
            self.feed(tag, model);
        }
    }

    fn open_record<A>(&mut self, name: &str, attrs: &A)
    where
        A: Attributes + ?Sized,
    {
        let mut record = AllocationFailure {
            id: attrs.value("id").map(str::to_string),
            af_type: attrs.value("type").map(str::to_string),
            ..Default::default()
        };

        match attrs.value("timestamp") {
            Some(text) => match self.timestamps.parse(text) {
                Ok(time) => {
                    let elapsed = self.clock.elapsed_seconds(time);
                    debug!("ElapsedTime: {}", elapsed);
                    record.elapsed = Some(elapsed);
                }
                Err(_) => self.warn(ReaderWarning::DateParse {
                    element: name.to_string(),
                    text: text.to_string(),
                }),
            },
            None => self.warn(ReaderWarning::MissingAttribute {
                element: name.to_string(),
                attribute: "timestamp".to_string(),
            }),
        }

        self.current = Some(record);
    }

    fn record(&mut self) -> &mut AllocationFailure {
        self.current.get_or_insert_with(AllocationFailure::default)
    }

    /// Free/total bytes of one area; a pair whose difference overflows
    /// keeps only the total
    fn area_snapshot<A>(&mut self, element: &str, attrs: &A) -> AreaSnapshot
    where
        A: Attributes + ?Sized,
    {
        let mut free = self.long_attr(element, attrs, "freebytes");
        let total = self.long_attr(element, attrs, "totalbytes");

        if let (Some(f), Some(t)) = (free, total) {
            if t.checked_sub(f).is_none() {
                self.warn(number_warning(element, "freebytes", &f.to_string()));
                free = None;
            }
        }

        AreaSnapshot { free, total }
    }

    /// Missing attributes are silently unknown, malformed ones warn
    fn long_attr<A>(&mut self, element: &str, attrs: &A, attribute: &str) -> Option<i64>
    where
        A: Attributes + ?Sized,
    {
        let value = attrs.value(attribute)?;
        match parse_long(value) {
            Ok(v) => Some(v),
            Err(_) => {
                self.warn(number_warning(element, attribute, value));
                None
            }
        }
    }

    fn double_attr<A>(&mut self, element: &str, attrs: &A, attribute: &str) -> Option<f64>
    where
        A: Attributes + ?Sized,
    {
        let value = attrs.value(attribute)?;
        match parse_double(value) {
            Ok(v) => Some(v),
            Err(_) => {
                self.warn(number_warning(element, attribute, value));
                None
            }
        }
    }

    fn warn(&mut self, warning: ReaderWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}

fn number_warning(element: &str, attribute: &str, value: &str) -> ReaderWarning {
    ReaderWarning::NumberFormat {
        element: element.to_string(),
        attribute: attribute.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::WarningKind;

    #[test]
    fn test_area_snapshot_used_kb_truncates() {
        let snapshot = AreaSnapshot {
            free: Some(1000),
            total: Some(4096),
        };
        // (4096 - 1000) / 1024 = 3.02
        assert_eq!(snapshot.used_kb(), Some(3));
        assert_eq!(snapshot.total_kb(), Some(4));
    }

    #[test]
    fn test_incomplete_quartet() {
        let mut snapshots = AreaSnapshots::default();
        snapshots.before = AreaSnapshot {
            free: Some(0),
            total: Some(2048),
        };
        snapshots.after.total = Some(2048);
        assert!(snapshots.complete_kb().is_none());

        snapshots.after.free = Some(1024);
        assert_eq!(snapshots.complete_kb(), Some((2, 1, 2)));
    }

    #[test]
    fn test_middle_tenured_visit_is_ignored() {
        let mut snapshots = AreaSnapshots::default();
        assert!(snapshots.slot_mut(2).is_none());
        assert!(snapshots.slot_mut(1).is_some());
        assert!(snapshots.slot_mut(3).is_some());
    }

    #[test]
    fn test_unknown_element_inside_record() {
        let mut reader = IbmJ9Reader::new();

        reader.start_element(
            "af",
            &[("type", "tenured"), ("id", "1"), ("timestamp", "Thu Aug 30 14:23:10 2007")],
        );
        reader.start_element("refs", &[("soft", "0")]);

        assert!(reader.in_record());
        assert_eq!(reader.warnings().len(), 1);
        assert_eq!(reader.warnings()[0].kind(), WarningKind::Structural);
    }

    #[test]
    fn test_elements_outside_record_are_ignored() {
        let mut reader = IbmJ9Reader::new();

        reader.start_element("verbosegc", &[("version", "20070815")]);
        reader.start_element("tenured", &[("freebytes", "1")]);

        assert!(!reader.in_record());
        assert!(reader.warnings().is_empty());
        assert_eq!(reader.tenured_visits, 0);
    }

    #[test]
    fn test_timesms_needs_both_values() {
        let mut reader = IbmJ9Reader::new();

        reader.start_element("af", &[("timestamp", "Thu Aug 30 14:23:10 2007")]);
        reader.start_element("timesms", &[("mark", "15.443")]);
        assert!(reader.current.as_ref().unwrap().mark_ms.is_none());

        reader.start_element("timesms", &[("mark", "15.443"), ("sweep", "1.166")]);
        let record = reader.current.as_ref().unwrap();
        assert_eq!(record.mark_ms, Some(15.443));
        assert_eq!(record.sweep_ms, Some(1.166));
    }

    #[test]
    fn test_timesms_malformed_sweep_drops_both() {
        let mut reader = IbmJ9Reader::new();

        reader.start_element("af", &[("timestamp", "Thu Aug 30 14:23:10 2007")]);
        reader.start_element("timesms", &[("mark", "15.443"), ("sweep", "x")]);

        let record = reader.current.as_ref().unwrap();
        assert!(record.mark_ms.is_none());
        assert!(record.sweep_ms.is_none());
        assert_eq!(reader.warnings().len(), 1);
        assert_eq!(reader.warnings()[0].kind(), WarningKind::NumberFormat);
    }

    #[test]
    fn test_used_kb_overflow_is_unknown() {
        let snapshot = AreaSnapshot {
            free: Some(i64::MIN),
            total: Some(1),
        };
        assert_eq!(snapshot.used_kb(), None);
        assert_eq!(snapshot.total_kb(), Some(0));
    }
}
