use gc_trace_studio::model::{Category, Event, EventKind, GcModel};
use pretty_assertions::assert_eq;

fn full_gc(timestamp: f64, pause: f64, total_kb: i64) -> Event {
    let mut event = Event::new(EventKind::FullGc, timestamp)
        .with_pause(pause)
        .with_memory(total_kb / 2, total_kb / 4, total_kb);
    event.add(Event::new(EventKind::YoungGenDetail, timestamp).with_memory(100, 10, 200));
    event.add(Event::new(EventKind::OldGenDetail, timestamp).with_memory(50, 5, 400));
    event
}

fn zgc_cycle(timestamp: f64, cause: &str, total_kb: i64) -> Event {
    let mut cycle = Event::new(EventKind::ZgcGarbageCollection, timestamp)
        .with_cause(cause)
        .with_pause(0.75)
        .with_memory(10, 5, total_kb);
    cycle.add(Event::new(EventKind::ZgcPauseMarkStart, timestamp).with_pause(0.25));
    cycle.add(Event::new(EventKind::ZgcPauseMarkEnd, timestamp).with_pause(0.5));
    cycle
}

fn sample_model() -> GcModel {
    let mut model = GcModel::new();
    model.add(full_gc(1.0, 0.5, 4096));
    model.add(Event::new(EventKind::ZgcConcurrentMark, 2.0).with_pause(2.0));
    model.add(zgc_cycle(3.0, "Warmup", 1024));
    model.add(zgc_cycle(4.0, "Proactive", 2048));
    model.add(Event::new(EventKind::ZgcConcurrentMark, 5.0).with_pause(1.0));
    model.add(full_gc(6.0, 1.5, 8192));
    model
}

#[test]
fn test_positional_lookup_follows_insertion_order() {
    let model = sample_model();

    assert_eq!(model.len(), 6);
    assert_eq!(model.get(0).unwrap().kind, EventKind::FullGc);
    assert_eq!(model.get(2).unwrap().type_name(), "Garbage Collection (Warmup)");
    assert!(model.get(6).is_none());
    assert_eq!(model.last_event_added().unwrap().timestamp, 6.0);

    let timestamps: Vec<f64> = (&model).into_iter().map(|e| e.timestamp).collect();
    assert_eq!(timestamps, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[test]
fn test_per_category_pauses() {
    let model = sample_model();

    assert_eq!(model.full_gc_pause().n(), 2);
    assert_eq!(model.full_gc_pause().sum(), 2.0);
    assert_eq!(model.full_gc_pause().max(), 1.5);

    assert_eq!(model.concurrent_pause().n(), 2);
    assert_eq!(model.concurrent_pause().average(), 1.5);

    assert_eq!(model.gc_pause().n(), 2);
    assert_eq!(model.gc_pause().sum(), 1.5);

    assert_eq!(model.pause().n(), 6);
    assert_eq!(model.pause().sum(), 6.5);
}

#[test]
fn test_pause_types_are_grouped_by_name_and_cause() {
    let model = sample_model();

    let pauses = model.gc_event_pauses();
    assert_eq!(
        pauses.keys().cloned().collect::<Vec<_>>(),
        vec![
            "Garbage Collection (Proactive)".to_string(),
            "Garbage Collection (Warmup)".to_string(),
        ]
    );

    assert_eq!(model.full_gc_event_pauses().len(), 1);
    assert_eq!(model.full_gc_event_pauses()["Full GC"].n(), 2);
    assert_eq!(model.concurrent_event_pauses()["Concurrent Mark"].n(), 2);
}

#[test]
fn test_children_only_count_in_their_own_category() {
    let model = sample_model();

    let phases = model.gc_event_phases();
    assert_eq!(phases.len(), 2);
    assert_eq!(phases["Pause Mark Start"].n(), 2);
    assert_eq!(phases["Pause Mark End"].sum(), 1.0);

    let details = model.category(Category::GenerationDetail);
    assert_eq!(details.type_count(), 2);
    assert_eq!(details.occurrences(), 4);
    assert_eq!(details.heap_total.max(), 400.0);

    // children never reach the overall figures
    assert_eq!(model.heap_allocated_sizes().n(), 4);
}

#[test]
fn test_heap_allocated_sizes() {
    let model = sample_model();

    let heap = model.heap_allocated_sizes();
    assert_eq!(heap.min(), 1024.0);
    assert_eq!(heap.max(), 8192.0);
    assert_eq!(heap.sum(), 15360.0);
}

#[test]
fn test_unknown_figures_count_as_zero_pause_and_skip_heap() {
    let mut model = GcModel::new();
    model.add(Event::new(EventKind::ZgcGarbageCollection, 0.0).with_cause("Warmup"));

    let mut zero_total = Event::new(EventKind::FullGc, 1.0).with_pause(0.5);
    zero_total.total_kb = Some(0);
    model.add(zero_total);

    assert_eq!(model.gc_pause().n(), 1);
    assert_eq!(model.gc_pause().sum(), 0.0);
    assert_eq!(model.pause().n(), 2);
    assert!(model.heap_allocated_sizes().is_empty());
}

#[test]
fn test_summary_reflects_aggregates() {
    let model = sample_model();
    let summary = model.summary();

    assert_eq!(summary.event_count, 6);
    assert_eq!(summary.pause, *model.pause());
    assert_eq!(summary.categories.len(), Category::ALL.len());

    let pause = &summary.categories[&Category::Pause];
    assert_eq!(pause.type_count, 2);
    assert_eq!(pause.occurrences, 2);
    assert_eq!(pause.heap_total.sum(), 3072.0);

    let full = &summary.categories[&Category::FullGc];
    assert_eq!(full.pause, *model.full_gc_pause());
}

#[test]
fn test_empty_model_summary() {
    let summary = GcModel::default().summary();

    assert_eq!(summary.event_count, 0);
    assert!(summary
        .categories
        .values()
        .all(|c| c.type_count == 0 && c.occurrences == 0));
}
