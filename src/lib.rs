//! GC Trace Studio
//!
//! Readers that turn JVM garbage-collector logs into one uniform,
//! queryable model of GC events with pause and heap statistics.
//!
//! ## Getting Started
//!
//! ```no_run
//! use gc_trace_studio::model::GcModel;
//! use gc_trace_studio::parser::UnifiedZgcReader;
//!
//! let mut model = GcModel::new();
//! let mut reader = UnifiedZgcReader::new();
//! reader.read_lines(
//!     ["[0.5s][info][gc] GC(0) Garbage Collection (Warmup) 208M(10%)->164M(16%)"],
//!     &mut model,
//! );
//! assert_eq!(model.len(), 1);
//! ```
//!
//! IBM J9 logs are XML; decode them with any streaming XML parser and push
//! the elements into [`parser::IbmJ9Reader`].

pub mod commands;
pub mod model;
pub mod output;
pub mod parser;
pub mod utils;
