//! The three-stage scan pipeline (spec §2, §4.4–§4.7): Injector →
//! candidate-domain channel → Querier pool → scanned-domain channel →
//! Collector, coordinated with poison-pill sentinels rather than channel
//! close because multiple producers share a channel (design note, spec
//! §9). `Option<Domain>` doubles as the sentinel type: `None` is the
//! poison pill, mirroring the original's nil-pointer convention in an
//! idiomatic Rust shape.

pub mod collector;
pub mod controller;
pub mod injector;
pub mod querier;

pub use controller::{run_cycle, CycleSummary, PipelineConfig};
