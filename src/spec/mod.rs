//! Spec layer: the metric-list language + built-in presets.
//!
//! This module is intentionally separate from container decoding and
//! rendering. It owns:
//! - ColumnDef/MetricDef (parsed report columns)
//! - the built-in metric lists and their selection precedence

pub mod metric;
pub mod preset;

pub use metric::{ColumnDef, MetricDef, parse_metrics};
pub use preset::select_spec;
