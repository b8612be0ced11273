//! The metric-list language.
//!
//! A metric list is `;`-separated definitions, each a `,`-separated triple:
//!
//! ```text
//! sourceKeyExpr,displayName,deltaFlag
//! ```
//!
//! - `sourceKeyExpr`: one or more raw series names joined by `+`. Joined
//!   series are summed into one logical counter (servers expose primary and
//!   replicated operation counters separately; a rate is only meaningful
//!   over their sum).
//! - `displayName`: header label, may be empty.
//! - `deltaFlag`: the literal `d` marks a rate column; anything else means
//!   the raw instantaneous value is shown.
//!
//! All whitespace is stripped from the whole source string before any
//! splitting (display names included), and one trailing `;` is dropped. A
//! definition with fewer than 3 fields is not an error: it becomes a blank
//! column that renders a constant zero. Column order is declaration order.

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\r\n]+").expect("static pattern"));

/// One parsed report column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnDef {
    /// Well-formed triple: source keys summed into one value.
    Metric(MetricDef),
    /// Malformed definition, kept as a constant-zero column.
    Blank { display_name: String },
}

/// A well-formed report column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDef {
    /// Raw series names summed into this column. Never empty.
    pub source_keys: Vec<String>,
    pub display_name: String,
    /// Rate column: show the per-interval increase instead of the raw value.
    pub is_delta: bool,
}

impl ColumnDef {
    pub fn display_name(&self) -> &str {
        match self {
            ColumnDef::Metric(metric) => &metric.display_name,
            ColumnDef::Blank { display_name } => display_name,
        }
    }
}

/// Parse a metric list. Infallible: anything that does not form a full
/// triple degrades to a blank column rather than an error.
pub fn parse_metrics(src: &str) -> Vec<ColumnDef> {
    let cleaned = WHITESPACE.replace_all(src, "");
    let cleaned = cleaned.as_ref();
    let cleaned = cleaned.strip_suffix(';').unwrap_or(cleaned);
    cleaned.split(';').map(parse_column).collect()
}

fn parse_column(def: &str) -> ColumnDef {
    // Split on the first two commas only: a third comma lands in the
    // delta-flag field (and therefore disables it).
    let fields: Vec<&str> = def.splitn(3, ',').collect();
    if fields.len() < 3 {
        return ColumnDef::Blank {
            display_name: fields.get(1).copied().unwrap_or_default().to_string(),
        };
    }
    ColumnDef::Metric(MetricDef {
        source_keys: fields[0].split('+').map(str::to_string).collect(),
        display_name: fields[1].to_string(),
        is_delta: fields[2] == "d",
    })
}
