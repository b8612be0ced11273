//! The tabular renderer: one line per sample offset across all chunks,
//! with periodic header reprints as a visual anchor.

use crate::ftdc::MetricsChunk;
use crate::report::delta::DeltaEngine;
use crate::report::fmt;
use crate::spec::{ColumnDef, MetricDef};
use std::io::Write;

/// Width of the leading time column.
const TIME_WIDTH: usize = 17;

/// Renders the configured columns over a sequence of decoded chunks.
///
/// Owns the delta engine: its last-value state spans chunk boundaries but
/// never leaks across renderers.
pub struct Renderer {
    columns: Vec<ColumnDef>,
    width: usize,
    deltas: DeltaEngine,
}

impl Renderer {
    pub fn new(columns: Vec<ColumnDef>, width: usize) -> Self {
        Self {
            columns,
            width,
            deltas: DeltaEngine::new(),
        }
    }

    fn header(&self) -> String {
        let mut line = fmt::left("time", TIME_WIDTH);
        for column in &self.columns {
            line.push_str(&fmt::right(column.display_name(), self.width));
        }
        line
    }

    /// Write the full report: one upfront header, then per chunk and per
    /// offset one row, the header reprinted immediately before any row
    /// whose epoch-second is a multiple of 10. Chunks without a timestamp
    /// series render no rows.
    pub fn render<W: Write>(&mut self, chunks: &[MetricsChunk], out: &mut W) -> anyhow::Result<()> {
        let header = self.header();
        writeln!(out, "{header}")?;
        for chunk in chunks {
            for (offset, &millis) in chunk.timestamps().iter().enumerate() {
                if millis / 1000 % 10 == 0 {
                    writeln!(out, "{header}")?;
                }
                let mut line = fmt::left(&fmt::format_timestamp(millis), TIME_WIDTH);
                for column in &self.columns {
                    let value = column_value(&mut self.deltas, chunk, offset, column);
                    line.push_str(&fmt::right_trunc(&value.to_string(), self.width));
                }
                writeln!(out, "{line}")?;
            }
        }
        Ok(())
    }
}

/// One cell: the sum over the column's source keys at `offset`. Rate
/// columns push every key through the delta engine independently; the
/// reset policy applies per raw key, not to the combined sum. Blank
/// columns are a constant zero.
fn column_value(
    deltas: &mut DeltaEngine,
    chunk: &MetricsChunk,
    offset: usize,
    column: &ColumnDef,
) -> u64 {
    let ColumnDef::Metric(MetricDef {
        source_keys,
        is_delta,
        ..
    }) = column
    else {
        return 0;
    };
    let mut total = 0u64;
    for key in source_keys {
        let raw = chunk.sample(key, offset);
        let value = if *is_delta { deltas.delta(key, raw) } else { raw };
        total = total.wrapping_add(value);
    }
    total
}
