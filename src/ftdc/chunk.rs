use std::collections::BTreeMap;

/// Timestamp series present in every metric chunk (epoch milliseconds).
/// The renderer aligns every other series against this one.
pub const TIMESTAMP_KEY: &str = "replSetGetStatus/date";

/// One decoded unit of aligned time series: raw series name to one sample
/// per offset. All series in a chunk share the timestamp series' length;
/// series absent from the map are treated as all-zero.
#[derive(Debug, Clone, Default)]
pub struct MetricsChunk {
    pub series: BTreeMap<String, Vec<u64>>,
}

impl MetricsChunk {
    /// All raw series names of this chunk, lexicographically sorted.
    /// Used for key discovery only; rendering never calls this.
    pub fn sorted_keys(&self) -> Vec<&str> {
        self.series.keys().map(String::as_str).collect()
    }

    /// Raw sample for `key` at `offset`. Absent series and offsets past a
    /// series' end both read as zero; a missing metric never aborts the
    /// report.
    pub fn sample(&self, key: &str, offset: usize) -> u64 {
        self.series
            .get(key)
            .and_then(|samples| samples.get(offset))
            .copied()
            .unwrap_or(0)
    }

    /// The timestamp series, or empty if the chunk lacks one (such a chunk
    /// renders no rows).
    pub fn timestamps(&self) -> &[u64] {
        self.series
            .get(TIMESTAMP_KEY)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
