//! Decoder for the binary diagnostic container (diagnostic.data).
//!
//! A capture file is a contiguous sequence of BSON documents. Documents with
//! `type: 1` carry a metric chunk in their `data` binary:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ uncompressed_len: u32 LE                                 │
//! ├──────────────────────────────────────────────────────────┤
//! │ zlib stream, inflating to:                               │
//! │   reference BSON document (first sample of every series) │
//! │   metric_count: u32 LE                                   │
//! │   delta_count: u32 LE                                    │
//! │   metric-major LEB128 varint deltas, zero run-length     │
//! │   encoded (a zero varint is followed by a varint count   │
//! │   of additional zeros; runs may span metric boundaries)  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Series names are the reference document's field paths joined with `/`
//! (array elements use their index). Each series holds `delta_count + 1`
//! samples: the reference value followed by cumulative sums of its deltas.

use crate::ftdc::chunk::MetricsChunk;
use anyhow::{Context, bail};
use bson::{Bson, Document};
use flate2::read::ZlibDecoder;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Decode one capture file's bytes into its metric chunks, in file order.
/// Non-metric documents (metadata, etc.) are skipped.
pub fn decode(data: &[u8]) -> anyhow::Result<Vec<MetricsChunk>> {
    let mut cursor = Cursor::new(data);
    let mut chunks = Vec::new();

    while (cursor.position() as usize) < data.len() {
        let doc = Document::from_reader(&mut cursor).context("read container document")?;

        match doc.get_i32("type") {
            Ok(1) => {}
            Ok(other) => {
                debug!(doc_type = other, "skipping non-metric document");
                continue;
            }
            Err(_) => {
                debug!("skipping untyped document");
                continue;
            }
        }

        let payload = doc
            .get_binary_generic("data")
            .context("metric document has no data binary")?;
        chunks.push(decode_chunk(payload).context("decode metric chunk")?);
    }

    debug!(chunks = chunks.len(), "decoded container");
    Ok(chunks)
}

/// Decode a capture file, or every regular file of a capture directory in
/// sorted name order (diagnostic.data directories name files so that this is
/// temporal order).
pub fn decode_path(path: &Path) -> anyhow::Result<Vec<MetricsChunk>> {
    let meta =
        fs::metadata(path).with_context(|| format!("read input path {}", path.display()))?;
    if !meta.is_dir() {
        let data = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        return decode(&data).with_context(|| format!("decode {}", path.display()));
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in
        fs::read_dir(path).with_context(|| format!("read directory {}", path.display()))?
    {
        let entry = entry.with_context(|| format!("read directory {}", path.display()))?;
        if entry
            .file_type()
            .with_context(|| format!("stat {}", entry.path().display()))?
            .is_file()
        {
            files.push(entry.path());
        }
    }
    files.sort();

    let mut chunks = Vec::new();
    for file in files {
        let data = fs::read(&file).with_context(|| format!("read {}", file.display()))?;
        chunks.extend(decode(&data).with_context(|| format!("decode {}", file.display()))?);
    }
    Ok(chunks)
}

/// Inflate and unpack one metric chunk payload.
fn decode_chunk(payload: &[u8]) -> anyhow::Result<MetricsChunk> {
    if payload.len() < 4 {
        bail!("metric chunk truncated: {} bytes", payload.len());
    }
    let uncompressed_len = u32::from_le_bytes(payload[0..4].try_into().unwrap()) as usize;

    let mut inflated = Vec::with_capacity(uncompressed_len);
    ZlibDecoder::new(&payload[4..])
        .read_to_end(&mut inflated)
        .context("inflate metric chunk")?;
    if inflated.len() != uncompressed_len {
        bail!(
            "inflated chunk is {} bytes, header says {}",
            inflated.len(),
            uncompressed_len
        );
    }

    let mut cursor = Cursor::new(inflated.as_slice());
    let reference = Document::from_reader(&mut cursor).context("read reference document")?;
    let metric_count = read_u32(&mut cursor).context("read metric count")? as usize;
    let delta_count = read_u32(&mut cursor).context("read delta count")? as usize;

    let mut metrics: Vec<(String, u64)> = Vec::with_capacity(metric_count);
    flatten_document(&mut metrics, "", &reference);
    if metrics.len() != metric_count {
        bail!(
            "reference document yields {} metrics, header says {}",
            metrics.len(),
            metric_count
        );
    }

    // The delta stream is metric-major; zero runs carry across metrics.
    let mut chunk = MetricsChunk::default();
    let mut zeros: u64 = 0;
    for (name, start) in metrics {
        let mut samples = Vec::with_capacity(delta_count + 1);
        let mut value = start;
        samples.push(value);
        for _ in 0..delta_count {
            let delta = if zeros > 0 {
                zeros -= 1;
                0
            } else {
                let v = read_varint(&mut cursor).context("read delta stream")?;
                if v == 0 {
                    zeros = read_varint(&mut cursor).context("read zero run length")?;
                }
                v
            };
            value = value.wrapping_add(delta);
            samples.push(value);
        }
        chunk.series.insert(name, samples);
    }

    Ok(chunk)
}

fn read_u32(cursor: &mut Cursor<&[u8]>) -> anyhow::Result<u32> {
    let mut buf = [0u8; 4];
    cursor.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Unsigned LEB128.
fn read_varint(cursor: &mut Cursor<&[u8]>) -> anyhow::Result<u64> {
    let mut result = 0u64;
    let mut shift = 0u32;
    loop {
        let mut byte = [0u8; 1];
        cursor
            .read_exact(&mut byte)
            .context("varint stream truncated")?;
        result |= u64::from(byte[0] & 0x7f) << shift;
        if byte[0] & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
        if shift >= 64 {
            bail!("varint overflows u64");
        }
    }
}

/// Flatten a reference document into `/`-joined series names with their
/// first sample, preserving document order. The order must match the wire
/// layout of the delta stream exactly.
fn flatten_document(out: &mut Vec<(String, u64)>, prefix: &str, doc: &Document) {
    for (name, value) in doc {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };
        flatten_value(out, &path, value);
    }
}

fn flatten_value(out: &mut Vec<(String, u64)>, path: &str, value: &Bson) {
    match value {
        Bson::Double(v) => out.push((path.to_string(), *v as u64)),
        Bson::Int32(v) => out.push((path.to_string(), *v as u64)),
        Bson::Int64(v) => out.push((path.to_string(), *v as u64)),
        Bson::Boolean(v) => out.push((path.to_string(), u64::from(*v))),
        Bson::DateTime(v) => out.push((path.to_string(), v.timestamp_millis() as u64)),
        // A Timestamp is two on-wire metrics: seconds, then increment.
        Bson::Timestamp(ts) => {
            out.push((path.to_string(), u64::from(ts.time)));
            out.push((format!("{path}/inc"), u64::from(ts.increment)));
        }
        Bson::Document(nested) => flatten_document(out, path, nested),
        Bson::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_value(out, &format!("{path}/{index}"), item);
            }
        }
        // Strings, ObjectIds, etc. carry no samples.
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::spec::BinarySubtype;
    use bson::{Binary, doc};
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_varint(out: &mut Vec<u8>, mut value: u64) {
        loop {
            let mut byte = (value & 0x7f) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            out.push(byte);
            if value == 0 {
                return;
            }
        }
    }

    /// Assemble one type-1 container document around a reference doc and a
    /// pre-encoded delta stream.
    fn container(reference: &Document, metric_count: u32, delta_count: u32, deltas: &[u8]) -> Vec<u8> {
        let mut block = Vec::new();
        reference.to_writer(&mut block).unwrap();
        block.extend_from_slice(&metric_count.to_le_bytes());
        block.extend_from_slice(&delta_count.to_le_bytes());
        block.extend_from_slice(deltas);

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&block).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut payload = Vec::new();
        payload.extend_from_slice(&(block.len() as u32).to_le_bytes());
        payload.extend_from_slice(&compressed);

        let outer = doc! {
            "_id": bson::DateTime::from_millis(0),
            "type": 1i32,
            "data": Bson::Binary(Binary { subtype: BinarySubtype::Generic, bytes: payload }),
        };
        let mut bytes = Vec::new();
        outer.to_writer(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn varint_roundtrip() {
        for value in [0u64, 1, 127, 128, 300, 16_383, 16_384, u64::MAX] {
            let mut encoded = Vec::new();
            write_varint(&mut encoded, value);
            let mut cursor = Cursor::new(encoded.as_slice());
            assert_eq!(read_varint(&mut cursor).unwrap(), value);
        }
    }

    #[test]
    fn flatten_joins_paths_in_document_order() {
        let reference = doc! {
            "serverStatus": {
                "opcounters": { "insert": 5i64 },
                "ok": 1.0,
            },
            "replSetGetStatus": { "date": bson::DateTime::from_millis(1000) },
        };
        let mut out = Vec::new();
        flatten_document(&mut out, "", &reference);
        assert_eq!(
            out,
            vec![
                ("serverStatus/opcounters/insert".to_string(), 5),
                ("serverStatus/ok".to_string(), 1),
                ("replSetGetStatus/date".to_string(), 1000),
            ]
        );
    }

    #[test]
    fn flatten_expands_timestamps_and_arrays() {
        let reference = doc! {
            "ts": Bson::Timestamp(bson::Timestamp { time: 9, increment: 2 }),
            "arr": [3i32, 4i32],
            "name": "ignored",
        };
        let mut out = Vec::new();
        flatten_document(&mut out, "", &reference);
        assert_eq!(
            out,
            vec![
                ("ts".to_string(), 9),
                ("ts/inc".to_string(), 2),
                ("arr/0".to_string(), 3),
                ("arr/1".to_string(), 4),
            ]
        );
    }

    #[test]
    fn decodes_assembled_container() {
        let reference = doc! {
            "replSetGetStatus": { "date": bson::DateTime::from_millis(1000) },
            "serverStatus": { "opcounters": { "insert": 5i32 } },
        };
        // One delta per metric: date +1000, insert +3.
        let mut deltas = Vec::new();
        write_varint(&mut deltas, 1000);
        write_varint(&mut deltas, 3);
        let data = container(&reference, 2, 1, &deltas);

        let chunks = decode(&data).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].series.get("replSetGetStatus/date"),
            Some(&vec![1000, 2000])
        );
        assert_eq!(
            chunks[0].series.get("serverStatus/opcounters/insert"),
            Some(&vec![5, 8])
        );
    }

    #[test]
    fn zero_runs_span_metric_boundaries() {
        let reference = doc! { "a": 10i32, "b": 20i32 };
        // Metric-major deltas: a = [5, 0, 0], b = [0, 0, 7].
        // Encoded: 5, then a zero run of 1 + 3 = 4, then 7.
        let mut deltas = Vec::new();
        write_varint(&mut deltas, 5);
        write_varint(&mut deltas, 0);
        write_varint(&mut deltas, 3);
        write_varint(&mut deltas, 7);
        let data = container(&reference, 2, 3, &deltas);

        let chunks = decode(&data).unwrap();
        assert_eq!(chunks[0].series.get("a"), Some(&vec![10, 15, 15, 15]));
        assert_eq!(chunks[0].series.get("b"), Some(&vec![20, 20, 20, 27]));
    }

    #[test]
    fn skips_metadata_documents() {
        let metadata = doc! { "_id": bson::DateTime::from_millis(0), "type": 0i32 };
        let mut bytes = Vec::new();
        metadata.to_writer(&mut bytes).unwrap();

        let reference = doc! { "a": 1i32 };
        let mut deltas = Vec::new();
        write_varint(&mut deltas, 1);
        bytes.extend_from_slice(&container(&reference, 1, 1, &deltas));

        let chunks = decode(&bytes).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].series.get("a"), Some(&vec![1, 2]));
    }

    #[test]
    fn directory_files_decode_in_sorted_name_order() {
        let dir = tempfile::tempdir().unwrap();

        let reference = doc! { "a": 1i32 };
        let mut deltas = Vec::new();
        write_varint(&mut deltas, 1);
        fs::write(
            dir.path().join("metrics.2026-01-02"),
            container(&reference, 1, 1, &deltas),
        )
        .unwrap();

        let reference = doc! { "a": 100i32 };
        let mut deltas = Vec::new();
        write_varint(&mut deltas, 1);
        fs::write(
            dir.path().join("metrics.2026-01-01"),
            container(&reference, 1, 1, &deltas),
        )
        .unwrap();

        let chunks = decode_path(dir.path()).unwrap();
        assert_eq!(chunks.len(), 2);
        // The 01-01 file sorts (and therefore decodes) first.
        assert_eq!(chunks[0].series.get("a"), Some(&vec![100, 101]));
        assert_eq!(chunks[1].series.get("a"), Some(&vec![1, 2]));
    }

    #[test]
    fn missing_path_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(decode_path(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn metric_count_mismatch_is_fatal() {
        let reference = doc! { "a": 1i32 };
        let data = container(&reference, 3, 0, &[]);
        assert!(decode(&data).is_err());
    }

    #[test]
    fn garbage_input_is_fatal() {
        assert!(decode(&[0xff, 0x00, 0x13, 0x37]).is_err());
    }
}
