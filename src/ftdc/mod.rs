//! FTDC layer: decoding the binary diagnostic container into chunks of
//! aligned time series.
//!
//! This module owns:
//! - MetricsChunk (decoded series mapping + key discovery)
//! - the container decoder (BSON stream -> zlib -> delta-packed samples)

pub mod chunk;
pub mod decode;

pub use chunk::{MetricsChunk, TIMESTAMP_KEY};
pub use decode::{decode, decode_path};
