//! Newline-delimited JSON chunks into lazy streams of values.
//!
//! Each step parses one value at the current offset, then skips one byte for
//! the record delimiter. The value must start exactly at the offset: a blank
//! line or a `\r\n` delimiter leaves whitespace there and ends the chunk,
//! unless nothing but whitespace remains. The first position where no value
//! parses ends the chunk. A clean tail, a value cut off mid-way, and outright garbage all end
//! the stream the same way and none of them is an error; [`StreamEnd`]
//! records which one it was.

use std::fmt;

use serde_json::Value;

use s3select_core::schema::ColumnSpec;
use s3select_core::select::{JsonOutput, OutputSerialization};

use super::Reader;
use crate::error::{DecodeError, Result};

static JSON_SERIALIZATION: OutputSerialization =
    OutputSerialization::Json(JsonOutput::newline_delimited());

/// Why a chunk stopped yielding values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// Only whitespace (or nothing) was left.
    Exhausted,
    /// The input ended inside a value.
    Truncated,
    /// Bytes that are not JSON.
    Malformed,
}

/// Values of a single chunk.
pub struct ChunkValues {
    buf: Vec<u8>,
    offset: usize,
    end: Option<StreamEnd>,
}

impl ChunkValues {
    fn new(buf: Vec<u8>) -> Self {
        Self {
            buf,
            offset: 0,
            end: None,
        }
    }

    /// `None` until the stream has ended.
    pub fn stream_end(&self) -> Option<StreamEnd> {
        self.end
    }

    /// Byte offset the next parse attempt starts from.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn stop(&mut self, end: StreamEnd) -> Option<Value> {
        match end {
            StreamEnd::Exhausted => tracing::trace!(offset = self.offset, "json chunk exhausted"),
            StreamEnd::Truncated => {
                tracing::debug!(offset = self.offset, "json chunk ended inside a value")
            }
            StreamEnd::Malformed => tracing::warn!(
                offset = self.offset,
                len = self.buf.len(),
                "json chunk has undecodable trailing bytes; treating as end of chunk"
            ),
        }
        self.end = Some(end);
        None
    }
}

impl Iterator for ChunkValues {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.end.is_some() {
            return None;
        }
        let rest = self.buf.get(self.offset..).unwrap_or(&[]);
        match rest.iter().position(|b| !b.is_ascii_whitespace()) {
            None => return self.stop(StreamEnd::Exhausted),
            Some(0) => {}
            Some(_) => return self.stop(StreamEnd::Malformed),
        }
        let step = {
            let rest = self.buf.get(self.offset..).unwrap_or(&[]);
            let mut stream = serde_json::Deserializer::from_slice(rest).into_iter::<Value>();
            match stream.next() {
                Some(Ok(value)) => Ok((value, stream.byte_offset())),
                Some(Err(err)) if err.is_eof() => Err(StreamEnd::Truncated),
                Some(Err(_)) => Err(StreamEnd::Malformed),
                None => Err(StreamEnd::Exhausted),
            }
        };
        match step {
            Ok((value, consumed)) => {
                // +1 steps over the record delimiter.
                self.offset += consumed + 1;
                Some(value)
            }
            Err(end) => self.stop(end),
        }
    }
}

impl fmt::Debug for ChunkValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkValues")
            .field("len", &self.buf.len())
            .field("offset", &self.offset)
            .field("end", &self.end)
            .finish()
    }
}

/// Pull-based value stream over one or more chunks.
pub struct JsonValues {
    inner: Box<dyn Iterator<Item = Value> + Send>,
}

impl JsonValues {
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Value> + Send + 'static,
    {
        Self {
            inner: Box::new(iter),
        }
    }

    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }
}

impl Iterator for JsonValues {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        self.inner.next()
    }
}

impl fmt::Debug for JsonValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonValues").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesReader;

impl JsonLinesReader {
    pub fn new() -> Self {
        Self
    }

    /// Like [`Reader::read`], but keeps the per-chunk stream so callers can
    /// inspect [`ChunkValues::stream_end`] once it is drained.
    pub fn decode_chunk(&self, chunk: &[u8]) -> Result<ChunkValues> {
        std::str::from_utf8(chunk).map_err(DecodeError::Utf8)?;
        Ok(ChunkValues::new(chunk.to_vec()))
    }
}

impl Reader for JsonLinesReader {
    type Output = JsonValues;

    fn read(&self, chunk: &[u8], _columns: &ColumnSpec) -> Result<JsonValues> {
        Ok(JsonValues::new(self.decode_chunk(chunk)?))
    }

    fn combine(&self, partials: Vec<JsonValues>) -> JsonValues {
        tracing::trace!(parts = partials.len(), "chaining json streams");
        JsonValues::new(partials.into_iter().flatten())
    }

    fn serialization(&self) -> &OutputSerialization {
        &JSON_SERIALIZATION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn decodes_each_record() {
        let vals: Vec<Value> = JsonLinesReader
            .read(b"{\"a\":1}\n{\"b\":2}\n", &ColumnSpec::default())
            .unwrap()
            .collect();
        assert_eq!(vals, vec![json!({"a": 1}), json!({"b": 2})]);
    }

    #[test]
    fn truncated_tail_is_a_clean_stop() {
        let mut chunk = JsonLinesReader.decode_chunk(b"{\"a\":1}\n{\"b\":").unwrap();
        assert_eq!(chunk.next(), Some(json!({"a": 1})));
        assert_eq!(chunk.next(), None);
        assert_eq!(chunk.stream_end(), Some(StreamEnd::Truncated));
        assert_eq!(chunk.next(), None);
    }

    #[test]
    fn garbage_tail_is_a_clean_stop() {
        let mut chunk = JsonLinesReader.decode_chunk(b"[1,2]\n@@@\n{\"c\":3}\n").unwrap();
        assert_eq!(chunk.next(), Some(json!([1, 2])));
        assert_eq!(chunk.next(), None);
        assert_eq!(chunk.stream_end(), Some(StreamEnd::Malformed));
    }

    #[test]
    fn clean_tail_is_exhausted() {
        let mut chunk = JsonLinesReader.decode_chunk(b"1\n\"two\"\nnull\n").unwrap();
        let vals: Vec<Value> = chunk.by_ref().collect();
        assert_eq!(vals, vec![json!(1), json!("two"), Value::Null]);
        assert_eq!(chunk.stream_end(), Some(StreamEnd::Exhausted));
        assert_eq!(chunk.offset(), 13);
    }

    #[test]
    fn value_must_start_at_the_offset() {
        let mut crlf = JsonLinesReader.decode_chunk(b"{\"a\":1}\r\n{\"b\":2}\r\n").unwrap();
        assert_eq!(crlf.next(), Some(json!({"a": 1})));
        assert_eq!(crlf.next(), None);
        assert_eq!(crlf.stream_end(), Some(StreamEnd::Malformed));

        let blank = JsonLinesReader.decode_chunk(b"{\"a\":1}\n\n{\"b\":2}\n").unwrap();
        assert_eq!(blank.collect::<Vec<_>>(), vec![json!({"a": 1})]);

        let mut padded = JsonLinesReader.decode_chunk(b" 1\n").unwrap();
        assert_eq!(padded.next(), None);
        assert_eq!(padded.stream_end(), Some(StreamEnd::Malformed));
    }

    #[test]
    fn trailing_blank_lines_are_exhausted() {
        let mut chunk = JsonLinesReader.decode_chunk(b"{\"a\":1}\n\n \n").unwrap();
        assert_eq!(chunk.by_ref().count(), 1);
        assert_eq!(chunk.stream_end(), Some(StreamEnd::Exhausted));
    }

    #[test]
    fn combine_is_lazy_over_partials() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = pulled.clone();
        let tail = JsonValues::new(std::iter::from_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            None
        }));
        let head = JsonLinesReader.read(b"{\"a\":1}\n", &ColumnSpec::default()).unwrap();

        let mut combined = JsonLinesReader.combine(vec![head, tail]);
        assert_eq!(combined.next(), Some(json!({"a": 1})));
        assert_eq!(pulled.load(Ordering::SeqCst), 0);
        assert_eq!(combined.next(), None);
        assert_eq!(pulled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_chunk_yields_nothing() {
        let mut chunk = JsonLinesReader.decode_chunk(b"").unwrap();
        assert_eq!(chunk.next(), None);
        assert_eq!(chunk.stream_end(), Some(StreamEnd::Exhausted));
    }

    #[test]
    fn invalid_utf8_fails_eagerly() {
        let err = JsonLinesReader
            .read(b"{\"a\":\"\xff\"}\n", &ColumnSpec::default())
            .unwrap_err();
        assert!(err.is_decode());
    }
}
