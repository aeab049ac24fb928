//! Framing for streamed response bodies.
//!
//! Both streamed endpoints hand back a plain byte stream. It is turned into
//! an `AsyncRead` with [`StreamReader`] and framed with a codec: chat replies
//! as UTF-8 text fragments, audits as JSON lines.

use bytes::{Buf, Bytes, BytesMut};
use std::io;
use tokio_stream::{Stream, StreamExt};
use tokio_util::codec::{Decoder, FramedRead, LinesCodec};
use tokio_util::io::StreamReader;

use super::provider::{ProviderError, Result};

/// Decodes bytes into text as soon as they form complete code points.
///
/// A code point split across two network chunks stays in the read buffer
/// until its remaining bytes arrive. Invalid sequences become U+FFFD.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Codec;

impl Decoder for Utf8Codec {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> io::Result<Option<String>> {
        let mut out = String::new();

        while !src.is_empty() {
            match std::str::from_utf8(&src[..]) {
                Ok(text) => {
                    out.push_str(text);
                    src.clear();
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&src[..valid]));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            src.advance(valid + len);
                        }
                        None => {
                            // Truncated code point: wait for more bytes.
                            src.advance(valid);
                            break;
                        }
                    }
                }
            }
        }

        Ok((!out.is_empty()).then_some(out))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> io::Result<Option<String>> {
        if let Some(text) = self.decode(src)? {
            return Ok(Some(text));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let rest = String::from_utf8_lossy(&src[..]).into_owned();
        src.clear();
        Ok(Some(rest))
    }
}

fn body_reader<S, E>(body: S) -> StreamReader<impl Stream<Item = io::Result<Bytes>>, Bytes>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    StreamReader::new(body.map(|chunk| chunk.map_err(io::Error::other)))
}

/// Text fragments of a streamed body, in arrival order.
pub fn text_fragments<S, E>(body: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    FramedRead::new(body_reader(body), Utf8Codec).map(|fragment| fragment.map_err(ProviderError::from))
}

/// Non-blank, trimmed lines of a streamed body. The last line needs no
/// trailing newline.
pub fn json_lines<S, E>(body: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    FramedRead::new(body_reader(body), LinesCodec::new()).filter_map(|line| match line {
        Ok(line) => {
            let line = line.trim();
            (!line.is_empty()).then(|| Ok(line.to_string()))
        }
        Err(e) => Some(Err(ProviderError::Stream(e.to_string()))),
    })
}
