//! Response-body capture and bounded previews.
//!
//! The response body handed back by the handler chain is wrapped in
//! [`CaptureBody`], a body that mirrors every data frame into a bounded
//! buffer while forwarding it unmodified to the transport. When the stream
//! ends (or the body is dropped mid-stream) the exit log line is emitted
//! with the bounded preview.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::{Body, Bytes};
use http::{Method, StatusCode};
use http_body::{Body as HttpBody, Frame, SizeHint};
use lazy_static::lazy_static;
use regex::Regex;

use splitlog::Logger;

lazy_static! {
    /// Collapses escaped quotes, newlines, tabs and whitespace directly
    /// following `{`, `,` or `[`. Best-effort cosmetic transform, not a
    /// JSON parser.
    static ref COLLAPSE_RE: Regex = Regex::new(r#"\\(")|\n|\t|([{,\[])\s+"#).unwrap();
}

/// Beautify `bytes` and bound the result to `limit` characters, appending
/// an ellipsis when truncated. The limit counts characters, not bytes, so
/// multi-byte text is never split.
pub(crate) fn bounded_preview(bytes: &[u8], limit: usize) -> String {
    if bytes.is_empty() {
        return String::new();
    }
    let text = String::from_utf8_lossy(bytes);
    let collapsed = COLLAPSE_RE.replace_all(&text, "${1}${2}");
    let mut chars = collapsed.chars();
    let head: String = chars.by_ref().take(limit).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Everything needed to emit the exit log line once the response body has
/// been streamed.
pub(crate) struct ExitLine {
    pub logger: Arc<Logger>,
    pub client: String,
    pub status: StatusCode,
    pub started: Instant,
    pub method: Method,
    pub path: String,
    pub response_ext: String,
}

impl ExitLine {
    fn emit(self, preview: &str) {
        let elapsed = self.started.elapsed();
        let line = format!(
            "<- RESP | {:>15} | {:>3} | {:>13} | {} {} | {} {}",
            self.client,
            self.status.as_u16(),
            format!("{elapsed:?}"),
            self.method,
            self.path,
            self.response_ext,
            preview,
        );
        if self.status.as_u16() > 400 {
            self.logger.error(&line);
        } else {
            self.logger.info(&line);
        }
    }
}

/// Bounded mirror of the bytes flowing through a [`CaptureBody`].
struct CaptureBuf {
    buf: Vec<u8>,
    total: usize,
    limit: usize,
}

impl CaptureBuf {
    fn observe(&mut self, chunk: &[u8]) {
        self.total += chunk.len();
        let room = self.limit.saturating_sub(self.buf.len());
        if room > 0 {
            self.buf.extend_from_slice(&chunk[..room.min(chunk.len())]);
        }
    }

    /// Truncation triggers strictly past the limit, so a body of exactly
    /// `limit` bytes is shown whole.
    fn preview(&self) -> String {
        if self.total > self.limit {
            format!("{}...", String::from_utf8_lossy(&self.buf))
        } else {
            String::from_utf8_lossy(&self.buf).into_owned()
        }
    }
}

/// Decorator over the outbound body: forwards every frame unmodified while
/// mirroring data frames into a bounded buffer.
pub(crate) struct CaptureBody {
    inner: Body,
    capture: Option<CaptureBuf>,
    exit: Option<ExitLine>,
}

impl CaptureBody {
    /// `limit` of `None` disables the preview (ignored extension); the
    /// exit line is still emitted.
    pub(crate) fn new(inner: Body, limit: Option<usize>, exit: ExitLine) -> Self {
        Self {
            inner,
            capture: limit.map(|limit| CaptureBuf {
                buf: Vec::new(),
                total: 0,
                limit,
            }),
            exit: Some(exit),
        }
    }

    fn finish(&mut self) {
        if let Some(exit) = self.exit.take() {
            let preview = self
                .capture
                .as_ref()
                .map(CaptureBuf::preview)
                .unwrap_or_default();
            exit.emit(&preview);
        }
    }
}

impl HttpBody for CaptureBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_frame(cx) {
            Poll::Ready(Some(Ok(frame))) => {
                if let (Some(capture), Some(data)) = (this.capture.as_mut(), frame.data_ref()) {
                    capture.observe(data);
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Poll::Ready(Some(Err(err))) => {
                this.finish();
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                this.finish();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        HttpBody::size_hint(&self.inner)
    }
}

impl Drop for CaptureBody {
    // a client that disconnects mid-stream still gets its exit line
    fn drop(&mut self) {
        self.finish();
    }
}
