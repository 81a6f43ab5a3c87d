//! Upstream fragment stream → Server-Sent-Events frames.
//!
//! [`Relay`] is the per-request state machine
//! (`idle → streaming → done | failed`); [`spawn`] drives it from a producer
//! task that feeds a bounded channel. The HTTP layer drains the channel and
//! the response ends when the channel closes.

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::dispatch::{FragmentStream, StreamEvent};

/// One SSE frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// `data: <json fragment>`
    Fragment(String),
    /// `event: done` / `data: <json full text>`
    Done(String),
    /// `event: error` / `data: <json message>`
    Error(String),
}

impl Frame {
    /// Value of the `event:` field; `None` for plain data frames.
    pub fn event(&self) -> Option<&'static str> {
        match self {
            Frame::Fragment(_) => None,
            Frame::Done(_) => Some("done"),
            Frame::Error(_) => Some("error"),
        }
    }

    /// The carried text, JSON-encoded so newlines never break the framing.
    pub fn data(&self) -> String {
        let text = match self {
            Frame::Fragment(t) | Frame::Done(t) | Frame::Error(t) => t,
        };
        serde_json::Value::String(text.clone()).to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    Streaming,
    Done,
    Failed,
}

/// Turns upstream events into frames while enforcing that nothing follows a
/// terminal frame.
#[derive(Debug)]
pub struct Relay {
    state: RelayState,
    accumulated: String,
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}

impl Relay {
    pub fn new() -> Self {
        Self { state: RelayState::Idle, accumulated: String::new() }
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Concatenation of every fragment relayed so far.
    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, RelayState::Done | RelayState::Failed)
    }

    pub fn on_fragment(&mut self, text: String) -> Option<Frame> {
        if self.is_finished() {
            return None;
        }
        self.state = RelayState::Streaming;
        self.accumulated.push_str(&text);
        Some(Frame::Fragment(text))
    }

    /// The done frame carries `full` as given by upstream, even when it
    /// differs from [`Relay::accumulated`].
    pub fn on_complete(&mut self, full: String) -> Option<Frame> {
        if self.is_finished() {
            return None;
        }
        if full != self.accumulated {
            debug!(
                streamed = self.accumulated.len(),
                completed = full.len(),
                "completion text differs from streamed fragments"
            );
        }
        self.state = RelayState::Done;
        Some(Frame::Done(full))
    }

    pub fn on_error(&mut self, message: String) -> Option<Frame> {
        if self.is_finished() {
            return None;
        }
        self.state = RelayState::Failed;
        Some(Frame::Error(message))
    }

    /// Feed one upstream item.
    pub fn on_event(&mut self, item: Result<StreamEvent, crate::UpstreamError>) -> Option<Frame> {
        match item {
            Ok(StreamEvent::Fragment(text)) => self.on_fragment(text),
            Ok(StreamEvent::Completed(full)) => self.on_complete(full),
            Err(e) => self.on_error(e.to_string()),
        }
    }
}

/// Relay `upstream` through a channel of `capacity` frames.
///
/// The producer task stops pulling upstream as soon as the receiver is
/// dropped. An upstream that ends without a completion event is closed with a
/// done frame carrying the accumulated text.
pub fn spawn(mut upstream: FragmentStream, capacity: usize) -> ReceiverStream<Frame> {
    let (tx, rx) = mpsc::channel(capacity.max(1));

    tokio::spawn(async move {
        let mut relay = Relay::new();

        while let Some(item) = upstream.next().await {
            if let Some(frame) = relay.on_event(item) {
                if tx.send(frame).await.is_err() {
                    debug!(relayed = relay.accumulated().len(), "client disconnected; dropping upstream stream");
                    return;
                }
            }
            if relay.is_finished() {
                break;
            }
        }

        if !relay.is_finished() {
            warn!("upstream ended without a completion event");
            let full = relay.accumulated().to_owned();
            if let Some(frame) = relay.on_complete(full) {
                let _ = tx.send(frame).await;
            }
        }

        debug!(state = ?relay.state(), relayed = relay.accumulated().len(), "relay finished");
    });

    ReceiverStream::new(rx)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use futures::stream;

    use super::*;
    use crate::UpstreamError;

    fn scripted(items: Vec<Result<StreamEvent, UpstreamError>>) -> FragmentStream {
        Box::pin(stream::iter(items))
    }

    #[tokio::test]
    async fn fragments_then_done() {
        let upstream = scripted(vec![
            Ok(StreamEvent::Fragment("Hel".into())),
            Ok(StreamEvent::Fragment("lo".into())),
            Ok(StreamEvent::Completed("Hello".into())),
        ]);
        let frames: Vec<Frame> = spawn(upstream, 4).collect().await;

        assert_eq!(
            frames,
            vec![
                Frame::Fragment("Hel".into()),
                Frame::Fragment("lo".into()),
                Frame::Done("Hello".into()),
            ]
        );
        let joined: String = frames
            .iter()
            .filter_map(|f| match f {
                Frame::Fragment(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(joined, "Hello");
    }

    #[tokio::test]
    async fn upstream_error_ends_with_error_frame() {
        let upstream = scripted(vec![
            Ok(StreamEvent::Fragment("par".into())),
            Err(UpstreamError::Stream("connection reset".into())),
            Ok(StreamEvent::Fragment("never".into())),
        ]);
        let frames: Vec<Frame> = spawn(upstream, 4).collect().await;

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], Frame::Fragment("par".into()));
        assert_eq!(frames[1], Frame::Error("upstream stream failed: connection reset".into()));
    }

    #[tokio::test]
    async fn missing_completion_is_closed_with_accumulated_text() {
        let upstream = scripted(vec![
            Ok(StreamEvent::Fragment("a".into())),
            Ok(StreamEvent::Fragment("b".into())),
        ]);
        let frames: Vec<Frame> = spawn(upstream, 1).collect().await;

        assert_eq!(frames.last(), Some(&Frame::Done("ab".into())));
    }

    #[tokio::test]
    async fn dropped_receiver_stops_pulling_upstream() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&pulled);
        let upstream: FragmentStream = Box::pin(stream::iter(0..1000).map(move |i| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(StreamEvent::Fragment(i.to_string()))
        }));

        let mut frames = spawn(upstream, 1);
        assert!(frames.next().await.is_some());
        drop(frames);

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(pulled.load(Ordering::SeqCst) < 1000);
    }

    #[test]
    fn nothing_follows_a_terminal_frame() {
        let mut relay = Relay::new();
        assert_eq!(relay.state(), RelayState::Idle);
        assert!(relay.on_fragment("x".into()).is_some());
        assert_eq!(relay.state(), RelayState::Streaming);
        assert!(relay.on_error("boom".into()).is_some());
        assert_eq!(relay.state(), RelayState::Failed);
        assert!(relay.on_fragment("y".into()).is_none());
        assert!(relay.on_complete("xy".into()).is_none());
        assert_eq!(relay.accumulated(), "x");
    }

    #[test]
    fn done_frame_keeps_upstream_text() {
        let mut relay = Relay::new();
        relay.on_fragment("Hel".into());
        let frame = relay.on_complete("Hello!".into()).unwrap();
        assert_eq!(frame, Frame::Done("Hello!".into()));
        assert_eq!(relay.accumulated(), "Hel");
    }

    #[test]
    fn frames_carry_event_name_and_json_data() {
        let fragment = Frame::Fragment("Hel".into());
        assert_eq!(fragment.event(), None);
        assert_eq!(fragment.data(), "\"Hel\"");

        let done = Frame::Done("a\nb".into());
        assert_eq!(done.event(), Some("done"));
        assert_eq!(done.data(), "\"a\\nb\"");

        assert_eq!(Frame::Error("bad".into()).event(), Some("error"));
    }
}
