use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use desk_logging::{desk_trace, desk_warn};
use orderdesk_core::{InboundMessage, OutboundMessage};

use crate::{decode_inbound, encode_outbound, DecodeError};

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("host channel disconnected")]
    Disconnected,
    #[error("failed to encode {kind}: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Transport between the widget and its host page.
pub trait HostLink {
    fn send(&self, message: &OutboundMessage) -> Result<(), LinkError>;
    /// Next decoded host message, if one is waiting.
    fn try_recv(&self) -> Option<Result<InboundMessage, DecodeError>>;
}

/// Host link over in-process channels carrying JSON text.
///
/// Inbound text is decoded on a dedicated thread so that a slow or noisy
/// host never blocks the widget loop.
pub struct ChannelHostLink {
    outbound_tx: mpsc::Sender<String>,
    event_rx: mpsc::Receiver<Result<InboundMessage, DecodeError>>,
}

/// The host side of a [`ChannelHostLink`].
pub struct HostEnd {
    inbound_tx: mpsc::Sender<String>,
    outbound_rx: mpsc::Receiver<String>,
}

impl ChannelHostLink {
    pub fn new(outbound_tx: mpsc::Sender<String>, inbound_rx: mpsc::Receiver<String>) -> Self {
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            while let Ok(text) = inbound_rx.recv() {
                let decoded = decode_inbound(&text);
                if let Err(err) = &decoded {
                    desk_warn!("rejected host message: {}", err);
                }
                if event_tx.send(decoded).is_err() {
                    break;
                }
            }
        });

        Self {
            outbound_tx,
            event_rx,
        }
    }

    /// A connected link and the host end that drives it.
    pub fn pair() -> (Self, HostEnd) {
        let (outbound_tx, outbound_rx) = mpsc::channel();
        let (inbound_tx, inbound_rx) = mpsc::channel();
        let link = Self::new(outbound_tx, inbound_rx);
        (
            link,
            HostEnd {
                inbound_tx,
                outbound_rx,
            },
        )
    }

    /// Blocks up to `timeout` for the next host message.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Result<InboundMessage, DecodeError>> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl HostLink for ChannelHostLink {
    fn send(&self, message: &OutboundMessage) -> Result<(), LinkError> {
        let text = encode_outbound(message).map_err(|source| LinkError::Encode {
            kind: message.kind(),
            source,
        })?;
        desk_trace!("-> {}", text);
        self.outbound_tx
            .send(text)
            .map_err(|_| LinkError::Disconnected)
    }

    fn try_recv(&self) -> Option<Result<InboundMessage, DecodeError>> {
        self.event_rx.try_recv().ok()
    }
}

impl HostEnd {
    /// Deliver raw text as if posted by the host page.
    pub fn post(&self, text: impl Into<String>) -> Result<(), LinkError> {
        self.inbound_tx
            .send(text.into())
            .map_err(|_| LinkError::Disconnected)
    }

    pub fn try_recv(&self) -> Option<String> {
        self.outbound_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<String> {
        self.outbound_rx.recv_timeout(timeout).ok()
    }

    /// Splits into the sending and receiving halves for use on separate threads.
    pub fn split(self) -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
        (self.inbound_tx, self.outbound_rx)
    }
}
