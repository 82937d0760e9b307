//! # Frame Transport
//!
//! The duplex connection seam between a subscriber and the relay: two
//! bounded mpsc channels of JSON text frames, one per direction. An
//! in-process relay wires the two ends directly; a network listener
//! would pump a socket into the same pair. Dropping either end's sender
//! is how that side closes the connection.

use tokio::sync::mpsc;

/// Default per-connection frame buffer.
pub const DEFAULT_FRAME_CAPACITY: usize = 64;

/// One end of a duplex frame connection.
#[derive(Debug)]
pub struct FrameConn {
    /// Frames toward the peer.
    pub tx: mpsc::Sender<String>,
    /// Frames from the peer.
    pub rx: mpsc::Receiver<String>,
}

impl FrameConn {
    /// Split into independently owned halves.
    #[must_use]
    pub fn split(self) -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
        (self.tx, self.rx)
    }
}

/// Create a connected duplex pair with the given per-direction capacity.
///
/// The two ends are symmetric; by convention the first is held by the
/// client and the second by the relay.
#[must_use]
pub fn frame_duplex(capacity: usize) -> (FrameConn, FrameConn) {
    let (client_tx, relay_rx) = mpsc::channel(capacity);
    let (relay_tx, client_rx) = mpsc::channel(capacity);
    (
        FrameConn {
            tx: client_tx,
            rx: client_rx,
        },
        FrameConn {
            tx: relay_tx,
            rx: relay_rx,
        },
    )
}
