use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, trace, warn, Instrument};

use crate::{
    config::LinkConfig,
    credentials::WifiCredentials,
    error::{LinkError, SendError},
    events::{decode_lossy, Event, EventSink},
    link::{BoxedTransport, SerialLink},
};

/// Breather after a failed read, so a dead transport does not
/// turn the loop into a busy spin of error events.
const READ_ERROR_BACKOFF: Duration = Duration::from_millis(100);

struct ReadLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns the one [`SerialLink`] and runs the session around it.
///
/// Exactly two execution contexts ever touch the link: the caller of these
/// methods, and the single background read loop spawned on open. The mutex
/// around the link is the one serialization point between them; the read
/// loop holds it for at most one read timeout per iteration.
///
/// Every outcome, good or bad, is mirrored into the [`EventSink`]. Errors
/// never tear the session down; only [`close`](Self::close) does.
pub struct SessionController {
    link: Arc<Mutex<SerialLink>>,
    sink: Arc<dyn EventSink>,
    read_loop: Option<ReadLoop>,
}

impl SessionController {
    /// A new controller with a closed link.
    pub fn new<S: EventSink + 'static>(sink: S) -> Self {
        Self {
            link: Arc::new(Mutex::new(SerialLink::new())),
            sink: Arc::new(sink),
            read_loop: None,
        }
    }

    /// A controller whose link is already open over the given transport.
    /// Used by tests and anything else that brings its own wire.
    pub fn with_transport<S: EventSink + 'static>(
        sink: S,
        transport: BoxedTransport,
        config: LinkConfig,
    ) -> Self {
        let mut controller = Self {
            link: Arc::new(Mutex::new(SerialLink::with_transport(transport, config))),
            sink: Arc::new(sink),
            read_loop: None,
        };

        controller.start_read_loop();
        controller
    }

    /// Whether the link is open.
    pub async fn is_open(&self) -> bool {
        self.link.lock().await.is_open()
    }

    /// Open the link and start the read loop.
    ///
    /// Emits `Info` on a fresh connect and `Error` on failure. Opening while
    /// already open is a no-op success: same link, same read loop, no event.
    pub async fn open(&mut self, config: LinkConfig) -> Result<(), LinkError> {
        let port = config.port.clone();
        let baud = config.baud;

        {
            let mut link = self.link.lock().await;

            if link.is_open() {
                trace!("Already connected");
                return Ok(());
            }

            if let Err(e) = link.open(config) {
                self.sink.publish(Event::Error(e.to_string()));
                return Err(e);
            }
        }

        if self.read_loop.is_none() {
            self.start_read_loop();
        }

        self.sink
            .publish(Event::Info(format!("Connected to {port} at {baud} baud.")));

        Ok(())
    }

    /// Format the `setWifi` command from the credentials and put it on wire.
    ///
    /// Checks run in order: the link must be open, then both fields must be
    /// non-empty; nothing is written until both pass. Success emits `Sent`
    /// with the command; a write failure emits `Error` and surfaces the
    /// cause.
    pub async fn send(&mut self, credentials: &WifiCredentials) -> Result<(), SendError> {
        let mut link = self.link.lock().await;

        if !link.is_open() {
            return Err(SendError::NotConnected);
        }

        if credentials.ssid.is_empty() {
            return Err(SendError::EmptyField("SSID"));
        }

        if credentials.password.is_empty() {
            return Err(SendError::EmptyField("Password"));
        }

        let message = credentials.command_line();

        match link.write(message.clone().into_bytes()).await {
            Ok(()) => {
                self.sink.publish(Event::Sent(message));
                Ok(())
            }
            Err(e) => {
                self.sink.publish(Event::Error(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Stop the read loop, close the link, emit `Info("Disconnected.")`.
    ///
    /// Cancellation is cooperative; the loop notices within one read timeout
    /// and this method waits for it before releasing the port. Closing an
    /// already closed session does nothing and emits nothing.
    pub async fn close(&mut self) {
        if let Some(read_loop) = self.read_loop.take() {
            read_loop.cancel.cancel();

            if read_loop.handle.await.is_err() {
                warn!("Read loop ended in a panic");
            }
        }

        let mut link = self.link.lock().await;

        if link.is_open() {
            link.close();
            self.sink.publish(Event::Info("Disconnected.".to_string()));
        }
    }

    fn start_read_loop(&mut self) {
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(
            read_loop(self.link.clone(), self.sink.clone(), cancel.clone())
                .instrument(info_span!("read-loop")),
        );

        self.read_loop = Some(ReadLoop { cancel, handle });
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        // The loop task holds clones of the link and sink;
        // make sure it winds down with the controller.
        if let Some(read_loop) = self.read_loop.take() {
            read_loop.cancel.cancel();
        }
    }
}

/// Polls the link until cancelled.
///
/// A received line is decoded (hex fallback included) and emitted; blank
/// lines are dropped. A read error is emitted and the loop keeps going:
/// a flaky wire is the operator's to act on, not ours.
async fn read_loop(
    link: Arc<Mutex<SerialLink>>,
    sink: Arc<dyn EventSink>,
    cancel: CancellationToken,
) {
    debug!("Read loop running");

    loop {
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = async { link.lock().await.read_line().await } => result,
        };

        match result {
            Ok(Some(bytes)) => {
                let text = decode_lossy(&bytes);
                let text = text.trim();

                if !text.is_empty() {
                    sink.publish(Event::Received(text.to_string()));
                }
            }

            // Timeout with no data, go again.
            Ok(None) => continue,

            // The link got closed under us; nothing left to poll.
            Err(LinkError::NotOpen) => break,

            Err(e) => {
                sink.publish(Event::Error(e.to_string()));
                tokio::time::sleep(READ_ERROR_BACKOFF).await;
            }
        }
    }

    debug!("Read loop done");
}
