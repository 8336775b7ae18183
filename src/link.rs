use std::io;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_serial::SerialPortBuilderExt;
use tokio_util::codec::{Decoder, Framed};
use tracing::{debug, trace};

use crate::{config::LinkConfig, error::LinkError};

/// Codec for framing the byte stream into lines.
pub(crate) mod codec;

use codec::LinesCodec;

/// Anything a link can run over: a real serial stream, or an in-memory
/// pipe when testing.
pub trait Transport: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T> Transport for T where T: AsyncRead + AsyncWrite + Send + Unpin {}

/// A boxed [`Transport`].
pub type BoxedTransport = Box<dyn Transport>;

enum State {
    Closed,
    Open {
        framed: Framed<BoxedTransport, LinesCodec>,
        config: LinkConfig,
    },
}

/// A single serial connection.
///
/// Starts out closed. [`open`](Self::open) acquires the configured port and
/// transitions to open; opening an already open link is a no-op success and
/// does not reopen anything. [`close`](Self::close) never fails. Reads and
/// writes reject a closed link with [`LinkError::NotOpen`].
///
/// The session controller owns the only instance; nothing else may hold a
/// live handle to the underlying port.
pub struct SerialLink {
    state: State,
}

impl Default for SerialLink {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialLink {
    /// A new link in the closed state.
    pub fn new() -> Self {
        Self {
            state: State::Closed,
        }
    }

    /// A link which is already open over the given transport.
    ///
    /// This is the seam mocks plug into; production code goes through
    /// [`open`](Self::open) instead.
    pub fn with_transport(transport: BoxedTransport, config: LinkConfig) -> Self {
        Self {
            state: State::Open {
                framed: LinesCodec::default().framed(transport),
                config,
            },
        }
    }

    /// Whether the link is open.
    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open { .. })
    }

    /// The configuration of the open link, if any.
    pub fn config(&self) -> Option<&LinkConfig> {
        match &self.state {
            State::Closed => None,
            State::Open { config, .. } => Some(config),
        }
    }

    /// Acquire the configured port at 8-N-1 and transition to open.
    ///
    /// Already open: returns `Ok(())` without touching the port.
    pub fn open(&mut self, config: LinkConfig) -> Result<(), LinkError> {
        if self.is_open() {
            trace!("Open called on an open link, nothing to do");
            return Ok(());
        }

        if config.port.is_empty() {
            return Err(LinkError::OpenFailed {
                port: config.port,
                detail: "no port selected".into(),
            });
        }

        debug!(port = %config.port, baud = %config.baud, "Opening port");

        let stream = tokio_serial::new(&config.port, config.baud.into())
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .open_native_async()
            .map_err(|e| LinkError::OpenFailed {
                port: config.port.clone(),
                detail: e.to_string(),
            })?;

        self.state = State::Open {
            framed: LinesCodec::default().framed(Box::new(stream) as BoxedTransport),
            config,
        };

        Ok(())
    }

    /// Put one line on the wire. The codec appends the line terminator.
    ///
    /// The bytes are transmitted exactly once on success; no retry happens
    /// at this layer.
    pub async fn write(&mut self, bytes: Vec<u8>) -> Result<(), LinkError> {
        match &mut self.state {
            State::Closed => Err(LinkError::NotOpen),
            State::Open { framed, .. } => framed.send(bytes).await,
        }
    }

    /// Wait for one line from the wire, at most the configured read timeout.
    ///
    /// `Ok(None)` means the timeout elapsed with no complete line: a normal
    /// outcome, not end-of-stream. The timeout is a hard bound; this never
    /// blocks longer, so a concurrent close request stays responsive.
    pub async fn read_line(&mut self) -> Result<Option<Vec<u8>>, LinkError> {
        match &mut self.state {
            State::Closed => Err(LinkError::NotOpen),
            State::Open { framed, config } => {
                match tokio::time::timeout(config.read_timeout, framed.next()).await {
                    // No complete line within the timeout.
                    Err(_elapsed) => Ok(None),
                    Ok(Some(result)) => result.map(Some),
                    Ok(None) => Err(LinkError::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "the device went away",
                    ))),
                }
            }
        }
    }

    /// Release the port and transition to closed. Never fails;
    /// closing a closed link is a no-op.
    pub fn close(&mut self) {
        if self.is_open() {
            debug!("Closing link");
            self.state = State::Closed;
        }
    }
}
