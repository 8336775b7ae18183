#![deny(missing_docs)]

//! Send Wi-Fi credentials to an embedded device over a serial link.
//!
//! The crate is built around a single serial session:
//! a [`session::SessionController`] owns the one open [`link::SerialLink`],
//! runs a background read loop against it and reports everything that
//! happens (connects, sends, received lines, errors) as [`events::Event`]s
//! through an [`events::EventSink`].
//!
//! Port discovery is a stateless query in [`catalog`].
//! Presentation is someone else's job: the bundled CLI is one consumer
//! of the event stream, nothing in the core depends on it.

/// Enumeration of serial ports attached to the host.
pub mod catalog;

/// The command line interface.
pub mod cli;

/// Link configuration: port, baud rate, read timeout.
pub mod config;

/// Wi-Fi credentials and the wire command built from them.
pub mod credentials;

/// Possible errors in this library.
pub mod error;

/// Events the session emits, and the sink they are pushed through.
pub mod events;

/// The serial link: lifecycle, reads, writes.
pub mod link;

/// Logging/tracing setup.
pub mod logging;

/// An in-memory device, useful to exercise a link without hardware.
pub mod mock;

/// The session controller and its background read loop.
pub mod session;
