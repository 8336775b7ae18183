//! An in-memory device, useful to exercise a link and session without
//! actual serial hardware.
//!
//! [`MockDevice::new`] hands out two ends of a pipe: a transport for
//! [`SerialLink::with_transport`](crate::link::SerialLink::with_transport),
//! and a handle for scripting the device side. Dropping the handle looks
//! like the device going away.

use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt, DuplexStream};

use crate::link::BoxedTransport;

/// The device side of an in-memory serial connection.
///
/// Methods panic on pipe failure; this type exists for tests, where that is
/// the right reaction.
pub struct MockDevice {
    stream: DuplexStream,
}

impl MockDevice {
    /// A fresh connection: the transport to hand the link, and the device
    /// side to keep in the test.
    pub fn new() -> (BoxedTransport, Self) {
        let (link_side, device_side) = duplex(1024);

        (Box::new(link_side), Self {
            stream: device_side,
        })
    }

    /// Put raw bytes on the wire, exactly as given.
    pub async fn send_bytes(&mut self, bytes: &[u8]) {
        self.stream
            .write_all(bytes)
            .await
            .expect("mock device write should work");
    }

    /// Put a line on the wire, terminated for the link's codec.
    pub async fn send_line(&mut self, line: &str) {
        self.send_bytes(line.as_bytes()).await;
        self.send_bytes(b"\n").await;
    }

    /// The next line the link put on the wire, terminator included.
    pub async fn read_sent(&mut self) -> Vec<u8> {
        let mut bytes = vec![];

        loop {
            let byte = self
                .stream
                .read_u8()
                .await
                .expect("mock device read should work");

            bytes.push(byte);

            if byte == b'\n' {
                return bytes;
            }
        }
    }
}
