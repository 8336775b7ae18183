use std::time::{Duration, Instant};

use color_eyre::Result;
use pretty_assertions::assert_eq;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver};
use wifi_provisioner::{
    config::LinkConfig,
    credentials::WifiCredentials,
    error::SendError,
    events::Event,
    mock::MockDevice,
    session::SessionController,
};

const READ_TIMEOUT: Duration = Duration::from_millis(50);

fn config() -> LinkConfig {
    LinkConfig::new("mock").read_timeout(READ_TIMEOUT)
}

fn connected_session() -> (SessionController, MockDevice, UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (transport, device) = MockDevice::new();
    let session = SessionController::with_transport(tx, transport, config());

    (session, device, rx)
}

async fn next_event(rx: &mut UnboundedReceiver<Event>) -> Event {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event stream ended")
}

async fn assert_nothing_sent(device: &mut MockDevice) {
    let outcome = tokio::time::timeout(READ_TIMEOUT, device.read_sent()).await;

    assert!(outcome.is_err(), "expected no bytes on the wire");
}

#[tokio::test]
async fn send_without_a_connection_is_rejected() -> Result<()> {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut session = SessionController::new(tx);

    let credentials = WifiCredentials::new("MyNet", "secret123");
    let outcome = session.send(&credentials).await;

    assert!(matches!(outcome, Err(SendError::NotConnected)));

    Ok(())
}

#[tokio::test]
async fn empty_ssid_is_rejected_before_any_write() -> Result<()> {
    let (mut session, mut device, _rx) = connected_session();

    let credentials = WifiCredentials::new("", "secret123");
    let outcome = session.send(&credentials).await;

    assert!(matches!(outcome, Err(SendError::EmptyField("SSID"))));
    assert_nothing_sent(&mut device).await;

    Ok(())
}

#[tokio::test]
async fn empty_password_is_rejected_before_any_write() -> Result<()> {
    let (mut session, mut device, _rx) = connected_session();

    let credentials = WifiCredentials::new("MyNet", "");
    let outcome = session.send(&credentials).await;

    assert!(matches!(outcome, Err(SendError::EmptyField("Password"))));
    assert_nothing_sent(&mut device).await;

    Ok(())
}

#[tokio::test]
async fn send_puts_the_exact_command_on_the_wire() -> Result<()> {
    let (mut session, mut device, mut rx) = connected_session();

    let credentials = WifiCredentials::new("MyNet", "secret123");
    session.send(&credentials).await?;

    assert_eq!(
        device.read_sent().await,
        b"setWifi - 'MyNet' --'secret123'\n".to_vec()
    );
    assert_eq!(
        next_event(&mut rx).await,
        Event::Sent("setWifi - 'MyNet' --'secret123'".into())
    );

    Ok(())
}

#[tokio::test]
async fn device_output_becomes_received_events() -> Result<()> {
    let (_session, mut device, mut rx) = connected_session();

    device.send_line("ssid accepted").await;

    assert_eq!(
        next_event(&mut rx).await,
        Event::Received("ssid accepted".into())
    );

    Ok(())
}

#[tokio::test]
async fn bad_utf8_is_reported_as_hex_and_the_loop_survives() -> Result<()> {
    let (_session, mut device, mut rx) = connected_session();

    device.send_bytes(b"\xFF\xFE\n").await;

    assert_eq!(next_event(&mut rx).await, Event::Received("Raw: fffe".into()));

    // The loop is still alive and decoding.
    device.send_line("still here").await;

    assert_eq!(
        next_event(&mut rx).await,
        Event::Received("still here".into())
    );

    Ok(())
}

#[tokio::test]
async fn blank_lines_are_not_reported() -> Result<()> {
    let (_session, mut device, mut rx) = connected_session();

    device.send_line("").await;
    device.send_line("   ").await;
    device.send_line("actual output").await;

    assert_eq!(
        next_event(&mut rx).await,
        Event::Received("actual output".into())
    );

    Ok(())
}

#[tokio::test]
async fn close_emits_one_disconnect_and_is_idempotent() -> Result<()> {
    let (mut session, _device, mut rx) = connected_session();

    session.close().await;

    assert_eq!(next_event(&mut rx).await, Event::Info("Disconnected.".into()));
    assert!(!session.is_open().await);

    session.close().await;

    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    Ok(())
}

#[tokio::test]
async fn close_returns_within_one_read_timeout() -> Result<()> {
    let (mut session, _device, _rx) = connected_session();

    let before = Instant::now();
    session.close().await;

    // One read timeout of loop latency, plus scheduling slack.
    assert!(before.elapsed() < READ_TIMEOUT + Duration::from_millis(200));

    Ok(())
}

#[tokio::test]
async fn open_while_open_is_a_no_op() -> Result<()> {
    let (mut session, mut device, mut rx) = connected_session();

    session.open(LinkConfig::new("/dev/ttyOther")).await?;

    // No connect event, no second read loop; the original link still works.
    device.send_line("one line").await;

    assert_eq!(next_event(&mut rx).await, Event::Received("one line".into()));
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    Ok(())
}

#[tokio::test]
async fn a_read_error_does_not_end_the_session() -> Result<()> {
    let (mut session, device, mut rx) = connected_session();

    // The device goes away mid-session.
    drop(device);

    assert!(matches!(next_event(&mut rx).await, Event::Error(_)));

    // The session is still up and only the operator closes it.
    assert!(session.is_open().await);

    session.close().await;

    Ok(())
}

#[tokio::test]
async fn failing_to_open_emits_an_error_event() -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = SessionController::new(tx);

    let outcome = session.open(LinkConfig::new("")).await;

    assert!(outcome.is_err());
    assert!(matches!(next_event(&mut rx).await, Event::Error(_)));
    assert!(!session.is_open().await);

    Ok(())
}
