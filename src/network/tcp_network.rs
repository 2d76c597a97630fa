//! ## Handles the TCP transport between dispatcher and actuators
//!
//! Every actuator opens one TCP connection to the dispatcher. Frames are sent as
//! `(payload length) as u16` in big-endian followed by the payload, see [serial].
//!
//! The first frame on a connection must be [`Frame::Register`]. After that the actuator sends
//! [`Frame::Event`]s and receives [`Frame::Command`]s.

use anyhow::{bail, Context};
use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::sleep;

use super::{ActuatorLink, Route};
use crate::config;
use crate::messages::{serial, Event, Frame, Target};
use crate::print;

/// Reads one frame from `reader`.
///
/// ## Returns
/// - `Ok(Some(frame))` on success.
/// - `Ok(None)` if the peer closed the connection between two frames.
/// - `Err` on I/O errors, a connection closed mid-frame, or an undecodable payload.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> anyhow::Result<Option<Frame>> {
    let mut len_buf = [0u8; 2];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e).context("Failed to read frame length"),
    }

    let len = u16::from_be_bytes(len_buf) as usize;
    let mut buffer = vec![0u8; len];
    reader.read_exact(&mut buffer).await.context("Failed to read frame payload")?;

    match serial::deserialize_frame(&buffer) {
        Some(frame) => Ok(Some(frame)),
        None => bail!("Undecodable frame of {} bytes", len),
    }
}

/// Writes one frame to `writer` and flushes it.
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, frame: &Frame) -> anyhow::Result<()> {
    let buf = match serial::encode_frame(frame) {
        Some(buf) => buf,
        None => bail!("Could not encode {:?}", frame),
    };
    writer.write_all(&buf).await.context("Failed to write frame")?;
    writer.flush().await.context("Failed to flush stream")?;
    Ok(())
}

/// Binds the dispatcher's TCP listener.
pub async fn bind(addr: &str) -> anyhow::Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Error while setting up TCP listener on {}", addr))?;
    print::ok(format!("Dispatcher listening on {}", listener.local_addr()?));
    Ok(listener)
}

/// Accepts actuator connections.
///
/// ## Parameters
/// - `listener`: Bound listener, see [bind].
/// - `events_tx`: Sender to the dispatcher's inbound queue.
/// - `routes_tx`: Registrations for the router.
///
/// ## Behavior
/// Every accepted connection is served by its own task. The function only returns if the
/// router is gone.
pub async fn listener_task(listener: TcpListener, events_tx: mpsc::Sender<Event>, routes_tx: mpsc::Sender<Route>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                print::info(format!("{} connected to TCP", addr));
                if routes_tx.is_closed() {
                    print::err("Router is gone, listener stops".to_string());
                    break;
                }

                let events_tx = events_tx.clone();
                let routes_tx = routes_tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = serve_actuator(stream, addr, events_tx, routes_tx).await {
                        print::err(format!("Connection to {} closed: {:#}", addr, e));
                    }
                });
            }
            Err(e) => {
                print::err(format!("Error while accepting actuator connection: {}", e));
            }
        }
    }
}

/// Serves one actuator connection until it closes.
async fn serve_actuator(
    stream: TcpStream,
    addr: SocketAddr,
    events_tx: mpsc::Sender<Event>,
    routes_tx: mpsc::Sender<Route>,
) -> anyhow::Result<()> {
    let (mut reader, mut writer) = stream.into_split();

    let target = match read_frame(&mut reader).await? {
        Some(Frame::Register(target)) => target,
        Some(other) => bail!("Expected registration from {}, got {:?}", addr, other),
        None => return Ok(()),
    };

    let (tx, mut commands_rx) = mpsc::unbounded_channel();
    routes_tx
        .send(Route { target: target.clone(), tx })
        .await
        .context("Router is gone")?;

    let writer_target = target.clone();
    let writer_task = tokio::spawn(async move {
        while let Some(command) = commands_rx.recv().await {
            if let Err(e) = write_frame(&mut writer, &Frame::Command(command)).await {
                print::err(format!("Failed to send command to {}: {:#}", writer_target, e));
                break;
            }
        }
    });

    let result = forward_events(&mut reader, &target, &events_tx).await;
    writer_task.abort();
    print::info(format!("{} disconnected", target));
    result
}

async fn forward_events<R: AsyncRead + Unpin>(reader: &mut R, target: &Target, events_tx: &mpsc::Sender<Event>) -> anyhow::Result<()> {
    while let Some(frame) = read_frame(reader).await? {
        match frame {
            Frame::Event(Event::WatchdogFired { .. }) => {
                print::warn(format!("{} sent a watchdog event, ignored", target));
            }
            Frame::Event(event) => {
                if let (Target::Elevator(name), Some(elevator)) = (target, event.elevator()) {
                    if name != elevator {
                        print::warn(format!("{} sent an event for {}, ignored", target, elevator));
                        continue;
                    }
                }
                events_tx.send(event).await.context("Dispatcher queue closed")?;
            }
            other => print::warn(format!("Unexpected frame from {}: {:?}", target, other)),
        }
    }
    Ok(())
}

/// Connects an actuator to the dispatcher at `addr` and registers it as `target`.
///
/// ## Returns
/// An [`ActuatorLink`] backed by two tasks: one writing events to the connection,
/// one reading commands from it. Both stop when the connection closes.
pub async fn connect_actuator(addr: &str, target: Target) -> anyhow::Result<ActuatorLink> {
    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("Failed to connect to dispatcher at {}", addr))?;
    let (mut reader, mut writer) = stream.into_split();
    write_frame(&mut writer, &Frame::Register(target.clone())).await?;

    let (events_tx, mut events_rx) = mpsc::channel::<Event>(config::ACTUATOR_CHANNEL_CAPACITY);
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();

    let writer_target = target.clone();
    tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            if let Err(e) = write_frame(&mut writer, &Frame::Event(event)).await {
                print::err(format!("{}: failed to send event: {:#}", writer_target, e));
                break;
            }
        }
    });

    tokio::spawn(async move {
        loop {
            match read_frame(&mut reader).await {
                Ok(Some(Frame::Command(command))) => {
                    if commands_tx.send(command).is_err() {
                        break;
                    }
                }
                Ok(Some(other)) => print::warn(format!("{}: unexpected frame {:?}", target, other)),
                Ok(None) => {
                    print::info(format!("{}: dispatcher closed the connection", target));
                    break;
                }
                Err(e) => {
                    print::err(format!("{}: {:#}", target, e));
                    break;
                }
            }
        }
    });

    print::ok(format!("Connected to dispatcher at {}", addr));
    Ok(ActuatorLink { events_tx, commands_rx })
}

/// Same as [connect_actuator], but retries every [config::CONNECT_RETRY_DELAY] until the
/// dispatcher accepts the connection.
pub async fn connect_actuator_retrying(addr: &str, target: Target) -> ActuatorLink {
    loop {
        match connect_actuator(addr, target.clone()).await {
            Ok(link) => return link,
            Err(e) => {
                print::warn(format!("{}: {:#}, retrying", target, e));
                sleep(config::CONNECT_RETRY_DELAY).await;
            }
        }
    }
}
