//! Read and write loops for one connection.
//!
//! Both loops are generic over the transport so they can be driven by an
//! axum WebSocket or by in-process channels. Either loop stopping closes
//! the handle, which stops the other.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use rally_core::config::RealtimeConfig;

use super::frame::Frame;
use super::handle::ConnectionHandle;
use crate::hub::SessionHub;
use crate::message::builder::build_error;
use crate::message::validator::parse_inbound;
use crate::message::OutboundMessage;
use crate::metrics::RealtimeMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteFailure {
    Timeout,
    Transport,
}

async fn write_frame<K>(sink: &mut K, frame: Frame, deadline: Duration) -> Result<(), WriteFailure>
where
    K: Sink<Frame> + Unpin,
    K::Error: fmt::Display,
{
    match time::timeout(deadline, sink.send(frame)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            debug!(error = %e, "Transport write failed");
            Err(WriteFailure::Transport)
        }
        Err(_) => Err(WriteFailure::Timeout),
    }
}

/// Read frames until the peer goes away, the read deadline passes, or the
/// handle is closed. Text frames are decoded and handed to the hub; a
/// frame that fails to decode earns the sender a private error and the
/// loop carries on.
pub async fn read_loop<S, E>(
    handle: Arc<ConnectionHandle>,
    mut stream: S,
    hub: SessionHub,
    config: &RealtimeConfig,
    metrics: &RealtimeMetrics,
) where
    S: Stream<Item = Result<Frame, E>> + Unpin,
    E: fmt::Display,
{
    let closed = handle.closed_token();
    let pong_wait = config.pong_wait();

    loop {
        let next = tokio::select! {
            _ = closed.cancelled() => break,
            next = time::timeout(pong_wait, stream.next()) => next,
        };

        let frame = match next {
            Err(_) => {
                warn!(conn_id = %handle.id, "Read deadline elapsed");
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(e))) => {
                debug!(conn_id = %handle.id, error = %e, "Transport read failed");
                break;
            }
            Ok(Some(Ok(frame))) => frame,
        };

        match frame {
            Frame::Text(text) => {
                metrics.frame_received();
                match parse_inbound(&text, config.max_message_bytes) {
                    Ok(message) => {
                        if !hub.dispatch(handle.session_id, handle.id, message).await {
                            debug!(conn_id = %handle.id, "Session actor gone");
                            break;
                        }
                    }
                    Err(e) => {
                        handle.send(build_error(&e, Some(handle.user_id())));
                    }
                }
            }
            Frame::Pong(_) => handle.pong_received(),
            Frame::Ping(_) => {}
            Frame::Close => break,
        }
    }

    handle.close();
}

/// Drain the outbound queue into the sink and send keepalive pings.
///
/// Stops after `max_write_timeouts` consecutive write timeouts, when
/// `max_missed_pongs` pings in a row go unanswered, on a transport error,
/// or when the handle is closed. On close, messages already queued are
/// flushed before the close frame.
pub async fn write_loop<K>(
    handle: Arc<ConnectionHandle>,
    mut sink: K,
    mut rx: mpsc::Receiver<OutboundMessage>,
    config: RealtimeConfig,
    metrics: Arc<RealtimeMetrics>,
) where
    K: Sink<Frame> + Unpin,
    K::Error: fmt::Display,
{
    let closed = handle.closed_token();
    let write_wait = config.write_wait();
    let interval = config.ping_interval();
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut timeouts = 0u32;

    loop {
        tokio::select! {
            msg = rx.recv() => {
                let Some(msg) = msg else { break };
                match write_frame(&mut sink, Frame::Text(msg.to_json()), write_wait).await {
                    Ok(()) => {
                        timeouts = 0;
                        metrics.message_sent();
                    }
                    Err(WriteFailure::Timeout) => {
                        timeouts += 1;
                        warn!(conn_id = %handle.id, timeouts, "Write deadline elapsed");
                        if timeouts >= config.max_write_timeouts {
                            break;
                        }
                    }
                    Err(WriteFailure::Transport) => break,
                }
            }
            _ = ticker.tick() => {
                if handle.unanswered_pings() >= config.max_missed_pongs {
                    warn!(
                        conn_id = %handle.id,
                        missed = handle.unanswered_pings(),
                        "Peer stopped answering pings"
                    );
                    break;
                }
                handle.ping_sent();
                if write_frame(&mut sink, Frame::Ping(Vec::new()), write_wait).await.is_err() {
                    break;
                }
            }
            _ = closed.cancelled() => {
                while let Ok(msg) = rx.try_recv() {
                    if write_frame(&mut sink, Frame::Text(msg.to_json()), write_wait).await.is_err() {
                        break;
                    }
                    metrics.message_sent();
                }
                let _ = write_frame(&mut sink, Frame::Close, write_wait).await;
                break;
            }
        }
    }

    handle.close();
    debug!(conn_id = %handle.id, "Write loop ended");
}
