//! Real-time WebSocket engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Per-connection outbound queue capacity.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer_size: usize,
    /// Per-session hub mailbox capacity.
    #[serde(default = "default_session_mailbox")]
    pub session_mailbox_size: usize,
    /// Interval between server pings in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Read deadline in seconds, reset by every inbound frame.
    #[serde(default = "default_pong_wait")]
    pub pong_wait_seconds: u64,
    /// Deadline for a single frame write in seconds.
    #[serde(default = "default_write_wait")]
    pub write_wait_seconds: u64,
    /// Consecutive unanswered pings before the peer is considered dead.
    #[serde(default = "default_max_missed_pongs")]
    pub max_missed_pongs: u32,
    /// Consecutive write timeouts or full queues before a slow consumer is closed.
    #[serde(default = "default_max_write_timeouts")]
    pub max_write_timeouts: u32,
    /// Largest accepted inbound text frame in bytes.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            outbound_buffer_size: default_outbound_buffer(),
            session_mailbox_size: default_session_mailbox(),
            ping_interval_seconds: default_ping_interval(),
            pong_wait_seconds: default_pong_wait(),
            write_wait_seconds: default_write_wait(),
            max_missed_pongs: default_max_missed_pongs(),
            max_write_timeouts: default_max_write_timeouts(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

impl RealtimeConfig {
    /// Ping interval as a [`Duration`].
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_seconds)
    }

    /// Read deadline as a [`Duration`].
    pub fn pong_wait(&self) -> Duration {
        Duration::from_secs(self.pong_wait_seconds)
    }

    /// Write deadline as a [`Duration`].
    pub fn write_wait(&self) -> Duration {
        Duration::from_secs(self.write_wait_seconds)
    }

    /// The ping interval must be strictly shorter than the read deadline,
    /// otherwise an idle but healthy peer would time out between pings.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.ping_interval_seconds == 0 {
            return Err(AppError::configuration(
                "realtime.ping_interval_seconds must be positive",
            ));
        }
        if self.ping_interval_seconds >= self.pong_wait_seconds {
            return Err(AppError::configuration(format!(
                "realtime.ping_interval_seconds ({}) must be shorter than realtime.pong_wait_seconds ({})",
                self.ping_interval_seconds, self.pong_wait_seconds
            )));
        }
        if self.outbound_buffer_size == 0 || self.session_mailbox_size == 0 {
            return Err(AppError::configuration(
                "realtime buffer sizes must be positive",
            ));
        }
        Ok(())
    }
}

fn default_outbound_buffer() -> usize {
    256
}

fn default_session_mailbox() -> usize {
    128
}

fn default_ping_interval() -> u64 {
    54
}

fn default_pong_wait() -> u64 {
    60
}

fn default_write_wait() -> u64 {
    10
}

fn default_max_missed_pongs() -> u32 {
    2
}

fn default_max_write_timeouts() -> u32 {
    3
}

fn default_max_message_bytes() -> usize {
    65_536
}
