//! Native status query over the Server List Ping protocol.

use crate::error::{QueryError, Result};
use crate::models::{SourceKind, StatusRecord, Target};
use crate::protocol;
use crate::StatusSource;

use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::net::TcpStream;
use tracing::debug;

/// Default budget for one complete ping exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Status JSON as sent by the server. Only the player section is read.
#[derive(Debug, Deserialize)]
struct StatusResponse {
  #[serde(default)]
  players: Option<PlayersSection>,
}

#[derive(Debug, Deserialize)]
struct PlayersSection {
  #[serde(default)]
  online: Option<u32>,
  #[serde(default)]
  max: Option<u32>,
  #[serde(default)]
  sample: Option<Vec<SamplePlayer>>,
}

#[derive(Debug, Deserialize)]
struct SamplePlayer {
  #[serde(default)]
  id: String,
  #[serde(default)]
  name: String,
}

/// Queries a Java edition server directly.
#[derive(Debug, Clone)]
pub struct JavaPing {
  timeout: Duration,
}

impl JavaPing {
  pub fn new(timeout: Duration) -> Self {
    Self { timeout }
  }

  async fn ping(&self, target: &Target) -> Result<StatusRecord> {
    let mut stream = TcpStream::connect((target.host.as_str(), target.port)).await?;
    stream.set_nodelay(true)?;

    protocol::write_packet(
      &mut stream,
      protocol::HANDSHAKE,
      &protocol::handshake_body(&target.host, target.port),
    )
    .await?;
    protocol::write_packet(&mut stream, protocol::STATUS_REQUEST, &[]).await?;

    let (id, body) = protocol::read_packet(&mut stream).await?;
    if id != protocol::STATUS_RESPONSE {
      return Err(QueryError::Protocol(format!(
        "expected status response, got packet {id:#04x}"
      )));
    }
    let json = protocol::read_string(&mut body.as_slice())?;
    let mut record = parse_status(&json)?;

    let token = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map(|d| d.as_millis() as i64)
      .unwrap_or_default();
    let started = Instant::now();
    protocol::write_packet(&mut stream, protocol::PING, &token.to_be_bytes()).await?;
    let (id, body) = protocol::read_packet(&mut stream).await?;
    let elapsed = started.elapsed();

    if id != protocol::PONG {
      return Err(QueryError::Protocol(format!("expected pong, got packet {id:#04x}")));
    }
    if body.as_slice() != token.to_be_bytes().as_slice() {
      return Err(QueryError::Protocol("pong payload does not match ping".to_string()));
    }
    record.latency = Some(elapsed.as_secs_f64() * 1000.0);

    debug!(server = %target, latency_ms = ?record.latency, "server list ping completed");
    Ok(record)
  }
}

impl Default for JavaPing {
  fn default() -> Self {
    Self::new(DEFAULT_TIMEOUT)
  }
}

#[async_trait]
impl StatusSource for JavaPing {
  fn kind(&self) -> SourceKind {
    SourceKind::Primary
  }

  async fn fetch(&self, target: &Target) -> Result<StatusRecord> {
    tokio::time::timeout(self.timeout, self.ping(target))
      .await
      .map_err(|_| QueryError::Timeout(self.timeout))?
  }
}

/// Build a record from the status JSON. Latency is filled in by the caller.
fn parse_status(json: &str) -> Result<StatusRecord> {
  let response: StatusResponse = serde_json::from_str(json)
    .map_err(|e| QueryError::Protocol(format!("invalid status json: {e}")))?;

  let Some(players) = response.players else {
    return Ok(StatusRecord::default());
  };

  Ok(StatusRecord {
    latency: None,
    players_online: players.online.unwrap_or(0),
    players_max: players.max,
    players: players
      .sample
      .unwrap_or_default()
      .into_iter()
      .map(|p| (p.id, p.name))
      .collect(),
  })
}
