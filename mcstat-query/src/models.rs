use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A Minecraft server address as dialled by the query sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
  pub host: String,
  pub port: u16,
}

impl Target {
  pub fn new(host: impl Into<String>, port: u16) -> Self {
    Self {
      host: host.into(),
      port,
    }
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.host, self.port)
  }
}

/// Normalized snapshot of a server's state at one point in time.
///
/// Records are never mutated after construction; the exporter replaces
/// the whole record on every successful acquisition.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusRecord {
  /// Round trip of the status ping in milliseconds.
  /// Only the native protocol reports it.
  pub latency: Option<f64>,
  /// Players currently online (0 when the server omits it).
  pub players_online: u32,
  /// Player slots, when reported.
  pub players_max: Option<u32>,
  /// Player UUID -> player name. May be a truncated sample of the
  /// online players, so its size need not match `players_online`.
  pub players: BTreeMap<String, String>,
}

impl StatusRecord {
  /// Number of players present in the sample.
  pub fn sample_size(&self) -> usize {
    self.players.len()
  }
}

/// Which query channel produced or rejected a status attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
  /// Native Server List Ping.
  Primary,
  /// Third-party HTTP status API.
  Fallback,
}

impl SourceKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      SourceKind::Primary => "primary",
      SourceKind::Fallback => "fallback",
    }
  }
}

impl fmt::Display for SourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
