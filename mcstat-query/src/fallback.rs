//! Status lookup through the public mcsrvstat.us API.

use crate::error::{QueryError, Result};
use crate::models::{SourceKind, StatusRecord, Target};
use crate::StatusSource;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.mcsrvstat.us";

/// The API rejects requests without a descriptive user agent.
const USER_AGENT: &str = concat!("mcstat-exporter/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ApiResponse {
  #[serde(default)]
  players: Option<ApiPlayers>,
}

#[derive(Debug, Deserialize)]
struct ApiPlayers {
  #[serde(default)]
  online: Option<u32>,
  #[serde(default)]
  max: Option<u32>,
  #[serde(default)]
  list: Vec<ApiPlayer>,
}

#[derive(Debug, Deserialize)]
struct ApiPlayer {
  #[serde(default)]
  uuid: String,
  #[serde(default)]
  name: String,
}

/// HTTP client for the third-party status API.
#[derive(Debug, Clone)]
pub struct McSrvStat {
  client: Client,
  base_url: String,
}

impl McSrvStat {
  pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .user_agent(USER_AGENT)
      .build()?;

    Ok(Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
    })
  }

  fn url(&self, target: &Target) -> String {
    format!("{}/3/{}", self.base_url, target)
  }
}

#[async_trait]
impl StatusSource for McSrvStat {
  fn kind(&self) -> SourceKind {
    SourceKind::Fallback
  }

  async fn fetch(&self, target: &Target) -> Result<StatusRecord> {
    let response = self.client.get(self.url(target)).send().await?;

    let status = response.status();
    if status != StatusCode::OK {
      return Err(QueryError::FallbackStatus(status));
    }

    let body = response.text().await?;
    let record = parse_status(&body)?;
    debug!(server = %target, players_online = record.players_online, "fallback api answered");
    Ok(record)
  }
}

/// Build a record from an API response body.
///
/// Missing counts default to 0 / absent, missing `uuid` or `name` become
/// empty strings, and repeated uuids keep the last name seen.
pub fn parse_status(body: &str) -> Result<StatusRecord> {
  let response: ApiResponse = serde_json::from_str(body)?;

  let Some(players) = response.players else {
    return Ok(StatusRecord::default());
  };

  Ok(StatusRecord {
    latency: None,
    players_online: players.online.unwrap_or(0),
    players_max: players.max,
    players: players
      .list
      .into_iter()
      .map(|p| (p.uuid, p.name))
      .collect(),
  })
}
