mod error;
pub mod fallback;
mod models;
pub mod primary;
pub mod protocol;

pub use error::{QueryError, Result};
pub use fallback::McSrvStat;
pub use models::{SourceKind, StatusRecord, Target};
pub use primary::JavaPing;

use async_trait::async_trait;

/// A single-attempt status query against one channel.
///
/// Implementations never retry; retry and fallback ordering belong to the
/// caller.
#[async_trait]
pub trait StatusSource: Send + Sync {
  /// Channel this source queries, used in log fields.
  fn kind(&self) -> SourceKind;

  /// Query the target once.
  async fn fetch(&self, target: &Target) -> Result<StatusRecord>;
}
