/// Input validation for the query target and metric naming
use mcstat_query::Target;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Server hostname cannot be empty")]
    HostEmpty,

    #[error("Server hostname too long (max 253 characters, got {0})")]
    HostTooLong(usize),

    #[error("Server port must be between 1 and 65535")]
    PortZero,

    #[error("Metrics prefix '{0}' is not a valid metric name (letters, digits, '_' and ':', not starting with a digit)")]
    PrefixInvalid(String),
}

/// Validates the server to query
///
/// Rules:
/// - Hostname cannot be empty or whitespace
/// - Max 253 characters (DNS name limit)
/// - Port must be non-zero
pub fn validate_target(target: &Target) -> Result<(), ValidationError> {
    let host = target.host.trim();
    if host.is_empty() {
        return Err(ValidationError::HostEmpty);
    }

    if host.len() > 253 {
        return Err(ValidationError::HostTooLong(host.len()));
    }

    if target.port == 0 {
        return Err(ValidationError::PortZero);
    }

    Ok(())
}

/// Validates the optional metric name prefix
///
/// Rules:
/// - Empty means no prefix
/// - Otherwise must match `[a-zA-Z_:][a-zA-Z0-9_:]*`
pub fn validate_prefix(prefix: &str) -> Result<(), ValidationError> {
    let mut chars = prefix.chars();
    let Some(first) = chars.next() else {
        return Ok(());
    };

    let valid_first = first.is_ascii_alphabetic() || first == '_' || first == ':';
    if !valid_first || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':') {
        return Err(ValidationError::PrefixInvalid(prefix.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Target validation tests
    #[test]
    fn test_valid_targets() {
        assert!(validate_target(&Target::new("mc.example.org", 25565)).is_ok());
        assert!(validate_target(&Target::new("127.0.0.1", 1)).is_ok());
        assert!(validate_target(&Target::new("localhost", 65535)).is_ok());
    }

    #[test]
    fn test_empty_host() {
        assert_eq!(
            validate_target(&Target::new("", 25565)),
            Err(ValidationError::HostEmpty)
        );
        assert_eq!(
            validate_target(&Target::new("   ", 25565)),
            Err(ValidationError::HostEmpty)
        );
    }

    #[test]
    fn test_host_too_long() {
        let host = "a".repeat(254);
        assert_eq!(
            validate_target(&Target::new(host, 25565)),
            Err(ValidationError::HostTooLong(254))
        );
    }

    #[test]
    fn test_zero_port() {
        assert_eq!(
            validate_target(&Target::new("mc.example.org", 0)),
            Err(ValidationError::PortZero)
        );
    }

    // Prefix validation tests
    #[test]
    fn test_valid_prefixes() {
        assert!(validate_prefix("").is_ok());
        assert!(validate_prefix("minecraft").is_ok());
        assert!(validate_prefix("mc_survival").is_ok());
        assert!(validate_prefix("_internal").is_ok());
        assert!(validate_prefix("ns:mc2").is_ok());
    }

    #[test]
    fn test_invalid_prefixes() {
        assert_eq!(
            validate_prefix("1st"),
            Err(ValidationError::PrefixInvalid("1st".to_string()))
        );
        assert!(validate_prefix("mc-server").is_err());
        assert!(validate_prefix("mc server").is_err());
        assert!(validate_prefix("mc.server").is_err());
    }
}
