//! Signer settings.

use tracing::warn;

/// Nonce length used when none is configured.
pub const DEFAULT_NONCE_SIZE: usize = 24;

/// Largest nonce length accepted from the environment.
pub const MAX_NONCE_SIZE: usize = 1024;

/// Envelope epoch used when none is configured.
pub const DEFAULT_EPOCH: u64 = 0;

/// Settings shared by every signature and envelope a signer produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerConfig {
    /// Length of the random nonce in each signature header
    pub nonce_size: usize,

    /// Epoch written into channel headers
    pub epoch: u64,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl SignerConfig {
    pub fn new(nonce_size: usize, epoch: u64) -> Self {
        Self { nonce_size, epoch }
    }

    /// Read `CHANCONF_NONCE_SIZE` and `CHANCONF_EPOCH`, falling back to the
    /// defaults when unset or unparseable.
    pub fn from_env() -> Self {
        let nonce_size = nonce_size_from(std::env::var("CHANCONF_NONCE_SIZE").ok().as_deref());

        let epoch = std::env::var("CHANCONF_EPOCH")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_EPOCH);

        Self { nonce_size, epoch }
    }
}

/// Parse a configured nonce length; zero or anything above
/// [`MAX_NONCE_SIZE`] falls back to [`DEFAULT_NONCE_SIZE`].
fn nonce_size_from(raw: Option<&str>) -> usize {
    match raw.and_then(|s| s.trim().parse::<usize>().ok()) {
        Some(n) if (1..=MAX_NONCE_SIZE).contains(&n) => n,
        Some(n) => {
            warn!(nonce_size = n, max = MAX_NONCE_SIZE, "nonce size out of range; using default");
            DEFAULT_NONCE_SIZE
        }
        None => DEFAULT_NONCE_SIZE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_values() {
        let config = SignerConfig::new(32, 7);
        assert_eq!(config.nonce_size, 32);
        assert_eq!(config.epoch, 7);
    }

    #[test]
    fn nonce_size_bounds() {
        assert_eq!(nonce_size_from(Some("32")), 32);
        assert_eq!(nonce_size_from(Some(" 1024 ")), MAX_NONCE_SIZE);
        assert_eq!(nonce_size_from(Some("1025")), DEFAULT_NONCE_SIZE);
        assert_eq!(nonce_size_from(Some("18446744073709551615")), DEFAULT_NONCE_SIZE);
        assert_eq!(nonce_size_from(Some("0")), DEFAULT_NONCE_SIZE);
        assert_eq!(nonce_size_from(Some("lots")), DEFAULT_NONCE_SIZE);
        assert_eq!(nonce_size_from(None), DEFAULT_NONCE_SIZE);
    }

    #[test]
    fn env_fallbacks() {
        // only reads the variables; tests elsewhere never set them
        let config = SignerConfig::from_env();
        if std::env::var("CHANCONF_NONCE_SIZE").is_err() {
            assert_eq!(config.nonce_size, DEFAULT_NONCE_SIZE);
        }
        if std::env::var("CHANCONF_EPOCH").is_err() {
            assert_eq!(config.epoch, DEFAULT_EPOCH);
        }
    }
}
