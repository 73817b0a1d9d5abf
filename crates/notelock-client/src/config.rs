//! Collaborator client configuration.
//!
//! Base URLs default to the live vendor endpoints; credentials are
//! required from the environment. Override everything explicitly (or via
//! [`RailsConfig::local_mock`]) for staging and tests.

use url::Url;

/// Configuration for the payment-processor and ledger collaborators.
///
/// Custom `Debug` implementation redacts every credential-bearing field
/// to prevent leakage in log output.
#[derive(Clone)]
pub struct RailsConfig {
    /// Base URL of the payment processor.
    /// Default: <https://api.nowpayments.io>
    pub nowpayments_url: Url,
    /// Payment processor API key.
    pub nowpayments_api_key: String,
    /// Shared secret the processor signs IPN callbacks with.
    pub ipn_secret: String,
    /// Base URL of the ledger notarization service.
    /// Default: <https://api.tatum.io>
    pub tatum_url: Url,
    /// Ledger service API key.
    pub tatum_api_key: String,
    /// Signing credential the ledger records with. Opaque pass-through;
    /// this service never interprets it.
    pub ledger_signing_key: String,
    /// Wallet address payments are settled to.
    pub payout_wallet: String,
    /// Public base URL of THIS service, used to build the IPN callback URL
    /// handed to the processor at charge creation.
    pub public_base_url: Url,
    /// Request timeout in seconds for both collaborators.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for RailsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RailsConfig")
            .field("nowpayments_url", &self.nowpayments_url)
            .field("nowpayments_api_key", &"[REDACTED]")
            .field("ipn_secret", &"[REDACTED]")
            .field("tatum_url", &self.tatum_url)
            .field("tatum_api_key", &"[REDACTED]")
            .field("ledger_signing_key", &"[REDACTED]")
            .field("payout_wallet", &self.payout_wallet)
            .field("public_base_url", &self.public_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl RailsConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `NOWPAYMENTS_API_URL` (default: `https://api.nowpayments.io`)
    /// - `NOWPAYMENTS_API_KEY` (required)
    /// - `NOWPAYMENTS_IPN_SECRET` (required)
    /// - `TATUM_API_URL` (default: `https://api.tatum.io`)
    /// - `TATUM_API_KEY` (required)
    /// - `LEDGER_SIGNING_KEY` (required)
    /// - `PAYOUT_WALLET` (required)
    /// - `PUBLIC_BASE_URL` (required — the processor must be able to reach
    ///   the webhook endpoint through it)
    /// - `UPSTREAM_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            nowpayments_url: env_url("NOWPAYMENTS_API_URL", "https://api.nowpayments.io")?,
            nowpayments_api_key: required_env("NOWPAYMENTS_API_KEY")?,
            ipn_secret: required_env("NOWPAYMENTS_IPN_SECRET")?,
            tatum_url: env_url("TATUM_API_URL", "https://api.tatum.io")?,
            tatum_api_key: required_env("TATUM_API_KEY")?,
            ledger_signing_key: required_env("LEDGER_SIGNING_KEY")?,
            payout_wallet: required_env("PAYOUT_WALLET")?,
            public_base_url: {
                let raw = required_env("PUBLIC_BASE_URL")?;
                Url::parse(&raw)
                    .map_err(|e| ConfigError::InvalidUrl("PUBLIC_BASE_URL".into(), e.to_string()))?
            },
            timeout_secs: std::env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Create a configuration pointing at local mock servers (for tests).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the localhost URL cannot be
    /// parsed (should not occur for valid port numbers, but avoids
    /// `expect()`).
    pub fn local_mock(base_port: u16, api_key: &str, ipn_secret: &str) -> Result<Self, ConfigError> {
        let make_url = |port: u16| -> Result<Url, ConfigError> {
            Url::parse(&format!("http://127.0.0.1:{port}"))
                .map_err(|e| ConfigError::InvalidUrl("localhost".to_string(), e.to_string()))
        };
        Ok(Self {
            nowpayments_url: make_url(base_port)?,
            nowpayments_api_key: api_key.to_string(),
            ipn_secret: ipn_secret.to_string(),
            tatum_url: make_url(base_port + 1)?,
            tatum_api_key: api_key.to_string(),
            ledger_signing_key: "0xtest-signing-key".to_string(),
            payout_wallet: "0xtest-payout-wallet".to_string(),
            public_base_url: make_url(base_port + 2)?,
            timeout_secs: 5,
        })
    }

    /// The IPN callback URL handed to the processor at charge creation.
    pub fn ipn_callback_url(&self) -> String {
        let base = self.public_base_url.as_str().trim_end_matches('/');
        format!("{base}/webhooks/payment")
    }
}

fn required_env(var: &str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::MissingVar(var.to_string()))
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
