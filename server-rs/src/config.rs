use std::env;
use std::time::Duration;

pub const PAYPAL_SANDBOX_BASE: &str = "https://api-m.sandbox.paypal.com";
pub const PAYPAL_LIVE_BASE: &str = "https://api-m.paypal.com";
pub const RESEND_API_BASE: &str = "https://api.resend.com";

/// Selects which payment host the gateway talks to and whether
/// non-production conveniences (test tier, provider payloads) are exposed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeploymentMode {
    Sandbox,
    Live,
}

impl DeploymentMode {
    /// An explicit `PAYPAL_MODE` wins; otherwise `NODE_ENV=production` means live.
    pub fn resolve(paypal_mode: Option<&str>, node_env: &str) -> Self {
        match paypal_mode.map(|m| m.trim().to_ascii_lowercase()) {
            Some(m) if m == "live" || m == "production" => Self::Live,
            Some(m) if m == "sandbox" || m == "test" => Self::Sandbox,
            _ if node_env.trim().eq_ignore_ascii_case("production") => Self::Live,
            _ => Self::Sandbox,
        }
    }

    pub fn paypal_base_url(self) -> &'static str {
        match self {
            Self::Sandbox => PAYPAL_SANDBOX_BASE,
            Self::Live => PAYPAL_LIVE_BASE,
        }
    }

    pub fn is_live(self) -> bool {
        self == Self::Live
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Live => "live",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub mode: DeploymentMode,
    pub cors_origins: Vec<String>,
    pub payment: PaymentConfig,
    pub email: EmailConfig,
    pub bank: BankTransferConfig,
    pub workflow: WorkflowConfig,
}

#[derive(Clone, Debug)]
pub struct PaymentConfig {
    pub client_id: String,
    pub client_secret: String,
    pub currency: String,
    pub api_base: Option<String>,
}

#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub api_key: String,
    pub from: String,
    pub admin_recipient: String,
    pub api_base: Option<String>,
}

/// Wire-transfer details quoted in deferred-payment emails.
#[derive(Clone, Debug, Default)]
pub struct BankTransferConfig {
    pub account_holder: String,
    pub bank_name: String,
    pub account_number: String,
    pub routing_number: String,
    pub account_type: String,
    pub address: String,
}

#[derive(Clone, Debug)]
pub struct WorkflowConfig {
    /// Payment-integrated variant: an order reference and country are mandatory.
    pub payment_required: bool,
    pub provider_timeout_secs: u64,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        let node_env = env_or("NODE_ENV", "development");
        let mode = DeploymentMode::resolve(env_opt("PAYPAL_MODE").as_deref(), &node_env);
        let defaults = Config::default();

        Self {
            port: env_or_parse("PORT", defaults.port),
            mode,
            cors_origins: env_opt("CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            payment: PaymentConfig {
                client_id: env_or("PAYPAL_CLIENT_ID", ""),
                client_secret: env_or("PAYPAL_CLIENT_SECRET", ""),
                currency: env_or("PAYPAL_CURRENCY", &defaults.payment.currency),
                api_base: env_opt("PAYPAL_API_BASE"),
            },
            email: EmailConfig {
                api_key: env_or("RESEND_API_KEY", ""),
                from: env_or("EMAIL_FROM", &defaults.email.from),
                admin_recipient: env_or("ADMIN_EMAIL", &defaults.email.admin_recipient),
                api_base: env_opt("RESEND_API_BASE"),
            },
            bank: BankTransferConfig {
                account_holder: env_or("BANK_ACCOUNT_HOLDER", ""),
                bank_name: env_or("BANK_NAME", ""),
                account_number: env_or("BANK_ACCOUNT_NUMBER", ""),
                routing_number: env_or("BANK_ROUTING_NUMBER", ""),
                account_type: env_or("BANK_ACCOUNT_TYPE", ""),
                address: env_or("BANK_ADDRESS", ""),
            },
            workflow: WorkflowConfig {
                payment_required: env_or_parse("PAYMENT_REQUIRED", false),
                provider_timeout_secs: env_or_parse(
                    "PROVIDER_TIMEOUT_SECS",
                    defaults.workflow.provider_timeout_secs,
                ),
            },
        }
    }

    /// Provider acknowledgements are only echoed back outside production.
    pub fn expose_provider_details(&self) -> bool {
        !self.mode.is_live()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            mode: DeploymentMode::Sandbox,
            cors_origins: Vec::new(),
            payment: PaymentConfig::default(),
            email: EmailConfig::default(),
            bank: BankTransferConfig::default(),
            workflow: WorkflowConfig::default(),
        }
    }
}

impl PaymentConfig {
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigError::Missing("PAYPAL_CLIENT_ID"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(ConfigError::Missing("PAYPAL_CLIENT_SECRET"));
        }
        Ok((&self.client_id, &self.client_secret))
    }

    pub fn base_url(&self, mode: DeploymentMode) -> String {
        self.api_base
            .as_deref()
            .unwrap_or(mode.paypal_base_url())
            .trim_end_matches('/')
            .to_string()
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            currency: "USD".to_string(),
            api_base: None,
        }
    }
}

impl EmailConfig {
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("RESEND_API_KEY"));
        }
        Ok(&self.api_key)
    }

    pub fn base_url(&self) -> String {
        self.api_base
            .as_deref()
            .unwrap_or(RESEND_API_BASE)
            .trim_end_matches('/')
            .to_string()
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            from: "Herscape <contact@herscape.org>".to_string(),
            admin_recipient: "contact@herscape.org".to_string(),
            api_base: None,
        }
    }
}

impl BankTransferConfig {
    pub fn is_configured(&self) -> bool {
        !self.account_number.trim().is_empty() && !self.routing_number.trim().is_empty()
    }
}

impl WorkflowConfig {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs.max(1))
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            payment_required: false,
            provider_timeout_secs: 15,
        }
    }
}
