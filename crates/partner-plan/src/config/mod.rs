use crate::plan::{PlanConfig, PlanConfigError};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration: service settings from the environment plus the
/// compensation plan the engine runs on.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub plan: PlanConfig,
}

impl AppConfig {
    /// Loads from the process environment. The plan starts from the published
    /// tables; the tuning constants flagged as business policy can be
    /// overridden per deployment without a code change.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let mut plan = PlanConfig::default();
        if let Some(margin) = read_plan_number("PLAN_SAFETY_MARGIN")? {
            plan.safety_margin = margin;
        }
        if let Some(volume) = read_plan_number("PLAN_AVERAGE_PARTNER_VOLUME")? {
            plan.average_partner_volume = volume;
        }
        if let Some(size) = read_plan_number("PLAN_MIN_NETWORK_SIZE")? {
            plan.min_network_size = size as usize;
        }
        plan.validate()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            plan,
        })
    }
}

fn read_plan_number(name: &'static str) -> Result<Option<f64>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidPlanNumber { name }),
        Err(_) => Ok(None),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPlanNumber { name: &'static str },
    Plan(PlanConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPlanNumber { name } => {
                write!(f, "{name} must parse to a number")
            }
            ConfigError::Plan(err) => write!(f, "plan configuration rejected: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidPlanNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Plan(source) => Some(source),
        }
    }
}

impl From<PlanConfigError> for ConfigError {
    fn from(value: PlanConfigError) -> Self {
        Self::Plan(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "PLAN_SAFETY_MARGIN",
            "PLAN_AVERAGE_PARTNER_VOLUME",
            "PLAN_MIN_NETWORK_SIZE",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn defaults_load_and_validate() {
        let _guard = env_guard().lock().expect("env guard");
        reset_env();

        let config = AppConfig::load().expect("defaults load");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.plan.safety_margin, 0.20);
    }

    #[test]
    fn plan_overrides_are_applied_and_validated() {
        let _guard = env_guard().lock().expect("env guard");
        reset_env();

        env::set_var("PLAN_SAFETY_MARGIN", "0.35");
        let config = AppConfig::load().expect("override loads");
        assert_eq!(config.plan.safety_margin, 0.35);

        env::set_var("PLAN_SAFETY_MARGIN", "not-a-number");
        let err = AppConfig::load().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidPlanNumber {
                name: "PLAN_SAFETY_MARGIN"
            }
        ));

        env::set_var("PLAN_SAFETY_MARGIN", "-1");
        assert!(matches!(AppConfig::load(), Err(ConfigError::Plan(_))));

        reset_env();
    }

    #[test]
    fn localhost_resolves_to_loopback() {
        let server = ServerConfig {
            host: "localhost".to_string(),
            port: 8080,
        };
        let addr = server.socket_addr().expect("localhost resolves");
        assert_eq!(addr.to_string(), "127.0.0.1:8080");
    }
}
