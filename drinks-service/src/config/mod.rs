use jsonwebtoken::Algorithm;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DrinksConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub seed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Dev),
            "prod" | "production" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Identity provider host, e.g. `tenant.us.auth0.com`.
    pub domain: String,
    pub audience: String,
    pub algorithms: Vec<Algorithm>,
    pub jwks_url: String,
    pub jwks_refresh_seconds: u64,
    /// Fixed HMAC key used instead of the JWKS when set.
    pub shared_secret: Option<String>,
    pub shared_kid: String,
}

impl AuthConfig {
    pub fn issuer(&self) -> String {
        issuer_for(&self.domain)
    }

    pub fn jwks_refresh(&self) -> Duration {
        Duration::from_secs(self.jwks_refresh_seconds)
    }
}

fn issuer_for(domain: &str) -> String {
    format!("https://{}/", domain.trim_end_matches('/'))
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Unset means drinks live in process memory.
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DrinksConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let domain = get_env("AUTH0_DOMAIN", None, is_prod)?;
        let default_jwks = format!("{}.well-known/jwks.json", issuer_for(&domain));

        Ok(DrinksConfig {
            common: common_config,
            environment,
            service_name: get_env("SERVICE_NAME", Some("drinks-service"), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok(),
            auth: AuthConfig {
                audience: get_env("API_AUDIENCE", None, is_prod)?,
                algorithms: parse_algorithms(&get_env("AUTH_ALGORITHMS", Some("RS256"), is_prod)?)?,
                jwks_url: get_env("AUTH_JWKS_URL", Some(&default_jwks), false)?,
                jwks_refresh_seconds: parse_env("AUTH_JWKS_REFRESH_SECONDS", 3600)?,
                shared_secret: env::var("AUTH_SHARED_SECRET").ok(),
                shared_kid: get_env("AUTH_SHARED_KID", Some("local"), false)?,
                domain,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").ok(),
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,
                min_connections: parse_env("DATABASE_MIN_CONNECTIONS", 1)?,
            },
            seed: parse_env("DRINKS_SEED", false)?,
        })
    }
}

/// Comma-separated JWT algorithm names, e.g. `RS256,ES256`.
pub fn parse_algorithms(raw: &str) -> Result<Vec<Algorithm>, AppError> {
    let algorithms = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Algorithm::from_str(s).map_err(|_| {
                AppError::ConfigError(anyhow::anyhow!("Unsupported JWT algorithm: {}", s))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if algorithms.is_empty() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "AUTH_ALGORITHMS must name at least one algorithm"
        )));
    }
    Ok(algorithms)
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val.trim().parse().map_err(|e: T::Err| {
            AppError::ConfigError(anyhow::anyhow!("{} is invalid: {}", key, e))
        }),
        Err(_) => Ok(default),
    }
}
