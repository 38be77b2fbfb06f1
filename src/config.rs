use crate::error::{BadEnvVarSnafu, ParseEnvVarSnafu, SatchelResult, ZeroEnvVarSnafu};
use dotenvy::var;
use secrecy::{ExposeSecret, SecretString};
use snafu::{ResultExt, ensure};
use std::{env::VarError, sync::Arc, time::Duration};

const DEFAULT_SERVER_IP: &str = "0.0.0.0:5000";
const DEFAULT_MAX_CONNECTIONS: u32 = 15;
const DEFAULT_CONNECT_ATTEMPTS: u32 = 10;
const DEFAULT_RETRY_DELAY_SECS: u64 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    db_config: Arc<DbConfig>,
    server_config: Arc<ServerConfig>,
}

impl RuntimeConfiguration {
    pub fn new() -> SatchelResult<Self> {
        Self::from_lookup(var)
    }

    ///`lookup` stands in for the process environment so tests don't have to touch it
    pub fn from_lookup(
        lookup: impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    ) -> SatchelResult<Self> {
        Ok(Self {
            db_config: Arc::new(DbConfig::from_lookup(&lookup)?),
            server_config: Arc::new(ServerConfig::from_lookup(&lookup)?),
        })
    }

    pub fn db_config(&self) -> Arc<DbConfig> {
        self.db_config.clone()
    }

    pub fn server_config(&self) -> Arc<ServerConfig> {
        self.server_config.clone()
    }
}

#[derive(Debug)]
pub struct DbConfig {
    url: SecretString,
    pub max_connections: u32,
    pub connect_attempts: u32,
    pub retry_delay: Duration,
    pub acquire_timeout: Duration,
}

impl DbConfig {
    fn from_lookup(
        lookup: &impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    ) -> SatchelResult<Self> {
        let url = lookup("DATABASE_URL").context(BadEnvVarSnafu {
            name: "DATABASE_URL",
        })?;

        let connect_attempts = optional_number(
            lookup,
            "SATCHEL_DB_CONNECT_ATTEMPTS",
            DEFAULT_CONNECT_ATTEMPTS,
        )?;
        ensure!(
            connect_attempts > 0,
            ZeroEnvVarSnafu {
                name: "SATCHEL_DB_CONNECT_ATTEMPTS"
            }
        );

        let max_connections = optional_number(
            lookup,
            "SATCHEL_DB_MAX_CONNECTIONS",
            DEFAULT_MAX_CONNECTIONS,
        )?;
        ensure!(
            max_connections > 0,
            ZeroEnvVarSnafu {
                name: "SATCHEL_DB_MAX_CONNECTIONS"
            }
        );

        Ok(Self {
            url: SecretString::from(url),
            max_connections,
            connect_attempts,
            retry_delay: Duration::from_secs(optional_number(
                lookup,
                "SATCHEL_DB_RETRY_DELAY_SECS",
                DEFAULT_RETRY_DELAY_SECS,
            )?),
            acquire_timeout: Duration::from_secs(optional_number(
                lookup,
                "SATCHEL_DB_ACQUIRE_TIMEOUT_SECS",
                DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?),
        })
    }

    pub fn get_db_url(&self) -> &str {
        self.url.expose_secret()
    }
}

#[derive(Debug)]
pub struct ServerConfig {
    pub server_ip: String,
}

impl ServerConfig {
    fn from_lookup(
        lookup: &impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    ) -> SatchelResult<Self> {
        Ok(Self {
            server_ip: optional(lookup, "SATCHEL_SERVER_IP")?
                .unwrap_or_else(|| DEFAULT_SERVER_IP.to_string()),
        })
    }
}

fn optional(
    lookup: &impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    name: &'static str,
) -> SatchelResult<Option<String>> {
    match lookup(name) {
        Ok(value) => Ok(Some(value)),
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(None),
        Err(source) => Err(source).context(BadEnvVarSnafu { name }),
    }
}

fn optional_number<T: std::str::FromStr<Err = std::num::ParseIntError>>(
    lookup: &impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    name: &'static str,
    default: T,
) -> SatchelResult<T> {
    match optional(lookup, name)? {
        Some(value) => value.trim().parse().context(ParseEnvVarSnafu { name }),
        None => Ok(default),
    }
}
