use std::env;

use anyhow::Context;

use crate::database::connection::DbConfig;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DbConfig,
}

impl AppConfig {
    /// Reads `PORT`, `DATABASE_URL` and the optional `LOCAL` switch.
    /// Startup fails here when the required variables are absent.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let port = env::var("PORT")
            .context("missing PORT environment variable, set it in the environment or .env")?
            .parse::<u16>()
            .context("PORT is not a valid port number")?;
        let url =
            env::var("DATABASE_URL").context("missing DATABASE_URL environment variable")?;
        // LOCAL set means a local database without TLS, unset means a hosted one behind TLS
        let local = env::var("LOCAL").is_ok();
        Ok(Self {
            server: ServerConfig { port },
            database: DbConfig::new(url, local),
        })
    }
}
