use super::models::app_env::{AppEnv, Env};
use std::env;
use std::str::FromStr;

const DEFAULT_CONFIG_DIR: &str = "config";

impl AppEnv {
    /// Reads the process environment. Start-up cannot continue without it.
    pub fn new() -> AppEnv {
        Self::from_lookup(|name| env::var(name).ok()).unwrap_or_else(|e| panic!("ENV -> {}", e))
    }

    /// Builds the env from any variable source, reporting every missing variable at once.
    pub fn from_lookup<F>(lookup: F) -> Result<AppEnv, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |name: &'static str| match lookup(name) {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                missing.push(name);
                String::new()
            }
        };

        let env = required("ENV");
        let server_port = required("SERVER_PORT");
        let server_address = required("SERVER_ADDRESS");
        let clickhouse_url = required("CLICKHOUSE_HOST");
        let clickhouse_user = required("CLICKHOUSE_USER");
        let clickhouse_password = required("CLICKHOUSE_PASSWORD");
        let clickhouse_database = required("CLICKHOUSE_DATABASE");
        let postgres_host = required("POSTGRES_HOST");
        let postgres_user = required("POSTGRES_USER");
        let postgres_password = required("POSTGRES_PASSWORD");
        let postgres_database = required("POSTGRES_DATABASE");

        if !missing.is_empty() {
            return Err(format!("{} is not set", missing.join(", ")));
        }

        Ok(AppEnv {
            env: Env::from_str(&env)?,
            server_port: server_port
                .parse()
                .map_err(|_| format!("SERVER_PORT must be a port number, got '{}'", server_port))?,
            server_address,
            config_dir: lookup("CONFIG_DIR").unwrap_or_else(|| DEFAULT_CONFIG_DIR.to_string()),
            clickhouse_url,
            clickhouse_user,
            clickhouse_password,
            clickhouse_database,
            postgres_host,
            postgres_user,
            postgres_password,
            postgres_database,
        })
    }
}

impl Default for AppEnv {
    fn default() -> Self {
        Self::new()
    }
}
