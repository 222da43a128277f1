use super::{app_config::AppConfig, app_env::AppEnv};

/// Process environment plus the TOML file it points at.
#[derive(Debug)]
pub struct AppSettings {
    pub app_config: AppConfig,
    pub app_env: AppEnv,
}

impl AppSettings {
    /// Reads the environment, then `<CONFIG_DIR>/<ENV>.toml`. Panics when either is unusable.
    pub fn load() -> Self {
        let app_env = AppEnv::new();
        let app_config = AppConfig::new(&app_env.env, &app_env.config_dir);
        Self { app_config, app_env }
    }
}
