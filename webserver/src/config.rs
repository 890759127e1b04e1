use shared::log_config::LogConfig;

#[derive(clap::ValueEnum, Clone, Debug, Copy)]
pub enum CargoEnv {
    Development,
    Production,
}

#[derive(clap::Parser)]
pub struct AppConfig {
    #[clap(long, env, value_enum, default_value_t = CargoEnv::Development)]
    pub cargo_env: CargoEnv,

    #[clap(long, env, default_value = "5000")]
    pub port: u16,

    #[clap(long, env, default_value = "60", help = "Request timeout in seconds")]
    pub http_timeout: u64,

    #[command(flatten)]
    pub log: LogConfig,
}
