//! campus-config - 配置加载库

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use thiserror::Error;

use secrecy::Secret;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    // 根据环境自动调整连接池大小
    match std::env::var("APP_ENV").as_deref() {
        Ok("production") => 50,
        _ => 10,
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 流通规则兜底配置
///
/// 仅在 loan_policies 表为空时用于播种初始策略；
/// 正式策略以数据库中的记录为准
#[derive(Debug, Clone, Deserialize)]
pub struct CirculationConfig {
    #[serde(default = "default_max_books")]
    pub max_books_per_student: u32,
    #[serde(default = "default_loan_period_days")]
    pub loan_period_days: u32,
    /// 每逾期日罚金（最小货币单位）
    #[serde(default = "default_fine_per_day_minor")]
    pub fine_per_day_minor: i64,
    #[serde(default = "default_fine_currency")]
    pub fine_currency: String,
}

fn default_max_books() -> u32 {
    3
}

fn default_loan_period_days() -> u32 {
    14
}

fn default_fine_per_day_minor() -> i64 {
    10
}

fn default_fine_currency() -> String {
    "INR".to_string()
}

impl Default for CirculationConfig {
    fn default() -> Self {
        Self {
            max_books_per_student: default_max_books(),
            loan_period_days: default_loan_period_days(),
            fine_per_day_minor: default_fine_per_day_minor(),
            fine_currency: default_fine_currency(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    pub app_env: String,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub circulation: CirculationConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config: Self = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("").split("_"))
            .extract()?;

        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}

#[cfg(test)]
mod tests;
