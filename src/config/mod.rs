/// 统一配置系统
///
/// 提供TOML/JSON配置文件、环境变量覆盖和验证
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub mod host;
pub mod panel;

pub use crate::core::error::{ConfigError, ConfigResult};
pub use host::{HostConfig, ProjectConfig, RgbColor, SequenceConfig};
pub use panel::PanelConfig;

/// 运行器主配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// 宿主配置
    #[serde(default)]
    pub host: HostConfig,

    /// 面板配置
    #[serde(default)]
    pub panel: PanelConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RunnerConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        // 宿主配置
        if let Ok(val) = env::var("TMS_HOST_APP_NAME") {
            self.host.app_name = val;
        }
        if let Ok(val) = env::var("TMS_HOST_APP_VERSION") {
            self.host.app_version = val;
        }
        if let Ok(val) = env::var("TMS_RUNNER_FUNCTION") {
            self.host.runner_function = val;
        }
        if let Ok(val) = env::var("TMS_STARTUP_SCRIPTS") {
            self.host.startup_scripts = val
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(val) = env::var("TMS_HOST_MEMORY_LIMIT") {
            if let Ok(limit) = val.parse() {
                self.host.memory_limit_bytes = Some(limit);
            }
        }

        // 面板配置
        if let Ok(val) = env::var("TMS_SETTINGS_PATH") {
            self.panel.settings_path = val;
        }

        // 日志配置
        if let Ok(val) = env::var("TMS_LOG_LEVEL") {
            if let Some(level) = LogLevel::parse(&val) {
                self.logging.level = level;
            }
        }
        if let Ok(val) = env::var("TMS_LOG_FILE") {
            self.logging.log_to_file = true;
            self.logging.log_file_path = val;
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.host.validate()?;
        self.panel.validate()?;
        if self.logging.log_to_file && self.logging.log_file_path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Log file path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./tms_runner.toml
    /// 2. ./tms_runner.json
    /// 3. <config dir>/tms_runner/config.toml
    /// 4. 使用默认配置
    pub fn load_or_default() -> Self {
        if let Ok(config) = Self::from_toml_file("tms_runner.toml") {
            tracing::debug!(target: "bridge", "Loaded config from tms_runner.toml");
            return config;
        }

        if let Ok(config) = Self::from_json_file("tms_runner.json") {
            tracing::debug!(target: "bridge", "Loaded config from tms_runner.json");
            return config;
        }

        if let Some(config_path) = Self::user_config_path() {
            if let Ok(config) = Self::from_toml_file(&config_path) {
                tracing::debug!(target: "bridge", "Loaded config from {:?}", config_path);
                return config;
            }
        }

        Self::default()
    }

    /// 用户配置目录中的配置文件路径
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tms_runner").join("config.toml"))
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,

    /// 是否输出到文件
    pub log_to_file: bool,

    /// 日志文件路径
    pub log_file_path: String,

    /// 是否输出到控制台
    pub log_to_console: bool,
}

impl_default!(LoggingConfig {
    level: LogLevel::Info,
    log_to_file: false,
    log_file_path: "tms_runner.log".to_string(),
    log_to_console: true,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// 不区分大小写地解析级别名称
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}
