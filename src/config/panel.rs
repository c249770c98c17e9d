/// 面板配置

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigResult};

const APP_DIR: &str = "tms_runner";

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// 面板配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// 设置存储文件（本地存储的等价物）
    pub settings_path: String,

    /// 用户数据目录，仅用于调试报告
    pub user_data_dir: String,

    /// 扩展目录，仅用于调试报告
    pub extension_dir: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        let data = data_dir();
        Self {
            settings_path: data.join("settings.json").to_string_lossy().into_owned(),
            user_data_dir: data.to_string_lossy().into_owned(),
            extension_dir: std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .to_string_lossy()
                .into_owned(),
        }
    }
}

impl PanelConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.settings_path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Settings path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_path() {
        let config = PanelConfig::default();
        assert!(config.settings_path.ends_with("settings.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_settings_path_rejected() {
        let config = PanelConfig {
            settings_path: "  ".to_string(),
            ..PanelConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
