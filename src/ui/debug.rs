//! 调试信息报告

use std::fmt;

use crate::config::PanelConfig;
use crate::ui::settings::SettingsStore;

/// 调试报告
#[derive(Debug, Clone)]
pub struct DebugReport {
    /// 宿主发布的环境记录（原始文本）
    pub host_environment: String,
    pub user_data: String,
    pub extension: String,
    /// 原样存储的设置对象
    pub settings: serde_json::Value,
}

impl DebugReport {
    pub fn collect(host_environment: String, panel: &PanelConfig, store: &SettingsStore) -> Self {
        Self {
            host_environment,
            user_data: panel.user_data_dir.clone(),
            extension: panel.extension_dir.clone(),
            settings: store.raw_settings(),
        }
    }
}

impl fmt::Display for DebugReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settings =
            serde_json::to_string_pretty(&self.settings).unwrap_or_else(|_| "{}".to_string());
        write!(
            f,
            "=== TMS Runner Debug ===\nHostEnvironment:\n{}\n\nUserData: {}\nExtension: {}\n\nSettings:\n{}",
            self.host_environment, self.user_data, self.extension, settings
        )
    }
}
