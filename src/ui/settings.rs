//! 面板设置存储
//!
//! 本地存储的等价物：一个 JSON 文件，键映射到 JSON 字符串。每次修改后立即
//! 写回磁盘。

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{ConfigError, ConfigResult};

/// 面板设置的存储键
pub const SETTINGS_KEY: &str = "tms.runner.settings.v1";

/// 面板模式的存储键
pub const MODE_KEY: &str = "tms_mode";

/// 默认面板模式
pub const DEFAULT_MODE: &str = "manual";

/// 用户可调整的面板设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PanelSettings {
    /// 启动时打开的标签页
    pub default_tab: String,
    /// 强调色 `#rrggbb`
    pub accent: String,
    /// 紧凑布局
    pub compact: bool,
}

impl_default!(PanelSettings {
    default_tab: "main".to_string(),
    accent: "#4a90e2".to_string(),
    compact: false,
});

impl PanelSettings {
    /// 验证设置
    pub fn validate(&self) -> ConfigResult<()> {
        if !is_hex_color(&self.accent) {
            return Err(ConfigError::ValidationError(format!(
                "Accent must be a #rrggbb colour, got '{}'",
                self.accent
            )));
        }
        if self.default_tab.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Default tab must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// 键值设置存储
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl SettingsStore {
    /// 打开存储文件；文件不存在时为空存储，内容损坏时丢弃
    pub fn open<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(target: "panel", path = %path.display(), error = %e, "Settings store corrupt, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(ConfigError::FileError(e)),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set_item(&mut self, key: &str, value: impl Into<String>) -> ConfigResult<()> {
        self.entries.insert(key.to_string(), value.into());
        self.flush()
    }

    pub fn remove_item(&mut self, key: &str) -> ConfigResult<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&self) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// 读取面板设置，缺失或损坏时返回默认值
    pub fn load_settings(&self) -> PanelSettings {
        self.get_item(SETTINGS_KEY)
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    /// 原样存储的设置对象，缺失或损坏时为空对象
    pub fn raw_settings(&self) -> serde_json::Value {
        self.get_item(SETTINGS_KEY)
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_else(|| serde_json::json!({}))
    }

    pub fn save_settings(&mut self, settings: &PanelSettings) -> ConfigResult<()> {
        settings.validate()?;
        let raw =
            serde_json::to_string(settings).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        self.set_item(SETTINGS_KEY, raw)?;
        tracing::info!(target: "panel", "Saved settings");
        Ok(())
    }

    /// 删除已保存的设置并返回默认值
    pub fn reset_settings(&mut self) -> ConfigResult<PanelSettings> {
        self.remove_item(SETTINGS_KEY)?;
        tracing::info!(target: "panel", "Reset settings");
        Ok(PanelSettings::default())
    }

    /// 当前面板模式
    pub fn mode(&self) -> String {
        match self.get_item(MODE_KEY) {
            Some(mode) if !mode.is_empty() => mode.to_string(),
            _ => DEFAULT_MODE.to_string(),
        }
    }

    pub fn set_mode(&mut self, mode: &str) -> ConfigResult<()> {
        self.set_item(MODE_KEY, mode)
    }
}
