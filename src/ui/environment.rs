//! 宿主环境
//!
//! 宿主以 JSON 发布的环境记录，以及面板据此显示的宿主信息与主题。

use serde::{Deserialize, Serialize};

use crate::config::{HostConfig, RgbColor};

/// 未提供名称时显示的宿主名
pub const DEFAULT_HOST_NAME: &str = "Adobe Host";

/// 环境记录不可读时显示的文本
pub const UNREADABLE_ENVIRONMENT: &str = "Could not read host environment";

/// 亮色主题的亮度阈值
pub const LIGHT_THEME_LUMINANCE: f64 = 160.0;

/// 宿主皮肤信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSkinInfo {
    #[serde(default)]
    pub panel_background_color: Option<RgbColor>,
}

/// 宿主环境记录
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostEnvironment {
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub app_version: Option<String>,
    #[serde(default)]
    pub app_skin_info: Option<AppSkinInfo>,
}

impl HostEnvironment {
    pub fn from_config(config: &HostConfig) -> Self {
        Self {
            app_name: Some(config.app_name.clone()),
            app_version: Some(config.app_version.clone()),
            app_skin_info: Some(AppSkinInfo {
                panel_background_color: Some(config.panel_background),
            }),
        }
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn to_json(&self) -> String {
        // 只包含字符串与整数，序列化不会失败
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// `<名称> <版本>`，空名称回退到默认宿主名
    pub fn label(&self) -> String {
        let name = self
            .app_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_HOST_NAME);
        format!("{} {}", name, self.app_version.as_deref().unwrap_or(""))
    }

    /// 面板背景的相对亮度
    pub fn background_luminance(&self) -> Option<f64> {
        let color = self.app_skin_info.as_ref()?.panel_background_color?;
        Some(luminance(color))
    }

    /// 背景足够亮时使用亮色主题
    pub fn prefers_light(&self) -> bool {
        self.background_luminance()
            .map(|lum| lum > LIGHT_THEME_LUMINANCE)
            .unwrap_or(false)
    }
}

pub fn luminance(color: RgbColor) -> f64 {
    0.2126 * f64::from(color.red) + 0.7152 * f64::from(color.green) + 0.0722 * f64::from(color.blue)
}

/// 面板顶部的宿主信息
#[derive(Debug, Clone, PartialEq)]
pub struct HostDisplay {
    pub label: String,
    pub light_theme: bool,
}

impl HostDisplay {
    /// 从宿主发布的原始 JSON 构造
    pub fn from_raw(raw: &str) -> Self {
        match HostEnvironment::from_json(raw) {
            Ok(env) => Self {
                label: env.label(),
                light_theme: env.prefers_light(),
            },
            Err(e) => {
                tracing::warn!(target: "panel", error = %e, "Host environment unreadable");
                Self {
                    label: UNREADABLE_ENVIRONMENT.to_string(),
                    light_theme: false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_defaults() {
        let env = HostEnvironment::from_json(r#"{"appVersion":"24.1"}"#).unwrap();
        assert_eq!(env.label(), "Adobe Host 24.1");

        let env = HostEnvironment::from_json(r#"{"appName":"PPRO"}"#).unwrap();
        assert_eq!(env.label(), "PPRO ");
    }

    #[test]
    fn test_theme_threshold() {
        let dark = HostEnvironment::from_config(&HostConfig::default());
        assert!(!dark.prefers_light());

        let raw = r#"{"appName":"PPRO","appSkinInfo":{"panelBackgroundColor":{"red":240,"green":240,"blue":240}}}"#;
        let light = HostEnvironment::from_json(raw).unwrap();
        assert!(light.prefers_light());

        // 恰好等于阈值时不切换
        let grey = RgbColor { red: 160, green: 160, blue: 160 };
        assert!((luminance(grey) - 160.0).abs() < 1e-9);
        let env = HostEnvironment {
            app_skin_info: Some(AppSkinInfo { panel_background_color: Some(grey) }),
            ..HostEnvironment::default()
        };
        assert!(!env.prefers_light());
    }

    #[test]
    fn test_missing_skin_keeps_dark() {
        let env = HostEnvironment::from_json(r#"{"appName":"PPRO","appSkinInfo":{}}"#).unwrap();
        assert_eq!(env.background_luminance(), None);
        assert!(!env.prefers_light());
    }

    #[test]
    fn test_json_round_trip_uses_camel_case() {
        let env = HostEnvironment::from_config(&HostConfig::default());
        let json = env.to_json();
        assert!(json.contains("\"appName\":\"Premiere Pro\""));
        assert!(json.contains("\"panelBackgroundColor\""));
        assert_eq!(HostEnvironment::from_json(&json).unwrap(), env);
    }

    #[test]
    fn test_display_from_unreadable_record() {
        let display = HostDisplay::from_raw("not json");
        assert_eq!(display.label, UNREADABLE_ENVIRONMENT);
        assert!(!display.light_theme);

        let display = HostDisplay::from_raw(&HostEnvironment::from_config(&HostConfig::default()).to_json());
        assert_eq!(display.label, "Premiere Pro 25.0");
    }
}
