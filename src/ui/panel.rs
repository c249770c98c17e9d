//! 控制面板
//!
//! 无界面的面板状态：输入框、日志框、提示与警告。按钮操作通过
//! [`PanelBridge`] 发送到宿主，并把结果写回面板状态。

use crate::bindings::protocol::{normalize_path, HostResult};
use crate::core::error::{BridgeError, EncodeError};
use crate::services::bridge::{DemoCommand, PanelBridge};
use crate::ui::environment::HostDisplay;

/// 标记备注为空时使用的默认文本
pub const DEFAULT_MARKER_NOTE: &str = "Marker from CEP";

pub const EMPTY_PATH_TOAST: &str = "Please enter a JSX path";
pub const ERROR_TOAST: &str = "JSX error";
pub const SUCCESS_TOAST: &str = "JSX ran";
pub const SUCCESS_LOG: &str = "✅ Success (empty result from JSX runner)";

/// 文件选择对话框
pub trait FileDialog {
    /// 选择一个文件，返回所选路径
    fn open_file(&self, title: &str, extensions: &[&str]) -> Result<Vec<String>, String>;
}

/// 面板状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    /// 脚本路径输入
    pub jsx_path: String,
    /// 标记备注输入
    pub marker_note: String,
    /// 日志框
    pub jsx_log: String,
    /// 最近一次提示
    pub toast: Option<String>,
    /// 已弹出的警告
    pub alerts: Vec<String>,
    /// `Mode: <MODE>`
    pub mode_label: String,
    /// 宿主信息
    pub host_label: String,
    pub light_theme: bool,
}

impl PanelState {
    fn toast(&mut self, message: &str) {
        tracing::debug!(target: "panel", toast = message);
        self.toast = Some(message.to_string());
    }
}

/// 模式标签
pub fn mode_label(mode: &str) -> String {
    format!("Mode: {}", mode.to_uppercase())
}

/// 控制面板
pub struct ControlPanel {
    bridge: PanelBridge,
    state: PanelState,
}

impl ControlPanel {
    pub fn new(bridge: PanelBridge, mode: &str) -> Self {
        let display = HostDisplay::from_raw(&bridge.host_environment().to_json());
        let state = PanelState {
            mode_label: mode_label(mode),
            host_label: display.label,
            light_theme: display.light_theme,
            ..PanelState::default()
        };
        Self { bridge, state }
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn bridge(&self) -> &PanelBridge {
        &self.bridge
    }

    pub fn set_jsx_path(&mut self, path: impl Into<String>) {
        self.state.jsx_path = path.into();
    }

    pub fn set_marker_note(&mut self, note: impl Into<String>) {
        self.state.marker_note = note.into();
    }

    /// 运行输入框中的外部脚本
    ///
    /// 空路径只显示提示，不会调度。
    pub async fn run_external_script(&mut self) -> Option<HostResult> {
        let path = normalize_path(&self.state.jsx_path);
        let result = match self.bridge.run_script_file(&path).await {
            Ok(result) => result,
            Err(BridgeError::Encode(EncodeError::EmptyPath)) => {
                self.state.toast(EMPTY_PATH_TOAST);
                return None;
            }
            Err(e) => HostResult::failure(e.to_string()),
        };

        match &result {
            HostResult::Failure(_) => {
                let wire = result.to_wire();
                tracing::warn!(target: "panel", path = %path, error = %result.text(), "External script failed");
                self.state.alerts.push(wire.clone());
                self.state.jsx_log = wire;
                self.state.toast(ERROR_TOAST);
            }
            HostResult::Success(_) => {
                self.state.jsx_log = SUCCESS_LOG.to_string();
                self.state.toast(SUCCESS_TOAST);
            }
        }
        Some(result)
    }

    async fn run_demo(&mut self, demo: DemoCommand) -> HostResult {
        let result = match self.bridge.demo(&demo).await {
            Ok(result) => result,
            Err(e) => HostResult::failure(e.to_string()),
        };
        self.state.jsx_log = result.to_wire();
        result
    }

    pub async fn hello(&mut self) -> HostResult {
        self.run_demo(DemoCommand::Hello).await
    }

    pub async fn project_info(&mut self) -> HostResult {
        self.run_demo(DemoCommand::ProjectInfo).await
    }

    pub async fn active_sequence(&mut self) -> HostResult {
        self.run_demo(DemoCommand::ActiveSequenceName).await
    }

    /// 在播放头处添加标记，备注为空时使用默认文本
    pub async fn add_marker(&mut self) -> HostResult {
        let note = if self.state.marker_note.is_empty() {
            DEFAULT_MARKER_NOTE.to_string()
        } else {
            self.state.marker_note.clone()
        };
        self.run_demo(DemoCommand::AddMarker(Some(note))).await
    }

    /// 通过对话框选择脚本路径
    pub fn browse_for_script(&mut self, dialog: &dyn FileDialog) {
        match dialog.open_file("Select a JSX file", &["jsx"]) {
            Ok(paths) => {
                if let Some(first) = paths.first() {
                    self.state.jsx_path = normalize_path(first);
                }
            }
            Err(e) => {
                self.state.jsx_log = format!("Open dialog failed: {}", e);
            }
        }
    }

    pub fn shutdown(self) {
        self.bridge.shutdown();
    }
}
