//! 面板 UI 模块
//!
//! 消费宿主结果的无界面面板模型。
//!
//! ## 功能特性
//!
//! - 外部脚本运行与演示命令按钮
//! - 宿主环境信息与主题
//! - 调试报告
//! - 本地设置存储

pub mod debug;
pub mod environment;
pub mod panel;
pub mod settings;

pub use debug::DebugReport;
pub use environment::{HostDisplay, HostEnvironment};
pub use panel::{ControlPanel, FileDialog, PanelState};
pub use settings::{PanelSettings, SettingsStore};
