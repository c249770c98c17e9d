/// 宿主配置

use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigResult};
use crate::bindings::protocol::is_valid_command_name;

/// 面板背景色 (0 - 255)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

/// 序列夹具
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// 序列名称
    pub name: String,

    /// 播放头位置 (ticks)
    #[serde(default)]
    pub player_position_ticks: i64,
}

/// 宿主中打开的项目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// 项目名称
    pub name: String,

    /// 项目文件路径，未保存时为空
    #[serde(default)]
    pub path: Option<String>,

    /// 项目中的序列
    #[serde(default)]
    pub sequences: Vec<SequenceConfig>,

    /// 活动序列的名称
    #[serde(default)]
    pub active_sequence: Option<String>,
}

/// 宿主配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// 脚本加载器在宿主中注册的函数名
    pub runner_function: String,

    /// 演示命令所在的命名空间对象
    pub demo_namespace: String,

    /// 宿主应用名称 (`app.name`)
    pub app_name: String,

    /// 宿主应用版本
    pub app_version: String,

    /// 宿主面板背景色
    pub panel_background: RgbColor,

    /// 宿主中打开的项目
    pub project: Option<ProjectConfig>,

    /// 启动时加载的脚本
    pub startup_scripts: Vec<String>,

    /// 脚本运行时内存上限（字节）
    pub memory_limit_bytes: Option<usize>,
}

impl_default!(HostConfig {
    runner_function: "TMSRunner_runFile".to_string(),
    demo_namespace: "KitchenSink".to_string(),
    app_name: "Premiere Pro".to_string(),
    app_version: "25.0".to_string(),
    panel_background: RgbColor { red: 50, green: 50, blue: 50 },
    project: None,
    startup_scripts: Vec::new(),
    memory_limit_bytes: None,
});

impl HostConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if !is_valid_command_name(&self.runner_function) || self.runner_function.contains('.') {
            return Err(ConfigError::ValidationError(format!(
                "Invalid runner function name: {:?}",
                self.runner_function
            )));
        }
        if !is_valid_command_name(&self.demo_namespace) || self.demo_namespace.contains('.') {
            return Err(ConfigError::ValidationError(format!(
                "Invalid demo namespace: {:?}",
                self.demo_namespace
            )));
        }
        if self.runner_function == self.demo_namespace {
            return Err(ConfigError::ValidationError(
                "Runner function and demo namespace must differ".to_string(),
            ));
        }
        if self.memory_limit_bytes == Some(0) {
            return Err(ConfigError::ValidationError(
                "Memory limit must be positive".to_string(),
            ));
        }
        if let Some(project) = &self.project {
            if let Some(active) = &project.active_sequence {
                if !project.sequences.iter().any(|s| &s.name == active) {
                    return Err(ConfigError::ValidationError(format!(
                        "Active sequence {:?} is not part of project {:?}",
                        active, project.name
                    )));
                }
            }
        }
        Ok(())
    }
}
