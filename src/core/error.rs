//! 统一错误处理模块
//!
//! 提供桥接层范围内的统一错误类型定义
//!
//! ## 错误类型分层
//!
//! - **输入错误** (`EncodeError`): 在任何宿主交互之前同步检测（空命令名、空路径）
//! - **宿主错误** (`HostError`): 宿主运行时创建失败或宿主线程不可用
//! - **加载错误** (`LoadError`): 脚本加载状态机的失败，`Display` 文本即线格式消息
//! - **配置错误** (`ConfigError`): 配置与设置的读取、解析、验证
//!
//! 解析错误与执行错误永远不会以原生错误的形式跨越宿主边界，
//! 它们在求值点被转换为 [`HostResult::Failure`](crate::bindings::HostResult)。

use thiserror::Error;

/// 桥接层顶层错误类型
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 命令编码错误（输入错误）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Command name must not be empty")]
    EmptyName,

    #[error("Invalid command name: {0:?}")]
    InvalidName(String),

    #[error("Script path must not be empty")]
    EmptyPath,
}

/// 宿主运行时错误
#[derive(Error, Debug, Clone)]
pub enum HostError {
    #[error("Failed to create script runtime: {0}")]
    Runtime(String),

    #[error("Invalid host binding: {0}")]
    InvalidBinding(String),

    #[error("Host dispatcher is not running")]
    Unavailable,
}

impl From<rquickjs::Error> for HostError {
    fn from(err: rquickjs::Error) -> Self {
        HostError::InvalidBinding(err.to_string())
    }
}

/// 脚本加载错误
///
/// 每个变体的显示文本就是失败结果中哨兵前缀之后的消息。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Empty filePath")]
    EmptyPath,

    #[error("JSX not found: {0}")]
    NotFound(String),

    #[error("Cannot read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("{0}")]
    Evaluation(String),
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

/// 桥接层结果类型别名
pub type BridgeResult<T> = Result<T, BridgeError>;
pub type EncodeResult<T> = Result<T, EncodeError>;
pub type HostResultOf<T> = Result<T, HostError>;
pub type LoadResult<T> = Result<T, LoadError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
