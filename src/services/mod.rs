//! 服务层
//!
//! 面向 UI 的业务入口。

pub mod bridge;

pub use bridge::{DemoCommand, PanelBridge};
