//! 宿主侧脚本系统
//!
//! - `loader` - 外部脚本加载状态机
//! - `kitchen_sink` - 演示命令与宿主应用模型
//! - `dispatcher` - 串行化求值的宿主线程

pub mod dispatcher;
pub mod kitchen_sink;
pub mod loader;

pub use dispatcher::{ContextFactory, Dispatch, DispatchId, HostDispatcher};
pub use kitchen_sink::{HostApplication, KitchenSink, SharedHostApplication};
pub use loader::{LocalFileSystem, ScriptEvaluator, ScriptLoader, ScriptSource};
