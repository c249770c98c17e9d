//! 面板桥接服务
//!
//! UI 侧的唯一入口：把命令编码为表达式，交给宿主调度器，再把结果解码为
//! [`HostResult`]。

use crate::bindings::protocol::{Command, HostResult};
use crate::config::HostConfig;
use crate::core::error::{BridgeResult, HostError, HostResultOf};
use crate::scripting::dispatcher::HostDispatcher;
use crate::ui::environment::HostEnvironment;

/// 演示命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemoCommand {
    Hello,
    ProjectInfo,
    ActiveSequenceName,
    /// 在播放头处添加标记，可选备注
    AddMarker(Option<String>),
}

impl DemoCommand {
    /// 宿主函数名（不含命名空间）
    pub fn function_name(&self) -> &'static str {
        match self {
            DemoCommand::Hello => "hello",
            DemoCommand::ProjectInfo => "getProjectInfo",
            DemoCommand::ActiveSequenceName => "getActiveSequenceName",
            DemoCommand::AddMarker(_) => "addMarkerAtPlayhead",
        }
    }

    /// 在给定命名空间下编码为命令
    pub fn to_command(&self, namespace: &str) -> BridgeResult<Command> {
        let command = Command::new(format!("{}.{}", namespace, self.function_name()))?;
        Ok(match self {
            DemoCommand::AddMarker(Some(note)) => command.arg(note.as_str()),
            _ => command,
        })
    }
}

/// 面板桥接
pub struct PanelBridge {
    dispatcher: HostDispatcher,
}

impl PanelBridge {
    /// 启动宿主并连接
    ///
    /// 阻塞到宿主上下文就绪，包括所有启动脚本加载完成。异步代码中使用
    /// [`PanelBridge::connect_async`]。
    pub fn connect(config: HostConfig) -> HostResultOf<Self> {
        Ok(Self::with_dispatcher(HostDispatcher::spawn(config)?))
    }

    /// 在阻塞线程池上启动宿主，不占用异步工作线程
    pub async fn connect_async(config: HostConfig) -> HostResultOf<Self> {
        tokio::task::spawn_blocking(move || Self::connect(config))
            .await
            .map_err(|e| HostError::Runtime(e.to_string()))?
    }

    pub fn with_dispatcher(dispatcher: HostDispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &HostDispatcher {
        &self.dispatcher
    }

    /// 调用一个已编码的命令
    pub async fn invoke(&self, command: &Command) -> HostResult {
        let expression = command.to_expression();
        tracing::debug!(target: "bridge", %expression, "Invoking host command");
        let result = self.dispatcher.dispatch(expression).await;
        if let HostResult::Failure(message) = &result {
            tracing::debug!(target: "bridge", command = command.name(), error = %message, "Host command failed");
        }
        result
    }

    /// 直接求值一段表达式
    pub async fn evaluate(&self, expression: &str) -> HostResult {
        self.dispatcher.dispatch(expression).await
    }

    /// 让宿主的运行器加载一个外部脚本
    ///
    /// 空路径在编码阶段被拒绝，不会发送到宿主。
    pub async fn run_script_file(&self, path: &str) -> BridgeResult<HostResult> {
        let command = Command::new(self.dispatcher.config().runner_function.as_str())?
            .path_arg(path)?;
        tracing::info!(target: "bridge", path = %command.args()[0], "Running external script");
        Ok(self.invoke(&command).await)
    }

    /// 调用一个演示命令
    pub async fn demo(&self, demo: &DemoCommand) -> BridgeResult<HostResult> {
        let command = demo.to_command(&self.dispatcher.config().demo_namespace)?;
        Ok(self.invoke(&command).await)
    }

    /// 宿主发布的环境记录
    pub fn host_environment(&self) -> HostEnvironment {
        HostEnvironment::from_config(self.dispatcher.config())
    }

    /// 等待已提交的命令完成后关闭宿主
    pub fn shutdown(self) {
        self.dispatcher.shutdown();
    }
}
