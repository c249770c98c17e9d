//! 宿主调度器
//!
//! 宿主上下文运行在专用线程上，所有求值经过同一个 FIFO 队列，
//! 一次只执行一个表达式。因此结果按提交顺序完成，依赖先前加载的命令
//! 总能看到该加载的效果。
//!
//! 每次调度返回一个 [`Dispatch`] future：
//! - 恰好完成一次；
//! - 不可取消：丢弃 future 不会中止宿主中的求值；
//! - 没有超时：宿主中挂起的求值会让 future 永远挂起。

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context as TaskContext, Poll};
use std::thread;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use tokio::sync::oneshot;

use crate::bindings::js::HostContext;
use crate::bindings::protocol::HostResult;
use crate::config::HostConfig;
use crate::core::error::{HostError, HostResultOf};
use crate::scripting::kitchen_sink::{HostApplication, SharedHostApplication};

/// 调度编号
pub type DispatchId = u64;

/// 发送到宿主线程的命令
enum HostCommand {
    /// 求值表达式
    Evaluate {
        id: DispatchId,
        expression: String,
        reply: oneshot::Sender<HostResult>,
    },
    /// 关闭宿主线程
    Shutdown,
}

/// 一次调度的结果
///
/// 宿主线程在回复之前停止时，结果为携带宿主自身错误文本的失败。
pub struct Dispatch {
    id: DispatchId,
    reply: oneshot::Receiver<HostResult>,
}

impl Dispatch {
    pub fn id(&self) -> DispatchId {
        self.id
    }
}

impl Future for Dispatch {
    type Output = HostResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.reply).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(HostResult::failure(HostError::Unavailable.to_string())),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// 在宿主线程上构造执行上下文的工厂
///
/// QuickJS 运行时不能跨线程移动，所以注入的是工厂而不是上下文本身。
pub type ContextFactory = Box<dyn FnOnce() -> HostResultOf<HostContext> + Send>;

/// 宿主调度器
pub struct HostDispatcher {
    /// 命令发送器
    command_sender: Sender<HostCommand>,
    /// 宿主线程句柄
    host_thread: Option<thread::JoinHandle<()>>,
    /// 下一个调度编号
    next_id: AtomicU64,
    /// 宿主配置
    config: HostConfig,
    /// 宿主应用状态
    app: SharedHostApplication,
}

impl HostDispatcher {
    /// 使用本地文件系统启动宿主，并加载启动脚本
    pub fn spawn(config: HostConfig) -> HostResultOf<Self> {
        let app = Arc::new(Mutex::new(HostApplication::from_config(&config)));
        let factory_config = config.clone();
        let factory_app = Arc::clone(&app);
        let factory: ContextFactory = Box::new(move || {
            let host = HostContext::new(factory_config, factory_app)?;
            host.run_startup_scripts();
            Ok(host)
        });
        Self::with_factory(config, app, factory)
    }

    /// 使用注入的上下文工厂启动宿主
    ///
    /// 工厂在宿主线程上执行；它的错误会同步返回给调用方。调用会阻塞到
    /// 工厂完成为止。
    pub fn with_factory(
        config: HostConfig,
        app: SharedHostApplication,
        factory: ContextFactory,
    ) -> HostResultOf<Self> {
        let (cmd_tx, cmd_rx) = unbounded::<HostCommand>();
        let (ready_tx, ready_rx) = bounded::<HostResultOf<()>>(1);

        let host_thread = thread::Builder::new()
            .name("tms-host".to_string())
            .spawn(move || match factory() {
                Ok(host) => {
                    let _ = ready_tx.send(Ok(()));
                    Self::host_thread_loop(host, cmd_rx);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })
            .map_err(|e| HostError::Runtime(e.to_string()))?;

        let ready = ready_rx.recv().unwrap_or(Err(HostError::Unavailable));
        if let Err(e) = ready {
            let _ = host_thread.join();
            return Err(e);
        }

        tracing::info!(target: "host", app = %config.app_name, "Host dispatcher started");
        Ok(Self {
            command_sender: cmd_tx,
            host_thread: Some(host_thread),
            next_id: AtomicU64::new(1),
            config,
            app,
        })
    }

    /// 宿主线程主循环
    fn host_thread_loop(host: HostContext, cmd_rx: Receiver<HostCommand>) {
        loop {
            match cmd_rx.recv() {
                Ok(HostCommand::Evaluate {
                    id,
                    expression,
                    reply,
                }) => {
                    tracing::debug!(target: "host", id, %expression, "Evaluating");
                    let result = host.evaluate(&expression);
                    if let HostResult::Failure(message) = &result {
                        tracing::debug!(target: "host", id, error = %message, "Evaluation failed");
                    }
                    // 接收方可能已经丢弃了 future，求值照常完成
                    let _ = reply.send(result);
                }
                Ok(HostCommand::Shutdown) | Err(_) => break,
            }
        }
        tracing::debug!(target: "host", "Host thread stopped");
    }

    /// 提交一个表达式
    pub fn dispatch(&self, expression: impl Into<String>) -> Dispatch {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();
        let command = HostCommand::Evaluate {
            id,
            expression: expression.into(),
            reply: reply_tx,
        };
        if self.command_sender.send(command).is_err() {
            // 发送失败时 reply_tx 随命令一起被丢弃，future 以失败完成
            tracing::warn!(target: "host", id, "Host dispatcher is not running");
        }
        Dispatch { id, reply: reply_rx }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// 宿主应用状态
    pub fn application(&self) -> SharedHostApplication {
        Arc::clone(&self.app)
    }

    fn stop(&mut self) {
        let _ = self.command_sender.send(HostCommand::Shutdown);
        if let Some(handle) = self.host_thread.take() {
            let _ = handle.join();
        }
    }

    /// 等待已提交的命令完成后关闭宿主
    pub fn shutdown(mut self) {
        self.stop();
    }
}

impl Drop for HostDispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
