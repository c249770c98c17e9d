//! JavaScript host context using rquickjs
//!
//! [`HostContext`] owns the QuickJS runtime and the one persistent context
//! every evaluation runs in. Scripts loaded through the runner function
//! mutate that context, so later commands can call what earlier loads
//! defined, and a redefinition simply replaces the previous one.
//!
//! This is the only place where results exist as raw strings: host-side
//! functions hand wire strings back to JavaScript, and [`HostContext::evaluate`]
//! decodes whatever the expression produced into a [`HostResult`].

use std::sync::Arc;

use rquickjs::context::EvalOptions;
use rquickjs::function::{Opt, Rest};
use rquickjs::{Context, Ctx, Function, Object, Runtime, Value};

use super::protocol::{is_valid_command_name, HostResult};
use crate::config::HostConfig;
use crate::core::error::{HostError, HostResultOf, LoadResult};
use crate::scripting::kitchen_sink::{KitchenSink, SharedHostApplication};
use crate::scripting::loader::{LocalFileSystem, ScriptEvaluator, ScriptLoader, ScriptSource};

/// Global, non-strict evaluation. Implicit globals, `with` and legacy
/// octal literals are accepted.
fn script_options() -> EvalOptions {
    EvalOptions {
        global: true,
        strict: false,
        ..Default::default()
    }
}

impl<'js> ScriptEvaluator for Ctx<'js> {
    fn evaluate(&self, source: &str) -> Result<(), String> {
        self.eval_with_options::<(), _>(source, script_options())
            .map_err(|e| describe_error(self, e))
    }
}

/// JavaScript `String(value)`. A throwing `toString` surfaces as
/// `Error::Exception` with the exception still pending.
fn coerce_string<'js>(ctx: &Ctx<'js>, value: Value<'js>) -> rquickjs::Result<String> {
    let to_string: Function = ctx.globals().get("String")?;
    to_string.call::<_, String>((value,))
}

/// Like [`coerce_string`], but a failed conversion is dropped and its
/// exception cleared.
fn coerce_lossy<'js>(ctx: &Ctx<'js>, value: Value<'js>) -> Option<String> {
    match coerce_string(ctx, value) {
        Ok(text) => Some(text),
        Err(err) => {
            if matches!(err, rquickjs::Error::Exception) {
                let _ = ctx.catch();
            }
            None
        }
    }
}

/// Text of a failed evaluation. Pending exceptions are taken off the
/// context so the next evaluation starts clean.
fn describe_error(ctx: &Ctx<'_>, err: rquickjs::Error) -> String {
    if matches!(err, rquickjs::Error::Exception) {
        let exception = ctx.catch();
        if let Some(text) = coerce_lossy(ctx, exception) {
            return text;
        }
    }
    err.to_string()
}

fn is_falsy(value: &Value<'_>) -> bool {
    if value.is_undefined() || value.is_null() {
        return true;
    }
    if let Some(b) = value.as_bool() {
        return !b;
    }
    if let Some(n) = value.as_number() {
        return n == 0.0 || n.is_nan();
    }
    false
}

/// Optional string argument with JavaScript truthiness: falsy values count
/// as absent, anything else is coerced with `String()`.
fn optional_text<'js>(ctx: &Ctx<'js>, value: Opt<Value<'js>>) -> Option<String> {
    let value = value.0?;
    if is_falsy(&value) {
        return None;
    }
    coerce_lossy(ctx, value).filter(|s| !s.is_empty())
}

fn load_outcome(result: LoadResult<String>) -> HostResult {
    match result {
        Ok(_) => HostResult::empty(),
        Err(e) => HostResult::failure(e.to_string()),
    }
}

fn register_console<'js>(ctx: &Ctx<'js>) -> rquickjs::Result<()> {
    let console = Object::new(ctx.clone())?;

    console.set(
        "log",
        Function::new(ctx.clone(), |ctx: Ctx<'js>, args: Rest<Value<'js>>| {
            let msg = join_args(&ctx, args);
            tracing::info!(target: "script.console", "{}", msg);
        })?,
    )?;
    console.set(
        "warn",
        Function::new(ctx.clone(), |ctx: Ctx<'js>, args: Rest<Value<'js>>| {
            let msg = join_args(&ctx, args);
            tracing::warn!(target: "script.console", "{}", msg);
        })?,
    )?;
    console.set(
        "error",
        Function::new(ctx.clone(), |ctx: Ctx<'js>, args: Rest<Value<'js>>| {
            let msg = join_args(&ctx, args);
            tracing::error!(target: "script.console", "{}", msg);
        })?,
    )?;

    ctx.globals().set("console", console)
}

fn join_args<'js>(ctx: &Ctx<'js>, args: Rest<Value<'js>>) -> String {
    args.0
        .into_iter()
        .filter_map(|v| coerce_lossy(ctx, v))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Global `runner(filePath)`: the external script loader.
fn register_runner<'js>(
    ctx: &Ctx<'js>,
    name: &str,
    source: Arc<dyn ScriptSource>,
) -> rquickjs::Result<()> {
    let runner = Function::new(
        ctx.clone(),
        move |ctx: Ctx<'js>, path: Opt<Value<'js>>| -> String {
            let path = optional_text(&ctx, path);
            let loader = ScriptLoader::new(source.as_ref());
            load_outcome(loader.load(path.as_deref(), &ctx)).to_wire()
        },
    )?;
    ctx.globals().set(name, runner)
}

/// Namespace object holding the demo commands.
fn register_kitchen_sink<'js>(
    ctx: &Ctx<'js>,
    namespace: &str,
    sink: KitchenSink,
) -> rquickjs::Result<()> {
    let obj = Object::new(ctx.clone())?;

    let s = sink.clone();
    obj.set("hello", Function::new(ctx.clone(), move || s.hello().to_wire())?)?;

    let s = sink.clone();
    obj.set(
        "getProjectInfo",
        Function::new(ctx.clone(), move || s.get_project_info().to_wire())?,
    )?;

    let s = sink.clone();
    obj.set(
        "getActiveSequenceName",
        Function::new(ctx.clone(), move || s.get_active_sequence_name().to_wire())?,
    )?;

    let s = sink;
    obj.set(
        "addMarkerAtPlayhead",
        Function::new(
            ctx.clone(),
            move |ctx: Ctx<'js>, note: Opt<Value<'js>>| -> String {
                s.add_marker_at_playhead(optional_text(&ctx, note)).to_wire()
            },
        )?,
    )?;

    ctx.globals().set(namespace, obj)
}

/// The host's persistent scripting context.
pub struct HostContext {
    #[allow(dead_code)]
    runtime: Runtime,
    context: Context,
    config: HostConfig,
    source: Arc<dyn ScriptSource>,
}

impl HostContext {
    /// Context backed by the local filesystem.
    pub fn new(config: HostConfig, app: SharedHostApplication) -> HostResultOf<Self> {
        Self::with_source(config, app, Arc::new(LocalFileSystem))
    }

    /// Context whose runner resolves scripts through `source`.
    pub fn with_source(
        config: HostConfig,
        app: SharedHostApplication,
        source: Arc<dyn ScriptSource>,
    ) -> HostResultOf<Self> {
        let runtime = Runtime::new().map_err(|e| HostError::Runtime(e.to_string()))?;
        if let Some(limit) = config.memory_limit_bytes {
            runtime.set_memory_limit(limit);
        }
        let context = Context::full(&runtime).map_err(|e| HostError::Runtime(e.to_string()))?;

        let host = Self {
            runtime,
            context,
            config,
            source,
        };
        host.bind_host_api(KitchenSink::new(app))?;
        tracing::debug!(
            target: "host",
            runner = %host.config.runner_function,
            namespace = %host.config.demo_namespace,
            "Host context ready"
        );
        Ok(host)
    }

    fn bind_host_api(&self, sink: KitchenSink) -> HostResultOf<()> {
        let source = Arc::clone(&self.source);
        self.context.with(|ctx| -> rquickjs::Result<()> {
            register_console(&ctx)?;
            register_runner(&ctx, &self.config.runner_function, source)?;
            register_kitchen_sink(&ctx, &self.config.demo_namespace, sink)?;
            Ok(())
        })?;
        Ok(())
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Evaluates an expression and returns the raw result string.
    ///
    /// `undefined` and `null` become the empty string, other values go
    /// through `String()`. An exception, including one thrown while
    /// converting the result, becomes a sentinel-prefixed string carrying
    /// its text.
    pub fn evaluate_wire(&self, expression: &str) -> String {
        self.context.with(|ctx| {
            let outcome = ctx
                .eval_with_options::<Value, _>(expression, script_options())
                .and_then(|value| {
                    if value.is_undefined() || value.is_null() {
                        Ok(String::new())
                    } else {
                        coerce_string(&ctx, value)
                    }
                });
            match outcome {
                Ok(text) => text,
                Err(err) => HostResult::failure(describe_error(&ctx, err)).to_wire(),
            }
        })
    }

    /// Evaluates an expression and decodes its result.
    pub fn evaluate(&self, expression: &str) -> HostResult {
        HostResult::from_wire(&self.evaluate_wire(expression))
    }

    /// Runs the loader directly, without going through an expression.
    pub fn load_script(&self, path: &str) -> HostResult {
        let loader = ScriptLoader::new(self.source.as_ref());
        self.context
            .with(|ctx| load_outcome(loader.load(Some(path), &ctx)))
    }

    /// Loads the configured startup scripts in order and returns how many
    /// succeeded. Failures are logged and do not stop the remaining loads.
    pub fn run_startup_scripts(&self) -> usize {
        let mut loaded = 0;
        for path in &self.config.startup_scripts {
            match self.load_script(path) {
                HostResult::Success(_) => loaded += 1,
                HostResult::Failure(message) => {
                    tracing::warn!(target: "host", path = %path, error = %message, "Startup script failed");
                }
            }
        }
        loaded
    }

    /// Whether a global, or a dotted path below one, currently resolves to
    /// something other than `undefined`.
    pub fn is_defined(&self, name: &str) -> bool {
        if !is_valid_command_name(name) {
            return false;
        }
        self.context.with(|ctx| {
            let mut segments = name.split('.').peekable();
            let mut current = ctx.globals();
            while let Some(segment) = segments.next() {
                if segments.peek().is_none() {
                    return matches!(
                        current.get::<_, Value>(segment),
                        Ok(value) if !value.is_undefined()
                    );
                }
                match current.get::<_, Object>(segment) {
                    Ok(next) => current = next,
                    Err(_) => return false,
                }
            }
            false
        })
    }
}
