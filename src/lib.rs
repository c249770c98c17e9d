//! # TMS Runner
//!
//! A control panel bridge that drives an embedded scripting host.
//!
//! ## Features
//!
//! - **Command Encoder**: turns a function name and string arguments into a
//!   single host expression, escaping every literal safely
//! - **Host Dispatcher**: one host thread evaluates expressions in
//!   submission order against a persistent QuickJS context
//! - **External Script Loader**: `TMSRunner_runFile(path)` loads a script
//!   file into the host and reports failures through the `ERROR:` sentinel
//! - **Demo Commands**: the `KitchenSink` namespace exposes host
//!   application queries (project info, active sequence, markers)
//! - **Panel Model**: headless panel state, host environment, settings
//!   store and debug report
//!
//! ## Architecture Design
//!
//! - **UI side**: [`ui::ControlPanel`] and [`services::PanelBridge`] encode
//!   commands and decode results
//! - **Wire**: [`bindings::protocol`] defines the expression and result
//!   string formats
//! - **Host side**: [`scripting::HostDispatcher`] owns the host thread,
//!   [`bindings::HostContext`] binds the host API into the script context
//!
//! ### Example
//!
//! ```ignore
//! use tms_runner::config::HostConfig;
//! use tms_runner::services::{DemoCommand, PanelBridge};
//!
//! let bridge = PanelBridge::connect(HostConfig::default())?;
//! let result = bridge.demo(&DemoCommand::Hello).await?;
//! println!("{}", result);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Errors, logging and macros
//! - [`config`]: Configuration system
//! - [`bindings`]: Wire protocol and host API bindings
//! - [`scripting`]: Script loader, demo commands and the host dispatcher
//! - [`services`]: UI-facing bridge
//! - [`ui`]: Panel presentation model

/// Core functionality: errors, logging and macros
#[macro_use]
pub mod core;
/// Configuration system
pub mod config;
/// Wire protocol and host API bindings
pub mod bindings;
/// Host-side scripting: loader, demo commands, dispatcher
pub mod scripting;
/// UI-facing services
pub mod services;
/// Panel presentation model
pub mod ui;
