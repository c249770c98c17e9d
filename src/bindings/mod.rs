//! Host Bridge Layer
//!
//! The UI never calls host functions directly. It encodes a [`Command`] into
//! one expression string, the host evaluates it inside its persistent
//! context, and a single string comes back that decodes into a
//! [`HostResult`].
//!
//! ```text
//! ┌──────────────────────────┐          ┌──────────────────────────────┐
//! │        UI layer          │          │        Host thread           │
//! │                          │          │                              │
//! │  Command ──encode──▶ "f(\"a\")" ───▶ │  HostContext::evaluate       │
//! │                          │          │   ├─ TMSRunner_runFile(path)  │
//! │                          │          │   └─ KitchenSink.*()          │
//! │  HostResult ◀──decode── "ERROR: …" ◀─│                              │
//! └──────────────────────────┘          └──────────────────────────────┘
//! ```

pub mod js;
pub mod property_tests;
pub mod protocol;

pub use js::HostContext;
pub use protocol::*;
