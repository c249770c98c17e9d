//! 演示命令
//!
//! 宿主侧的 `KitchenSink` 命名空间背后的应用模型。每个命令独立地把内部错误
//! 转换为失败结果，从不向调用方抛出。

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::bindings::protocol::HostResult;
use crate::config::{HostConfig, ProjectConfig};

/// 演示命令创建的标记名称
pub const MARKER_NAME: &str = "CEP Marker";

/// 序列上的标记
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub name: String,
    pub comments: String,
    pub ticks: i64,
}

/// 宿主中的序列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub name: String,
    pub player_position_ticks: i64,
    pub markers: Vec<Marker>,
}

/// 宿主中打开的项目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub path: Option<String>,
    pub sequences: Vec<Sequence>,
    pub active_sequence: Option<usize>,
}

impl From<&ProjectConfig> for Project {
    fn from(config: &ProjectConfig) -> Self {
        let sequences: Vec<Sequence> = config
            .sequences
            .iter()
            .map(|s| Sequence {
                name: s.name.clone(),
                player_position_ticks: s.player_position_ticks,
                markers: Vec::new(),
            })
            .collect();
        let active_sequence = config
            .active_sequence
            .as_ref()
            .and_then(|name| sequences.iter().position(|s| &s.name == name));
        Self {
            name: config.name.clone(),
            path: config.path.clone(),
            sequences,
            active_sequence,
        }
    }
}

impl Project {
    pub fn active_sequence(&self) -> Option<&Sequence> {
        self.active_sequence.and_then(|i| self.sequences.get(i))
    }

    pub fn active_sequence_mut(&mut self) -> Option<&mut Sequence> {
        let index = self.active_sequence?;
        self.sequences.get_mut(index)
    }
}

/// 宿主应用状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostApplication {
    pub name: String,
    pub version: String,
    pub project: Option<Project>,
}

impl HostApplication {
    pub fn from_config(config: &HostConfig) -> Self {
        Self {
            name: config.app_name.clone(),
            version: config.app_version.clone(),
            project: config.project.as_ref().map(Project::from),
        }
    }
}

/// 在宿主线程与调用方之间共享的应用状态
pub type SharedHostApplication = Arc<Mutex<HostApplication>>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectInfo<'a> {
    name: &'a str,
    path: &'a str,
    sequence_count: usize,
}

/// 演示命令集合
#[derive(Clone)]
pub struct KitchenSink {
    app: SharedHostApplication,
}

impl KitchenSink {
    pub fn new(app: SharedHostApplication) -> Self {
        Self { app }
    }

    fn with_app<F>(&self, f: F) -> HostResult
    where
        F: FnOnce(&mut HostApplication) -> Result<String, String>,
    {
        let result = match self.app.lock() {
            Ok(mut app) => f(&mut app),
            Err(e) => Err(format!("Host application state unavailable: {}", e)),
        };
        if let Err(message) = &result {
            tracing::warn!(target: "host", error = %message, "Demo command failed");
        }
        HostResult::from(result)
    }

    pub fn hello(&self) -> HostResult {
        self.with_app(|app| Ok(format!("Hello from ExtendScript ✅\napp.name: {}", app.name)))
    }

    pub fn get_project_info(&self) -> HostResult {
        self.with_app(|app| {
            let Some(project) = &app.project else {
                return Ok("No project object.".to_string());
            };
            let info = ProjectInfo {
                name: &project.name,
                path: project.path.as_deref().unwrap_or("(unsaved project)"),
                sequence_count: project.sequences.len(),
            };
            serde_json::to_string_pretty(&info).map_err(|e| e.to_string())
        })
    }

    pub fn get_active_sequence_name(&self) -> HostResult {
        self.with_app(|app| {
            Ok(match app.project.as_ref().and_then(Project::active_sequence) {
                Some(seq) => format!("Active sequence: {}", seq.name),
                None => "(No active sequence)".to_string(),
            })
        })
    }

    pub fn add_marker_at_playhead(&self, note: Option<String>) -> HostResult {
        self.with_app(|app| {
            let Some(seq) = app.project.as_mut().and_then(Project::active_sequence_mut) else {
                return Ok("No active sequence to add marker.".to_string());
            };
            let ticks = seq.player_position_ticks;
            seq.markers.push(Marker {
                name: MARKER_NAME.to_string(),
                comments: note.unwrap_or_default(),
                ticks,
            });
            Ok(format!("Marker added at ticks: {}", ticks))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SequenceConfig;

    fn app_with_project(active: Option<&str>) -> SharedHostApplication {
        let config = HostConfig {
            project: Some(ProjectConfig {
                name: "promo".to_string(),
                path: None,
                sequences: vec![
                    SequenceConfig {
                        name: "Cut 1".to_string(),
                        player_position_ticks: 254016000000,
                    },
                    SequenceConfig {
                        name: "Cut 2".to_string(),
                        player_position_ticks: 0,
                    },
                ],
                active_sequence: active.map(str::to_string),
            }),
            ..HostConfig::default()
        };
        Arc::new(Mutex::new(HostApplication::from_config(&config)))
    }

    #[test]
    fn test_hello_reports_app_name() {
        let sink = KitchenSink::new(app_with_project(None));
        assert_eq!(
            sink.hello(),
            HostResult::success("Hello from ExtendScript ✅\napp.name: Premiere Pro")
        );
    }

    #[test]
    fn test_project_info_json() {
        let sink = KitchenSink::new(app_with_project(None));
        let text = sink.get_project_info().into_result().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["name"], "promo");
        assert_eq!(value["path"], "(unsaved project)");
        assert_eq!(value["sequenceCount"], 2);
    }

    #[test]
    fn test_no_project() {
        let app = Arc::new(Mutex::new(HostApplication::from_config(&HostConfig::default())));
        let sink = KitchenSink::new(app);
        assert_eq!(sink.get_project_info(), HostResult::success("No project object."));
        assert_eq!(
            sink.get_active_sequence_name(),
            HostResult::success("(No active sequence)")
        );
        assert_eq!(
            sink.add_marker_at_playhead(Some("x".to_string())),
            HostResult::success("No active sequence to add marker.")
        );
    }

    #[test]
    fn test_marker_added_to_active_sequence() {
        let app = app_with_project(Some("Cut 1"));
        let sink = KitchenSink::new(Arc::clone(&app));

        assert_eq!(
            sink.get_active_sequence_name(),
            HostResult::success("Active sequence: Cut 1")
        );
        assert_eq!(
            sink.add_marker_at_playhead(Some("check audio".to_string())),
            HostResult::success("Marker added at ticks: 254016000000")
        );

        let app = app.lock().unwrap();
        let seq = app.project.as_ref().unwrap().active_sequence().unwrap();
        assert_eq!(
            seq.markers,
            vec![Marker {
                name: MARKER_NAME.to_string(),
                comments: "check audio".to_string(),
                ticks: 254016000000,
            }]
        );
    }

    #[test]
    fn test_poisoned_state_becomes_failure() {
        let app = app_with_project(Some("Cut 1"));
        let poisoned = Arc::clone(&app);
        let _ = std::thread::spawn(move || {
            let _guard = poisoned.lock().unwrap();
            panic!("poison");
        })
        .join();

        let sink = KitchenSink::new(app);
        assert!(sink.hello().is_failure());
    }
}
