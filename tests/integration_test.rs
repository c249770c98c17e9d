use std::fs;

use tms_runner::bindings::{Command, HostResult, SENTINEL};
use tms_runner::config::{HostConfig, ProjectConfig, RunnerConfig, SequenceConfig};
use tms_runner::services::{DemoCommand, PanelBridge};
use tms_runner::ui::{ControlPanel, DebugReport, PanelSettings, SettingsStore};

fn editing_config() -> HostConfig {
    HostConfig {
        project: Some(ProjectConfig {
            name: "trailer".to_string(),
            path: Some("/projects/trailer.prproj".to_string()),
            sequences: vec![
                SequenceConfig {
                    name: "Rough".to_string(),
                    player_position_ticks: 0,
                },
                SequenceConfig {
                    name: "Final".to_string(),
                    player_position_ticks: 508032000000,
                },
            ],
            active_sequence: Some("Final".to_string()),
        }),
        ..HostConfig::default()
    }
}

#[tokio::test]
async fn test_script_load_then_dependent_call() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("tools.jsx");
    fs::write(
        &script,
        "var Tools = { shout: function (s) { return s.toUpperCase(); } };",
    )
    .unwrap();

    let bridge = PanelBridge::connect_async(editing_config()).await.unwrap();

    // 加载与调用连续提交，结果按提交顺序完成
    let load = Command::new("TMSRunner_runFile")
        .unwrap()
        .path_arg(&script.to_string_lossy())
        .unwrap();
    let call = Command::new("Tools.shout").unwrap().arg("a \"quoted\"\nline");
    let dispatcher = bridge.dispatcher();
    let pending_load = dispatcher.dispatch(load.to_expression());
    let pending_call = dispatcher.dispatch(call.to_expression());
    let (loaded, shouted) = tokio::join!(pending_load, pending_call);

    assert_eq!(loaded, HostResult::empty());
    assert_eq!(shouted, HostResult::success("A \"QUOTED\"\nLINE"));
    bridge.shutdown();
}

#[tokio::test]
async fn test_failures_use_sentinel_on_the_wire() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.jsx");
    fs::write(&broken, "function (").unwrap();
    let bridge = PanelBridge::connect_async(HostConfig::default()).await.unwrap();

    let missing = bridge.run_script_file("/no/such/file.jsx").await.unwrap();
    assert_eq!(missing.to_wire(), "ERROR: JSX not found: /no/such/file.jsx");

    let syntax = bridge
        .run_script_file(&broken.to_string_lossy())
        .await
        .unwrap();
    assert!(syntax.is_failure());
    assert!(syntax.to_wire().starts_with(SENTINEL));
    assert!(syntax.text().contains("SyntaxError"));

    // 宿主在失败后继续可用
    let after = bridge.evaluate("1 + 1").await;
    assert_eq!(after, HostResult::success("2"));
}

#[tokio::test]
async fn test_demo_commands_share_host_state() {
    let bridge = PanelBridge::connect_async(editing_config()).await.unwrap();

    let info = bridge.demo(&DemoCommand::ProjectInfo).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(info.text()).unwrap();
    assert_eq!(value["name"], "trailer");
    assert_eq!(value["path"], "/projects/trailer.prproj");
    assert_eq!(value["sequenceCount"], 2);

    let marker = bridge
        .demo(&DemoCommand::AddMarker(Some("C:\\notes\\\"v2\"".to_string())))
        .await
        .unwrap();
    assert_eq!(marker, HostResult::success("Marker added at ticks: 508032000000"));

    let app = bridge.dispatcher().application();
    let app = app.lock().unwrap();
    let seq = app.project.as_ref().unwrap().active_sequence().unwrap();
    assert_eq!(seq.name, "Final");
    assert_eq!(seq.markers[0].comments, "C:\\notes\\\"v2\"");
}

#[tokio::test]
async fn test_panel_flow_with_settings_and_debug() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut store = SettingsStore::open(dir.path().join("settings.json"))?;
    store.set_mode("auto")?;
    store
        .save_settings(&PanelSettings {
            default_tab: "host".to_string(),
            ..PanelSettings::default()
        })?;

    let mut config = RunnerConfig::default();
    config.host = editing_config();
    config.panel.settings_path = store.path().to_string_lossy().into_owned();
    config.panel.user_data_dir = "/data".to_string();
    config.panel.extension_dir = "/ext".to_string();
    config.validate()?;

    let bridge = PanelBridge::connect_async(config.host.clone()).await?;
    let mut panel = ControlPanel::new(bridge, &store.mode());
    assert_eq!(panel.state().mode_label, "Mode: AUTO");

    panel.set_jsx_path("");
    assert!(panel.run_external_script().await.is_none());
    assert_eq!(panel.state().toast.as_deref(), Some("Please enter a JSX path"));

    panel.active_sequence().await;
    assert_eq!(panel.state().jsx_log, "Active sequence: Final");

    let env = panel.bridge().host_environment().to_json();
    let report = DebugReport::collect(env, &config.panel, &store).to_string();
    assert!(report.starts_with("=== TMS Runner Debug ===\nHostEnvironment:\n{"));
    assert!(report.contains("\"appName\":\"Premiere Pro\""));
    assert!(report.contains("UserData: /data\nExtension: /ext\n\nSettings:\n"));
    assert!(report.contains("\"defaultTab\": \"host\""));

    panel.shutdown();
    Ok(())
}
