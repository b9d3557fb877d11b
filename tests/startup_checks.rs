mod common;

use frpc_panel::startup::run_startup_checks;

use common::Harness;

#[tokio::test]
async fn fresh_host_only_gets_install_dir() {
    let h = Harness::new();

    run_startup_checks(&h.state).await.unwrap();

    assert!(h.paths().install_dir.is_dir());
    assert!(!h.paths().unit_path.exists());
    assert!(h.manager.calls().is_empty());
}

#[tokio::test]
async fn missing_unit_is_repaired_and_service_started() {
    let h = Harness::new();
    h.install_fake_binary();
    std::fs::write(&h.paths().config_path, "serverAddr = \"frp.example.com\"\n").unwrap();

    run_startup_checks(&h.state).await.unwrap();

    let unit = std::fs::read_to_string(&h.paths().unit_path).unwrap();
    assert!(unit.contains(&format!("ExecStart={}", h.paths().binary_path.display())));
    assert_eq!(h.manager.calls(), vec!["daemon-reload", "enable", "start"]);
}

#[tokio::test]
async fn installed_without_config_is_not_started() {
    let h = Harness::new();
    h.install_fake_binary();
    std::fs::write(&h.paths().unit_path, "[Unit]\n").unwrap();

    run_startup_checks(&h.state).await.unwrap();

    assert!(h.manager.calls().is_empty());
    assert_eq!(std::fs::read_to_string(&h.paths().unit_path).unwrap(), "[Unit]\n");
}

#[tokio::test]
async fn unusable_install_dir_is_fatal() {
    let h = Harness::new();
    // 安装目录的位置被普通文件占用
    std::fs::write(&h.paths().install_dir, "not a directory").unwrap();
    let blocked = frpc_panel::config::PathsConfig {
        install_dir: h.paths().install_dir.join("nested"),
        ..h.paths().clone()
    };
    let mut config = h.config.clone();
    config.paths = blocked;
    let state = frpc_panel::AppState::new(config, h.caps.clone());

    assert!(run_startup_checks(&state).await.is_err());
}
