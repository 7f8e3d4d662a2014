//! Deployer tests

use std::path::PathBuf;

use fwsdk::deploy::{CleanScope, DeployOutcome, DeployTask};
use fwsdk::models::request::{DeployRequest, ModeSelector};
use fwsdk::storage::state::PersistedState;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::*;

#[tokio::test]
async fn test_second_deploy_is_a_no_op() {
    let server = MockServer::start().await;
    mount_branch(&server, "0.99.1", 2, 1).await;

    let temp = tempfile::tempdir().unwrap();
    let deployer = deployer(&temp);
    let task = branch_task(&server);

    assert_eq!(deployer.try_deploy(&task).await.unwrap(), DeployOutcome::Deployed);
    let state_file = deployer.layout().state_file();
    let written = std::fs::metadata(state_file.path()).unwrap().modified().unwrap();

    assert_eq!(deployer.try_deploy(&task).await.unwrap(), DeployOutcome::UpToDate);
    assert_eq!(
        std::fs::metadata(state_file.path()).unwrap().modified().unwrap(),
        written
    );
    assert_eq!(deployed_marker(&deployer), "0.99.1");
}

#[tokio::test]
async fn test_persisted_state_records_loader() {
    let server = MockServer::start().await;
    mount_branch(&server, "0.99.1", 1, 1).await;

    let temp = tempfile::tempdir().unwrap();
    let deployer = deployer(&temp);
    assert!(deployer.deploy(&branch_task(&server)).await);

    let state = PersistedState::load(&deployer.layout().state_file())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        state.as_map(),
        &params(&[
            ("hw_target", "f7"),
            ("mode", "branch"),
            ("branch", BRANCH),
            ("branch_root", &branch_root(&server)),
            ("version", "0.99.1"),
        ])
    );

    // the archive stays in the download dir
    assert!(deployer
        .layout()
        .download_dir()
        .file(&sdk_file_name("0.99.1"))
        .exists()
        .await);
    assert!(!deployer.layout().staging_sdk_dir().exists().await);
}

#[tokio::test]
async fn test_new_version_replaces_sdk() {
    let server = MockServer::start().await;
    mount_branch(&server, "0.99.1", 1, 1).await;

    let temp = tempfile::tempdir().unwrap();
    let deployer = deployer(&temp);
    let task = branch_task(&server);
    assert!(deployer.deploy(&task).await);

    // leftover from the old SDK must not survive the replacement
    let stale = deployer.layout().current_sdk_dir().file("stale.txt");
    stale.write_bytes(b"old").await.unwrap();

    server.reset().await;
    mount_branch(&server, "1.0.0", 1, 1).await;

    assert_eq!(deployer.try_deploy(&task).await.unwrap(), DeployOutcome::Deployed);
    assert_eq!(deployed_marker(&deployer), "1.0.0");
    assert!(!stale.exists().await);
}

#[tokio::test]
async fn test_target_change_redeploys() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/builds/{BRANCH}/")))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a href="flipper-z-f7-sdk-0.99.1.zip">f7</a>
               <a href="flipper-z-f18-sdk-0.99.1.zip">f18</a>"#,
        ))
        .mount(&server)
        .await;
    for target in ["f7", "f18"] {
        Mock::given(method("GET"))
            .and(path(format!("/builds/{BRANCH}/flipper-z-{target}-sdk-0.99.1.zip")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(sdk_zip(target)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let temp = tempfile::tempdir().unwrap();
    let deployer = deployer(&temp);
    let mut task = branch_task(&server);
    assert!(deployer.deploy(&task).await);

    task.hw_target = Some("f18".to_string());
    assert_eq!(deployer.try_deploy(&task).await.unwrap(), DeployOutcome::Deployed);
    assert_eq!(deployed_marker(&deployer), "f18");
}

#[tokio::test]
async fn test_force_redeploys() {
    let server = MockServer::start().await;
    mount_branch(&server, "0.99.1", 2, 2).await;

    let temp = tempfile::tempdir().unwrap();
    let deployer = deployer(&temp);
    let mut task = branch_task(&server);
    assert!(deployer.deploy(&task).await);

    task.force = true;
    assert_eq!(deployer.try_deploy(&task).await.unwrap(), DeployOutcome::Deployed);
}

#[tokio::test]
async fn test_unknown_version_always_redeploys() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/direct/sdk.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(sdk_zip("direct")))
        .expect(2)
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let deployer = deployer(&temp);
    let request = DeployRequest {
        hw_target: Some("f7".to_string()),
        mode: Some(ModeSelector::Url(format!("{}/direct/sdk.zip", server.uri()))),
        ..Default::default()
    };
    let task = DeployTask::from_request(&request).unwrap();

    assert_eq!(deployer.try_deploy(&task).await.unwrap(), DeployOutcome::Deployed);
    assert_eq!(deployer.try_deploy(&task).await.unwrap(), DeployOutcome::Deployed);

    let previous = deployer.get_previous_task().await.unwrap();
    assert_eq!(previous.params["version"], "unknown");
}

#[tokio::test]
async fn test_persisted_local_version_is_stale() {
    let server = MockServer::start().await;
    mount_branch(&server, "0.99.1", 1, 1).await;

    let temp = tempfile::tempdir().unwrap();
    let deployer = deployer(&temp);
    let state_file = deployer.layout().state_file();
    PersistedState::from_map(params(&[("hw_target", "f7"), ("version", "local")]))
        .save(&state_file)
        .await
        .unwrap();

    let outcome = deployer.try_deploy(&branch_task(&server)).await.unwrap();
    assert_eq!(outcome, DeployOutcome::Deployed);
}

#[tokio::test]
async fn test_missing_state_file_redeploys() {
    let server = MockServer::start().await;
    mount_branch(&server, "0.99.1", 2, 2).await;

    let temp = tempfile::tempdir().unwrap();
    let deployer = deployer(&temp);
    let task = branch_task(&server);
    assert!(deployer.deploy(&task).await);

    std::fs::remove_file(deployer.layout().state_file().path()).unwrap();
    assert!(deployer.layout().current_sdk_dir().exists().await);

    assert_eq!(deployer.try_deploy(&task).await.unwrap(), DeployOutcome::Deployed);
}

#[tokio::test]
async fn test_failed_resolve_keeps_existing_sdk() {
    let server = MockServer::start().await;
    mount_branch(&server, "0.99.1", 2, 1).await;

    let temp = tempfile::tempdir().unwrap();
    let deployer = deployer(&temp);
    let mut task = branch_task(&server);
    assert!(deployer.deploy(&task).await);

    task.hw_target = Some("f18".to_string());
    assert!(!deployer.deploy(&task).await);

    assert_eq!(deployed_marker(&deployer), "0.99.1");
    let previous = deployer.get_previous_task().await.unwrap();
    assert_eq!(previous.hw_target.as_deref(), Some("f7"));
}

#[tokio::test]
async fn test_broken_archive_keeps_existing_sdk() {
    let server = MockServer::start().await;
    mount_branch(&server, "0.99.1", 1, 1).await;

    let temp = tempfile::tempdir().unwrap();
    let deployer = deployer(&temp);
    assert!(deployer.deploy(&branch_task(&server)).await);

    server.reset().await;
    Mock::given(method("GET"))
        .and(path(format!("/builds/{BRANCH}/")))
        .respond_with(ResponseTemplate::new(200).set_body_string(branch_listing("1.0.0")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/builds/{BRANCH}/{}", sdk_file_name("1.0.0"))))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    assert!(!deployer.deploy(&branch_task(&server)).await);
    assert_eq!(deployed_marker(&deployer), "0.99.1");
    assert!(!deployer.layout().staging_sdk_dir().exists().await);
}

#[tokio::test]
async fn test_unreachable_index_fails_cleanly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let deployer = deployer(&temp);

    assert!(!deployer.deploy(&branch_task(&server)).await);
    assert!(!deployer.layout().current_sdk_dir().exists().await);
    assert!(deployer.get_previous_task().await.is_none());
}

#[tokio::test]
async fn test_local_archive_deploy() {
    let temp = tempfile::tempdir().unwrap();
    let archive = temp.path().join("my-sdk.zip");
    std::fs::write(&archive, sdk_zip("local-build")).unwrap();

    let state = tempfile::tempdir().unwrap();
    let deployer = deployer(&state);

    let request = DeployRequest {
        hw_target: Some("f7".to_string()),
        mode: Some(ModeSelector::Local(archive.clone())),
        ..Default::default()
    };
    let mut task = DeployTask::default();
    task.merge(DeployTask::from_request(&request).unwrap());

    assert_eq!(deployer.try_deploy(&task).await.unwrap(), DeployOutcome::Deployed);
    assert_eq!(deployed_marker(&deployer), "local-build");

    let previous = deployer.get_previous_task().await.unwrap();
    assert_eq!(previous.mode.as_deref(), Some("local"));
    assert_eq!(PathBuf::from(&previous.params["file_path"]), archive);

    // no version to compare against, so it is deployed again
    assert_eq!(deployer.try_deploy(&previous).await.unwrap(), DeployOutcome::Deployed);
}

#[tokio::test]
async fn test_status_and_clean_after_deploy() {
    let server = MockServer::start().await;
    mount_branch(&server, "0.99.1", 1, 1).await;

    let temp = tempfile::tempdir().unwrap();
    let deployer = deployer(&temp);
    assert!(deployer.deploy(&branch_task(&server)).await);

    let status = deployer.status().await;
    assert_eq!(status.error, None);
    assert_eq!(status.target.as_deref(), Some("f7"));
    assert_eq!(status.mode.as_deref(), Some("branch"));
    assert_eq!(status.version.as_deref(), Some("0.99.1"));
    assert_eq!(
        status.get("version").and_then(|v| v.as_str().map(str::to_string)),
        Some("0.99.1".to_string())
    );

    deployer.clean(CleanScope::Current).await.unwrap();
    let status = deployer.status().await;
    assert_eq!(status.error.as_deref(), Some("SDK is not deployed"));
    assert!(deployer.layout().download_dir().exists().await);
}
