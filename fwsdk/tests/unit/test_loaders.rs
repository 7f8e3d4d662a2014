//! Loader tests against a local update server

use fwsdk::deploy::DeployTask;
use fwsdk::errors::SdkError;
use fwsdk::filesys::dir::Dir;
use fwsdk::http::client::{HttpClient, TransportOptions};
use fwsdk::loader::{
    BranchArgs, ChannelArgs, LoaderArgs, LoaderFactory, SdkLoader, UpdateChannel,
};
use fwsdk::models::file_kind::FileKind;
use serde_json::json;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::*;

fn client() -> HttpClient {
    HttpClient::new(&TransportOptions::default()).unwrap()
}

async fn mount_channel_index(server: &MockServer) {
    let index = json!({
        "channels": [
            {
                "id": "development",
                "versions": [{
                    "version": "a1b2c3d",
                    "changelog": "Nightly build",
                    "files": [
                        {"type": "sdk_zip", "target": "f7", "url": format!("{}/files/dev/sdk-f7.zip", server.uri())},
                        {"type": "full_dfu", "target": "f7", "url": format!("{}/files/dev/full-f7.dfu", server.uri())}
                    ]
                }]
            },
            {
                "id": "release",
                "versions": [{
                    "version": "0.99.1",
                    "files": [
                        {"type": "sdk_zip", "target": "f7", "url": format!("{}/files/0.99.1/sdk-f7.zip", server.uri())}
                    ]
                }]
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/firmware/directory.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(index))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_branch_describe_round_trip() {
    let server = MockServer::start().await;
    mount_branch(&server, "0.99.1", 2, 0).await;

    let temp = tempfile::tempdir().unwrap();
    let download_dir = Dir::new(temp.path());
    let args = BranchArgs {
        branch: BRANCH.to_string(),
        branch_root: branch_root(&server),
    };

    let loader = SdkLoader::open(LoaderArgs::Branch(args.clone()), download_dir.clone(), &client())
        .await
        .unwrap();
    assert_eq!(loader.version(), "0.99.1");

    let metadata = loader.describe();
    let rebuilt = loader.mode().reconstruct_args(&metadata).unwrap();
    assert_eq!(rebuilt, LoaderArgs::Branch(args));

    let reopened = SdkLoader::open(rebuilt, download_dir, &client()).await.unwrap();
    let (SdkLoader::Branch(first), SdkLoader::Branch(second)) = (&loader, &reopened) else {
        panic!("expected branch loaders");
    };
    assert_eq!(first.index(), second.index());
    assert_eq!(
        second.artifact_url(FileKind::FullDfu, "f7").unwrap(),
        format!("{}/{BRANCH}/flipper-z-f7-full-0.99.1.dfu", branch_root(&server))
    );
}

#[tokio::test]
async fn test_channel_describe_round_trip() {
    let server = MockServer::start().await;
    mount_channel_index(&server).await;

    let temp = tempfile::tempdir().unwrap();
    let args = ChannelArgs {
        channel: UpdateChannel::Dev,
        json_index: format!("{}/firmware/directory.json", server.uri()),
    };

    let loader = SdkLoader::open(LoaderArgs::Channel(args.clone()), Dir::new(temp.path()), &client())
        .await
        .unwrap();
    assert_eq!(loader.version(), "a1b2c3d");

    let metadata = loader.describe();
    assert_eq!(metadata["channel"], "dev");
    assert_eq!(metadata["version"], "a1b2c3d");

    let rebuilt = loader.mode().reconstruct_args(&metadata).unwrap();
    assert_eq!(rebuilt, LoaderArgs::Channel(args));

    let reopened = SdkLoader::open(rebuilt, Dir::new(temp.path()), &client()).await.unwrap();
    let (SdkLoader::Channel(first), SdkLoader::Channel(second)) = (&loader, &reopened) else {
        panic!("expected channel loaders");
    };
    assert_eq!(first.index(), second.index());
    assert_eq!(second.changelog(), Some("Nightly build"));
}

#[tokio::test]
async fn test_channel_resolve_downloads_sdk() {
    let server = MockServer::start().await;
    mount_channel_index(&server).await;
    Mock::given(method("GET"))
        .and(path("/files/0.99.1/sdk-f7.zip"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(sdk_zip("0.99.1")))
        .expect(1)
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let task = DeployTask {
        params: params(&[
            ("channel", "release"),
            ("json_index", &format!("{}/firmware/directory.json", server.uri())),
        ]),
        ..DeployTask::default()
    };
    let loader = LoaderFactory::create_for_task(&task, Dir::new(temp.path()), &client())
        .await
        .unwrap();

    let archive = loader.resolve(Some("f7")).await.unwrap();
    assert_eq!(archive, temp.path().join("sdk-f7.zip"));
    assert_eq!(std::fs::read(&archive).unwrap(), sdk_zip("0.99.1"));
}

#[tokio::test]
async fn test_channel_missing_target() {
    let server = MockServer::start().await;
    mount_channel_index(&server).await;

    let temp = tempfile::tempdir().unwrap();
    let args = ChannelArgs {
        channel: UpdateChannel::Release,
        json_index: format!("{}/firmware/directory.json", server.uri()),
    };
    let loader = SdkLoader::open(LoaderArgs::Channel(args), Dir::new(temp.path()), &client())
        .await
        .unwrap();

    let err = loader.resolve(Some("f18")).await.unwrap_err();
    assert!(matches!(err, SdkError::ArtifactNotFound { .. }));

    let err = loader.resolve(None).await.unwrap_err();
    assert!(matches!(err, SdkError::MissingRequiredParameter(_)));
}

#[tokio::test]
async fn test_channel_not_in_index() {
    let server = MockServer::start().await;
    mount_channel_index(&server).await;

    let temp = tempfile::tempdir().unwrap();
    let args = ChannelArgs {
        channel: UpdateChannel::Rc,
        json_index: format!("{}/firmware/directory.json", server.uri()),
    };
    let err = SdkLoader::open(LoaderArgs::Channel(args), Dir::new(temp.path()), &client())
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::ChannelNotFound(id) if id == "release-candidate"));
}

#[tokio::test]
async fn test_branch_with_conflicting_versions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/builds/{BRANCH}/")))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a href="flipper-z-f7-sdk-0.1.2.zip">a</a>
               <a href="flipper-z-f7-sdk-0.2.0.zip">b</a>"#,
        ))
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let err = SdkLoader::open(
        LoaderArgs::Branch(BranchArgs {
            branch: BRANCH.to_string(),
            branch_root: branch_root(&server),
        }),
        Dir::new(temp.path()),
        &client(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, SdkError::VersionConflict { .. }));
}

#[tokio::test]
async fn test_http_error_is_transfer_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client()
        .get_text(&format!("{}/firmware/directory.json", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::TransferFailure { .. }));
}
