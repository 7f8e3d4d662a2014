//! Shared fixtures

use std::io::{Cursor, Write};

use fwsdk::deploy::{DeployTask, SdkDeployer};
use fwsdk::http::client::TransportOptions;
use fwsdk::loader::Metadata;
use fwsdk::storage::layout::StateLayout;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;

pub const BRANCH: &str = "dev";

/// A small SDK archive whose `sdk/VERSION` file holds `version`
pub fn sdk_zip(version: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file("sdk/VERSION", SimpleFileOptions::default()).unwrap();
    writer.write_all(version.as_bytes()).unwrap();
    writer.add_directory("sdk/lib/", SimpleFileOptions::default()).unwrap();
    writer.start_file("sdk/lib/libfw.a", SimpleFileOptions::default()).unwrap();
    writer.write_all(b"!<arch>\n").unwrap();
    writer.finish().unwrap().into_inner()
}

pub fn branch_root(server: &MockServer) -> String {
    format!("{}/builds", server.uri())
}

pub fn sdk_file_name(version: &str) -> String {
    format!("flipper-z-f7-sdk-{version}.zip")
}

/// Branch listing with an SDK and a firmware image for f7
pub fn branch_listing(version: &str) -> String {
    format!(
        r#"<html><body><pre>
<a href="../">../</a>
<a href="{sdk}">{sdk}</a>
<a href="flipper-z-f7-full-{version}.dfu">flipper-z-f7-full-{version}.dfu</a>
<a href="flipper-z-f7-full-{version}.elf.map">map</a>
</pre></body></html>"#,
        sdk = sdk_file_name(version),
    )
}

/// Serve a branch listing plus its SDK archive. The listing is expected
/// `listing_hits` times and the archive `zip_hits` times.
pub async fn mount_branch(server: &MockServer, version: &str, listing_hits: u64, zip_hits: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/builds/{BRANCH}/")))
        .respond_with(ResponseTemplate::new(200).set_body_string(branch_listing(version)))
        .expect(listing_hits)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/builds/{BRANCH}/{}", sdk_file_name(version))))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(sdk_zip(version)))
        .expect(zip_hits)
        .mount(server)
        .await;
}

pub fn params(entries: &[(&str, &str)]) -> Metadata {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn branch_task(server: &MockServer) -> DeployTask {
    DeployTask {
        hw_target: Some("f7".to_string()),
        force: false,
        mode: Some("branch".to_string()),
        params: params(&[("branch", BRANCH), ("branch_root", &branch_root(server))]),
    }
}

pub fn deployer(temp: &tempfile::TempDir) -> SdkDeployer {
    SdkDeployer::new(StateLayout::new(temp.path()), &TransportOptions::default()).unwrap()
}

/// Content of the deployed `sdk/VERSION` file
pub fn deployed_marker(deployer: &SdkDeployer) -> String {
    let path = deployer
        .layout()
        .current_sdk_dir()
        .path()
        .join("sdk")
        .join("VERSION");
    std::fs::read_to_string(path).unwrap()
}
