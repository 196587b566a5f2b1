//! BDD tests for provisioning a tool from a release index served over HTTP.

use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use trimarr_provisioner::config::ProvisionConfig;
use trimarr_provisioner::test_utils::{
    ArchiveEntry, release_json, release_json_with_digest, tar_xz_bytes,
};
use trimarr_provisioner::{InstalledBinary, ProvisionError, ProvisionRequest, provision};

const REPOSITORY: &str = "Jesseatgao/MKVToolNix-static-builds";
const RELEASE_TAG: &str = "release-88.0";
const MEMBER_BYTES: &[u8] = b"\x7fELF static mkvmerge";

struct ProvisionWorld {
    _temp_dir: tempfile::TempDir,
    destination_dir: Utf8PathBuf,
    server: mockito::ServerGuard,
    mocks: Vec<mockito::Mock>,
    published_asset: Option<String>,
    result: Option<Result<InstalledBinary, ProvisionError>>,
}

impl ProvisionWorld {
    fn release_path() -> String {
        format!("/repos/{REPOSITORY}/releases/latest")
    }

    fn download_path(asset: &str) -> String {
        format!("/download/{RELEASE_TAG}/{asset}")
    }

    fn publish(&mut self, asset: &str, body: String) {
        let mock = self
            .server
            .mock("GET", Self::release_path().as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create();
        self.mocks.push(mock);
        self.published_asset = Some(asset.to_owned());
    }

    fn installed_path(&self) -> Utf8PathBuf {
        self.destination_dir.join("mkvmerge")
    }

    fn error(&self) -> &ProvisionError {
        match self.result.as_ref().expect("provisioning attempted") {
            Err(err) => err,
            Ok(installed) => panic!("expected failure, installed {installed:?}"),
        }
    }
}

#[fixture]
fn world() -> ProvisionWorld {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let destination_dir = Utf8PathBuf::try_from(temp_dir.path().join("bin")).expect("UTF-8 path");
    ProvisionWorld {
        _temp_dir: temp_dir,
        destination_dir,
        server: mockito::Server::new(),
        mocks: Vec::new(),
        published_asset: None,
        result: None,
    }
}

#[given("the latest release publishes asset \"{asset}\"")]
fn given_release_publishes(world: &mut ProvisionWorld, asset: String) {
    let url = format!("{}{}", world.server.url(), ProvisionWorld::download_path(&asset));
    let body = release_json(RELEASE_TAG, &[(asset.as_str(), url.as_str())]);
    world.publish(&asset, body);
}

#[given("the latest release publishes asset \"{asset}\" with a wrong digest")]
fn given_release_with_wrong_digest(world: &mut ProvisionWorld, asset: String) {
    let url = format!("{}{}", world.server.url(), ProvisionWorld::download_path(&asset));
    let body = release_json_with_digest(RELEASE_TAG, &asset, &url, &"a".repeat(64));
    world.publish(&asset, body);
}

#[given("the asset archive contains \"{member}\"")]
fn given_archive_contains(world: &mut ProvisionWorld, member: String) {
    let asset = world
        .published_asset
        .clone()
        .expect("release published before archive");
    let archive = tar_xz_bytes(&[ArchiveEntry::file(&member, MEMBER_BYTES).with_mode(0o644)])
        .expect("archive");
    let mock = world
        .server
        .mock("GET", ProvisionWorld::download_path(&asset).as_str())
        .with_status(200)
        .with_header("content-type", "application/octet-stream")
        .with_body(archive)
        .create();
    world.mocks.push(mock);
}

#[given("the repository has no published release")]
fn given_no_release(world: &mut ProvisionWorld) {
    let mock = world
        .server
        .mock("GET", ProvisionWorld::release_path().as_str())
        .with_status(404)
        .with_body(r#"{"message":"Not Found"}"#)
        .create();
    world.mocks.push(mock);
}

#[when("\"{binary}\" is provisioned from asset \"{asset}\"")]
fn when_provisioned(world: &mut ProvisionWorld, binary: String, asset: String) {
    let config = ProvisionConfig::default().with_api_base(&world.server.url());
    let request = ProvisionRequest {
        repository: REPOSITORY,
        asset_name: &asset,
        target_basename: &binary,
        destination_dir: &world.destination_dir,
    };
    world.result = Some(provision(&config, &request));
}

#[then("provisioning succeeds")]
fn then_succeeds(world: &mut ProvisionWorld) {
    let result = world.result.as_ref().expect("provisioning attempted");
    assert!(result.is_ok(), "expected success, got {result:?}");
}

#[then("the installed binary is executable")]
fn then_executable(world: &mut ProvisionWorld) {
    let installed = trimarr_provisioner::installed_binary(&world.destination_dir, "mkvmerge")
        .expect("binary present");
    assert!(installed.executable, "{} is not executable", installed.path);
}

#[then("the installed binary matches the archived member")]
fn then_matches_member(world: &mut ProvisionWorld) {
    let bytes = std::fs::read(world.installed_path()).expect("read installed binary");
    assert_eq!(bytes, MEMBER_BYTES);
}

#[then("provisioning fails mentioning \"{keyword}\"")]
fn then_fails_mentioning(world: &mut ProvisionWorld, keyword: String) {
    let message = world.error().to_string();
    assert!(
        message.to_lowercase().contains(&keyword.to_lowercase()),
        "expected error to mention '{keyword}', got: {message}"
    );
}

#[then("nothing is installed")]
fn then_nothing_installed(world: &mut ProvisionWorld) {
    let path = world.installed_path();
    assert!(!path.exists(), "unexpected file at {path}");
}

#[scenario(
    path = "tests/features/provisioning.feature",
    name = "Binary is installed from the latest release"
)]
fn scenario_installs_binary(world: ProvisionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/provisioning.feature",
    name = "Repeated provisioning overwrites the binary"
)]
fn scenario_repeated_provisioning(world: ProvisionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/provisioning.feature",
    name = "Missing asset is reported"
)]
fn scenario_missing_asset(world: ProvisionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/provisioning.feature",
    name = "Missing member is reported"
)]
fn scenario_missing_member(world: ProvisionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/provisioning.feature",
    name = "Path traversal in the archive is rejected"
)]
fn scenario_path_traversal(world: ProvisionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/provisioning.feature",
    name = "Published digest mismatch is rejected"
)]
fn scenario_digest_mismatch(world: ProvisionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/provisioning.feature",
    name = "Repository without a release is reported"
)]
fn scenario_no_release(world: ProvisionWorld) {
    let _ = world;
}
