//! Release metadata resolution.
//!
//! Queries the release index for the release a repository currently marks as
//! latest and parses the response into a validated [`Release`]. The remote
//! JSON is checked against an explicit schema at this boundary so nothing
//! deeper in the pipeline touches untyped fields.

use log::debug;
use serde::Deserialize;

use crate::config::ProvisionConfig;
use crate::digest::Sha256Digest;
use crate::download::http_agent;
use crate::error::{ProvisionError, Result};

/// A published release: its tag and its ordered assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    tag: String,
    assets: Vec<Asset>,
}

impl Release {
    /// Construct a release from its parts.
    #[must_use]
    pub fn new(tag: impl Into<String>, assets: Vec<Asset>) -> Self {
        Self {
            tag: tag.into(),
            assets,
        }
    }

    /// Tag name of the release.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Assets in the order the release index lists them.
    #[must_use]
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    name: String,
    download_url: String,
    digest: Option<Sha256Digest>,
}

impl Asset {
    /// Construct an asset without a published digest.
    #[must_use]
    pub fn new(name: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            download_url: download_url.into(),
            digest: None,
        }
    }

    /// Attach a published SHA-256 digest.
    #[must_use]
    pub fn with_digest(mut self, digest: Sha256Digest) -> Self {
        self.digest = Some(digest);
        self
    }

    /// Exact filename of the asset.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct download URL of the asset.
    #[must_use]
    pub fn download_url(&self) -> &str {
        &self.download_url
    }

    /// SHA-256 digest published for the asset, if any.
    #[must_use]
    pub fn digest(&self) -> Option<&Sha256Digest> {
        self.digest.as_ref()
    }
}

#[derive(Debug, Deserialize)]
struct ReleasePayload {
    tag_name: String,
    assets: Vec<AssetPayload>,
}

#[derive(Debug, Deserialize)]
struct AssetPayload {
    name: String,
    browser_download_url: String,
    #[serde(default)]
    digest: Option<String>,
}

/// Parse a release-index response body into a [`Release`].
///
/// # Errors
///
/// Returns [`ProvisionError::MalformedResponse`] when the body is not JSON,
/// lacks `tag_name` or `assets`, an asset lacks `name` or
/// `browser_download_url`, or a published `sha256:` digest is malformed.
///
/// # Examples
///
/// ```
/// use trimarr_provisioner::release::parse_release;
///
/// let json = r#"{"tag_name":"v1","assets":[{"name":"pkg.tar.xz","browser_download_url":"http://host/pkg.tar.xz"}]}"#;
/// let release = parse_release("owner/name", json).expect("valid release");
/// assert_eq!(release.tag(), "v1");
/// assert_eq!(release.assets().len(), 1);
/// ```
pub fn parse_release(repository: &str, json: &str) -> Result<Release> {
    let malformed = |reason: String| ProvisionError::MalformedResponse {
        repository: repository.to_owned(),
        reason,
    };
    let payload: ReleasePayload =
        serde_json::from_str(json).map_err(|e| malformed(e.to_string()))?;

    let assets = payload
        .assets
        .into_iter()
        .map(|asset| -> Result<Asset> {
            let digest = match asset.digest.as_deref() {
                Some(field) => Sha256Digest::from_release_field(field)
                    .map_err(|e| malformed(format!("asset '{}': {e}", asset.name)))?,
                None => None,
            };
            Ok(Asset {
                name: asset.name,
                download_url: asset.browser_download_url,
                digest,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Release::new(payload.tag_name, assets))
}

/// Source of release metadata.
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseIndex {
    /// Fetch the release `repository` currently designates as latest.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::RemoteService`] on transport failure or a
    /// non-success status, [`ProvisionError::MalformedResponse`] when the
    /// body does not have the release shape.
    fn latest_release(&self, repository: &str) -> Result<Release>;
}

/// Release index backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubReleaseIndex {
    agent: ureq::Agent,
    api_base: String,
    user_agent: String,
}

impl GithubReleaseIndex {
    /// Build a client bounded by the configured request timeout.
    #[must_use]
    pub fn new(config: &ProvisionConfig) -> Self {
        Self {
            agent: http_agent(config.request_timeout),
            api_base: config.api_base.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    /// URL of the latest-release endpoint for `repository`.
    ///
    /// # Examples
    ///
    /// ```
    /// use trimarr_provisioner::config::ProvisionConfig;
    /// use trimarr_provisioner::release::GithubReleaseIndex;
    ///
    /// let index = GithubReleaseIndex::new(&ProvisionConfig::default());
    /// assert_eq!(
    ///     index.latest_release_url("owner/name"),
    ///     "https://api.github.com/repos/owner/name/releases/latest"
    /// );
    /// ```
    #[must_use]
    pub fn latest_release_url(&self, repository: &str) -> String {
        format!("{}/repos/{repository}/releases/latest", self.api_base)
    }
}

impl ReleaseIndex for GithubReleaseIndex {
    fn latest_release(&self, repository: &str) -> Result<Release> {
        let url = self.latest_release_url(repository);
        debug!("resolving latest release of {repository} via {url}");
        let response = self
            .agent
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", self.user_agent.as_str())
            .call()
            .map_err(|e| map_index_error(repository, &e))?;
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| ProvisionError::RemoteService {
                repository: repository.to_owned(),
                status: None,
                reason: format!("failed to read response body: {e}"),
            })?;
        let release = parse_release(repository, &body)?;
        debug!(
            "latest release of {repository} is {} with {} asset(s)",
            release.tag(),
            release.assets().len()
        );
        Ok(release)
    }
}

/// Resolve the latest release of `repository` through `index`.
///
/// # Errors
///
/// Propagates the index's error unchanged.
pub fn resolve(index: &dyn ReleaseIndex, repository: &str) -> Result<Release> {
    index.latest_release(repository)
}

/// Map a ureq error on the release index to a [`ProvisionError`].
fn map_index_error(repository: &str, err: &ureq::Error) -> ProvisionError {
    let (status, reason) = match err {
        ureq::Error::StatusCode(404) => (
            Some(404),
            "repository not found or has no published release".to_owned(),
        ),
        ureq::Error::StatusCode(code) => (Some(*code), format!("HTTP status {code}")),
        other => (None, other.to_string()),
    };
    ProvisionError::RemoteService {
        repository: repository.to_owned(),
        status,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const REPO: &str = "Jesseatgao/MKVToolNix-static-builds";

    fn index_for(server: &mockito::Server) -> GithubReleaseIndex {
        GithubReleaseIndex::new(&ProvisionConfig::default().with_api_base(&server.url()))
    }

    #[test]
    fn parses_assets_in_order() {
        let json = r#"{
            "tag_name": "v88.0",
            "name": "ignored extra field",
            "assets": [
                {"name": "a.tar.xz", "browser_download_url": "http://host/a"},
                {"name": "b.tar.xz", "browser_download_url": "http://host/b", "size": 12}
            ]
        }"#;
        let release = parse_release(REPO, json).expect("valid");
        assert_eq!(release.tag(), "v88.0");
        let names: Vec<_> = release.assets().iter().map(Asset::name).collect();
        assert_eq!(names, ["a.tar.xz", "b.tar.xz"]);
        assert!(release.assets().iter().all(|a| a.digest().is_none()));
    }

    #[test]
    fn parses_published_digest() {
        let json = format!(
            r#"{{"tag_name":"v1","assets":[{{"name":"a","browser_download_url":"u","digest":"sha256:{}"}}]}}"#,
            "c".repeat(64)
        );
        let release = parse_release(REPO, &json).expect("valid");
        let digest = release.assets()[0].digest().expect("digest present");
        assert_eq!(digest.as_str(), "c".repeat(64));
    }

    #[rstest]
    #[case::not_json("{not json")]
    #[case::missing_tag(r#"{"assets":[]}"#)]
    #[case::missing_assets(r#"{"tag_name":"v1"}"#)]
    #[case::asset_without_url(r#"{"tag_name":"v1","assets":[{"name":"a"}]}"#)]
    #[case::asset_without_name(r#"{"tag_name":"v1","assets":[{"browser_download_url":"u"}]}"#)]
    #[case::assets_not_array(r#"{"tag_name":"v1","assets":{}}"#)]
    #[case::bad_digest(
        r#"{"tag_name":"v1","assets":[{"name":"a","browser_download_url":"u","digest":"sha256:xyz"}]}"#
    )]
    fn rejects_malformed_payloads(#[case] json: &str) {
        let err = parse_release(REPO, json).expect_err("payload should be rejected");
        assert!(
            matches!(err, ProvisionError::MalformedResponse { ref repository, .. } if repository == REPO),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn github_index_fetches_latest_release() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", format!("/repos/{REPO}/releases/latest").as_str())
            .match_header("accept", "application/vnd.github+json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"tag_name":"v1","assets":[{"name":"pkg.tar.xz","browser_download_url":"http://host/pkg.tar.xz"}]}"#,
            )
            .create();

        let release = index_for(&server).latest_release(REPO).expect("release");

        mock.assert();
        assert_eq!(release.tag(), "v1");
        assert_eq!(release.assets()[0].download_url(), "http://host/pkg.tar.xz");
    }

    #[rstest]
    #[case::not_found(404, Some(404))]
    #[case::rate_limited(403, Some(403))]
    #[case::server_error(500, Some(500))]
    fn github_index_reports_error_status(#[case] status: usize, #[case] expected: Option<u16>) {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", format!("/repos/{REPO}/releases/latest").as_str())
            .with_status(status)
            .create();

        let err = index_for(&server)
            .latest_release(REPO)
            .expect_err("request should fail");

        assert!(
            matches!(err, ProvisionError::RemoteService { status, .. } if status == expected),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn github_index_reports_malformed_body() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", format!("/repos/{REPO}/releases/latest").as_str())
            .with_status(200)
            .with_body(r#"{"message":"ok"}"#)
            .create();

        let err = index_for(&server)
            .latest_release(REPO)
            .expect_err("body should be rejected");

        assert!(matches!(err, ProvisionError::MalformedResponse { .. }));
    }

    #[test]
    fn resolve_delegates_to_index() {
        let mut index = MockReleaseIndex::new();
        index
            .expect_latest_release()
            .withf(|repo| repo == REPO)
            .returning(|_| Ok(Release::new("v2", Vec::new())));

        let release = resolve(&index, REPO).expect("release");
        assert_eq!(release.tag(), "v2");
    }
}
