//! Asset lookup within a resolved release.

use crate::error::{ProvisionError, Result};
use crate::release::{Asset, Release};

/// Find the asset named exactly `asset_name` in `release`.
///
/// The scan follows the release's asset order and the first match wins, so
/// duplicate names resolve deterministically. Comparison is case-sensitive.
///
/// # Errors
///
/// Returns [`ProvisionError::AssetNotFound`] carrying the release tag when no
/// asset matches.
///
/// # Examples
///
/// ```
/// use trimarr_provisioner::locate::locate_asset;
/// use trimarr_provisioner::release::{Asset, Release};
///
/// let release = Release::new("v1", vec![Asset::new("pkg.tar.xz", "http://host/pkg.tar.xz")]);
/// let asset = locate_asset(&release, "pkg.tar.xz").expect("asset present");
/// assert_eq!(asset.download_url(), "http://host/pkg.tar.xz");
/// ```
pub fn locate_asset<'a>(release: &'a Release, asset_name: &str) -> Result<&'a Asset> {
    release
        .assets()
        .iter()
        .find(|asset| asset.name() == asset_name)
        .ok_or_else(|| ProvisionError::AssetNotFound {
            tag: release.tag().to_owned(),
            asset_name: asset_name.to_owned(),
        })
}
