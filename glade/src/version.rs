//! Supported glTF version.

use crate::Error;

/// glTF major version this crate decodes.
pub const GLTF_MAJOR: u32 = 2;

/// Accepts `asset.version` strings of the form `2.<minor>`.
pub(crate) fn validate_gltf_version(value: &str) -> Result<(), Error> {
    let invalid = || Error::UnsupportedVersion {
        value: value.to_string(),
    };
    let (major, minor) = value.split_once('.').ok_or_else(invalid)?;
    let major: u32 = major.parse().map_err(|_| invalid())?;
    minor.parse::<u32>().map_err(|_| invalid())?;
    if major != GLTF_MAJOR {
        return Err(invalid());
    }
    Ok(())
}
