use super::error::{PluginManagerError, Result};

/// Outcome of comparing a plugin's platform requirement with the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCheck {
    /// Major versions match
    Compatible,
    /// The requirement could not be interpreted; carries the warning to show
    Skipped(String),
}

/// Leading numeric component of a dotted version, or `None` when the string
/// has no `.` separator at all
fn leading_component(version: &str) -> Option<&str> {
    version.split_once('.').map(|(major, _)| major)
}

/// Compare the major version a plugin requires against the host's API version.
///
/// A malformed requirement comes from the catalog and is only worth a warning.
/// A malformed host version means the host misreports itself, which is fatal.
pub fn check_platform_version(required: &str, current: &str) -> Result<PlatformCheck> {
    let Some(current_major) = leading_component(current) else {
        return Err(PluginManagerError::InternalInconsistency(format!(
            "host reported malformed API version '{}'",
            current
        )));
    };

    let Some(required_major) = leading_component(required) else {
        return Ok(PlatformCheck::Skipped(format!(
            "Warning: Malformed platform version requirement '{}', skipping compatibility check.",
            required
        )));
    };

    let Ok(required_major) = required_major.parse::<i32>() else {
        return Ok(PlatformCheck::Skipped(format!(
            "Warning: Platform version requirement '{}' does not start with a number, skipping compatibility check.",
            required
        )));
    };

    let current_major = current_major.parse::<i32>().map_err(|_| {
        PluginManagerError::InternalInconsistency(format!(
            "host reported non-numeric API version '{}'",
            current
        ))
    })?;

    if required_major != current_major {
        return Err(PluginManagerError::UnsupportedPlatformVersion {
            required: required.to_string(),
            current: current.to_string(),
        });
    }

    Ok(PlatformCheck::Compatible)
}
