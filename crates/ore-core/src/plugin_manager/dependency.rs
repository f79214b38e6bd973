use crate::catalog::Dependency;

/// A version's declared dependencies, split into the platform requirement and
/// the plugins that have to be installed alongside it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    /// Requirement on the host platform API, if declared
    pub platform: Option<Dependency>,
    /// Everything else, in declaration order
    pub plugins: Vec<Dependency>,
}

impl DependencySet {
    /// Split a dependency list on the host's API identifier.
    ///
    /// Only the first platform entry counts; any repeat is dropped rather than
    /// installed as a plugin.
    pub fn split(dependencies: &[Dependency], api_id: &str) -> Self {
        let mut set = Self::default();
        for dependency in dependencies {
            if dependency.plugin_id == api_id {
                if set.platform.is_none() {
                    set.platform = Some(dependency.clone());
                }
            } else {
                set.plugins.push(dependency.clone());
            }
        }
        set
    }
}

pub(crate) fn version_mismatch_warning(dependency: &Dependency, installed_version: &str) -> String {
    format!(
        "Warning: This plugin depends on {} v{}, but you already have v{} installed. \
         Your plugin may not run or run as expected without it.",
        dependency.plugin_id, dependency.version, installed_version
    )
}

pub(crate) fn unresolved_warning(dependency: &Dependency) -> String {
    format!(
        "Warning: Could not resolve dependency {} v{}, your plugin may not run or run as expected without it.",
        dependency.plugin_id, dependency.version
    )
}
