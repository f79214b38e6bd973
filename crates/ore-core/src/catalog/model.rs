use serde::{Deserialize, Serialize};

/// A dependency declared by a version on another plugin (or on the platform API)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    /// ID of the required plugin
    pub plugin_id: String,

    /// Required version string, as declared by the author
    pub version: String,
}

impl Dependency {
    /// Create a new dependency
    pub fn new(plugin_id: &str, version: &str) -> Self {
        Self {
            plugin_id: plugin_id.to_string(),
            version: version.to_string(),
        }
    }
}

/// Release channel of a version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Metadata of a single published version of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    #[serde(default)]
    pub id: Option<u64>,

    /// Version name, e.g. "1.4.2"
    pub name: String,

    #[serde(default)]
    pub plugin_id: Option<String>,

    #[serde(default)]
    pub channel: Option<Channel>,

    /// Declared dependencies, including the platform API dependency if any
    #[serde(default)]
    pub dependencies: Vec<Dependency>,

    #[serde(default)]
    pub file_size: Option<u64>,

    #[serde(default)]
    pub md5: Option<String>,

    #[serde(default)]
    pub staff_approved: bool,

    #[serde(default)]
    pub downloads: u64,

    #[serde(default)]
    pub href: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,
}

impl Version {
    /// Create a version with the given name and no metadata
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            plugin_id: None,
            channel: None,
            dependencies: Vec::new(),
            file_size: None,
            md5: None,
            staff_approved: false,
            downloads: 0,
            href: None,
            created_at: None,
        }
    }

    /// Replace the declared dependencies
    pub fn with_dependencies(mut self, dependencies: Vec<Dependency>) -> Self {
        self.dependencies = dependencies;
        self
    }
}

/// Project category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// A project listed in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Plugin ID, the primary key of the project
    pub plugin_id: String,

    /// Human-readable name
    pub name: String,

    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub href: Option<String>,

    #[serde(default)]
    pub category: Option<Category>,

    /// The version the catalog currently recommends
    #[serde(rename = "recommended")]
    pub recommended_version: Version,

    #[serde(default)]
    pub downloads: u64,

    #[serde(default)]
    pub stars: u64,

    #[serde(default)]
    pub views: u64,

    #[serde(default)]
    pub created_at: Option<String>,
}

impl Project {
    /// Create a project with the given recommended version
    pub fn new(plugin_id: &str, name: &str, recommended_version: Version) -> Self {
        Self {
            plugin_id: plugin_id.to_string(),
            name: name.to_string(),
            owner: None,
            description: None,
            href: None,
            category: None,
            recommended_version,
            downloads: 0,
            stars: 0,
            views: 0,
            created_at: None,
        }
    }
}

/// A catalog user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<u64>,

    pub username: String,

    #[serde(default)]
    pub roles: Vec<String>,

    /// Plugin IDs of starred projects
    #[serde(default)]
    pub starred: Vec<String>,

    #[serde(default)]
    pub avatar_url: Option<String>,

    #[serde(default)]
    pub projects: Vec<Project>,

    #[serde(default)]
    pub created_at: Option<String>,
}
