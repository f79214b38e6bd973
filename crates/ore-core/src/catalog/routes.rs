//! Path segments of the catalog REST endpoints, relative to the repository root.

/// `/api/projects` (accepts `?q=<query>`)
pub fn project_list() -> Vec<&'static str> {
    vec!["api", "projects"]
}

/// `/api/projects/{id}`
pub fn project(id: &str) -> Vec<&str> {
    vec!["api", "projects", id]
}

/// `/api/projects/{id}/versions/{version}`
pub fn version<'a>(id: &'a str, version: &'a str) -> Vec<&'a str> {
    vec!["api", "projects", id, "versions", version]
}

/// `/api/projects/{id}/versions/{version}/download`
pub fn download<'a>(id: &'a str, version: &'a str) -> Vec<&'a str> {
    vec!["api", "projects", id, "versions", version, "download"]
}

/// `/api/users/{name}`
pub fn user(username: &str) -> Vec<&str> {
    vec!["api", "users", username]
}
