//! Fluent builder for `bundle-cache.toml` files in tests
//!
//! ```rust,ignore
//! let config = ConfigBuilder::new("com.acme:dist:pom:1.0")
//!     .local_repository(project.repository_path())
//!     .resolution("embed-scopes", "[\"compile\"]")
//!     .add_dependency("com.acme:api:1.0", "compile")
//!     .add_repository_set("target/felix", &["org.apache.felix:scr:jar:2.2.6@1"])
//!     .build();
//! ```

use std::fmt::Write;
use std::path::Path;

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    coordinates: String,
    resolution: Vec<(String, String)>,
    dependencies: Vec<String>,
    workspace: Vec<String>,
    sets: Vec<String>,
}

impl ConfigBuilder {
    pub fn new(coordinates: &str) -> Self {
        Self {
            coordinates: coordinates.to_string(),
            ..Self::default()
        }
    }

    /// Raw `[resolution]` key; `value` is TOML
    pub fn resolution(mut self, key: &str, value: &str) -> Self {
        self.resolution.push((key.to_string(), value.to_string()));
        self
    }

    pub fn local_repository(self, path: &Path) -> Self {
        let value = quoted(&path.display().to_string());
        self.resolution("local-repository", &value)
    }

    /// `group:artifact[:type]:version` resolved in `scope`
    pub fn add_dependency(mut self, coordinates: &str, scope: &str) -> Self {
        let parts: Vec<&str> = coordinates.split(':').collect();
        let (group, artifact, type_, version) = match parts.as_slice() {
            [g, a, v] => (*g, *a, "jar", *v),
            [g, a, t, v] => (*g, *a, *t, *v),
            _ => panic!("Invalid test coordinates: {coordinates}"),
        };
        self.dependencies.push(format!(
            "[[dependencies]]\n\
             group-id = \"{group}\"\n\
             artifact-id = \"{artifact}\"\n\
             type = \"{type_}\"\n\
             version = \"{version}\"\n\
             scope = \"{scope}\"\n"
        ));
        self
    }

    /// Dependency entry written verbatim after `[[dependencies]]`
    pub fn add_dependency_table(mut self, body: &str) -> Self {
        self.dependencies.push(format!("[[dependencies]]\n{body}\n"));
        self
    }

    pub fn add_workspace(mut self, coordinates: &str, path: &str) -> Self {
        self.workspace.push(format!(
            "[[workspace]]\ncoordinates = {}\npath = {}\n",
            quoted(coordinates),
            quoted(path)
        ));
        self
    }

    pub fn add_repository_set(mut self, cache_directory: &str, artifacts: &[&str]) -> Self {
        self.sets.push(format!(
            "[[repository-sets]]\ncache-directory = {}\nartifacts = {}\n",
            quoted(cache_directory),
            array(artifacts)
        ));
        self
    }

    /// Remote index set; `artifacts` are inline TOML tables or reference strings
    pub fn add_remote_index_set(mut self, url: &str, artifacts: &[&str]) -> Self {
        self.sets.push(format!(
            "[[remote-index-sets]]\nurl = {}\nartifacts = [{}]\n",
            quoted(url),
            artifacts.join(", ")
        ));
        self
    }

    pub fn add_properties_set(mut self, file: &str, cache_directory: &str) -> Self {
        self.sets.push(format!(
            "[[properties-sets]]\nfile = {}\ncache-directory = {}\n",
            quoted(file),
            quoted(cache_directory)
        ));
        self
    }

    pub fn build(self) -> String {
        let mut out = format!("[project]\ncoordinates = {}\n\n", quoted(&self.coordinates));
        if !self.resolution.is_empty() {
            out.push_str("[resolution]\n");
            for (key, value) in &self.resolution {
                let _ = writeln!(out, "{key} = {value}");
            }
            out.push('\n');
        }
        for section in self.dependencies.iter().chain(&self.workspace).chain(&self.sets) {
            out.push_str(section);
            out.push('\n');
        }
        out
    }
}

/// TOML literal string, safe for Windows paths
fn quoted(value: &str) -> String {
    format!("'{value}'")
}

fn array(values: &[&str]) -> String {
    let items: Vec<String> = values.iter().map(|v| quoted(v)).collect();
    format!("[{}]", items.join(", "))
}
