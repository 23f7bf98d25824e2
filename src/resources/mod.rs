use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Color,
    String,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Color => f.write_str("color"),
            Self::String => f.write_str("string"),
        }
    }
}

/// Lookup failures against a package's resources. Always recovered locally:
/// labels fall back to the package name and preview lists omit the package.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("package not installed: {package}")]
    PackageNotFound { package: String },
    #[error("{kind} resource not found: {name}")]
    NotFound { kind: ResourceKind, name: String },
    #[error("invalid {name} resource: {message}")]
    InvalidValue { name: String, message: String },
}

pub type ResourceResult<T> = std::result::Result<T, ResourceError>;

/// Named values of one package's resource table.
pub trait ResourceTable {
    fn color(&self, name: &str) -> ResourceResult<i32>;
    fn string(&self, name: &str) -> ResourceResult<String>;
}

/// Package-manager view needed for labels and previews.
pub trait PackageCatalog: Send + Sync {
    fn application_label(&self, package: &str) -> ResourceResult<String>;
    fn resources_for(&self, package: &str) -> ResourceResult<Box<dyn ResourceTable>>;
    /// The platform's own table, used for the default entry.
    fn system_resources(&self) -> Box<dyn ResourceTable>;
}

/// Map-backed table for hosts that resolve resources up front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceMap {
    colors: HashMap<String, i32>,
    strings: HashMap<String, String>,
}

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(mut self, name: impl Into<String>, color: i32) -> Self {
        self.colors.insert(name.into(), color);
        self
    }

    pub fn with_string(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.strings.insert(name.into(), value.into());
        self
    }
}

impl ResourceTable for ResourceMap {
    fn color(&self, name: &str) -> ResourceResult<i32> {
        self.colors
            .get(name)
            .copied()
            .ok_or_else(|| ResourceError::NotFound {
                kind: ResourceKind::Color,
                name: name.to_string(),
            })
    }

    fn string(&self, name: &str) -> ResourceResult<String> {
        self.strings
            .get(name)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound {
                kind: ResourceKind::String,
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_map_resolves_by_kind() {
        let table = ResourceMap::new()
            .with_color("accent", 0x00ff_0000)
            .with_string("font", "serif");

        assert_eq!(table.color("accent"), Ok(0x00ff_0000));
        assert_eq!(table.string("font").as_deref(), Ok("serif"));
        assert_eq!(
            table.color("font"),
            Err(ResourceError::NotFound {
                kind: ResourceKind::Color,
                name: "font".to_string()
            })
        );
    }

    #[test]
    fn not_found_error_names_kind_and_resource() {
        let err = ResourceError::NotFound {
            kind: ResourceKind::String,
            name: "config_icon_mask".to_string(),
        };
        assert_eq!(err.to_string(), "string resource not found: config_icon_mask");
    }
}
