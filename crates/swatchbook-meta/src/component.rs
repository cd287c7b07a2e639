//! Component data files.
//!
//! Every component lives in its own directory under the components root and
//! describes its examples in `{name}/{name}.yaml`:
//!
//! ```yaml
//! params:
//!   - name: text
//!     type: string
//!     required: true
//!     description: Button label.
//! examples:
//!   - name: default
//!     data:
//!       text: Click me
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::naming::{component_name_to_macro_name, is_valid_name};

/// Example used when a request does not name one.
pub const DEFAULT_EXAMPLE: &str = "default";

/// Extensions tried, in order, for a component's data file.
const DATA_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Parsed data file for one component.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ComponentData {
    /// Examples in file order
    #[serde(default)]
    pub examples: Vec<ExampleSpec>,

    /// Documented macro parameters
    #[serde(default)]
    pub params: Vec<ParamSpec>,

    /// Free-form accessibility notes
    #[serde(default, alias = "accessibilityCriteria")]
    pub accessibility_criteria: Option<String>,
}

/// A named set of parameters passed to the component macro.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ExampleSpec {
    pub name: String,

    /// Parameter object handed to the macro
    #[serde(default = "empty_object")]
    pub data: serde_json::Value,
}

/// Documentation for one macro parameter.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ParamSpec {
    pub name: String,

    #[serde(default, rename = "type")]
    pub param_type: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub description: Option<String>,

    /// Nested parameters of an object parameter
    #[serde(default)]
    pub params: Vec<ParamSpec>,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl ComponentData {
    /// Parse component data from YAML source.
    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }

    /// Find an example by exact name.
    pub fn example(&self, name: &str) -> Option<&ExampleSpec> {
        self.examples.iter().find(|example| example.name == name)
    }

    fn first_duplicate_example(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.examples
            .iter()
            .map(|example| example.name.as_str())
            .find(|name| !seen.insert(*name))
    }
}

/// Errors that can occur when loading component data.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Invalid component name: {0:?}")]
    InvalidName(String),

    #[error("Component '{name}' has no data file at {}", path.display())]
    NotFound { name: String, path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid YAML in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Duplicate example '{example}' in {}", path.display())]
    DuplicateExample { path: PathBuf, example: String },
}

impl LoadError {
    /// Whether the error means the component does not exist, as opposed to a
    /// broken component.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::InvalidName(_) | LoadError::NotFound { .. })
    }
}

/// Load `{root}/{name}/{name}.yaml` (or `.yml`).
///
/// The file is read on every call; nothing is cached.
pub fn load_component(root: &Path, name: &str) -> Result<ComponentData, LoadError> {
    if !is_valid_name(name) {
        return Err(LoadError::InvalidName(name.to_string()));
    }

    let dir = root.join(name);
    let mut first_candidate = None;

    for ext in DATA_EXTENSIONS {
        let path = dir.join(format!("{}.{}", name, ext));

        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                first_candidate.get_or_insert(path);
                continue;
            }
            Err(source) => return Err(LoadError::Io { path, source }),
        };

        let data = ComponentData::from_yaml(&source).map_err(|e| LoadError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        if let Some(example) = data.first_duplicate_example() {
            return Err(LoadError::DuplicateExample {
                path,
                example: example.to_string(),
            });
        }

        tracing::debug!(
            "Loaded {} examples for '{}' from {}",
            data.examples.len(),
            name,
            path.display()
        );
        return Ok(data);
    }

    Err(LoadError::NotFound {
        name: name.to_string(),
        path: first_candidate.unwrap_or(dir),
    })
}

/// A components root together with its macro naming convention.
#[derive(Debug, Clone)]
pub struct ComponentLibrary {
    root: PathBuf,
    macro_prefix: String,
}

impl ComponentLibrary {
    /// Create a library rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, macro_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            macro_prefix: macro_prefix.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn macro_prefix(&self) -> &str {
        &self.macro_prefix
    }

    /// Load a component's data file.
    pub fn load_component(&self, name: &str) -> Result<ComponentData, LoadError> {
        load_component(&self.root, name)
    }

    /// Macro identifier for a component.
    pub fn macro_name(&self, component: &str) -> String {
        component_name_to_macro_name(&self.macro_prefix, component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    fn write_component(root: &Path, name: &str, file: &str, yaml: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), yaml).unwrap();
    }

    #[test]
    fn loads_examples_and_params() {
        let temp = tempdir().unwrap();
        write_component(
            temp.path(),
            "button",
            "button.yaml",
            r#"
params:
  - name: text
    type: string
    required: true
    description: Button label
examples:
  - name: default
    data:
      text: Click me
  - name: disabled
    data:
      text: Disabled
      disabled: true
"#,
        );

        let data = load_component(temp.path(), "button").unwrap();

        assert_eq!(data.examples.len(), 2);
        assert_eq!(data.examples[0].name, "default");
        assert_eq!(data.examples[0].data, json!({ "text": "Click me" }));
        assert_eq!(
            data.example("disabled").unwrap().data,
            json!({ "text": "Disabled", "disabled": true })
        );
        assert_eq!(data.params[0].param_type.as_deref(), Some("string"));
        assert!(data.params[0].required);
    }

    #[test]
    fn falls_back_to_yml_extension() {
        let temp = tempdir().unwrap();
        write_component(
            temp.path(),
            "tag",
            "tag.yml",
            "examples:\n  - name: default\n    data:\n      text: Beta\n",
        );

        let data = load_component(temp.path(), "tag").unwrap();

        assert_eq!(data.examples[0].data, json!({ "text": "Beta" }));
    }

    #[test]
    fn defaults_missing_data_to_empty_object() {
        let temp = tempdir().unwrap();
        write_component(
            temp.path(),
            "divider",
            "divider.yaml",
            "examples:\n  - name: default\n",
        );

        let data = load_component(temp.path(), "divider").unwrap();

        assert_eq!(data.examples[0].data, json!({}));
    }

    #[test]
    fn reads_camel_case_accessibility_criteria() {
        let data = ComponentData::from_yaml("accessibilityCriteria: Must be focusable\n").unwrap();

        assert_eq!(
            data.accessibility_criteria.as_deref(),
            Some("Must be focusable")
        );
        assert!(data.examples.is_empty());
    }

    #[test]
    fn errors_on_missing_component() {
        let temp = tempdir().unwrap();

        let result = load_component(temp.path(), "does-not-exist");

        assert!(matches!(result, Err(LoadError::NotFound { .. })));
        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn errors_on_directory_without_data_file() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("globals")).unwrap();

        let result = load_component(temp.path(), "globals");

        assert!(matches!(result, Err(LoadError::NotFound { .. })));
    }

    #[test]
    fn rejects_path_like_names() {
        let temp = tempdir().unwrap();

        let result = load_component(temp.path(), "../etc");

        assert!(matches!(result, Err(LoadError::InvalidName(_))));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let temp = tempdir().unwrap();
        write_component(
            temp.path(),
            "broken",
            "broken.yaml",
            "examples: [invalid yaml\n",
        );

        let result = load_component(temp.path(), "broken");

        let err = result.unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn errors_on_duplicate_example_names() {
        let temp = tempdir().unwrap();
        write_component(
            temp.path(),
            "button",
            "button.yaml",
            "examples:\n  - name: default\n  - name: default\n",
        );

        let result = load_component(temp.path(), "button");

        assert!(matches!(
            result,
            Err(LoadError::DuplicateExample { ref example, .. }) if example == "default"
        ));
    }

    #[test]
    fn library_derives_macro_names() {
        let library = ComponentLibrary::new("/components", "govuk");

        assert_eq!(library.macro_name("back-link"), "govukBackLink");
        assert_eq!(library.root(), Path::new("/components"));
    }
}
