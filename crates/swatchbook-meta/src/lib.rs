//! Component metadata loading and directory cataloging.
//!
//! This crate reads the per-component YAML files that describe examples and
//! parameters, and walks component and example directories into catalog trees
//! used for navigation.

pub mod catalog;
pub mod component;
pub mod naming;

pub use catalog::{catalog, CatalogError, CatalogNode, NodeKind};
pub use component::{
    load_component, ComponentData, ComponentLibrary, ExampleSpec, LoadError, ParamSpec,
    DEFAULT_EXAMPLE,
};
pub use naming::{component_name_to_macro_name, is_valid_name, titlecase};
