//! # Component Kinds -- Variant-Type Normalization
//!
//! Form builders ship several generations of the same component under
//! suffixed type names (`fileLatest`, `tableLegacy`, ...). The suffix never
//! changes semantics, so every classification in the workspace goes through
//! [`normalize_type`] first.
//!
//! The rule engine only understands base type names; the schema handed to
//! it is rewritten with these normalized names (see
//! `formval_validation::normalize::normalize_components`).

use std::fmt;

/// Closed set of variant markers stripped from the end of a type name.
pub const VARIANT_SUFFIXES: &[&str] = &["Latest", "Legacy"];

/// Strip trailing variant markers from a component type name.
///
/// Markers are stripped repeatedly, so the result never ends in a marker
/// and the function is idempotent. A type name that consists of nothing
/// but a marker is returned unchanged.
///
/// ```
/// use formval_core::normalize_type;
///
/// assert_eq!(normalize_type("fileLatest"), "file");
/// assert_eq!(normalize_type("tableLegacy"), "table");
/// assert_eq!(normalize_type("textfield"), "textfield");
/// ```
pub fn normalize_type(component_type: &str) -> &str {
    let mut current = component_type;
    loop {
        let stripped = VARIANT_SUFFIXES.iter().find_map(|suffix| {
            current
                .strip_suffix(suffix)
                .filter(|base| !base.is_empty())
        });
        match stripped {
            Some(base) => current = base,
            None => return current,
        }
    }
}

/// Semantic classification of a component type after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// File upload (`file`) or CSV data import (`dataImport`).
    File,
    /// Two-dimensional grid of row groups.
    Table,
    /// Side-by-side column layout.
    Columns,
    /// Container whose children live in the parent's data namespace.
    Fieldset,
    /// Day picker with a `YYYY-MM-DD` wire value.
    Day,
    /// Anything else (text fields, selects, panels, edit grids, ...).
    Other,
}

impl ComponentKind {
    /// Classify a raw (possibly suffixed) component type name.
    pub fn of(component_type: &str) -> Self {
        match normalize_type(component_type) {
            "file" | "dataImport" => Self::File,
            "table" => Self::Table,
            "columns" => Self::Columns,
            "fieldset" => Self::Fieldset,
            "day" => Self::Day,
            _ => Self::Other,
        }
    }

    /// Returns the base type name for this kind, or `None` for [`ComponentKind::Other`].
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            Self::File => Some("file"),
            Self::Table => Some("table"),
            Self::Columns => Some("columns"),
            Self::Fieldset => Some("fieldset"),
            Self::Day => Some("day"),
            Self::Other => None,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("other"))
    }
}

/// Whether the type names a file-bearing component.
pub fn is_file_component(component_type: &str) -> bool {
    ComponentKind::of(component_type) == ComponentKind::File
}

/// Whether the type names a table component.
pub fn is_table_component(component_type: &str) -> bool {
    ComponentKind::of(component_type) == ComponentKind::Table
}

/// Whether the type names a fieldset component.
pub fn is_fieldset_component(component_type: &str) -> bool {
    ComponentKind::of(component_type) == ComponentKind::Fieldset
}

/// Whether the type names a columns component.
pub fn is_columns_component(component_type: &str) -> bool {
    ComponentKind::of(component_type) == ComponentKind::Columns
}
