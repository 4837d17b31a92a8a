//! # Component Tree Model
//!
//! A form schema is a JSON tree of typed components. Four nesting idioms
//! describe how a node's children are laid out:
//!
//! | Idiom    | JSON                          | [`ComponentShape`] |
//! |----------|-------------------------------|--------------------|
//! | plain    | no children                   | `Field`            |
//! | nested   | `components: [...]`           | `Nested`           |
//! | columns  | `columns: [{components}]`     | `Columns`          |
//! | table    | `rows: [[{components}]]`      | `Table`            |
//!
//! The JSON form is duck-typed; this module folds it into the tagged enum
//! once, at deserialization time, using the same precedence the traversal
//! uses: `columns` wins, then a table-kind type with `rows`, then
//! `components`. Structural keys that do not describe the node's shape
//! (a textarea's numeric `rows`, for example) are preserved verbatim in
//! [`FormComponent::attributes`] so serialization round-trips.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::kind::{normalize_type, ComponentKind};

/// How a component's children are shaped. Exactly one per node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ComponentShape {
    /// A leaf data field (or a container without children).
    #[default]
    Field,
    /// Generic nested list: fieldsets, panels, edit-grid row templates.
    Nested(Vec<FormComponent>),
    /// Side-by-side columns, each with its own component list.
    Columns(Vec<Column>),
    /// Table grid: rows of row-groups, each holding components.
    Table(Vec<Vec<Row>>),
}

/// One column of a columns layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Column {
    /// Components placed in this column.
    #[serde(default)]
    pub components: Vec<FormComponent>,
    /// Layout attributes (`width`, `offset`, ...) carried through untouched.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// One row-group (cell) of a table grid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    /// Components placed in this cell.
    #[serde(default)]
    pub components: Vec<FormComponent>,
    /// Cell attributes carried through untouched.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// A node in the form schema tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawComponent", into = "RawComponent")]
pub struct FormComponent {
    /// Component type name, possibly carrying a variant suffix.
    pub component_type: String,
    /// Data-binding name. Not unique across the whole tree.
    pub key: Option<String>,
    /// Layout of this node's children.
    pub shape: ComponentShape,
    /// File size budget such as `"50MB"`.
    pub file_max_size: Option<String>,
    /// Comma-separated list of accepted MIME types / extensions.
    pub file_pattern: Option<String>,
    /// Day components: render as `DD/MM/YYYY` instead of `MM/DD/YYYY`.
    pub day_first: Option<bool>,
    /// Entity name for server-side CSV checksum verification.
    pub resource_validation: Option<String>,
    /// Every other schema attribute (label, validate, conditional, ...).
    pub attributes: Map<String, Value>,
}

impl FormComponent {
    /// Create a plain field component.
    pub fn field(component_type: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            key: Some(key.into()),
            ..Self::default()
        }
    }

    /// Create a component with a nested `components` list.
    pub fn nested(
        component_type: impl Into<String>,
        key: Option<&str>,
        components: Vec<FormComponent>,
    ) -> Self {
        Self {
            component_type: component_type.into(),
            key: key.map(str::to_string),
            shape: ComponentShape::Nested(components),
            ..Self::default()
        }
    }

    /// Create a columns layout, one component list per column.
    pub fn columns(key: Option<&str>, columns: Vec<Vec<FormComponent>>) -> Self {
        Self {
            component_type: "columns".to_string(),
            key: key.map(str::to_string),
            shape: ComponentShape::Columns(
                columns
                    .into_iter()
                    .map(|components| Column {
                        components,
                        attributes: Map::new(),
                    })
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Create a table, one component list per cell.
    pub fn table(key: Option<&str>, rows: Vec<Vec<Vec<FormComponent>>>) -> Self {
        Self {
            component_type: "table".to_string(),
            key: key.map(str::to_string),
            shape: ComponentShape::Table(
                rows.into_iter()
                    .map(|cells| {
                        cells
                            .into_iter()
                            .map(|components| Row {
                                components,
                                attributes: Map::new(),
                            })
                            .collect()
                    })
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// The type name with any variant suffix removed.
    pub fn normalized_type(&self) -> &str {
        normalize_type(&self.component_type)
    }

    /// Semantic classification of this component.
    pub fn kind(&self) -> ComponentKind {
        ComponentKind::of(&self.component_type)
    }

    /// Whether this component binds the given data key.
    pub fn has_key(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }

    /// `dayFirst`, defaulting to `false` when absent.
    pub fn is_day_first(&self) -> bool {
        self.day_first.unwrap_or(false)
    }

    /// The nested `components` list, if this node has the nested shape.
    pub fn nested_components(&self) -> Option<&[FormComponent]> {
        match &self.shape {
            ComponentShape::Nested(components) => Some(components),
            _ => None,
        }
    }

    /// Immediate children in layout order, flattened across columns and
    /// table cells.
    pub fn children(&self) -> Vec<&FormComponent> {
        match &self.shape {
            ComponentShape::Field => Vec::new(),
            ComponentShape::Nested(components) => components.iter().collect(),
            ComponentShape::Columns(columns) => columns
                .iter()
                .flat_map(|column| column.components.iter())
                .collect(),
            ComponentShape::Table(rows) => rows
                .iter()
                .flatten()
                .flat_map(|row| row.components.iter())
                .collect(),
        }
    }
}

/// A complete form schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FormSchema {
    /// Top-level components.
    #[serde(default)]
    pub components: Vec<FormComponent>,
    /// Form-level attributes (`title`, `path`, `display`, ...).
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl FormSchema {
    /// Create a schema from its top-level components.
    pub fn new(components: Vec<FormComponent>) -> Self {
        Self {
            components,
            attributes: Map::new(),
        }
    }
}

// -- Wire representation -----------------------------------------------------

/// Duck-typed JSON shape of a component, folded into [`FormComponent`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawComponent {
    #[serde(rename = "type", default)]
    component_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    components: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    columns: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rows: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_max_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    day_first: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resource_validation: Option<String>,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl TryFrom<RawComponent> for FormComponent {
    type Error = serde_json::Error;

    fn try_from(raw: RawComponent) -> Result<Self, Self::Error> {
        let RawComponent {
            component_type,
            key,
            components,
            columns,
            rows,
            file_max_size,
            file_pattern,
            day_first,
            resource_validation,
            mut attributes,
        } = raw;

        let is_table = ComponentKind::of(&component_type) == ComponentKind::Table;
        let mut leftovers: Vec<(&str, Value)> = Vec::new();

        let shape = match (columns, rows, components) {
            (Some(columns @ Value::Array(_)), rows, components) => {
                leftovers.extend(rows.map(|v| ("rows", v)));
                leftovers.extend(components.map(|v| ("components", v)));
                ComponentShape::Columns(serde_json::from_value(columns)?)
            }
            (columns, rows, components) if is_table => {
                leftovers.extend(columns.map(|v| ("columns", v)));
                leftovers.extend(components.map(|v| ("components", v)));
                match rows {
                    Some(Value::Null) | None => ComponentShape::Table(Vec::new()),
                    Some(rows) => ComponentShape::Table(serde_json::from_value(rows)?),
                }
            }
            (columns, rows, Some(components @ Value::Array(_))) => {
                leftovers.extend(columns.map(|v| ("columns", v)));
                leftovers.extend(rows.map(|v| ("rows", v)));
                ComponentShape::Nested(serde_json::from_value(components)?)
            }
            (columns, rows, components) => {
                leftovers.extend(columns.map(|v| ("columns", v)));
                leftovers.extend(rows.map(|v| ("rows", v)));
                leftovers.extend(components.map(|v| ("components", v)));
                ComponentShape::Field
            }
        };

        for (name, value) in leftovers {
            attributes.insert(name.to_string(), value);
        }

        Ok(Self {
            component_type,
            key,
            shape,
            file_max_size,
            file_pattern,
            day_first,
            resource_validation,
            attributes,
        })
    }
}

impl From<FormComponent> for RawComponent {
    fn from(component: FormComponent) -> Self {
        let FormComponent {
            component_type,
            key,
            shape,
            file_max_size,
            file_pattern,
            day_first,
            resource_validation,
            mut attributes,
        } = component;

        let mut take = |name: &str| attributes.remove(name);
        let (mut components, mut columns, mut rows) =
            (take("components"), take("columns"), take("rows"));

        // Serializing plain structs of components and maps cannot fail.
        match shape {
            ComponentShape::Field => {}
            ComponentShape::Nested(children) => {
                components = Some(serde_json::to_value(children).unwrap_or(Value::Null));
            }
            ComponentShape::Columns(cols) => {
                columns = Some(serde_json::to_value(cols).unwrap_or(Value::Null));
            }
            ComponentShape::Table(grid) => {
                rows = Some(serde_json::to_value(grid).unwrap_or(Value::Null));
            }
        }

        Self {
            component_type,
            key,
            components,
            columns,
            rows,
            file_max_size,
            file_pattern,
            day_first,
            resource_validation,
            attributes,
        }
    }
}
