//! # Submission Converter
//!
//! Applies a caller-supplied value transform to every submitted entry,
//! keyed by the component definition that owns it. Unlike the resolver,
//! ownership here is decided by a shallow, fixed precedence:
//!
//! 1. a top-level component with the key;
//! 2. a component directly inside a top-level fieldset;
//! 3. a component inside a top-level table's cells;
//! 4. a component inside a top-level columns layout.
//!
//! When the converted value is a list and the owning component has nested
//! `components` (edit grids, data grids), each object element of the list
//! is converted recursively against those nested components.

use formval_core::{ComponentKind, ComponentShape, FormComponent};
use serde_json::{Map, Value};

/// Convert every entry of `data` with `converter`.
///
/// Entries with no owning component pass through unchanged.
pub fn convert_submission<F>(
    components: &[FormComponent],
    data: &Map<String, Value>,
    converter: &F,
) -> Map<String, Value>
where
    F: Fn(&Value, &FormComponent) -> Value,
{
    data.iter()
        .map(|(key, value)| {
            let converted = match owning_component(components, key) {
                Some(component) => convert_value(component, value, converter),
                None => value.clone(),
            };
            (key.clone(), converted)
        })
        .collect()
}

fn convert_value<F>(component: &FormComponent, value: &Value, converter: &F) -> Value
where
    F: Fn(&Value, &FormComponent) -> Value,
{
    let converted = converter(value, component);
    match (converted, component.nested_components()) {
        (Value::Array(items), Some(nested)) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(row) => Value::Object(convert_submission(nested, &row, converter)),
                    other => other,
                })
                .collect(),
        ),
        (converted, _) => converted,
    }
}

/// Resolve the component owning `key` using the converter precedence.
pub fn owning_component<'a>(components: &'a [FormComponent], key: &str) -> Option<&'a FormComponent> {
    let by_kind = |kind: ComponentKind| components.iter().filter(move |c| c.kind() == kind);

    components
        .iter()
        .find(|c| c.has_key(key))
        .or_else(|| {
            by_kind(ComponentKind::Fieldset)
                .filter_map(FormComponent::nested_components)
                .flatten()
                .find(|c| c.has_key(key))
        })
        .or_else(|| {
            by_kind(ComponentKind::Table)
                .filter_map(|table| match &table.shape {
                    ComponentShape::Table(rows) => Some(rows),
                    _ => None,
                })
                .flatten()
                .flatten()
                .flat_map(|row| row.components.iter())
                .find(|c| c.has_key(key))
        })
        .or_else(|| {
            by_kind(ComponentKind::Columns)
                .filter_map(|layout| match &layout.shape {
                    ComponentShape::Columns(columns) => Some(columns),
                    _ => None,
                })
                .flatten()
                .flat_map(|column| column.components.iter())
                .find(|c| c.has_key(key))
        })
}
