//! # Normalization
//!
//! Two rewrites run before a submission reaches the rule engine:
//!
//! 1. The schema is cloned with every component type reduced to its base
//!    name (`fileLatest` becomes `file`), through every nesting idiom.
//! 2. Each submitted entry is coerced against the component that owns its
//!    key: `YYYY-MM-DD` day values become `MM/DD/YYYY` (or `DD/MM/YYYY` when
//!    the component is `dayFirst`), and incomplete file references collapse
//!    to `[]`.

use formval_core::{
    find_component, normalize_type, ComponentShape, FileData, FormComponent, FormSchema,
    FormSubmission,
};
use serde_json::{Map, Value};

/// Clone `components` with every `type` normalized, recursively.
pub fn normalize_components(components: &[FormComponent]) -> Vec<FormComponent> {
    components.iter().map(normalize_component).collect()
}

/// Clone `schema` with every component type normalized.
pub fn normalize_schema(schema: &FormSchema) -> FormSchema {
    FormSchema {
        components: normalize_components(&schema.components),
        attributes: schema.attributes.clone(),
    }
}

fn normalize_component(component: &FormComponent) -> FormComponent {
    let mut normalized = component.clone();
    normalized.component_type = normalize_type(&component.component_type).to_string();
    match &mut normalized.shape {
        ComponentShape::Field => {}
        ComponentShape::Nested(children) => *children = normalize_components(children),
        ComponentShape::Columns(columns) => {
            for column in columns {
                column.components = normalize_components(&column.components);
            }
        }
        ComponentShape::Table(rows) => {
            for row in rows.iter_mut().flatten() {
                row.components = normalize_components(&row.components);
            }
        }
    }
    normalized
}

/// Return a copy of `submission` with each data entry coerced against the
/// component that owns its key in `components`.
pub fn normalize_submission(
    components: &[FormComponent],
    submission: &FormSubmission,
) -> FormSubmission {
    let data: Map<String, Value> = submission
        .data
        .iter()
        .map(|(key, value)| {
            let value = match find_component(components, key) {
                Some(component) => normalize_value(component, value),
                None => value.clone(),
            };
            (key.clone(), value)
        })
        .collect();

    FormSubmission {
        data,
        extra: submission.extra.clone(),
    }
}

fn normalize_value(component: &FormComponent, value: &Value) -> Value {
    match component.normalized_type() {
        "day" => match value.as_str().and_then(|s| reorder_day(s, component.is_day_first())) {
            Some(formatted) => Value::String(formatted),
            None => value.clone(),
        },
        "file" => {
            let complete = FileData::from_value(value).is_some_and(|file| file.is_complete());
            if complete {
                value.clone()
            } else {
                Value::Array(Vec::new())
            }
        }
        _ => value.clone(),
    }
}

/// `YYYY-MM-DD` to `MM/DD/YYYY`, or `DD/MM/YYYY` when `day_first`.
///
/// Returns `None` unless the input has exactly two `-` separators.
fn reorder_day(value: &str, day_first: bool) -> Option<String> {
    let parts: Vec<&str> = value.split('-').collect();
    let [year, month, day] = parts.as_slice() else {
        return None;
    };
    Some(if day_first {
        format!("{day}/{month}/{year}")
    } else {
        format!("{month}/{day}/{year}")
    })
}
