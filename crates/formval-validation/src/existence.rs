//! Batch field existence lookup.

use formval_core::{find_component, FormComponent};
use indexmap::IndexMap;

/// One entry per distinct field name, in first-occurrence order, `true`
/// when some component anywhere in the tree binds that key.
pub fn check_fields_existence<S: AsRef<str>>(
    components: &[FormComponent],
    fields: &[S],
) -> IndexMap<String, bool> {
    let mut result = IndexMap::with_capacity(fields.len());
    for field in fields {
        let field = field.as_ref();
        if !result.contains_key(field) {
            result.insert(field.to_string(), find_component(components, field).is_some());
        }
    }
    result
}
