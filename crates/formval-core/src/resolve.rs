//! # Resolver
//!
//! Depth-first, left-to-right search over a component tree. At each node
//! the node itself is tested first, then its children are visited according
//! to its [`ComponentShape`]. A match does not stop descent, so a container
//! and its descendants can all appear in the result.

use crate::component::{ComponentShape, FormComponent};

/// Collect every component matching `predicate`, in tree pre-order.
///
/// Returns `None` rather than an empty list when nothing matches.
pub fn find_components<'a, P>(tree: &'a [FormComponent], predicate: P) -> Option<Vec<&'a FormComponent>>
where
    P: Fn(&FormComponent) -> bool,
{
    let mut found = Vec::new();
    collect(tree, &predicate, &mut found);
    if found.is_empty() {
        None
    } else {
        Some(found)
    }
}

/// First component (in pre-order) whose `key` equals `key`.
pub fn find_component<'a>(tree: &'a [FormComponent], key: &str) -> Option<&'a FormComponent> {
    find_components(tree, |c| c.has_key(key)).and_then(|found| found.into_iter().next())
}

fn collect<'a, P>(components: &'a [FormComponent], predicate: &P, found: &mut Vec<&'a FormComponent>)
where
    P: Fn(&FormComponent) -> bool,
{
    for component in components {
        if predicate(component) {
            found.push(component);
        }
        match &component.shape {
            ComponentShape::Field => {}
            ComponentShape::Columns(columns) => {
                for column in columns {
                    collect(&column.components, predicate, found);
                }
            }
            ComponentShape::Table(rows) => {
                for row in rows.iter().flatten() {
                    collect(&row.components, predicate, found);
                }
            }
            ComponentShape::Nested(children) => collect(children, predicate, found),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_component() -> impl Strategy<Value = FormComponent> {
        let leaf = "[a-z]{1,6}".prop_map(|key| FormComponent::field("textfield", key));
        leaf.prop_recursive(4, 48, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4)
                    .prop_map(|children| FormComponent::nested("fieldset", None, children)),
                prop::collection::vec(prop::collection::vec(inner.clone(), 0..3), 0..3)
                    .prop_map(|columns| FormComponent::columns(None, columns)),
                prop::collection::vec(
                    prop::collection::vec(prop::collection::vec(inner, 0..3), 0..2),
                    0..3
                )
                .prop_map(|rows| FormComponent::table(None, rows)),
            ]
        })
    }

    fn pre_order<'a>(components: &'a [FormComponent], out: &mut Vec<&'a FormComponent>) {
        for component in components {
            out.push(component);
            let children = component.children();
            for child in children {
                pre_order(std::slice::from_ref(child), out);
            }
        }
    }

    proptest! {
        #[test]
        fn always_true_visits_every_node_once_in_pre_order(
            tree in prop::collection::vec(arb_component(), 1..4)
        ) {
            let mut expected = Vec::new();
            pre_order(&tree, &mut expected);

            let found = find_components(&tree, |_| true).unwrap();
            prop_assert_eq!(found.len(), expected.len());
            for (a, b) in found.iter().zip(expected.iter()) {
                prop_assert!(std::ptr::eq(*a, *b));
            }
        }
    }
}
