//! Step 4: surgical destructuring removal.
//!
//! Exactly the DI-related elements and sub-patterns are removed, at any
//! depth; everything else is preserved for re-emission as a plain binding.

use wirec_core::ast::BindingElement;

/// Remove every element whose path is one of `di_paths`. A nested pattern
/// that becomes empty is dropped entirely; one that keeps unrelated elements
/// survives with only those.
pub fn prune_elements(elements: &[BindingElement], di_paths: &[Vec<String>]) -> Vec<BindingElement> {
    let mut prefix = Vec::new();
    prune_at(elements, &mut prefix, di_paths)
}

fn prune_at(
    elements: &[BindingElement],
    prefix: &mut Vec<String>,
    di_paths: &[Vec<String>],
) -> Vec<BindingElement> {
    let mut kept = Vec::new();
    for element in elements {
        prefix.push(element.property.clone());
        match &element.nested {
            Some(nested) => {
                let pruned = prune_at(nested, prefix, di_paths);
                if !pruned.is_empty() {
                    kept.push(BindingElement {
                        property: element.property.clone(),
                        alias: element.alias.clone(),
                        nested: Some(pruned),
                    });
                }
            }
            None => {
                if !di_paths.iter().any(|p| p == prefix) {
                    kept.push(element.clone());
                }
            }
        }
        prefix.pop();
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(paths: &[&[&str]]) -> Vec<Vec<String>> {
        paths
            .iter()
            .map(|p| p.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn unrelated_element_survives_di_removal() {
        let elements = vec![
            BindingElement::simple("logger"),
            BindingElement::simple("title"),
        ];
        let kept = prune_elements(&elements, &paths(&[&["logger"]]));
        assert_eq!(kept, vec![BindingElement::simple("title")]);
    }

    #[test]
    fn injection_only_pattern_is_fully_removed() {
        let elements = vec![BindingElement::simple("logger")];
        assert!(prune_elements(&elements, &paths(&[&["logger"]])).is_empty());
    }

    #[test]
    fn nested_di_element_is_removed_keeping_siblings() {
        let elements = vec![BindingElement::nested(
            "services",
            vec![
                BindingElement::simple("logger"),
                BindingElement::simple("theme"),
            ],
        )];
        let kept = prune_elements(&elements, &paths(&[&["services", "logger"]]));
        assert_eq!(
            kept,
            vec![BindingElement::nested(
                "services",
                vec![BindingElement::simple("theme")],
            )]
        );
    }

    #[test]
    fn empty_nested_pattern_is_dropped() {
        let elements = vec![
            BindingElement::nested("services", vec![BindingElement::simple("logger")]),
            BindingElement::simple("title"),
        ];
        let kept = prune_elements(&elements, &paths(&[&["services", "logger"]]));
        assert_eq!(kept, vec![BindingElement::simple("title")]);
    }

    #[test]
    fn aliases_on_preserved_elements_survive() {
        let elements = vec![
            BindingElement::simple("logger"),
            BindingElement::aliased("title", "heading"),
        ];
        let kept = prune_elements(&elements, &paths(&[&["logger"]]));
        assert_eq!(kept, vec![BindingElement::aliased("title", "heading")]);
    }

    #[test]
    fn same_name_at_different_depth_is_not_removed() {
        // DI path is services.logger; a top-level logger is unrelated
        let elements = vec![
            BindingElement::simple("logger"),
            BindingElement::nested("services", vec![BindingElement::simple("logger")]),
        ];
        let kept = prune_elements(&elements, &paths(&[&["services", "logger"]]));
        assert_eq!(kept, vec![BindingElement::simple("logger")]);
    }
}
