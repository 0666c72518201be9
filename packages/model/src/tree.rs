use crate::state::{
    ComponentState, RepeatedComponentKind, RepeaterState, StandardComponentState,
};

/// Maps over the nodes of a flat component tree in a level-order traversal,
/// starting from the leaf nodes (deepest children) and working up. The
/// handler receives each node together with its already-mapped children.
pub fn map_component_tree<T>(
    tree: &[ComponentState],
    handler: &mut impl FnMut(&ComponentState, Vec<T>) -> T,
) -> Vec<T> {
    map_children(tree, None, handler)
}

fn map_children<T>(
    tree: &[ComponentState],
    parent_uuid: Option<&str>,
    handler: &mut impl FnMut(&ComponentState, Vec<T>) -> T,
) -> Vec<T> {
    tree.iter()
        .filter(|state| state.parent_uuid() == parent_uuid)
        .map(|state| {
            let children = map_children(tree, Some(state.uuid()), handler);
            handler(state, children)
        })
        .collect()
}

/// Returns the direct children of `parent_uuid` in list order.
pub fn children_of<'a>(
    tree: &'a [ComponentState],
    parent_uuid: Option<&str>,
) -> Vec<&'a ComponentState> {
    tree.iter()
        .filter(|state| state.parent_uuid() == parent_uuid)
        .collect()
}

/// Flattens a Repeater into the component it repeats, carrying the
/// repeater's own ids so the editor keeps a stable identity. Non-repeater
/// states pass through unchanged.
pub fn extract_repeated_state(state: &ComponentState) -> ComponentState {
    match state {
        ComponentState::Repeater(repeater) => repeated_to_state(repeater),
        other => other.clone(),
    }
}

fn repeated_to_state(repeater: &RepeaterState) -> ComponentState {
    let inner = StandardComponentState {
        component_name: repeater.repeated_component.component_name.clone(),
        props: repeater.repeated_component.props.clone(),
        uuid: repeater.uuid.clone(),
        parent_uuid: repeater.parent_uuid.clone(),
        metadata_uuid: repeater.repeated_component.metadata_uuid.clone(),
    };
    match repeater.repeated_component.kind {
        RepeatedComponentKind::Standard => ComponentState::Standard(inner),
        RepeatedComponentKind::Module => ComponentState::Module(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FragmentState;
    use crate::values::PropValues;

    fn standard(name: &str, uuid: &str, parent: Option<&str>) -> ComponentState {
        ComponentState::Standard(StandardComponentState {
            component_name: name.to_string(),
            props: PropValues::new(),
            uuid: uuid.to_string(),
            parent_uuid: parent.map(str::to_string),
            metadata_uuid: format!("metadata-{}", name),
        })
    }

    #[test]
    fn test_map_component_tree_bottom_up() {
        let tree = vec![
            ComponentState::Fragment(FragmentState {
                uuid: "0".to_string(),
                parent_uuid: None,
            }),
            standard("Card", "1", Some("0")),
            standard("Banner", "2", Some("0")),
        ];

        let rendered = map_component_tree(&tree, &mut |state, children| match state {
            ComponentState::Fragment(_) => format!("<>{}</>", children.join("")),
            other => format!("<{}/>", other.component_name().unwrap()),
        });

        assert_eq!(rendered, vec!["<><Card/><Banner/></>"]);
    }

    #[test]
    fn test_extract_repeated_state() {
        use crate::state::RepeatedComponent;

        let repeater = ComponentState::Repeater(RepeaterState {
            uuid: "5".to_string(),
            parent_uuid: Some("0".to_string()),
            list_expression: "document.services".to_string(),
            repeated_component: RepeatedComponent {
                kind: RepeatedComponentKind::Standard,
                component_name: "Banner".to_string(),
                props: PropValues::new(),
                metadata_uuid: "metadata-Banner".to_string(),
            },
        });

        let extracted = extract_repeated_state(&repeater);
        assert_eq!(extracted.uuid(), "5");
        assert_eq!(extracted.parent_uuid(), Some("0"));
        assert_eq!(extracted.component_name(), Some("Banner"));
        assert!(matches!(extracted, ComponentState::Standard(_)));
    }
}
