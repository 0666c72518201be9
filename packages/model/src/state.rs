use serde::{Deserialize, Serialize};

use crate::values::PropValues;

/// The in-memory representation of one file's rendered output: a flat,
/// insertion-ordered list of nodes. Each node except the roots carries a
/// `parent_uuid` referencing another node in the same list; nesting is
/// reconstructed by grouping children under their parent in list order.
pub type ComponentTree = Vec<ComponentState>;

/// One node of a component tree, discriminated by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ComponentState {
    /// A directly-authored component backed by a component file.
    Standard(StandardComponentState),
    /// Same shape as Standard, but the referenced metadata is a reusable
    /// sub-tree (a module file) rather than a leaf component.
    Module(StandardComponentState),
    /// Structural grouping node, emitted when markup has multiple top-level
    /// siblings.
    Fragment(FragmentState),
    /// A primitive platform element addressed by tag name only. Props are
    /// not currently editable.
    BuiltIn(BuiltInState),
    /// Renders its single wrapped child once per item of a collection.
    Repeater(RepeaterState),
    /// Produced when parsing cannot classify a node. Excluded from
    /// generation.
    Error(ErrorComponentState),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardComponentState {
    pub component_name: String,
    pub props: PropValues,
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_uuid: Option<String>,
    pub metadata_uuid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentState {
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_uuid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltInState {
    pub component_name: String,
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_uuid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeaterState {
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_uuid: Option<String>,
    /// Source expression that must resolve to a collection at render time,
    /// e.g. `document.services`.
    pub list_expression: String,
    pub repeated_component: RepeatedComponent,
}

/// The single component wrapped by a repeater. Carries no ids of its own;
/// the repeater's ids stand in for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatedComponent {
    pub kind: RepeatedComponentKind,
    pub component_name: String,
    pub props: PropValues,
    pub metadata_uuid: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatedComponentKind {
    Standard,
    Module,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorComponentState {
    pub component_name: String,
    pub message: String,
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_uuid: Option<String>,
}

impl ComponentState {
    pub fn uuid(&self) -> &str {
        match self {
            ComponentState::Standard(s) | ComponentState::Module(s) => &s.uuid,
            ComponentState::Fragment(s) => &s.uuid,
            ComponentState::BuiltIn(s) => &s.uuid,
            ComponentState::Repeater(s) => &s.uuid,
            ComponentState::Error(s) => &s.uuid,
        }
    }

    pub fn parent_uuid(&self) -> Option<&str> {
        match self {
            ComponentState::Standard(s) | ComponentState::Module(s) => s.parent_uuid.as_deref(),
            ComponentState::Fragment(s) => s.parent_uuid.as_deref(),
            ComponentState::BuiltIn(s) => s.parent_uuid.as_deref(),
            ComponentState::Repeater(s) => s.parent_uuid.as_deref(),
            ComponentState::Error(s) => s.parent_uuid.as_deref(),
        }
    }

    pub fn set_parent_uuid(&mut self, parent_uuid: Option<String>) {
        match self {
            ComponentState::Standard(s) | ComponentState::Module(s) => s.parent_uuid = parent_uuid,
            ComponentState::Fragment(s) => s.parent_uuid = parent_uuid,
            ComponentState::BuiltIn(s) => s.parent_uuid = parent_uuid,
            ComponentState::Repeater(s) => s.parent_uuid = parent_uuid,
            ComponentState::Error(s) => s.parent_uuid = parent_uuid,
        }
    }

    /// Tag or component name this node renders as, if it has one.
    pub fn component_name(&self) -> Option<&str> {
        match self {
            ComponentState::Standard(s) | ComponentState::Module(s) => Some(&s.component_name),
            ComponentState::BuiltIn(s) => Some(&s.component_name),
            ComponentState::Repeater(s) => Some(&s.repeated_component.component_name),
            ComponentState::Error(s) => Some(&s.component_name),
            ComponentState::Fragment(_) => None,
        }
    }

    pub fn props(&self) -> Option<&PropValues> {
        match self {
            ComponentState::Standard(s) | ComponentState::Module(s) => Some(&s.props),
            ComponentState::Repeater(s) => Some(&s.repeated_component.props),
            _ => None,
        }
    }

    /// Whether this node's props can be edited (Standard, Module, or the
    /// component wrapped by a Repeater).
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            ComponentState::Standard(_) | ComponentState::Module(_) | ComponentState::Repeater(_)
        )
    }
}
