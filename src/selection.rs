//! selection sets
//!
//! declarative field specs, the selection tree built from them, and the
//! per-service selection state that accumulates them.

use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt;

/// one entry of a [`FieldSpec`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEntry {
    /// scalar field
    Leaf(String),
    /// field with its own sub-selection
    Nested(String, FieldSpec),
}

/// ordered, nested description of the fields to request
///
/// ```
/// use graphql_resource::FieldSpec;
///
/// let spec = FieldSpec::new()
///     .field("id")
///     .field("title")
///     .nested("price", FieldSpec::from(["withVat", "currency"]));
/// assert_eq!(spec.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpec {
    entries: Vec<FieldEntry>,
}

impl FieldSpec {
    /// create an empty spec
    pub fn new() -> Self {
        Self::default()
    }

    /// add a scalar field
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.entries.push(FieldEntry::Leaf(name.into()));
        self
    }

    /// add a field with a sub-selection
    pub fn nested(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.entries.push(FieldEntry::Nested(name.into(), spec));
        self
    }

    /// entries in declaration order
    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    /// number of top-level entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// true if no fields are listed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// build the selection tree for this spec
    pub fn build(&self) -> Vec<SelectionNode> {
        build(self)
    }

    /// read a spec from a json literal.
    ///
    /// arrays list leaf names (objects inside an array contribute their
    /// entries in place). in objects, an object or array value is a nested
    /// selection under the key, a string value is a leaf named by the value,
    /// and `true` or `null` is a leaf named by the key.
    pub fn from_json(value: &Value) -> Result<Self> {
        let mut spec = FieldSpec::new();
        spec.extend_from_json(value)?;
        Ok(spec)
    }

    fn extend_from_json(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::String(name) => self.entries.push(FieldEntry::Leaf(name.clone())),
                        Value::Object(_) => self.extend_from_json(item)?,
                        other => {
                            return Err(Error::InvalidFieldSpec(format!(
                                "unsupported list entry: {other}"
                            )))
                        }
                    }
                }
            }
            Value::Object(map) => {
                for (key, item) in map {
                    let entry = match item {
                        Value::Object(_) | Value::Array(_) => {
                            FieldEntry::Nested(key.clone(), FieldSpec::from_json(item)?)
                        }
                        Value::String(name) => FieldEntry::Leaf(name.clone()),
                        Value::Bool(true) | Value::Null => FieldEntry::Leaf(key.clone()),
                        other => {
                            return Err(Error::InvalidFieldSpec(format!(
                                "unsupported value for `{key}`: {other}"
                            )))
                        }
                    };
                    self.entries.push(entry);
                }
            }
            other => {
                return Err(Error::InvalidFieldSpec(format!(
                    "expected an array or object, got {other}"
                )))
            }
        }
        Ok(())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for FieldSpec {
    fn from(names: [S; N]) -> Self {
        names.into_iter().fold(FieldSpec::new(), |spec, name| spec.field(name))
    }
}

impl<S: Into<String>> FromIterator<S> for FieldSpec {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        iter.into_iter().fold(FieldSpec::new(), |spec, name| spec.field(name))
    }
}

impl TryFrom<Value> for FieldSpec {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        FieldSpec::from_json(&value)
    }
}

/// a requested field and its sub-selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionNode {
    name: String,
    children: Vec<SelectionNode>,
}

impl SelectionNode {
    /// scalar field
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// field with a sub-selection
    pub fn with_children(name: impl Into<String>, children: Vec<SelectionNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    /// field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// sub-selection, empty for leaves
    pub fn children(&self) -> &[SelectionNode] {
        &self.children
    }

    /// true if the field has no sub-selection
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Display for SelectionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.children.is_empty() {
            f.write_str(" ")?;
            write_selection_set(f, &self.children)?;
        }
        Ok(())
    }
}

/// write `{ a b { c } }` for a list of nodes
pub(crate) fn write_selection_set(f: &mut impl fmt::Write, nodes: &[SelectionNode]) -> fmt::Result {
    f.write_str("{")?;
    for node in nodes {
        write!(f, " {node}")?;
    }
    f.write_str(" }")
}

/// build the ordered selection tree for a field spec
pub fn build(spec: &FieldSpec) -> Vec<SelectionNode> {
    spec.entries
        .iter()
        .map(|entry| match entry {
            FieldEntry::Leaf(name) => SelectionNode::leaf(name.clone()),
            FieldEntry::Nested(name, nested) => {
                SelectionNode::with_children(name.clone(), build(nested))
            }
        })
        .collect()
}

/// selection state owned by one resource service.
///
/// an empty explicit selection means "use the defaults"; the defaults are
/// kept separately and never copied into the explicit selection by `read`.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    defaults: Vec<SelectionNode>,
    current: Vec<SelectionNode>,
}

impl SelectionState {
    /// create a state that falls back to `defaults`
    pub fn new(defaults: Vec<SelectionNode>) -> Self {
        Self {
            defaults,
            current: Vec::new(),
        }
    }

    /// discard the explicit selection and store `spec` instead
    pub fn replace(&mut self, spec: &FieldSpec) {
        self.current = build(spec);
    }

    /// append `spec` to the effective selection.
    ///
    /// nodes are concatenated, not merged by name: appending a field that is
    /// already selected yields two sibling nodes with that name.
    pub fn append(&mut self, spec: &FieldSpec) {
        let mut next = self.read().to_vec();
        next.extend(build(spec));
        self.current = next;
    }

    /// effective selection: the explicit one, or the defaults when empty
    pub fn read(&self) -> &[SelectionNode] {
        if self.current.is_empty() {
            &self.defaults
        } else {
            &self.current
        }
    }

    /// drop the explicit selection
    pub fn reset(&mut self) {
        self.current.clear();
    }

    /// true if an explicit selection is stored
    pub fn is_customized(&self) -> bool {
        !self.current.is_empty()
    }

    /// default tree used while no explicit selection is stored
    pub fn defaults(&self) -> &[SelectionNode] {
        &self.defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product_spec() -> FieldSpec {
        FieldSpec::new()
            .field("id")
            .field("title")
            .nested(
                "variations",
                FieldSpec::new()
                    .field("id")
                    .nested("price", FieldSpec::from(["withVat", "currency"])),
            )
    }

    fn names(nodes: &[SelectionNode]) -> Vec<&str> {
        nodes.iter().map(SelectionNode::name).collect()
    }

    #[test]
    fn test_build_preserves_order_and_nesting() {
        let nodes = build(&product_spec());
        assert_eq!(names(&nodes), vec!["id", "title", "variations"]);
        assert!(nodes[0].is_leaf());

        let variations = &nodes[2];
        assert_eq!(names(variations.children()), vec!["id", "price"]);
        assert_eq!(
            names(variations.children()[1].children()),
            vec!["withVat", "currency"]
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        assert_eq!(build(&product_spec()), build(&product_spec()));
    }

    #[test]
    fn test_build_deep_nesting() {
        let mut spec = FieldSpec::from(["leaf"]);
        for depth in 0..64 {
            spec = FieldSpec::new().nested(format!("level{depth}"), spec);
        }
        let mut nodes = build(&spec);
        let mut depth = 0;
        while let Some(node) = nodes.pop() {
            if node.is_leaf() {
                assert_eq!(node.name(), "leaf");
                break;
            }
            depth += 1;
            nodes = node.children().to_vec();
        }
        assert_eq!(depth, 64);
    }

    #[test]
    fn test_display() {
        let nodes = build(&product_spec());
        let mut text = String::new();
        write_selection_set(&mut text, &nodes).unwrap();
        assert_eq!(
            text,
            "{ id title variations { id price { withVat currency } } }"
        );
    }

    #[test]
    fn test_from_json_mixed_entries() {
        let spec = FieldSpec::from_json(&json!([
            "id",
            "title",
            {"producer": ["id", "name"], "flag": true, "alias": "code"}
        ]))
        .unwrap();

        let expected = FieldSpec::new()
            .field("id")
            .field("title")
            .nested("producer", FieldSpec::from(["id", "name"]))
            .field("flag")
            .field("code");
        assert_eq!(spec, expected);
    }

    #[test]
    fn test_from_json_rejects_scalars() {
        assert!(matches!(
            FieldSpec::from_json(&json!("id")),
            Err(Error::InvalidFieldSpec(_))
        ));
        assert!(matches!(
            FieldSpec::from_json(&json!([1])),
            Err(Error::InvalidFieldSpec(_))
        ));
        assert!(matches!(
            FieldSpec::try_from(json!({"id": 5})),
            Err(Error::InvalidFieldSpec(_))
        ));
    }

    #[test]
    fn test_read_falls_back_to_defaults() {
        let state = SelectionState::new(build(&FieldSpec::from(["id", "name"])));
        assert_eq!(names(state.read()), vec!["id", "name"]);
        assert!(!state.is_customized());
    }

    #[test]
    fn test_replace_then_read() {
        let mut state = SelectionState::new(build(&FieldSpec::from(["id", "name"])));
        state.replace(&product_spec());
        assert_eq!(state.read(), build(&product_spec()).as_slice());
        assert!(state.is_customized());

        state.reset();
        assert_eq!(names(state.read()), vec!["id", "name"]);
    }

    #[test]
    fn test_append_concatenates_with_duplicates() {
        let mut state = SelectionState::default();
        let a = FieldSpec::from(["id", "title"]);
        let b = FieldSpec::from(["title", "code"]);
        state.append(&a);
        state.append(&b);

        let mut expected = build(&a);
        expected.extend(build(&b));
        assert_eq!(state.read(), expected.as_slice());
        assert_eq!(names(state.read()), vec!["id", "title", "title", "code"]);
    }

    #[test]
    fn test_append_starts_from_defaults() {
        let mut state = SelectionState::new(build(&FieldSpec::from(["id"])));
        state.append(&FieldSpec::from(["ean"]));
        assert_eq!(names(state.read()), vec!["id", "ean"]);
        assert_eq!(names(state.defaults()), vec!["id"]);
    }
}
