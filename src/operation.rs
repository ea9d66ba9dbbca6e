//! graphql operations
//!
//! a named query or mutation with a single root field, built from a
//! selection tree and rendered to graphql document text.

use crate::error::{Error, Result};
use crate::selection::{write_selection_set, SelectionNode};
use serde_json::{Map, Value};
use std::fmt::{self, Write as _};

/// root field of the list envelope holding the requested selection
pub const ITEMS_FIELD: &str = "items";
/// envelope flag for a following page
pub const HAS_NEXT_PAGE_FIELD: &str = "hasNextPage";
/// envelope flag for a preceding page
pub const HAS_PREVIOUS_PAGE_FIELD: &str = "hasPreviousPage";

/// operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    /// graphql keyword for this kind
    pub fn keyword(self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
        }
    }
}

/// argument value on the root field
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    /// reference to a declared variable, rendered as `$name`
    Variable(String),
    /// inline literal; object keys must be graphql names
    Literal(Value),
    /// enum value, rendered unquoted
    Enum(String),
}

/// `$name: Type` declaration in the operation header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDefinition {
    pub name: String,
    /// graphql type, e.g. `Int!` or `[String!]`
    pub type_name: String,
}

/// a single-root graphql query or mutation.
///
/// the root field is named after the operation, so a successful response is
/// keyed by `name`. the selection is an owned snapshot taken at build time.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    name: String,
    kind: OperationKind,
    arguments: Vec<(String, ArgumentValue)>,
    variable_definitions: Vec<VariableDefinition>,
    selection: Vec<SelectionNode>,
    variables: Map<String, Value>,
}

impl Operation {
    /// create an operation of the given kind
    pub fn new(name: impl Into<String>, kind: OperationKind, selection: Vec<SelectionNode>) -> Self {
        Self {
            name: name.into(),
            kind,
            arguments: Vec::new(),
            variable_definitions: Vec::new(),
            selection,
            variables: Map::new(),
        }
    }

    /// create a query
    pub fn query(name: impl Into<String>, selection: Vec<SelectionNode>) -> Self {
        Self::new(name, OperationKind::Query, selection)
    }

    /// create a mutation
    pub fn mutation(name: impl Into<String>, selection: Vec<SelectionNode>) -> Self {
        Self::new(name, OperationKind::Mutation, selection)
    }

    /// create a query whose selection is wrapped in the list envelope
    pub fn list(name: impl Into<String>, items: Vec<SelectionNode>) -> Self {
        Self::query(name, list_envelope(items))
    }

    /// add an argument to the root field
    pub fn with_argument(mut self, name: impl Into<String>, value: ArgumentValue) -> Self {
        self.arguments.push((name.into(), value));
        self
    }

    /// declare `$name: type_name`, pass it as the `name` argument of the
    /// root field, and attach its value
    pub fn with_variable(
        mut self,
        name: impl Into<String>,
        type_name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        let name = name.into();
        self.variables.insert(name.clone(), value.into());
        self.with_variable_argument(name, type_name)
    }

    /// declare `$name: type_name` and pass it as the `name` argument of the
    /// root field; the value is supplied at execution time
    pub fn with_variable_argument(
        mut self,
        name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        let name = name.into();
        self.arguments
            .push((name.clone(), ArgumentValue::Variable(name.clone())));
        self.with_variable_definition(name, type_name)
    }

    /// declare a variable without binding it to a root argument
    pub fn with_variable_definition(
        mut self,
        name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        self.variable_definitions.push(VariableDefinition {
            name: name.into(),
            type_name: type_name.into(),
        });
        self
    }

    /// attach variable values verbatim
    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables.extend(variables);
        self
    }

    /// operation and root field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// query or mutation
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// true for mutations
    pub fn is_mutation(&self) -> bool {
        self.kind == OperationKind::Mutation
    }

    /// root field arguments in declaration order
    pub fn arguments(&self) -> &[(String, ArgumentValue)] {
        &self.arguments
    }

    /// declared variables in declaration order
    pub fn variable_definitions(&self) -> &[VariableDefinition] {
        &self.variable_definitions
    }

    /// selection snapshot of the root field
    pub fn selection(&self) -> &[SelectionNode] {
        &self.selection
    }

    /// attached variable values
    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    /// render the graphql document text
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// check that every name rendered into the header and root arguments is
    /// a graphql name, so the document parses
    pub fn validate(&self) -> Result<()> {
        check_name("operation", &self.name)?;
        for def in &self.variable_definitions {
            check_name("variable", &def.name)?;
        }
        for (name, value) in &self.arguments {
            check_name("argument", name)?;
            match value {
                ArgumentValue::Variable(var) => check_name("variable", var)?,
                ArgumentValue::Enum(value) => {
                    if matches!(value.as_str(), "true" | "false" | "null") {
                        return Err(Error::InvalidOperation(format!(
                            "`{value}` is not a valid enum value"
                        )));
                    }
                    check_name("enum value", value)?;
                }
                ArgumentValue::Literal(value) => check_literal_keys(value)?,
            }
        }
        Ok(())
    }
}

fn is_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

fn check_name(what: &str, name: &str) -> Result<()> {
    if is_name(name) {
        Ok(())
    } else {
        Err(Error::InvalidOperation(format!(
            "`{name}` is not a valid graphql {what} name"
        )))
    }
}

fn check_literal_keys(value: &Value) -> Result<()> {
    match value {
        Value::Array(items) => items.iter().try_for_each(check_literal_keys),
        Value::Object(map) => map.iter().try_for_each(|(key, item)| {
            check_name("object field", key)?;
            check_literal_keys(item)
        }),
        _ => Ok(()),
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.keyword())?;
        if !self.variable_definitions.is_empty() {
            f.write_str("(")?;
            for (idx, def) in self.variable_definitions.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "${}: {}", def.name, def.type_name)?;
            }
            f.write_str(")")?;
        }

        write!(f, " {{ {}", self.name)?;
        if !self.arguments.is_empty() {
            f.write_str("(")?;
            for (idx, (name, value)) in self.arguments.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{name}: ")?;
                match value {
                    ArgumentValue::Variable(var) => write!(f, "${var}")?,
                    ArgumentValue::Literal(value) => write_literal(f, value)?,
                    ArgumentValue::Enum(value) => f.write_str(value)?,
                }
            }
            f.write_str(")")?;
        }
        if !self.selection.is_empty() {
            f.write_str(" ")?;
            write_selection_set(f, &self.selection)?;
        }
        f.write_str(" }")
    }
}

/// wrap a selection in the paginated list envelope:
/// `items { .. } hasNextPage hasPreviousPage`
pub fn list_envelope(items: Vec<SelectionNode>) -> Vec<SelectionNode> {
    vec![
        SelectionNode::with_children(ITEMS_FIELD, items),
        SelectionNode::leaf(HAS_NEXT_PAGE_FIELD),
        SelectionNode::leaf(HAS_PREVIOUS_PAGE_FIELD),
    ]
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Array(items) => {
            f.write_char('[')?;
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                write_literal(f, item)?;
            }
            f.write_char(']')
        }
        Value::Object(map) => {
            f.write_char('{')?;
            for (idx, (key, item)) in map.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{key}: ")?;
                write_literal(f, item)?;
            }
            f.write_char('}')
        }
        // json scalars share graphql's literal syntax
        scalar => write!(f, "{scalar}"),
    }
}
