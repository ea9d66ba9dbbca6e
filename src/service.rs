//! resource services
//!
//! a [`ResourceService`] binds one remote resource (its default fields and
//! optional capabilities) to a transport and a selection state.

use crate::error::{Error, Result};
use crate::executor::{execute, Transport};
use crate::operation::Operation;
use crate::pagination::{ListPage, Paginator};
use crate::selection::{FieldSpec, SelectionNode, SelectionState};
use serde_json::{Map, Value};

/// optional capability of a resource
#[derive(Debug, Clone, PartialEq)]
pub enum Capability<T> {
    Supported(T),
    Unsupported,
}

impl<T> Capability<T> {
    /// unwrap a supported capability or fail with [`Error::NotImplemented`]
    pub fn require(self, capability: &'static str) -> Result<T> {
        match self {
            Capability::Supported(value) => Ok(value),
            Capability::Unsupported => Err(Error::NotImplemented { capability }),
        }
    }

    /// true for `Supported`
    pub fn is_supported(&self) -> bool {
        matches!(self, Capability::Supported(_))
    }
}

/// arguments of a translate call
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateRequest {
    pub id: i64,
    pub language: String,
    pub data: Value,
}

/// a remote resource such as "product" or "order"
pub trait Resource {
    /// fields requested when the caller has not chosen any
    fn default_selection_set(&self) -> FieldSpec;

    /// mutation that stores a translation of one record.
    ///
    /// `selection` is the service's effective selection at call time.
    fn translate_operation(
        &self,
        _request: &TranslateRequest,
        _selection: &[SelectionNode],
    ) -> Capability<Operation> {
        Capability::Unsupported
    }
}

/// selection state and execution for one resource
pub struct ResourceService<R, T> {
    resource: R,
    transport: T,
    selection: SelectionState,
}

impl<R: Resource, T: Transport> ResourceService<R, T> {
    /// create a service; the resource's default fields are built once here
    pub fn new(resource: R, transport: T) -> Self {
        let defaults = resource.default_selection_set().build();
        Self {
            resource,
            transport,
            selection: SelectionState::new(defaults),
        }
    }

    /// the wrapped resource
    pub fn resource(&self) -> &R {
        &self.resource
    }

    /// the transport operations are sent through
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// overwrite the current selection
    pub fn set_selection(&mut self, spec: &FieldSpec) -> &mut Self {
        self.selection.replace(spec);
        self
    }

    /// add fields to the current selection (duplicates are kept)
    pub fn add_selection(&mut self, spec: &FieldSpec) -> &mut Self {
        self.selection.append(spec);
        self
    }

    /// go back to the resource's default fields
    pub fn reset_selection(&mut self) -> &mut Self {
        self.selection.reset();
        self
    }

    /// effective selection
    pub fn selection(&self) -> &[SelectionNode] {
        self.selection.read()
    }

    /// query rooted at `name`; with `list`, the selection goes inside the
    /// `items` envelope next to the page flags
    pub fn create_base_query(&self, name: &str, list: bool) -> Operation {
        let selection = self.selection().to_vec();
        if list {
            Operation::list(name, selection)
        } else {
            Operation::query(name, selection)
        }
    }

    /// mutation rooted at `name` returning the current selection
    pub fn create_base_mutation(&self, name: &str) -> Operation {
        Operation::mutation(name, self.selection().to_vec())
    }

    /// run `operation`; see [`execute`] for the not-found rules
    pub async fn execute_query(
        &self,
        operation: &Operation,
        variables: Map<String, Value>,
        reset_result: bool,
    ) -> Result<Option<Value>> {
        execute(&self.transport, operation, variables, reset_result).await
    }

    /// run a list query page by page and collect every item.
    ///
    /// `operation` is usually built with `create_base_query(name, true)` and
    /// declares the paging variables; `page_variables` maps a 1-based page
    /// number to that page's values.
    pub async fn list_all<F>(
        &self,
        operation: &Operation,
        mut page_variables: F,
    ) -> Result<Vec<Value>>
    where
        F: FnMut(u32) -> Map<String, Value>,
    {
        let fetch = |page: u32| {
            let variables = page_variables(page);
            async move { self.execute_query(operation, variables, true).await }
        };
        let extract = |payload: Option<Value>| match payload {
            Some(value) => ListPage::<Value>::from_value(value),
            None => Ok(ListPage {
                items: Vec::new(),
                has_next_page: false,
                has_previous_page: false,
            }),
        };

        Paginator::new(fetch, extract).collect_all().await
    }

    /// store a translation of record `id` in `language`.
    ///
    /// fails with [`Error::NotImplemented`] before any request when the
    /// resource does not support translations.
    pub async fn translate(&self, id: i64, language: &str, data: Value) -> Result<Option<Value>> {
        let request = TranslateRequest {
            id,
            language: language.to_string(),
            data,
        };
        let operation = self
            .resource
            .translate_operation(&request, self.selection())
            .require("translate")?;
        self.execute_query(&operation, Map::new(), true).await
    }
}
