//! resource-oriented graphql client
//!
//! this crate builds graphql selection sets declaratively, wraps them in
//! single-root queries and mutations, and executes them with not-found
//! handling suited to services that model one remote resource at a time.
//!
//! - [`FieldSpec`] describes fields, [`SelectionNode`] is the built tree
//! - [`SelectionState`] accumulates a service's selection
//! - [`Operation`] renders the document, optionally inside the list envelope
//! - [`execute`] runs it through any [`Transport`]; [`Client`] is the http one
//! - [`ResourceService`] ties a [`Resource`] to all of the above
//!
//! ## quick start
//!
//! ```no_run
//! use graphql_resource::{Client, ClientConfig, FieldSpec, Resource, ResourceService};
//!
//! struct Products;
//!
//! impl Resource for Products {
//!     fn default_selection_set(&self) -> FieldSpec {
//!         FieldSpec::from(["id", "title"])
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(ClientConfig::new("https://shop.example.com/graphql").with_token("token"))?;
//! let service = ResourceService::new(Products, client);
//! let query = service
//!     .create_base_query("product", false)
//!     .with_variable("id", "Int!", 1);
//! match service.execute_query(&query, Default::default(), true).await? {
//!     Some(product) => println!("{product}"),
//!     None => println!("no such product"),
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod executor;
mod graphql;
mod operation;
mod pagination;
mod selection;
mod service;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use executor::{execute, Transport};
pub use graphql::{GraphQlError, GraphQlLocation, GraphQlResponse, NOT_FOUND_CATEGORY};
pub use operation::{
    list_envelope, ArgumentValue, Operation, OperationKind, VariableDefinition,
    HAS_NEXT_PAGE_FIELD, HAS_PREVIOUS_PAGE_FIELD, ITEMS_FIELD,
};
pub use pagination::{ListPage, Paginator};
pub use selection::{build, FieldEntry, FieldSpec, SelectionNode, SelectionState};
pub use service::{Capability, Resource, ResourceService, TranslateRequest};
