//! resilient execution
//!
//! dispatches an [`Operation`] through a [`Transport`], unwraps the
//! single-root payload, and turns not-found query errors into `None`.

use crate::error::{Error, Result};
use crate::operation::Operation;
use serde_json::{Map, Value};
use std::future::Future;

/// sends operations to a graphql endpoint
///
/// implementations return the response `data` on success and an
/// [`Error::GraphQl`] carrying the server's error entries on failure.
pub trait Transport {
    /// send `operation` with `variables` and return the raw data payload
    fn run_operation(
        &self,
        operation: &Operation,
        variables: &Map<String, Value>,
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// execute `operation` once.
///
/// the operation is validated first; an invalid one is never sent.
/// the variables sent are the operation's own, overlaid with `variables`.
/// with `unwrap_single_key`, an object payload is replaced by the value of
/// its only key. returns `Ok(None)` when a query fails with a not-found
/// classification; mutation errors always propagate.
pub async fn execute<T: Transport>(
    transport: &T,
    operation: &Operation,
    variables: Map<String, Value>,
    unwrap_single_key: bool,
) -> Result<Option<Value>> {
    operation.validate()?;

    let mut merged = operation.variables().clone();
    merged.extend(variables);

    tracing::debug!(
        operation = %operation.name(),
        kind = ?operation.kind(),
        variables = merged.len(),
        "dispatching graphql operation"
    );

    match transport.run_operation(operation, &merged).await {
        Ok(payload) if unwrap_single_key => unwrap_root(operation, payload).map(Some),
        Ok(payload) => Ok(Some(payload)),
        Err(err) if !operation.is_mutation() && err.is_not_found() => {
            tracing::debug!(
                operation = %operation.name(),
                "resource not found, returning empty result"
            );
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn unwrap_root(operation: &Operation, payload: Value) -> Result<Value> {
    match payload {
        Value::Object(map) if map.len() > 1 => Err(Error::UnexpectedPayload(format!(
            "operation `{}` expects a single root field, got {}",
            operation.name(),
            map.len()
        ))),
        Value::Object(map) if !map.is_empty() => {
            Ok(map.into_iter().next().map(|(_, value)| value).unwrap_or(Value::Null))
        }
        other => Ok(other),
    }
}
