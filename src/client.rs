//! http transport
//!
//! posts graphql documents to the configured endpoint and maps the response
//! envelope to data or a structured [`Error::GraphQl`].

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::executor::Transport;
use crate::graphql::GraphQlResponse;
use crate::operation::Operation;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use url::Url;

/// graphql client over http
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    endpoint: Url,
    http: reqwest::Client,
}

impl Client {
    /// create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        let endpoint = config.validate()?.clone();

        let http = match &config.http_client {
            Some(http) => http.clone(),
            None => {
                let mut headers = HeaderMap::new();
                if let Some(token) = &config.token {
                    headers.insert(
                        AUTHORIZATION,
                        HeaderValue::from_str(&format!("Bearer {token}")).map_err(|err| {
                            Error::Config(format!("invalid api token header value: {err}"))
                        })?,
                    );
                }
                headers.extend(config.extra_headers.clone());

                let mut builder = reqwest::Client::builder()
                    .default_headers(headers)
                    .user_agent(config.user_agent.clone())
                    .timeout(config.timeout)
                    .danger_accept_invalid_certs(!config.verify_ssl);
                if let Some(customize) = &config.http_client_builder {
                    builder = customize(builder);
                }
                builder.build()?
            }
        };

        Ok(Self {
            config: Arc::new(config),
            endpoint,
            http,
        })
    }

    /// access the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// execute a raw graphql document
    pub async fn execute_raw(
        &self,
        query: &str,
        variables: Option<Value>,
    ) -> Result<GraphQlResponse<Value>> {
        self.execute_with(query, variables, |url, body| self.post(url, body))
            .await
    }

    /// execute a raw graphql document and deserialize into a typed response
    pub async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<Value>,
    ) -> Result<GraphQlResponse<T>> {
        self.execute_with(query, variables, |url, body| self.post(url, body))
            .await
    }

    async fn post(&self, url: Url, body: Value) -> Result<(StatusCode, String)> {
        let response = self.http.post(url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }

    pub(crate) async fn execute_with<T: DeserializeOwned, F, Fut>(
        &self,
        query: &str,
        variables: Option<Value>,
        send: F,
    ) -> Result<GraphQlResponse<T>>
    where
        F: FnOnce(Url, Value) -> Fut,
        Fut: Future<Output = Result<(StatusCode, String)>>,
    {
        let body = serde_json::json!({
            "query": query,
            "variables": variables.unwrap_or_else(|| serde_json::json!({})),
        });

        let (status, text) = send(self.endpoint.clone(), body).await?;
        parse_graphql_response(status, text)
    }
}

impl Transport for Client {
    fn run_operation(
        &self,
        operation: &Operation,
        variables: &Map<String, Value>,
    ) -> impl Future<Output = Result<Value>> + Send {
        let query = operation.render();
        let variables = Value::Object(variables.clone());
        async move {
            let response = self.execute_raw(&query, Some(variables)).await?;
            Ok(response.data.unwrap_or(Value::Null))
        }
    }
}

fn parse_graphql_response<T: DeserializeOwned>(
    status: StatusCode,
    text: String,
) -> Result<GraphQlResponse<T>> {
    let parsed: GraphQlResponse<T> = match serde_json::from_str(&text) {
        Ok(parsed) => parsed,
        Err(_) if !status.is_success() => {
            return Err(http_error(status, text));
        }
        Err(err) => return Err(err.into()),
    };

    if !parsed.errors.is_empty() {
        let message = parsed
            .errors
            .first()
            .map(|err| err.message.clone())
            .unwrap_or_else(|| "graphql error".to_string());
        return Err(Error::GraphQl {
            status: Some(status.as_u16()),
            errors: parsed.errors,
            body: text,
            message,
        });
    }

    if !status.is_success() {
        return Err(http_error(status, text));
    }

    Ok(parsed)
}

fn http_error(status: StatusCode, body: String) -> Error {
    Error::GraphQl {
        status: Some(status.as_u16()),
        errors: Vec::new(),
        body,
        message: format!("graphql http error: {}", status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn test_client() -> Client {
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("test http client");
        Client::new(ClientConfig::new("http://localhost:1234/graphql").with_http_client(http))
            .unwrap()
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_execute_posts_query_and_variables() {
        let client = test_client();
        let response = client
            .execute_with::<Value, _, _>(
                "query { ok }",
                Some(serde_json::json!({"id": 1})),
                |url, body| async move {
                    assert_eq!(url.path(), "/graphql");
                    assert_eq!(body["query"], "query { ok }");
                    assert_eq!(body["variables"]["id"], 1);
                    Ok((StatusCode::OK, "{\"data\": {\"ok\": true}}".to_string()))
                },
            )
            .await
            .unwrap();

        assert_eq!(response.data.unwrap()["ok"], true);
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_execute_defaults_variables_to_empty_object() {
        let client = test_client();
        client
            .execute_with::<Value, _, _>("query { ok }", None, |_url, body| async move {
                assert_eq!(body["variables"], serde_json::json!({}));
                Ok((StatusCode::OK, "{\"data\": {\"ok\": true}}".to_string()))
            })
            .await
            .unwrap();
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_execute_graphql_error() {
        let client = test_client();
        let err = client
            .execute_with::<Value, _, _>("query { ok }", None, |_url, _body| async move {
                Ok((
                    StatusCode::OK,
                    "{\"data\": null, \"errors\": [{\"message\": \"boom\", \"extensions\": {\"category\": \"NOT_FOUND\"}}]}"
                        .to_string(),
                ))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::GraphQl { .. }));
        assert!(err.is_not_found());
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_execute_typed_success() {
        #[derive(Debug, Deserialize)]
        struct Data {
            value: i64,
        }
        let client = test_client();
        let response = client
            .execute_with::<Data, _, _>("query { value }", None, |_url, _body| async move {
                Ok((StatusCode::OK, "{\"data\": {\"value\": 7}}".to_string()))
            })
            .await
            .unwrap();

        assert_eq!(response.data.unwrap().value, 7);
    }

    #[test]
    fn test_invalid_token_header() {
        let config = ClientConfig::new("http://localhost:1234/graphql").with_token("bad\ntoken");
        let err = Client::new(config).err().expect("expected error");
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_parse_graphql_response_success() {
        let text = "{\"data\": {\"value\": 9}}".to_string();
        let parsed = parse_graphql_response::<Value>(StatusCode::OK, text).unwrap();
        assert_eq!(parsed.data.unwrap()["value"], 9);
    }

    #[test]
    fn test_parse_graphql_response_http_error() {
        let text = "{\"data\": null}".to_string();
        let err = parse_graphql_response::<Value>(StatusCode::BAD_GATEWAY, text).unwrap_err();
        assert!(matches!(
            err,
            Error::GraphQl {
                status: Some(502),
                ..
            }
        ));
    }

    #[test]
    fn test_parse_non_json_http_error() {
        let err = parse_graphql_response::<Value>(
            StatusCode::SERVICE_UNAVAILABLE,
            "<html>down</html>".to_string(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::GraphQl {
                status: Some(503),
                ..
            }
        ));

        let err = parse_graphql_response::<Value>(StatusCode::OK, "nope".to_string()).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
