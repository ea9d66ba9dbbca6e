use graphql_resource::{Client, ClientConfig, FieldSpec, Resource, ResourceService};
use serde_json::{json, Map};
use std::env;

const PAGE_SIZE: u32 = 50;

struct Products;

impl Resource for Products {
    fn default_selection_set(&self) -> FieldSpec {
        FieldSpec::from(["id", "title"])
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let endpoint =
        env::var("GRAPHQL_URL").unwrap_or_else(|_| "http://localhost:8000/graphql".to_string());
    let token = env::var("GRAPHQL_TOKEN").expect("GRAPHQL_TOKEN is required");

    let client = Client::new(ClientConfig::new(endpoint).with_token(token))?;
    let products = ResourceService::new(Products, client);

    let query = products
        .create_base_query("products", true)
        .with_variable_argument("offset", "Int")
        .with_variable_argument("limit", "Int");
    let items = products
        .list_all(&query, |page| {
            let mut vars = Map::new();
            vars.insert("offset".to_string(), json!((page - 1) * PAGE_SIZE));
            vars.insert("limit".to_string(), json!(PAGE_SIZE));
            vars
        })
        .await?;

    println!("fetched {} products", items.len());
    for item in items {
        println!("{item}");
    }

    Ok(())
}
