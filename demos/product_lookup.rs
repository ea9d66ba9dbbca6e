use graphql_resource::{Client, ClientConfig, FieldSpec, Resource, ResourceService};
use std::env;

struct Products;

impl Resource for Products {
    fn default_selection_set(&self) -> FieldSpec {
        FieldSpec::new()
            .field("id")
            .field("title")
            .nested("price", FieldSpec::from(["withVat", "currency"]))
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
    let id: i64 = env::var("PRODUCT_ID")
        .ok()
        .and_then(|id| id.parse().ok())
        .unwrap_or(1);

    let client = Client::new(ClientConfig::new(endpoint).with_token(token))?;
    let mut products = ResourceService::new(Products, client);
    products.add_selection(&FieldSpec::new().nested("producer", FieldSpec::from(["name"])));

    let query = products
        .create_base_query("product", false)
        .with_variable("id", "Int!", id);
    println!("query: {}", query.render());

    match products.execute_query(&query, Default::default(), true).await? {
        Some(product) => println!("product: {product}"),
        None => println!("product {id} does not exist"),
    }

    Ok(())
}
