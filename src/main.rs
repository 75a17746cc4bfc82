//! Bootstrap: define the sample kinds, bind them, mount routes, seed, serve.

use docrest::{
    common_routes, record_routes, seed_sample_data, AppState, FieldDef, MemoryStore,
    RouteBindings, SchemaRegistry,
};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tracing_subscriber::EnvFilter;

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("docrest=info".parse()?))
        .init();

    let mut registry = SchemaRegistry::new();
    let user = registry.define(
        "user",
        vec![
            FieldDef::text("name").required(),
            FieldDef::text("email").required().unique(),
            FieldDef::integer("age").minimum(0),
        ],
    )?;
    let post = registry.define(
        "post",
        vec![
            FieldDef::text("title").required(),
            FieldDef::text("content").required(),
            FieldDef::reference("author", "user"),
        ],
    )?;
    let comment = registry.define(
        "comment",
        vec![
            FieldDef::text("content").required(),
            FieldDef::reference("post", "post"),
            FieldDef::reference("author", "user"),
        ],
    )?;

    let mut bindings = RouteBindings::new();
    bindings.bind(user.clone(), "users")?;
    bindings.bind(post.clone(), "posts")?;
    bindings.bind(comment.clone(), "comments")?;

    let store = Arc::new(MemoryStore::new());
    bindings.ensure_indexes(store.as_ref()).await?;

    let state = AppState {
        store: store.clone(),
        bindings: Arc::new(bindings),
    };

    let seed = std::env::var("SEED").map(|v| v != "0" && v != "false").unwrap_or(true);
    if seed {
        if let Err(e) = seed_sample_data(store.as_ref(), &user, &post, &comment).await {
            tracing::warn!(error = %e, "seeding sample data failed; serving anyway");
        }
    }

    let app = Router::new()
        .merge(common_routes(state.clone()))
        .merge(record_routes(state))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:4040".into());
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
