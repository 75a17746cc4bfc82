//! Sample-data seeding through the ordinary create path. Runs once at
//! startup; a failure here is logged and never prevents the service from
//! serving requests.

use crate::error::AppError;
use crate::schema::KindHandle;
use crate::service::CrudService;
use crate::store::{Document, DocumentStore, ID_FIELD};
use serde_json::{json, Value};

const SAMPLE_USERS: &[(&str, &str, i64)] = &[
    ("Alice", "alice@example.com", 30),
    ("Bob", "bob@example.com", 25),
    ("Charlie", "charlie@example.com", 35),
    ("David", "david@example.com", 28),
    ("Eve", "eve@example.com", 22),
];

/// Insert five users, five posts (one per user), and five comments (each on
/// one post, authored by the next user round-robin).
pub async fn seed_sample_data(
    store: &dyn DocumentStore,
    users: &KindHandle,
    posts: &KindHandle,
    comments: &KindHandle,
) -> Result<(), AppError> {
    let mut user_ids = Vec::with_capacity(SAMPLE_USERS.len());
    for (name, email, age) in SAMPLE_USERS.iter().copied() {
        let rec = CrudService::create(
            store,
            users,
            &fields(json!({"name": name, "email": email, "age": age})),
        )
        .await?;
        user_ids.push(record_id(&rec)?);
    }

    let mut post_ids = Vec::with_capacity(user_ids.len());
    for (i, author) in user_ids.iter().enumerate() {
        let rec = CrudService::create(
            store,
            posts,
            &fields(json!({
                "title": format!("Post {}", i + 1),
                "content": format!("Content of Post {}", i + 1),
                "author": author.clone(),
            })),
        )
        .await?;
        post_ids.push(record_id(&rec)?);
    }

    for (i, post) in post_ids.iter().enumerate() {
        CrudService::create(
            store,
            comments,
            &fields(json!({
                "content": format!("Comment {}", i + 1),
                "post": post.clone(),
                "author": user_ids[(i + 1) % user_ids.len()].clone(),
            })),
        )
        .await?;
    }

    tracing::info!(
        users = user_ids.len(),
        posts = post_ids.len(),
        comments = post_ids.len(),
        "seeded sample data"
    );
    Ok(())
}

fn fields(v: Value) -> Document {
    match v {
        Value::Object(m) => m,
        _ => Document::new(),
    }
}

fn record_id(rec: &Value) -> Result<String, AppError> {
    rec.get(ID_FIELD)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| AppError::Validation("created record missing identifier".into()))
}
