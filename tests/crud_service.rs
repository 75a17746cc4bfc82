//! Service-level tests for the generic CRUD contract, run against the
//! in-memory document store.

use docrest::{
    AppError, CrudService, Document, FieldDef, KindHandle, MemoryStore, RouteBindings,
    SchemaRegistry,
};
use serde_json::{json, Value};

struct Fixture {
    store: MemoryStore,
    user: KindHandle,
    post: KindHandle,
    comment: KindHandle,
}

async fn fixture() -> Fixture {
    let mut reg = SchemaRegistry::new();
    let user = reg
        .define(
            "user",
            vec![
                FieldDef::text("name").required(),
                FieldDef::text("email").required().unique(),
                FieldDef::integer("age").minimum(0),
            ],
        )
        .unwrap();
    let post = reg
        .define(
            "post",
            vec![
                FieldDef::text("title").required(),
                FieldDef::text("content").required(),
                FieldDef::reference("author", "user"),
            ],
        )
        .unwrap();
    let comment = reg
        .define(
            "comment",
            vec![
                FieldDef::text("content").required(),
                FieldDef::reference("post", "post"),
                FieldDef::reference("author", "user"),
            ],
        )
        .unwrap();

    let mut bindings = RouteBindings::new();
    bindings.bind(user.clone(), "users").unwrap();
    bindings.bind(post.clone(), "posts").unwrap();
    bindings.bind(comment.clone(), "comments").unwrap();

    let store = MemoryStore::new();
    bindings.ensure_indexes(&store).await.unwrap();
    Fixture {
        store,
        user,
        post,
        comment,
    }
}

fn fields(v: Value) -> Document {
    v.as_object().cloned().unwrap()
}

fn id_of(rec: &Value) -> String {
    rec.get("id").and_then(Value::as_str).unwrap().to_string()
}

#[tokio::test]
async fn round_trip_create_then_list() {
    let fx = fixture().await;
    let body = json!({"name": "Alice", "email": "alice@example.com", "age": 30});
    let created = CrudService::create(&fx.store, &fx.user, &fields(body.clone()))
        .await
        .unwrap();
    // Every submitted field survives unchanged, plus a non-null identifier.
    for (k, v) in body.as_object().unwrap() {
        assert_eq!(created.get(k), Some(v));
    }
    assert!(!id_of(&created).is_empty());

    let listed = CrudService::list(&fx.store, &fx.user).await.unwrap();
    assert_eq!(listed, vec![created]);
}

#[tokio::test]
async fn idempotent_delete() {
    let fx = fixture().await;
    let created = CrudService::create(
        &fx.store,
        &fx.user,
        &fields(json!({"name": "A", "email": "a@example.com"})),
    )
    .await
    .unwrap();
    let id = id_of(&created);
    CrudService::delete(&fx.store, &fx.user, &id).await.unwrap();
    // Second delete of the same identifier is still a success.
    CrudService::delete(&fx.store, &fx.user, &id).await.unwrap();
    assert!(CrudService::list(&fx.store, &fx.user).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_merges_over_existing_fields() {
    let fx = fixture().await;
    let created = CrudService::create(
        &fx.store,
        &fx.user,
        &fields(json!({"name": "Alice", "email": "alice@example.com", "age": 30})),
    )
    .await
    .unwrap();
    let updated = CrudService::update(
        &fx.store,
        &fx.user,
        &id_of(&created),
        &fields(json!({"age": 31})),
    )
    .await
    .unwrap();
    assert_eq!(updated.get("name"), Some(&json!("Alice")));
    assert_eq!(updated.get("email"), Some(&json!("alice@example.com")));
    assert_eq!(updated.get("age"), Some(&json!(31)));
    assert_eq!(id_of(&updated), id_of(&created));
}

#[tokio::test]
async fn duplicate_unique_value_is_rejected_without_side_effect() {
    let fx = fixture().await;
    CrudService::create(
        &fx.store,
        &fx.user,
        &fields(json!({"name": "Alice", "email": "alice@example.com"})),
    )
    .await
    .unwrap();
    let err = CrudService::create(
        &fx.store,
        &fx.user,
        &fields(json!({"name": "Other", "email": "alice@example.com"})),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(CrudService::list(&fx.store, &fx.user).await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_may_keep_its_own_unique_value() {
    let fx = fixture().await;
    let created = CrudService::create(
        &fx.store,
        &fx.user,
        &fields(json!({"name": "Alice", "email": "alice@example.com"})),
    )
    .await
    .unwrap();
    let updated = CrudService::update(
        &fx.store,
        &fx.user,
        &id_of(&created),
        &fields(json!({"name": "Alicia", "email": "alice@example.com"})),
    )
    .await
    .unwrap();
    assert_eq!(updated.get("name"), Some(&json!("Alicia")));
}

#[tokio::test]
async fn update_unknown_identifier_is_not_found() {
    let fx = fixture().await;
    let err = CrudService::update(
        &fx.store,
        &fx.user,
        "15b6ff3a-4a09-4b58-8f2a-95cb3f1a6a11",
        &fields(json!({"name": "Ghost"})),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(CrudService::list(&fx.store, &fx.user).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_rejects_missing_required_field() {
    let fx = fixture().await;
    let err = CrudService::create(
        &fx.store,
        &fx.user,
        &fields(json!({"email": "a@example.com"})),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(msg) if msg.contains("name")));
    assert!(CrudService::list(&fx.store, &fx.user).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_drops_unknown_fields_and_client_identifier() {
    let fx = fixture().await;
    let created = CrudService::create(
        &fx.store,
        &fx.user,
        &fields(json!({
            "name": "Alice",
            "email": "alice@example.com",
            "id": "client-picked",
            "role": "admin"
        })),
    )
    .await
    .unwrap();
    assert_ne!(created.get("id"), Some(&json!("client-picked")));
    assert_eq!(created.get("role"), None);
}

#[tokio::test]
async fn dangling_reference_expands_to_null() {
    let fx = fixture().await;
    let alice = CrudService::create(
        &fx.store,
        &fx.user,
        &fields(json!({"name": "Alice", "email": "alice@example.com"})),
    )
    .await
    .unwrap();
    let bob = CrudService::create(
        &fx.store,
        &fx.user,
        &fields(json!({"name": "Bob", "email": "bob@example.com"})),
    )
    .await
    .unwrap();
    CrudService::create(
        &fx.store,
        &fx.post,
        &fields(json!({"title": "P1", "content": "C1", "author": id_of(&alice)})),
    )
    .await
    .unwrap();
    CrudService::create(
        &fx.store,
        &fx.post,
        &fields(json!({"title": "P2", "content": "C2", "author": id_of(&bob)})),
    )
    .await
    .unwrap();

    CrudService::delete(&fx.store, &fx.user, &id_of(&alice))
        .await
        .unwrap();

    // One dangling author must not fail the list; the other rows still expand.
    let posts = CrudService::list(&fx.store, &fx.post).await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].get("author"), Some(&Value::Null));
    assert_eq!(
        posts[1].get("author").and_then(|a| a.get("name")),
        Some(&json!("Bob"))
    );
}

#[tokio::test]
async fn expansion_is_one_level_only() {
    let fx = fixture().await;
    let alice = CrudService::create(
        &fx.store,
        &fx.user,
        &fields(json!({"name": "Alice", "email": "alice@example.com"})),
    )
    .await
    .unwrap();
    let post = CrudService::create(
        &fx.store,
        &fx.post,
        &fields(json!({"title": "P1", "content": "C1", "author": id_of(&alice)})),
    )
    .await
    .unwrap();
    CrudService::create(
        &fx.store,
        &fx.comment,
        &fields(json!({"content": "Nice", "post": id_of(&post), "author": id_of(&alice)})),
    )
    .await
    .unwrap();

    let comments = CrudService::list(&fx.store, &fx.comment).await.unwrap();
    let embedded_post = comments[0].get("post").unwrap();
    assert_eq!(embedded_post.get("title"), Some(&json!("P1")));
    // The embedded post's own author reference stays a raw identifier.
    assert_eq!(embedded_post.get("author"), Some(&json!(id_of(&alice))));
}

#[tokio::test]
async fn end_to_end_scenario() {
    let fx = fixture().await;
    let alice = CrudService::create(
        &fx.store,
        &fx.user,
        &fields(json!({"name": "Alice", "email": "alice@example.com", "age": 30})),
    )
    .await
    .unwrap();
    let u1 = id_of(&alice);

    let post = CrudService::create(
        &fx.store,
        &fx.post,
        &fields(json!({"title": "P1", "content": "C1", "author": u1.clone()})),
    )
    .await
    .unwrap();
    assert!(!id_of(&post).is_empty());

    let posts = CrudService::list(&fx.store, &fx.post).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].get("author"), Some(&alice));

    CrudService::delete(&fx.store, &fx.user, &u1).await.unwrap();
    let posts = CrudService::list(&fx.store, &fx.post).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].get("author"), Some(&Value::Null));
}
