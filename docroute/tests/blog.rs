use docroute::prelude::*;
use serde_json::{Value, json};

async fn list_posts(ctx: RequestContext, res: ResponseBuilder, store: DocumentStore) -> HandlerResult {
    let page = store.collection("posts").query_page(&ctx.to_query()).await?;
    res.json(&page)
}

async fn show_post(ctx: RequestContext, res: ResponseBuilder, store: DocumentStore) -> HandlerResult {
    let id = ctx.param("id").unwrap_or_default();

    match store.collection("posts").get(id).await? {
        Some(post) => res.json(&post),
        None => res.status(status::NOT_FOUND).json(&json!({ "error": "Post not found" })),
    }
}

async fn create_post(ctx: RequestContext, res: ResponseBuilder, store: DocumentStore) -> HandlerResult {
    let stored = store.collection("posts").add(ctx.record()?).await?;
    res.status(status::CREATED).json(&stored)
}

async fn update_post(ctx: RequestContext, res: ResponseBuilder, store: DocumentStore) -> HandlerResult {
    let id = ctx.param("id").unwrap_or_default().to_string();
    let posts = store.collection("posts");

    let Some(mut post) = posts.get(&id).await? else {
        return res.status(status::NOT_FOUND).json(&json!({ "error": "Post not found" }));
    };

    for (key, value) in ctx.record()? {
        if key != "id" {
            post.insert(key, value);
        }
    }

    res.json(&posts.update(post).await?)
}

async fn delete_post(ctx: RequestContext, res: ResponseBuilder, store: DocumentStore) -> HandlerResult {
    let deleted = store
        .collection("posts")
        .delete(ctx.param("id").unwrap_or_default())
        .await?;

    Ok(if deleted {
        res.status(status::NO_CONTENT).empty()
    } else {
        res.status(status::NOT_FOUND).text("Post not found")
    })
}

fn post_schema() -> Schema {
    Schema::new()
        .field("title", FieldRule::string().required().min_length(5).max_length(100))
        .field("content", FieldRule::string().required())
        .field("views", FieldRule::number().min(0.0))
}

fn blog_router() -> Router {
    Router::new()
        .get("/posts", list_posts)
        .post_with_schema("/posts", post_schema(), create_post)
        .get("/posts/:id", show_post)
        .put_with_schema("/posts/:id", post_schema(), update_post)
        .delete("/posts/:id", delete_post)
}

async fn blog() -> MockApi {
    MockApi::builder(blog_router())
        .seed_json(json!({
            "posts": [
                { "id": "1", "title": "Rust ownership", "content": "a", "author": "ana", "views": 30 },
                { "id": "2", "title": "Async traits", "content": "b", "author": "bo", "views": 10 },
                { "id": "3", "title": "Borrow checker", "content": "c", "author": "ana", "views": 20 },
                { "id": "4", "title": "Zero-cost abstractions", "content": "d", "author": "cy", "views": 10 },
            ]
        }))
        .build()
        .await
        .unwrap()
}

fn body(response: &Response) -> &Value {
    response.json().expect("json body")
}

#[tokio::test]
async fn create_rejects_short_title_then_accepts_valid_post() {
    let api = MockApi::builder(blog_router()).collection("posts").build().await.unwrap();

    let rejected = api
        .handle(Request::post("/posts").with_json(&json!({ "title": "Hi", "content": "x" })))
        .await;
    assert_eq!(rejected.status, status::BAD_REQUEST);
    assert_eq!(body(&rejected)["error"], "Validation failed");
    assert_eq!(
        body(&rejected)["errors"]["title"],
        json!(["must be at least 5 characters long"])
    );
    assert!(api.store().collection("posts").scan().await.unwrap().is_empty());

    let created = api
        .handle(
            Request::post("/posts")
                .with_json(&json!({ "title": "Hello world", "content": "First post" })),
        )
        .await;
    assert_eq!(created.status, status::CREATED);
    assert_eq!(created.header("Content-Type"), Some("application/json"));

    let id = body(&created)["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());
    assert_eq!(body(&created)["title"], "Hello world");

    let fetched = api.handle(Request::get(format!("/posts/{id}"))).await;
    assert_eq!(fetched.status, status::OK);
    assert_eq!(body(&fetched)["content"], "First post");
}

#[tokio::test]
async fn validation_reports_every_failing_field() {
    let api = blog().await;

    let response = api
        .handle(Request::post("/posts").with_json(&json!({ "title": 42, "views": -1 })))
        .await;

    assert_eq!(response.status, status::BAD_REQUEST);
    assert_eq!(
        body(&response)["errors"],
        json!({
            "title": ["must be of type string"],
            "content": ["is required"],
            "views": ["must be at least 0"],
        })
    );
}

#[tokio::test]
async fn missing_post_and_unknown_route_are_404() {
    let api = blog().await;

    let missing = api.handle(Request::get("/posts/nope")).await;
    assert_eq!(missing.status, status::NOT_FOUND);
    assert_eq!(body(&missing), &json!({ "error": "Post not found" }));

    let unrouted = api.handle(Request::get("/users")).await;
    assert_eq!(unrouted.status, status::NOT_FOUND);
    assert_eq!(
        body(&unrouted),
        &json!({ "error": "Not Found", "message": "No route for GET /users" })
    );

    let wrong_method = api.handle(Request::patch("/posts/1")).await;
    assert_eq!(wrong_method.status, status::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_sorts_and_paginates_from_query_string() {
    let api = blog().await;

    let response = api
        .handle(Request::get("/posts").with_query("author=ana&_sort=views&_order=asc"))
        .await;
    let ids = body(&response)["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|post| post["id"].as_str().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["3", "1"]);
    assert_eq!(body(&response)["count"], 2);

    let page = api
        .handle(Request::get("/posts?_sort=views&_order=desc&_page=2&_limit=2"))
        .await;
    let ids = body(&page)["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|post| post["id"].as_str().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["2", "4"]);
    assert_eq!(body(&page)["count"], 4);
    assert_eq!(body(&page)["previous_page"], 1);
    assert_eq!(body(&page)["next_page"], Value::Null);
}

#[tokio::test]
async fn numeric_query_values_match_numbers() {
    let api = blog().await;

    let response = api.handle(Request::get("/posts?views=10")).await;

    assert_eq!(body(&response)["count"], 2);
}

#[tokio::test]
async fn explicit_query_overrides_inline_query() {
    let api = blog().await;

    let response = api
        .handle(Request::get("/posts?author=bo").with_query("author=cy"))
        .await;

    assert_eq!(body(&response)["items"][0]["id"], "4");
    assert_eq!(body(&response)["count"], 1);
}

#[tokio::test]
async fn update_and_delete_round_trip() {
    let api = blog().await;

    let updated = api
        .handle(
            Request::put("/posts/2")
                .with_json(&json!({ "title": "Async traits, revisited", "content": "b2" })),
        )
        .await;
    assert_eq!(updated.status, status::OK);
    assert_eq!(body(&updated)["title"], "Async traits, revisited");
    assert_eq!(body(&updated)["author"], "bo");

    let deleted = api.handle(Request::delete("/posts/2")).await;
    assert_eq!(deleted.status, status::NO_CONTENT);
    assert_eq!(deleted.body, docroute::response::ResponseBody::Empty);

    let again = api.handle(Request::delete("/posts/2")).await;
    assert_eq!(again.status, status::NOT_FOUND);
    assert_eq!(again.text(), Some("Post not found"));
}

#[tokio::test]
async fn malformed_body_fails_validation_under_root() {
    let api = blog().await;

    let response = api.handle(Request::post("/posts").with_body("{not json")).await;

    assert_eq!(response.status, status::BAD_REQUEST);
    assert!(body(&response)["errors"]["$root"].is_array());
}

#[tokio::test]
async fn store_errors_become_internal_server_error() {
    let api = blog().await;

    // id "1" is already taken by the seed data
    let response = api
        .handle(
            Request::post("/posts")
                .with_json(&json!({ "id": "1", "title": "Duplicate", "content": "x" })),
        )
        .await;

    assert_eq!(response.status, status::INTERNAL_SERVER_ERROR);
    assert_eq!(body(&response), &json!({ "error": "Internal Server Error" }));
}

#[tokio::test]
async fn call_accepts_raw_parts() {
    let api = blog().await;

    let response = api
        .call("get", "/posts/3", None, None, Default::default())
        .await;
    assert_eq!(body(&response)["title"], "Borrow checker");

    let unsupported = api
        .call("OPTIONS", "/posts", None, None, Default::default())
        .await;
    assert_eq!(unsupported.status, status::NOT_FOUND);
    assert_eq!(body(&unsupported)["message"], "No route for OPTIONS /posts");
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
struct Post {
    id: String,
    title: String,
    views: i64,
}

impl Document for Post {
    fn collection_name() -> &'static str {
        "posts"
    }
}

#[tokio::test]
async fn typed_collection_round_trips() {
    docroute::init_tracing();
    let api = blog().await;
    let posts = api.store().typed_collection::<Post>();

    let seeded = posts.get("2").await.unwrap().unwrap();
    assert_eq!(seeded, Post { id: "2".into(), title: "Async traits".into(), views: 10 });

    let added = posts
        .add(Post { id: "9".into(), title: "Typed".into(), views: 0 })
        .await
        .unwrap();
    assert_eq!(added.id, "9");

    let fetched = api.handle(Request::get("/posts/9")).await;
    assert_eq!(body(&fetched)["title"], "Typed");

    let popular = posts
        .query(&Query::builder().filter("views", 10).build())
        .await
        .unwrap();
    assert_eq!(popular.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["2", "4"]);
}

#[tokio::test]
async fn dispatcher_validates_title_length_and_status_choice() {
    let schema = Schema::new()
        .field("title", FieldRule::string().required().min_length(5))
        .field("status", FieldRule::string().one_of(["draft", "published"]));
    let router = Router::new().post_with_schema("/posts", schema, create_post);
    let dispatcher = Dispatcher::new(router, DocumentStore::new(InMemoryStore::new()));

    let short = dispatcher
        .handle(Request::post("/posts").with_json(&json!({ "title": "ok", "status": "draft" })))
        .await;
    assert_eq!(short.status, status::BAD_REQUEST);
    assert_eq!(
        body(&short)["errors"],
        json!({ "title": ["must be at least 5 characters long"] })
    );

    let archived = dispatcher
        .handle(
            Request::post("/posts")
                .with_json(&json!({ "title": "A New Post", "status": "archived" })),
        )
        .await;
    assert_eq!(archived.status, status::BAD_REQUEST);
    assert_eq!(
        body(&archived)["errors"],
        json!({ "status": ["must be one of: draft, published"] })
    );

    let created = dispatcher
        .handle(
            Request::post("/posts").with_json(&json!({ "title": "A New Post", "status": "draft" })),
        )
        .await;
    assert_eq!(created.status, status::CREATED);
    assert_eq!(body(&created)["title"], "A New Post");
    assert_eq!(body(&created)["status"], "draft");

    let id = body(&created)["id"].as_str().unwrap();
    assert!(!id.is_empty());
    assert!(dispatcher.store().collection("posts").get(id).await.unwrap().is_some());
}
