//! In-process stand-in for the blog backend. Records every request it sees
//! and can be told to fail the next one.

use std::sync::{Arc, Mutex};

use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, Request},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Extension, Json, Router,
};
use chrono::{Duration, Utc};
use hmstores_blog_client::{Config, HttpBlogRepo};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub type Shared = Arc<Mutex<Backend>>;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Clone)]
pub enum Failure {
    Logic(i64, Option<&'static str>),
    Http(StatusCode),
    Garbage,
}

#[derive(Debug, Default)]
pub struct Backend {
    /// Newest first, like the real listing.
    pub blogs: Vec<Value>,
    pub requests: Vec<RecordedRequest>,
    pub fail_next: Option<Failure>,
    pub upload_files: Vec<String>,
}

pub struct MockServer {
    pub base: String,
    pub backend: Shared,
}

impl MockServer {
    pub async fn start() -> MockServer {
        super::init_tracing();

        let backend: Shared = Arc::new(Mutex::new(Backend {
            upload_files: vec!["uploads/blogs/x.png".to_string()],
            ..Backend::default()
        }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = create_routes(backend.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockServer {
            base: format!("http://{addr}"),
            backend,
        }
    }

    pub fn config(&self) -> Arc<Config> {
        Arc::new(Config::new(&self.base).unwrap())
    }

    pub fn repo(&self) -> Arc<HttpBlogRepo> {
        Arc::new(HttpBlogRepo::new(self.config()).unwrap())
    }

    /// Adds `count` posts by `author`, oldest first, so the last one seeded
    /// heads the listing.
    pub fn seed(&self, author: &str, count: usize) -> Vec<String> {
        let mut backend = self.backend.lock().unwrap();
        (0..count)
            .map(|n| {
                let id = Uuid::now_v7().to_string();
                let blog = json!({
                    "id": id,
                    "title": format!("{author} post {n}"),
                    "content": format!("<p>Story number {n} from {author}</p>"),
                    "image": format!("uploads/blogs/{n}.png"),
                    "author": author,
                    "publishDate": (Utc::now() - Duration::minutes((count - n) as i64)).to_rfc3339(),
                    "totalLike": n as u64,
                    "totalComment": 0
                });
                backend.blogs.insert(0, blog);
                id
            })
            .collect()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.backend.lock().unwrap().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.backend.lock().unwrap().requests.clear();
    }

    pub fn fail_next(&self, failure: Failure) {
        self.backend.lock().unwrap().fail_next = Some(failure);
    }

    pub fn set_upload_files(&self, files: Vec<String>) {
        self.backend.lock().unwrap().upload_files = files;
    }
}

fn create_routes(backend: Shared) -> Router {
    Router::new()
        .route("/api/v1/blogs", get(list))
        .route("/api/v1/blogs/get-by-author", get(list_by_author))
        .route("/api/v1/blogs/get-detail", get(get_detail))
        .route("/api/v1/blogs/create", post(create))
        .route("/api/v1/blogs/edit/{id}", patch(edit))
        .route("/api/v1/blogs/delete/{id}", delete(delete_blog))
        .route("/api/v1/upload", post(upload))
        .layer(middleware::from_fn(record))
        .layer(Extension(backend))
        .layer(TraceLayer::new_for_http())
}

async fn record(Extension(backend): Extension<Shared>, req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    let header = |name: header::HeaderName| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let failure = {
        let mut backend = backend.lock().unwrap();
        backend.requests.push(RecordedRequest {
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(str::to_string),
            authorization: header(header::AUTHORIZATION),
            content_type: header(header::CONTENT_TYPE),
            body: bytes.to_vec(),
        });
        backend.fail_next.take()
    };

    match failure {
        Some(Failure::Logic(code, message)) => {
            Json(json!({ "statusCode": code, "message": message, "data": null })).into_response()
        }
        Some(Failure::Http(status)) => (status, "upstream exploded").into_response(),
        Some(Failure::Garbage) => (StatusCode::OK, "<html>not json</html>").into_response(),
        None => next.run(Request::from_parts(parts, Body::from(bytes))).await,
    }
}

fn ok(data: Value) -> Json<Value> {
    Json(json!({ "statusCode": 200, "message": "Success", "data": data }))
}

fn not_found() -> Json<Value> {
    Json(json!({ "statusCode": 404, "message": "Blog not found", "data": null }))
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(rename = "pageNumber")]
    page_number: usize,
    #[serde(rename = "pageSize")]
    page_size: usize,
    search: Option<String>,
    filter: Option<String>,
}

fn page_of(blogs: Vec<Value>, query: &ListQuery) -> Value {
    let mut blogs = blogs;
    if let Some(search) = &query.search {
        let needle = search.to_lowercase();
        blogs.retain(|b| b["title"].as_str().unwrap_or("").to_lowercase().contains(&needle));
    }
    if query.filter.as_deref() == Some("popular") {
        blogs.sort_by_key(|b| std::cmp::Reverse(b["totalLike"].as_u64().unwrap_or(0)));
    }

    let total_count = blogs.len();
    let total_pages = total_count.div_ceil(query.page_size);
    let items: Vec<Value> = blogs
        .into_iter()
        .skip((query.page_number - 1) * query.page_size)
        .take(query.page_size)
        .collect();

    json!({ "items": items, "totalPages": total_pages, "totalCount": total_count })
}

async fn list(
    Extension(backend): Extension<Shared>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let blogs = backend.lock().unwrap().blogs.clone();
    ok(page_of(blogs, &query))
}

async fn list_by_author(
    Extension(backend): Extension<Shared>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response {
    let Some(author) = bearer(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let blogs: Vec<Value> = backend
        .lock()
        .unwrap()
        .blogs
        .iter()
        .filter(|b| b["author"] == author.as_str())
        .cloned()
        .collect();
    ok(page_of(blogs, &query)).into_response()
}

#[derive(Debug, Deserialize)]
struct DetailQuery {
    #[serde(rename = "blogID")]
    blog_id: String,
}

async fn get_detail(
    Extension(backend): Extension<Shared>,
    Query(query): Query<DetailQuery>,
) -> impl IntoResponse {
    let backend = backend.lock().unwrap();
    match backend.blogs.iter().find(|b| b["id"] == query.blog_id.as_str()) {
        Some(blog) => ok(blog.clone()),
        None => not_found(),
    }
}

async fn create(
    Extension(backend): Extension<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let blog = json!({
        "id": Uuid::now_v7().to_string(),
        "title": body["title"],
        "content": body["content"],
        "image": body["image"],
        "author": bearer(&headers).unwrap_or_else(|| "anonymous".to_string()),
        "publishDate": Utc::now().to_rfc3339(),
        "totalLike": 0,
        "totalComment": 0
    });
    backend.lock().unwrap().blogs.insert(0, blog.clone());
    ok(blog)
}

async fn edit(
    Extension(backend): Extension<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let mut backend = backend.lock().unwrap();
    let Some(blog) = backend.blogs.iter_mut().find(|b| b["id"] == id.as_str()) else {
        return not_found();
    };
    for field in ["title", "content", "image"] {
        if let Some(value) = body.get(field) {
            blog[field] = value.clone();
        }
    }
    ok(blog.clone())
}

async fn delete_blog(
    Extension(backend): Extension<Shared>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut backend = backend.lock().unwrap();
    let before = backend.blogs.len();
    backend.blogs.retain(|b| b["id"] != id.as_str());
    if backend.blogs.len() == before {
        return not_found();
    }
    ok(Value::Bool(true))
}

async fn upload(Extension(backend): Extension<Shared>, _body: Bytes) -> impl IntoResponse {
    let files = backend.lock().unwrap().upload_files.clone();
    ok(json!({ "files": files }))
}
