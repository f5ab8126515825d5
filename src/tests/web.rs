use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use url::form_urlencoded;

use super::site;
use crate::config::Config;
use crate::web::{is_ajax, router};

fn app() -> Router {
    router(Arc::new(Config::default()))
}

fn form_body(url: &str) -> Body {
    Body::from(
        form_urlencoded::Serializer::new(String::new())
            .append_pair("url", url)
            .finish(),
    )
}

fn ajax_form(url: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("X-Requested-With", "XMLHttpRequest")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(form_body(url))
        .unwrap()
}

async fn read_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
pub fn test_ajax_marker() {
    let mut headers = axum::http::HeaderMap::new();
    assert!(!is_ajax(&headers));

    headers.insert("x-requested-with", "xmlhttprequest".parse().unwrap());
    assert!(is_ajax(&headers));

    headers.insert("x-requested-with", "fetch".parse().unwrap());
    assert!(!is_ajax(&headers));
}

#[tokio::test(flavor = "multi_thread")]
pub async fn test_get_renders_page() {
    let resp = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("<form id=\"urlForm\""));
}

#[tokio::test(flavor = "multi_thread")]
pub async fn test_post_without_marker_renders_page() {
    let req = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(form_body("https://example.com"))
        .unwrap();

    let resp = app().oneshot(req).await.unwrap();

    assert!(resp.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
}

#[tokio::test(flavor = "multi_thread")]
pub async fn test_invalid_url_envelope() {
    let resp = app().oneshot(ajax_form("not a url")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(
        read_json(resp).await,
        json!({"success": false, "message": "Please enter a valid URL."})
    );
}

#[tokio::test(flavor = "multi_thread")]
pub async fn test_unreadable_body_is_a_missing_url() {
    let req = Request::builder()
        .method("POST")
        .uri("/")
        .header("X-Requested-With", "XMLHttpRequest")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(
        read_json(resp).await,
        json!({"success": false, "message": "Please enter a valid URL."})
    );
}

#[tokio::test(flavor = "multi_thread")]
pub async fn test_form_request_end_to_end() {
    let addr = site::spawn();
    let url = format!("http://{addr}/news/article");

    let resp = app().oneshot(ajax_form(&url)).await.unwrap();
    let body = read_json(resp).await;

    let favicon: String = form_urlencoded::byte_serialize(url.as_bytes()).collect();
    assert_eq!(
        body,
        json!({
            "success": true,
            "headline": "Big Story",
            "card_image": "https://news.example/img.jpg",
            "website_name": "127.0.0.1",
            "original_url": url,
            "favicon": format!("https://www.google.com/s2/favicons?domain={favicon}"),
        })
    );
}

#[tokio::test(flavor = "multi_thread")]
pub async fn test_json_request_fetch_failure() {
    let addr = site::spawn();

    let req = Request::builder()
        .method("POST")
        .uri("/")
        .header("X-Requested-With", "XMLHttpRequest")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"url": format!("http://{addr}/missing")}).to_string(),
        ))
        .unwrap();

    let resp = app().oneshot(req).await.unwrap();
    let body = read_json(resp).await;

    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().unwrap().contains("404"));
    assert!(body.get("headline").is_none());
}

#[tokio::test(flavor = "multi_thread")]
pub async fn test_json_content_type_is_case_insensitive() {
    let addr = site::spawn();

    let req = Request::builder()
        .method("POST")
        .uri("/")
        .header("X-Requested-With", "XMLHttpRequest")
        .header(header::CONTENT_TYPE, "Application/JSON; charset=UTF-8")
        .body(Body::from(
            json!({"url": format!("http://{addr}/news/article")}).to_string(),
        ))
        .unwrap();

    let resp = app().oneshot(req).await.unwrap();
    let body = read_json(resp).await;

    assert_eq!(body["success"], json!(true));
    assert_eq!(body["headline"], json!("Big Story"));
}

#[tokio::test(flavor = "multi_thread")]
pub async fn test_json_suffix_content_type() {
    let addr = site::spawn();

    let req = Request::builder()
        .method("POST")
        .uri("/")
        .header("X-Requested-With", "XMLHttpRequest")
        .header(header::CONTENT_TYPE, "application/vnd.card+json")
        .body(Body::from(
            json!({"url": format!("http://{addr}/news/plain")}).to_string(),
        ))
        .unwrap();

    let resp = app().oneshot(req).await.unwrap();
    let body = read_json(resp).await;

    assert_eq!(body["success"], json!(true));
    assert_eq!(body["headline"], json!("Plain page"));
}
