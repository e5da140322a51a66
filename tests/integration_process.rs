use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tower::util::ServiceExt;

use gridmill::api::handlers::AppState;
use gridmill::api::routes::create_router;
use gridmill::services::ingestion::IngestionService;

const API_KEY: &str = "supersecret";

fn app() -> Router {
    let state = Arc::new(AppState {
        api_key: API_KEY.to_string(),
        service: IngestionService::with_defaults(),
    });
    create_router(state)
}

fn put_process(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri("/process")
        .header(header::AUTHORIZATION, format!("Bearer {}", API_KEY))
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let bytes = body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Builds a one-page PDF around the given content operations.
fn build_pdf(ops: Vec<Operation>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let content = Content { operations: ops };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().unwrap(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

fn show_text(text: &str, x: i64, y: i64) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ]
}

/// A page with a ruled 3x2 grid holding a small tariff table.
fn tariff_pdf() -> Vec<u8> {
    let mut ops = Vec::new();

    let ys: [i64; 4] = [700, 650, 600, 550];
    for y in ys {
        ops.push(Operation::new("m", vec![50.into(), y.into()]));
        ops.push(Operation::new("l", vec![550.into(), y.into()]));
        ops.push(Operation::new("S", vec![]));
    }
    let xs: [i64; 3] = [50, 300, 550];
    for x in xs {
        ops.push(Operation::new("m", vec![x.into(), 550.into()]));
        ops.push(Operation::new("l", vec![x.into(), 700.into()]));
        ops.push(Operation::new("S", vec![]));
    }

    let cells: [(&str, i64, i64); 6] = [
        ("Country", 60, 670),
        ("Price", 310, 670),
        ("Argentine", 60, 620),
        ("0,27 EUR", 310, 620),
        ("Brazil", 60, 570),
        ("0,19 EUR", 310, 570),
    ];
    for (text, x, y) in cells {
        ops.extend(show_text(text, x, y));
    }

    build_pdf(ops)
}

/// A page of prose with no table structure at all.
fn prose_pdf() -> Vec<u8> {
    let mut ops = Vec::new();
    let lines: [(&str, i64); 3] = [
        ("Terms and conditions of the service.", 700),
        ("All tariffs are subject to change.", 680),
        ("Contact support for further details.", 660),
    ];
    for (text, y) in lines {
        ops.extend(show_text(text, 72, y));
    }
    build_pdf(ops)
}

#[tokio::test]
async fn test_health_probe() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json, serde_json::json!({"ok": true}));
}

#[tokio::test]
async fn test_missing_auth_is_401() {
    let req = Request::builder()
        .method("PUT")
        .uri("/process")
        .body(Body::from("data"))
        .unwrap();

    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_token_is_403() {
    let req = Request::builder()
        .method("PUT")
        .uri("/process")
        .header(header::AUTHORIZATION, "Bearer wrong")
        .body(Body::from("data"))
        .unwrap();

    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_empty_body_is_400() {
    let resp = app().oneshot(put_process(Vec::new())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_plain_text_body() {
    let mut req = put_process(b"hello world".to_vec());
    req.headers_mut()
        .insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
    req.headers_mut()
        .insert("x-filename", "note.txt".parse().unwrap());

    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = json_body(resp).await;
    let docs = json.as_array().unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["page_content"], "hello world");
    assert_eq!(docs[0]["metadata"]["format"], "basic_text");
    assert_eq!(docs[0]["metadata"]["source"], "note.txt");
}

#[tokio::test]
async fn test_missing_filename_uses_default_source() {
    let resp = app().oneshot(put_process(b"some text".to_vec())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = json_body(resp).await;
    assert_eq!(json[0]["metadata"]["source"], "uploaded");
}

#[tokio::test]
async fn test_structured_pdf_emits_snapshot_then_rows() {
    let mut req = put_process(tariff_pdf());
    req.headers_mut()
        .insert(header::CONTENT_TYPE, "application/pdf".parse().unwrap());
    req.headers_mut()
        .insert("x-filename", "tarifs.pdf".parse().unwrap());

    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = json_body(resp).await;
    let docs = json.as_array().unwrap();
    assert_eq!(docs.len(), 3, "snapshot + one document per data row");

    // Snapshot first.
    assert_eq!(docs[0]["metadata"]["format"], "table_md");
    let md = docs[0]["page_content"].as_str().unwrap();
    assert!(md.contains("| Country | Price |"));
    assert!(md.contains("| Argentine | 0,27 EUR |"));

    // Then row documents in row order.
    assert_eq!(docs[1]["metadata"]["format"], "row_kv");
    assert!(docs[1]["page_content"]
        .as_str()
        .unwrap()
        .starts_with("Country: Argentine"));
    assert!(docs[2]["page_content"]
        .as_str()
        .unwrap()
        .starts_with("Country: Brazil"));

    // All three share one table identity on page 1, table 1.
    let id = docs[0]["metadata"]["table_id"].as_str().unwrap();
    assert!(id.starts_with("p001_t001_"));
    for doc in docs {
        assert_eq!(doc["metadata"]["table_id"].as_str().unwrap(), id);
        assert_eq!(doc["metadata"]["source"], "tarifs.pdf");
        assert_eq!(doc["metadata"]["page"], 1);
        assert!(!doc["page_content"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_structured_pdf_is_deterministic() {
    let body = tariff_pdf();

    let mut first = None;
    for _ in 0..2 {
        let mut req = put_process(body.clone());
        req.headers_mut()
            .insert(header::CONTENT_TYPE, "application/pdf".parse().unwrap());
        let resp = app().oneshot(req).await.unwrap();
        let json = json_body(resp).await;
        match &first {
            None => first = Some(json),
            Some(prev) => assert_eq!(prev, &json),
        }
    }
}

#[tokio::test]
async fn test_tableless_pdf_falls_back_to_text() {
    let mut req = put_process(prose_pdf());
    req.headers_mut()
        .insert(header::CONTENT_TYPE, "application/pdf".parse().unwrap());
    req.headers_mut()
        .insert("x-filename", "terms.pdf".parse().unwrap());

    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = json_body(resp).await;
    let docs = json.as_array().unwrap();
    assert!(!docs.is_empty(), "fallback must never return an empty array");
    for doc in docs {
        assert_eq!(doc["metadata"]["format"], "fallback_text");
        assert_eq!(doc["metadata"]["source"], "terms.pdf");
        assert!(!doc["page_content"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_garbage_pdf_yields_ocr_hint() {
    let mut req = put_process(b"%PDF-1.4 not really".to_vec());
    req.headers_mut()
        .insert(header::CONTENT_TYPE, "application/pdf".parse().unwrap());
    req.headers_mut()
        .insert("x-filename", "scan.pdf".parse().unwrap());

    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = json_body(resp).await;
    let docs = json.as_array().unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["metadata"]["format"], "fallback_text");
    assert!(docs[0]["page_content"].as_str().unwrap().contains("OCR"));
}
