use fnapi::http::{header, Body, HeaderValue, Request, Response, StatusCode};
use fnapi::{File, FormConfig, Json, MethodFactory, ParamSpec};

use serde_json::{json, Value};

const BOUNDARY: &str = "fnapi-test-boundary";

enum Part<'a> {
    Value(&'a str, &'a str),
    File(&'a str, &'a str, &'a str),
}

fn multipart(uri: &str, parts: &[Part<'_>]) -> Request {
    let mut raw = String::new();

    for part in parts {
        raw.push_str(&format!("--{}\r\n", BOUNDARY));
        match part {
            Part::Value(name, value) => {
                raw.push_str(&format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name));
                raw.push_str(value);
            }
            Part::File(name, file_name, content) => {
                raw.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    name, file_name
                ));
                raw.push_str("Content-Type: application/octet-stream\r\n\r\n");
                raw.push_str(content);
            }
        }
        raw.push_str("\r\n");
    }
    raw.push_str(&format!("--{}--\r\n", BOUNDARY));

    let mut req = Request::new(Body::from(raw));
    *req.method_mut() = fnapi::http::Method::POST;
    *req.uri_mut() = uri.parse().unwrap();
    req.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&format!("multipart/form-data; boundary={}", BOUNDARY)).unwrap(),
    );
    req
}

async fn json(res: Response) -> Value {
    let bytes = res.into_body().collect(usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn describe(title: String, file: File) -> Json<Value> {
    let data = file.data().ok().map(|data| String::from_utf8_lossy(&data).into_owned());

    Json(json!({
        "title": title,
        "valid": file.is_valid(),
        "name": file.file_name(),
        "data": data,
        "on_disk": file.is_on_disk(),
    }))
}

fn params(required: bool) -> Vec<ParamSpec> {
    let file = ParamSpec::file("upload");
    vec![
        ParamSpec::string("title"),
        if required { file.required() } else { file },
    ]
}

#[tokio::test]
async fn upload() {
    let method = MethodFactory::new().build("/upload", describe, false, params(true));

    let req = multipart(
        "/upload?title=query",
        &[Part::Value("title", "report"), Part::File("upload", "report.txt", "line one")],
    );
    let res = method.serve(req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        json(res).await,
        json!({
            "title": "report",
            "valid": true,
            "name": "report.txt",
            "data": "line one",
            "on_disk": false,
        })
    );
}

#[tokio::test]
async fn missing_file() {
    let method = MethodFactory::new().build("/upload", describe, false, params(true));
    let res = method
        .serve(multipart("/upload", &[Part::Value("title", "x")]))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let method = MethodFactory::new().build("/upload", describe, false, params(false));
    let res = method
        .serve(multipart("/upload", &[Part::Value("title", "x")]))
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body = json(res).await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn spill_to_disk() {
    let content = "x".repeat(64);

    let method = MethodFactory::new()
        .form_config(FormConfig::new().memory_limit(16))
        .build("/upload", describe, false, params(true));

    let res = method
        .serve(multipart("/upload", &[Part::File("upload", "big.bin", &content)]))
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body = json(res).await;
    assert_eq!(body["on_disk"], true);
    assert_eq!(body["data"], content.as_str());
    assert_eq!(body["title"], "");
}

#[tokio::test]
async fn malformed_multipart() {
    fn garbage() -> Request {
        let mut req = Request::new(Body::from("garbage"));
        *req.uri_mut() = "/upload?title=from-query".parse().unwrap();
        req.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=nope"),
        );
        req
    }

    let method = MethodFactory::new().build("/upload", describe, false, params(false));
    let res = method.serve(garbage()).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body = json(res).await;
    assert_eq!(body["title"], "from-query");
    assert_eq!(body["valid"], false);

    let method = MethodFactory::new().build("/upload", describe, false, params(true));
    let res = method.serve(garbage()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn urlencoded() {
    async fn sum(a: i64, b: i64) -> Json<i64> {
        Json(a + b)
    }

    let method = MethodFactory::new().build(
        "/sum",
        sum,
        false,
        vec![ParamSpec::int("a").required(), ParamSpec::int("b").required()],
    );

    let mut req = Request::new(Body::from("a=40"));
    *req.method_mut() = fnapi::http::Method::POST;
    *req.uri_mut() = "/sum?a=1&b=2".parse().unwrap();
    req.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );

    let res = method.serve(req).await;
    assert_eq!(json(res).await, json!(42));
}
