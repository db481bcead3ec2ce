use std::time::Duration;

use unwatch_engine::{
    FailureKind, FetchSettings, HttpItemRemover, HttpPageLoader, ItemHandle, ItemRemover,
    PageLoader,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn item(target: String) -> ItemHandle {
    ItemHandle {
        index: 0,
        target,
        label: None,
    }
}

#[tokio::test]
async fn loader_returns_decoded_html_and_final_location() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/watches"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            b"<html>caf\xe9</html>".to_vec(),
            "text/html; charset=ISO-8859-1",
        ))
        .mount(&server)
        .await;

    let loader = HttpPageLoader::new(FetchSettings::default()).unwrap();
    let location = format!("{}/users/watches?start=20", server.uri());

    let page = loader.load(&location).await.expect("load ok");
    assert_eq!(page.location, location);
    assert_eq!(page.html, "<html>café</html>");
    assert_eq!(page.encoding_label, "windows-1252");
}

#[tokio::test]
async fn loader_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/watches"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let loader = HttpPageLoader::new(FetchSettings::default()).unwrap();
    let err = loader
        .load(&format!("{}/users/watches", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(403));
}

#[tokio::test]
async fn loader_rejects_non_html() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/watches"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .mount(&server)
        .await;

    let loader = HttpPageLoader::new(FetchSettings::default()).unwrap();
    let err = loader
        .load(&format!("{}/users/watches", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::UnsupportedContentType {
            content_type: "application/json".into()
        }
    );
}

#[tokio::test]
async fn loader_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_raw("<html></html>", "text/html"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let loader = HttpPageLoader::new(settings).unwrap();
    let err = loader
        .load(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn remover_requests_link_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/unwatch"))
        .and(query_param("id", "11"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let remover = HttpItemRemover::new(&FetchSettings::default()).unwrap();
    remover
        .remove(&item(format!("{}/users/unwatch?id=11", server.uri())))
        .await
        .expect("removal ok");
}

#[tokio::test]
async fn remover_reports_failed_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/unwatch"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let remover = HttpItemRemover::new(&FetchSettings::default()).unwrap();
    let target = format!("{}/users/unwatch?id=12", server.uri());
    let err = remover.remove(&item(target.clone())).await.unwrap_err();
    assert_eq!(err.target, target);
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}
