use drive_agent_test_support::{CannedResponse, MockServer, pick_unused_port};
use drive_agent_tools::config::DriveClientConfig;
use drive_agent_tools::context::ExecutionContext;
use drive_agent_tools::credentials::{CredentialChain, auth_state_key};
use drive_agent_tools::runtime::{
    DriveFileLister, ErrorKind, ListingOutcome, MISSING_CREDENTIAL_MESSAGE, NO_FILES_MESSAGE,
};
use serde_json::json;
use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
use tokio::net::TcpListener;

/// Platform chain whose environment only knows `DRIVE_ACCESS_TOKEN=<env_token>`.
fn platform_chain(env_token: Option<&'static str>) -> CredentialChain {
    CredentialChain::platform_default_with_env(move |name| {
        env_token
            .filter(|_| name == "DRIVE_ACCESS_TOKEN")
            .map(str::to_string)
    })
}

fn lister_for(server: &MockServer, credentials: CredentialChain) -> DriveFileLister {
    DriveFileLister::new(
        DriveClientConfig::with_base_url(server.base_url()),
        credentials,
    )
    .expect("valid lister config")
}

fn ctx_with_token(token: &str) -> ExecutionContext {
    ExecutionContext::new().with_state(auth_state_key(), token)
}

#[tokio::test]
async fn missing_token_returns_auth_message_without_calling_api() -> anyhow::Result<()> {
    let server = MockServer::start(CannedResponse::json(200, &json!({"files": []}))).await?;
    let lister = lister_for(&server, platform_chain(None));

    let text = lister
        .list_drive_files("show my files", &ExecutionContext::new())
        .await;

    assert_eq!(text, MISSING_CREDENTIAL_MESSAGE);
    assert!(server.requests().is_empty());
    server.shutdown().await
}

#[tokio::test]
async fn empty_listing_returns_no_files_message() -> anyhow::Result<()> {
    let server = MockServer::start(CannedResponse::json(200, &json!({"files": []}))).await?;
    let lister = lister_for(&server, platform_chain(None));

    let outcome = lister.list("", &ctx_with_token("tok")).await;

    assert!(matches!(outcome, ListingOutcome::Empty));
    assert_eq!(outcome.render(), NO_FILES_MESSAGE);
    server.shutdown().await
}

#[tokio::test]
async fn files_are_rendered_one_per_line_in_order() -> anyhow::Result<()> {
    let server = MockServer::start(CannedResponse::json(
        200,
        &json!({
            "nextPageToken": "page-2",
            "files": [{"id": "1", "name": "a.txt"}, {"id": "2", "name": "b.txt"}]
        }),
    ))
    .await?;
    let lister = lister_for(&server, platform_chain(None));

    let text = lister.list_drive_files("ignored", &ctx_with_token("tok")).await;

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec!["Google Driveのファイル一覧:", "- a.txt (ID: 1)", "- b.txt (ID: 2)"]
    );
    // Only the first page is read even when more are available.
    assert_eq!(server.requests().len(), 1);
    server.shutdown().await
}

#[tokio::test]
async fn request_carries_bearer_token_and_fixed_query() -> anyhow::Result<()> {
    let server = MockServer::start(CannedResponse::json(200, &json!({"files": []}))).await?;
    let lister = lister_for(&server, platform_chain(None));

    let _ = lister.list("pdfs from last week", &ctx_with_token("ctx-token")).await;

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method, "GET");
    assert_eq!(req.path, "/drive/v3/files");
    assert_eq!(req.authorization.as_deref(), Some("Bearer ctx-token"));
    assert_eq!(req.query_param("pageSize").as_deref(), Some("15"));
    assert_eq!(
        req.query_param("fields").as_deref(),
        Some("nextPageToken,files(id,name)")
    );
    // The query text is never forwarded.
    assert_eq!(req.query_param("q"), None);
    server.shutdown().await
}

#[tokio::test]
async fn forbidden_json_error_surfaces_api_message() -> anyhow::Result<()> {
    let server = MockServer::start(CannedResponse::json(
        403,
        &json!({"error": {"code": 403, "message": "Insufficient permission"}}),
    ))
    .await?;
    let lister = lister_for(&server, platform_chain(None));

    let outcome = lister.list("", &ctx_with_token("tok")).await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::HttpStatus));
    let text = outcome.render();
    assert!(text.contains("Insufficient permission"), "got: {text}");
    assert!(text.starts_with("API Error: "));
    server.shutdown().await
}

#[tokio::test]
async fn server_error_with_html_body_surfaces_status_code() -> anyhow::Result<()> {
    let server = MockServer::start(CannedResponse::text(500, "<html>backend down</html>")).await?;
    let lister = lister_for(&server, platform_chain(None));

    let outcome = lister.list("", &ctx_with_token("tok")).await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::HttpStatus));
    let text = outcome.render();
    assert!(text.contains("500"), "got: {text}");
    assert_eq!(text, "API Error: 500 Internal Server Error");
    server.shutdown().await
}

#[tokio::test]
async fn drive_access_token_is_used_when_context_is_empty() -> anyhow::Result<()> {
    let server = MockServer::start(CannedResponse::json(200, &json!({"files": []}))).await?;
    let lister = lister_for(&server, platform_chain(Some("env-token")));

    let _ = lister.list("", &ctx_with_token("")).await;
    let _ = lister.list("", &ExecutionContext::new()).await;

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    for req in &requests {
        assert_eq!(req.authorization.as_deref(), Some("Bearer env-token"));
    }
    server.shutdown().await
}

#[tokio::test]
async fn context_token_wins_over_drive_access_token() -> anyhow::Result<()> {
    let server = MockServer::start(CannedResponse::json(200, &json!({"files": []}))).await?;
    let lister = lister_for(&server, platform_chain(Some("env-token")));

    let _ = lister.list("", &ctx_with_token("ctx-token")).await;

    let requests = server.requests();
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer ctx-token"));
    server.shutdown().await
}

#[tokio::test]
async fn connection_failure_is_a_transport_error() -> anyhow::Result<()> {
    let port = pick_unused_port()?;
    let lister = DriveFileLister::new(
        DriveClientConfig::with_base_url(format!("http://127.0.0.1:{port}")),
        platform_chain(None),
    )?;

    let outcome = lister.list("", &ctx_with_token("tok")).await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::Transport));
    let text = outcome.render();
    assert!(text.starts_with("APIリクエストエラー: "), "got: {text}");
    assert!(!text.contains("pageSize"), "query must be redacted: {text}");
    assert!(
        text.to_ascii_lowercase().contains("refused"),
        "underlying cause must be kept: {text}"
    );
    Ok(())
}

#[tokio::test]
async fn malformed_success_body_is_unexpected() -> anyhow::Result<()> {
    let server = MockServer::start(CannedResponse::text(200, "not json")).await?;
    let lister = lister_for(&server, platform_chain(None));

    let outcome = lister.list("", &ctx_with_token("tok")).await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::Unexpected));
    assert!(outcome.render().starts_with("予期せぬエラーが発生しました: "));
    server.shutdown().await
}

#[tokio::test]
async fn non_json_error_keeps_server_reason_phrase() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await?;
        let mut request = Vec::new();
        let mut buf = [0_u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let body = "quota exhausted";
        let response = format!(
            "HTTP/1.1 429 Slow Down Please\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await?;
        stream.shutdown().await
    });

    let lister = DriveFileLister::new(
        DriveClientConfig::with_base_url(format!("http://{addr}")),
        platform_chain(None),
    )?;
    let outcome = lister.list("", &ctx_with_token("tok")).await;

    assert_eq!(outcome.render(), "API Error: 429 Slow Down Please");
    server.await??;
    Ok(())
}
