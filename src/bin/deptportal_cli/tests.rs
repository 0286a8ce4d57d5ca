#![deny(clippy::all, clippy::pedantic)]

use std::sync::Arc;

use clap::Parser;
use deptportal::PortalClient;
use deptportal::cache::CacheConfig;
use deptportal::session::{CookieSession, SessionStore};
use deptportal::transport::HttpTransport;
use httpmock::MockServer;
use tempfile::NamedTempFile;
use url::Url;

use crate::args::{
    AuthCmd, BlogsCmd, Cli, Commands, DecisionArg, NoticesCmd, RecordsCmd, StageArg,
};
use crate::context::CliError;
use crate::handlers::{applications, auth, blogs, content, records};

fn client(server: &MockServer) -> (PortalClient, Arc<dyn SessionStore>) {
    let session: Arc<dyn SessionStore> = Arc::new(CookieSession::in_memory());
    let base = Url::parse(&server.url("/api/")).expect("url");
    let transport = HttpTransport::new(base, None, Arc::clone(&session)).expect("transport");
    let client = PortalClient::with_transport(
        Arc::new(transport),
        Arc::clone(&session),
        CacheConfig::default(),
    );
    (client, session)
}

fn tmp_file(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tmp file");
    std::io::Write::write_all(&mut file, contents).expect("write tmp");
    file
}

const USER: &str = r#"{"id":"u1","name":"Ada","email":"ada@example.edu","role":"STUDENT","permissions":[],"isVerified":true}"#;

#[test]
fn parses_global_overrides_after_subcommand() {
    let cli = Cli::parse_from([
        "deptportal-cli",
        "notices",
        "list",
        "--api-url",
        "https://portal.example/api/",
        "--limit",
        "5",
    ]);
    assert_eq!(
        cli.overrides.api_url.as_deref(),
        Some("https://portal.example/api/")
    );
    assert!(matches!(
        cli.command,
        Commands::Notices(ref args) if matches!(args.action, NoticesCmd::List { limit: Some(5), .. })
    ));
}

#[test]
fn read_value_prefers_file_over_inline() -> Result<(), CliError> {
    let file = tmp_file(b"from-file");
    let val = crate::io::read_value(Some("inline".into()), Some(file.path().to_path_buf()))?;
    assert_eq!(val, "from-file");
    Ok(())
}

#[test]
fn secret_requires_file_or_env() {
    let err = crate::io::read_secret(None, None).expect_err("missing password");
    assert!(matches!(err, CliError::InvalidInput(_)));
}

#[test]
fn uploads_carry_guessed_content_type() -> Result<(), CliError> {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("tmp file");
    std::fs::write(file.path(), b"png").expect("write tmp");
    let upload = crate::io::read_upload(file.path())?;
    assert_eq!(upload.content_type.as_deref(), Some("image/png"));
    assert_eq!(upload.bytes.as_ref(), b"png");
    Ok(())
}

#[tokio::test]
async fn login_stores_token_for_next_request() -> Result<(), CliError> {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method("POST")
            .path("/api/auth/login")
            .json_body(serde_json::json!({"email": "ada@example.edu", "password": "pw"}));
        then.status(200)
            .header("content-type", "application/json")
            .body(format!(r#"{{"data":{{"token":"tok-1","user":{USER}}}}}"#));
    });
    let me = server.mock(|when, then| {
        when.method("GET")
            .path("/api/auth/me")
            .header("authorization", "Bearer tok-1");
        then.status(200)
            .header("content-type", "application/json")
            .body(format!(r#"{{"data":{USER}}}"#));
    });

    let (client, session) = client(&server);
    auth::handle(
        &client,
        AuthCmd::Login {
            email: "ada@example.edu".into(),
            password_file: None,
            password_env: Some("pw".into()),
        },
    )
    .await?;
    assert_eq!(session.token().as_deref(), Some("tok-1"));

    auth::handle(&client, AuthCmd::Me).await?;
    login.assert();
    me.assert();
    Ok(())
}

#[tokio::test]
async fn logout_clears_session_even_when_server_fails() -> Result<(), CliError> {
    let server = MockServer::start();
    let logout = server.mock(|when, then| {
        when.method("POST").path("/api/auth/logout");
        then.status(500).body("boom");
    });

    let (client, session) = client(&server);
    session.store_token("tok-1").expect("store token");
    auth::handle(&client, AuthCmd::Logout).await?;

    logout.assert();
    assert!(session.token().is_none());
    Ok(())
}

#[tokio::test]
async fn notice_listing_sends_filters() -> Result<(), CliError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/api/content/notices")
            .query_param("category", "exams")
            .query_param("limit", "3");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"data":[]}"#);
    });

    let (client, _) = client(&server);
    content::handle(
        &client,
        NoticesCmd::List {
            category: Some("exams".into()),
            limit: Some(3),
        },
    )
    .await?;
    mock.assert();
    Ok(())
}

#[tokio::test]
async fn blog_create_uploads_multipart() -> Result<(), CliError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST")
            .path("/api/blogs")
            .header_matches("content-type", "^multipart/form-data; boundary=.+")
            .body_includes("name=\"title\"")
            .body_includes("filename=\"cover.png\"");
        then.status(201)
            .header("content-type", "application/json")
            .body(r#"{"data":{"id":"p1","title":"Hello","content":"Body","category":"tech","status":"PENDING"}}"#);
    });

    let dir = tempfile::tempdir().expect("tmp dir");
    let image = dir.path().join("cover.png");
    std::fs::write(&image, b"png").expect("write image");

    let (client, _) = client(&server);
    blogs::handle(
        &client,
        BlogsCmd::Create {
            title: "Hello".into(),
            content: Some("Body".into()),
            content_file: None,
            category: "tech".into(),
            image: Some(image),
        },
    )
    .await?;
    mock.assert();
    Ok(())
}

#[tokio::test]
async fn server_errors_surface_status_and_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("PATCH").path("/api/applications/a1/approve");
        then.status(422)
            .header("content-type", "application/json")
            .body(r#"{"message":"stage already decided"}"#);
    });

    let (client, _) = client(&server);
    let err = applications::handle(
        &client,
        crate::args::ApplicationsCmd::Decide {
            id: "a1".into(),
            decision: DecisionArg::Approve,
            remarks: None,
        },
    )
    .await
    .expect_err("422 must fail");
    assert_eq!(
        err.to_string(),
        "server answered 422: stage already decided"
    );
}

#[tokio::test]
async fn stage_filter_uses_wire_names() -> Result<(), CliError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/api/applications")
            .query_param("status", "PENDING_L2");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"data":[]}"#);
    });

    let (client, _) = client(&server);
    applications::handle(
        &client,
        crate::args::ApplicationsCmd::List {
            stage: Some(StageArg::L2),
        },
    )
    .await?;
    mock.assert();
    Ok(())
}

#[tokio::test]
async fn broadcast_reads_message_file() -> Result<(), CliError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST").path("/api/messenger/broadcast").json_body(
            serde_json::json!({
                "subject": "Exams",
                "message": "Timetable attached",
                "audience": "STUDENTS",
                "postAsNotice": true
            }),
        );
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"data":{"queued":42,"noticeId":"n1"}}"#);
    });

    let message = tmp_file(b"Timetable attached");
    let (client, _) = client(&server);
    records::handle(
        &client,
        RecordsCmd::Broadcast {
            subject: "Exams".into(),
            message: None,
            message_file: Some(message.path().to_path_buf()),
            audience: crate::args::AudienceArg::Students,
            post_as_notice: true,
        },
    )
    .await?;
    mock.assert();
    Ok(())
}
