//! End-to-end tests of `TagWatch` against a mock registry.

use libtagwatch::{ConnectionConfig, TagWatch, TagWatchError};
use mockito::Matcher;

const DIGEST: &str = "sha256:7173b809ca12ec5dee4506cd86be934c4596dd234ee82c0662eac04a8c2c71dc";

fn bearer_challenge(server: &mockito::Server) -> String {
    format!(r#"Bearer realm="{}/token",service="reg""#, server.url())
}

#[tokio::test]
async fn test_fetch_merges_and_sorts_branches() {
    let mut server = mockito::Server::new_async().await;
    let probe = server
        .mock("GET", "/v2/")
        .with_status(401)
        .with_header("WWW-Authenticate", &bearer_challenge(&server))
        .expect(2)
        .create_async()
        .await;
    let token = server
        .mock("GET", "/token")
        .match_query(Matcher::UrlEncoded(
            "scope".into(),
            "repository:team/svc:pull".into(),
        ))
        .with_status(200)
        .with_body(r#"{"token":"t0k"}"#)
        .expect(2)
        .create_async()
        .await;
    let tags = server
        .mock("GET", "/v2/team/svc/tags/list")
        .match_header("authorization", "Bearer t0k")
        .with_status(200)
        .with_body(
            r#"{"name":"team/svc","tags":["1700000000-aaa","latest","release-x","1700000100-bbb"]}"#,
        )
        .expect(2)
        .create_async()
        .await;

    let config = ConnectionConfig::new(server.url())
        .with_namespace("team")
        .with_credentials("robot", "s3cret");
    let tagwatch = TagWatch::new(config).unwrap();

    let records = tagwatch.fetch("svc", ["main", "develop"]).await.unwrap();

    probe.assert_async().await;
    token.assert_async().await;
    tags.assert_async().await;

    // "release-x" is dropped on both branches
    assert_eq!(records.len(), 6);
    let order: Vec<_> = records.iter().map(|r| r.tag.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "1700000100-bbb",
            "1700000100-bbb",
            "1700000000-aaa",
            "1700000000-aaa",
            "latest",
            "latest"
        ]
    );
    assert_eq!(records.iter().filter(|r| r.branch == "main").count(), 3);
    assert_eq!(records.iter().filter(|r| r.branch == "develop").count(), 3);
    assert_eq!(records[0].revision, "bbb");
}

#[tokio::test]
async fn test_fetch_all_branches_failing_returns_error() {
    let mut server = mockito::Server::new_async().await;
    let _probe = server
        .mock("GET", "/v2/")
        .with_status(200)
        .create_async()
        .await;
    let _tags = server
        .mock("GET", "/v2/svc/tags/list")
        .with_status(503)
        .create_async()
        .await;

    let tagwatch = TagWatch::new(ConnectionConfig::new(server.url())).unwrap();
    let result = tagwatch.fetch("svc", ["a", "b"]).await;

    assert!(matches!(
        result,
        Err(TagWatchError::Transport {
            status_code: Some(503),
            ..
        })
    ));
}

#[tokio::test]
async fn test_fetch_keeps_healthy_branch_when_another_fails() {
    let mut server = mockito::Server::new_async().await;
    let _probe = server
        .mock("GET", "/v2/")
        .with_status(200)
        .expect(2)
        .create_async()
        .await;
    // The first listing succeeds, every later one is refused
    let healthy = server
        .mock("GET", "/v2/svc/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"svc","tags":["1700000000-aaa","1700000100-bbb"]}"#)
        .expect(1)
        .create_async()
        .await;
    let failing = server
        .mock("GET", "/v2/svc/tags/list")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;

    let tagwatch = TagWatch::new(ConnectionConfig::new(server.url())).unwrap();
    let records = tagwatch.fetch("svc", ["a", "b"]).await.unwrap();

    healthy.assert_async().await;
    failing.assert_async().await;

    let order: Vec<_> = records.iter().map(|r| r.tag.as_str()).collect();
    assert_eq!(order, vec!["1700000100-bbb", "1700000000-aaa"]);

    // Which branch wins the race is not fixed, but all records share it
    let branch = records[0].branch.as_str();
    assert!(branch == "a" || branch == "b");
    assert!(records.iter().all(|r| r.branch == branch));
}

#[tokio::test]
async fn test_fetch_invalid_repository_name() {
    let tagwatch = TagWatch::new(ConnectionConfig::new("http://127.0.0.1:9")).unwrap();
    let result = tagwatch.fetch("Bad Name", ["main"]).await;
    assert!(matches!(result, Err(TagWatchError::Config { .. })));
}

#[tokio::test]
async fn test_fetch_unreachable_registry() {
    let tagwatch = TagWatch::new(ConnectionConfig::new("http://127.0.0.1:9")).unwrap();
    let result = tagwatch.fetch("svc", ["main"]).await;
    assert!(matches!(result, Err(TagWatchError::AuthDiscovery { .. })));
}

#[tokio::test]
async fn test_fetch_without_branches_is_empty() {
    let tagwatch = TagWatch::new(ConnectionConfig::new("http://127.0.0.1:9")).unwrap();
    let records = tagwatch.fetch("svc", Vec::<String>::new()).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_tag_digest_resolves_tag() {
    let mut server = mockito::Server::new_async().await;
    let _probe = server
        .mock("GET", "/v2/")
        .with_status(401)
        .with_header("WWW-Authenticate", &bearer_challenge(&server))
        .create_async()
        .await;
    let _token = server
        .mock("GET", "/token")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"access_token":"t0k"}"#)
        .create_async()
        .await;
    let manifest = server
        .mock("HEAD", "/v2/team/svc/manifests/v1")
        .match_header("authorization", "Bearer t0k")
        .with_status(200)
        .with_header("Docker-Content-Digest", DIGEST)
        .create_async()
        .await;

    let config = ConnectionConfig::new(server.url()).with_namespace("team");
    let tagwatch = TagWatch::new(config).unwrap();

    let digest = tagwatch.tag_digest("svc", "v1").await.unwrap();
    manifest.assert_async().await;
    assert_eq!(digest.to_string(), DIGEST);
}

#[tokio::test]
async fn test_tag_digest_missing_tag_is_transport_error() {
    let mut server = mockito::Server::new_async().await;
    let _probe = server
        .mock("GET", "/v2/")
        .with_status(200)
        .create_async()
        .await;
    let _manifest = server
        .mock("HEAD", "/v2/svc/manifests/nope")
        .with_status(404)
        .create_async()
        .await;

    let tagwatch = TagWatch::new(ConnectionConfig::new(server.url())).unwrap();
    let result = tagwatch.tag_digest("svc", "nope").await;

    assert!(matches!(result, Err(TagWatchError::Transport { .. })));
}

#[tokio::test]
async fn test_tag_digest_reprobes_on_every_call() {
    let mut server = mockito::Server::new_async().await;
    let probe = server
        .mock("GET", "/v2/")
        .with_status(200)
        .expect(2)
        .create_async()
        .await;
    let _manifest = server
        .mock("HEAD", "/v2/svc/manifests/v1")
        .with_status(200)
        .with_header("Docker-Content-Digest", DIGEST)
        .create_async()
        .await;

    let tagwatch = TagWatch::new(ConnectionConfig::new(server.url())).unwrap();
    tagwatch.tag_digest("svc", "v1").await.unwrap();
    tagwatch.tag_digest("svc", "v1").await.unwrap();

    probe.assert_async().await;
}
