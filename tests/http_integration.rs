//! Integration tests for the HTTP transport using wiremock
//!
//! These tests run resources against a mocked Weibo host, checking the
//! request shape (path, query, headers) and the handling of replies.

use serde_json::json;
use weibo_api::config::Config;
use weibo_api::weibo::http::{Endpoints, HttpTransport, Request, Transport};
use weibo_api::{Error, WeiboClient};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, cookie: Option<&str>) -> WeiboClient {
    let transport = HttpTransport::new(cookie)
        .expect("transport should build")
        .with_endpoints(Endpoints::single(&server.uri()));
    WeiboClient::with_transport(transport)
}

mod transport_tests {
    use super::*;

    /// Session cookie and browser headers go out with every request
    #[tokio::test]
    async fn test_sends_cookie_and_default_headers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/statuses/extend"))
            .and(query_param("id", "Mx9"))
            .and(header("cookie", "SUB=test_sub; SUBP=test_subp"))
            .and(header("x-requested-with", "XMLHttpRequest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": 1,
                "data": {"longTextContent": "全文"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("SUB=test_sub; SUBP=test_subp"));
        let mut status = client.status("Mx9");

        assert_eq!(status.text().await.unwrap(), json!("全文"));
        assert_eq!(status.text().await.unwrap(), json!("全文"));
    }

    /// Configured user agent overrides the mobile default
    #[tokio::test]
    async fn test_config_user_agent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/article/m/aj/detail"))
            .and(header("user-agent", "weibo-api-tests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"title": "标题", "content": "<p>正文</p>"}
            })))
            .mount(&server)
            .await;

        let config = Config {
            user_agent: Some("weibo-api-tests".to_string()),
            mobile_base_url: Some(server.uri()),
            card_base_url: Some(server.uri()),
            ..Config::default()
        };
        let client = WeiboClient::from_config(&config, None).unwrap();
        let mut article = client.article("2309404");

        assert_eq!(article.title().await.unwrap(), json!("标题"));
    }

    /// An explicit cookie overrides the configured one
    #[tokio::test]
    async fn test_explicit_cookie_beats_config() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/statuses/extend"))
            .and(header("cookie", "SUB=from-cli"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"longTextContent": "cli"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = Config {
            cookie: Some("SUB=from-config".to_string()),
            mobile_base_url: Some(server.uri()),
            ..Config::default()
        };
        let client = WeiboClient::from_config(&config, Some("SUB=from-cli")).unwrap();

        assert_eq!(client.status("Mx9").text().await.unwrap(), json!("cli"));
    }

    /// Without an explicit cookie (or with an empty one) the config cookie is sent
    #[tokio::test]
    async fn test_config_cookie_used_without_explicit() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/statuses/extend"))
            .and(header("cookie", "SUB=from-config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"longTextContent": "config"}
            })))
            .expect(2)
            .mount(&server)
            .await;

        let config = Config {
            cookie: Some("SUB=from-config".to_string()),
            mobile_base_url: Some(server.uri()),
            ..Config::default()
        };

        for explicit in [None, Some("")] {
            let client = WeiboClient::from_config(&config, explicit).unwrap();
            assert_eq!(client.status("Mx9").text().await.unwrap(), json!("config"));
        }
    }

    /// Error statuses surface as decode errors with the upstream message
    #[tokio::test]
    async fn test_error_status_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/container/getIndex"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"message": "login required"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let mut people = client.people(1815418641);

        match people.ensure_data().await {
            Err(Error::Decode(err)) => {
                assert_eq!(err.status, 403);
                assert_eq!(err.reason.as_deref(), Some("login required"));
                assert!(err.url.contains("value=1815418641"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    /// HTML login pages are not JSON
    #[tokio::test]
    async fn test_html_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/statuses/extend"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>passport</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let err = client.status("x").ensure_data().await.unwrap_err();
        assert!(err.is_decode());
    }

    /// A closed port is a transport error
    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let transport = HttpTransport::new(None).unwrap();
        let result = transport.execute(&Request::get("http://127.0.0.1:9/nothing")).await;
        assert!(result.is_err());

        let client = WeiboClient::with_transport(transport.with_endpoints(Endpoints::single("http://127.0.0.1:9")));
        assert!(matches!(
            client.people(1).ensure_data().await,
            Err(Error::Transport(_))
        ));
    }
}

mod listing_tests {
    use super::*;

    /// Each page is requested with its own page query parameter
    #[tokio::test]
    async fn test_followers_pages() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/container/getIndex"))
            .and(query_param("containerid", "231051_-_fans_-_42"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": 1,
                "data": {"cards": [{"card_group": [
                    {"user": {"id": 1, "screen_name": "a"}},
                    {"user": {"id": 2, "screen_name": "b"}}
                ]}]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/container/getIndex"))
            .and(query_param("containerid", "231051_-_fans_-_42"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": 0, "msg": "没有更多"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let mut followers = client.followers(42);

        let mut names = Vec::new();
        while let Some(page) = followers.next_page().await.unwrap() {
            for user in page.values() {
                let user = user.into_view().unwrap();
                names.push(user.get("screen_name").unwrap().into_value());
            }
        }

        assert_eq!(names, vec![json!("a"), json!("b")]);
        assert_eq!(followers.page_number(), 2);
    }

    /// Article listings use the profile article container
    #[tokio::test]
    async fn test_articles_container() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/container/getIndex"))
            .and(query_param("containerid", "2304137_-_WEIBO_SECOND_PROFILE_WEIBO_ARTICAL"))
            .and(query_param("page", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"cardlistInfo": {"total": 21}, "cards": [{"mblog": {"id": "9"}}]}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let mut articles = client.articles(7);

        let payload = articles.fetch_page_payload(3).await.unwrap();
        assert_eq!(weibo_api::Paginated::total_items(&payload), Some(21));
    }
}
