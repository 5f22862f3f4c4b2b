use chrono::NaiveDate;
use gdelt_doc_api::{Client, Error, Filters, QueryMode, Sanitizer};
use wiremock::matchers::{header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOC_PATH: &str = "/api/v2/doc/doc";

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn client_for(server: &MockServer) -> Client {
    Client::with_base_url(&format!("{}{}", server.uri(), DOC_PATH)).unwrap()
}

fn filters() -> Filters {
    Filters::default()
        .with_keyword(["airline", "carbon"])
        .with_date_range(
            NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 5, 2).unwrap(),
        )
}

#[tokio::test]
async fn article_search_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .and(query_param("mode", "artlist"))
        .and(query_param("format", "json"))
        .and(query_param("maxrecords", "250"))
        .and(query_param("startdatetime", "20200501000000"))
        .and(query_param("enddatetime", "20200502000000"))
        .and(query_param(
            "query",
            "(keyword:\"airline\" OR keyword:\"carbon\")",
        ))
        .and(header_regex("user-agent", "^gdelt-doc-api/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("articles.json")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let articles = client.article_search(&filters()).await.unwrap();

    assert_eq!(articles.len(), 2);
    assert_eq!(articles.columns().len(), 8);
    assert_eq!(articles.articles[0].domain, "example.com");
    assert_eq!(articles.articles[1].sourcecountry, "France");
}

#[tokio::test]
async fn article_search_sends_num_records_and_sort() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .and(query_param("maxrecords", "25"))
        .and(query_param("sort", "DateDesc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("articles.json")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let filters = filters()
        .with_num_records(25)
        .with_sort(gdelt_doc_api::SortBy::DateDesc);
    assert!(client.article_search(&filters).await.is_ok());
}

#[tokio::test]
async fn article_search_empty_sentinel_returns_empty_table() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let articles = client.article_search(&filters()).await.unwrap();

    assert!(articles.is_empty());
    assert_eq!(
        articles.columns(),
        &[
            "url",
            "url_mobile",
            "title",
            "seendate",
            "socialimage",
            "domain",
            "language",
            "sourcecountry"
        ]
    );
}

#[tokio::test]
async fn article_search_blank_body_returns_empty_table() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("  \n"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let articles = client.article_search(&filters()).await.unwrap();
    assert!(articles.is_empty());
}

#[tokio::test]
async fn article_search_strips_control_characters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(load_fixture("articles_control_chars.json")),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let articles = client.article_search(&filters()).await.unwrap();

    assert_eq!(articles.len(), 1);
    assert_eq!(articles.articles[0].title, "Brokentitle with control chars");
    assert_eq!(articles.articles[0].url, "https://www.example.com/ab");
}

#[tokio::test]
async fn article_search_replaces_invalid_utf8() {
    let mock_server = MockServer::start().await;

    let mut body = br#"{"articles": [{"url": "https://a.com/x", "title": "caf"#.to_vec();
    body.extend_from_slice(&[0xC3, 0x28]);
    body.extend_from_slice(br#"e"}]}"#);

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let articles = client.article_search(&filters()).await.unwrap();
    assert_eq!(articles.articles[0].title, "caf(e");
}

#[tokio::test]
async fn custom_sanitizer_replaces_instead_of_stripping() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(load_fixture("articles_control_chars.json")),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).with_sanitizer(Sanitizer::default().with_replacement(' '));
    let articles = client.article_search(&filters()).await.unwrap();
    assert_eq!(articles.articles[0].title, "Broken title  with  control chars");
}

#[tokio::test]
async fn article_search_repairs_broken_escapes() {
    let mock_server = MockServer::start().await;

    let body = r#"{"articles": [
        {"url": "https://a.com/x", "title": "it\'s broken", "socialimage": null},
        {"url": "https://a.com/y", "title": "caf\u00zz", "language": "English"}
    ]}"#;

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let articles = client.article_search(&filters()).await.unwrap();

    assert_eq!(articles.len(), 2);
    assert_eq!(articles.articles[0].title, "it's broken");
    assert_eq!(articles.articles[0].socialimage, "");
    assert_eq!(articles.articles[1].title, "caf u00zz");
    assert_eq!(articles.articles[1].language, "English");
}

#[tokio::test]
async fn repair_limit_turns_into_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"articles": [{"url": "https://a.com/x", "title": "caf\u00zz"}]}"#),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).with_sanitizer(Sanitizer::default().with_max_repairs(0));
    let err = client.article_search(&filters()).await.unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[tokio::test]
async fn article_search_rejects_num_records_before_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .article_search(&filters().with_num_records(251))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn invalid_filters_fail_before_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .article_search(&filters().with_timespan("3days"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn server_error_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.article_search(&filters()).await.unwrap_err();
    match err {
        Error::Api { status, ref message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal Server Error");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
    assert_eq!(err.status_kind(), Some(gdelt_doc_api::StatusKind::ServerError));
}

#[tokio::test]
async fn too_many_requests_is_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.article_search(&filters()).await.unwrap_err();
    assert!(matches!(err, Error::RateLimited));
}

#[tokio::test]
async fn plain_text_rate_limit_message_is_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "Please limit requests to one every 5 seconds or contact us for larger queries.",
        ))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .timeline_search(QueryMode::TimelineVol, &filters())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RateLimited));
}

#[tokio::test]
async fn plain_text_error_message_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "The specified phrase is too short.\n",
        ))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.article_search(&filters()).await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 200);
            assert_eq!(message, "The specified phrase is too short.");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_json_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not valid json}"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.article_search(&filters()).await.unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[tokio::test]
async fn unexpected_structure_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"articles": "none"}"#))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.article_search(&filters()).await.unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[tokio::test]
async fn connection_failure_is_transport_error() {
    // nothing listens on port 1
    let client = Client::with_base_url(&format!("http://127.0.0.1:1{}", DOC_PATH)).unwrap();
    let err = client.article_search(&filters()).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn timeline_vol_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .and(query_param("mode", "timelinevol"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(load_fixture("timeline_vol.json")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let timeline = client
        .timeline_search(QueryMode::TimelineVol, &filters())
        .await
        .unwrap();

    assert_eq!(timeline.columns(), vec!["datetime", "Volume Intensity"]);
    assert_eq!(timeline.len(), 3);
    assert_eq!(timeline.rows[1].values, vec![Some(0.2345)]);
}

#[tokio::test]
async fn timeline_volraw_has_three_columns() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .and(query_param("mode", "timelinevolraw"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(load_fixture("timeline_volraw.json")),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let timeline = client
        .timeline_search(QueryMode::TimelineVolRaw, &filters())
        .await
        .unwrap();

    assert_eq!(timeline.columns().len(), 3);
    assert_eq!(
        timeline.column("All Articles").unwrap(),
        vec![Some(9120.0), Some(8874.0)]
    );
}

#[tokio::test]
async fn timeline_source_country_fills_missing_with_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .and(query_param("mode", "timelinesourcecountry"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(load_fixture("timeline_sourcecountry.json")),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let timeline = client
        .timeline_search(QueryMode::TimelineSourceCountry, &filters())
        .await
        .unwrap();

    assert_eq!(timeline.len(), 2);
    assert_eq!(
        timeline.column("United States").unwrap(),
        vec![Some(0.51), Some(0.47)]
    );
    assert_eq!(
        timeline.column("United Kingdom").unwrap(),
        vec![Some(0.22), None]
    );
}

#[tokio::test]
async fn timeline_without_data_returns_empty_series() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"timeline": []}"#))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let timeline = client
        .timeline_search(QueryMode::TimelineLang, &filters())
        .await
        .unwrap();

    assert!(timeline.is_empty());
    assert_eq!(timeline.columns(), vec!["datetime"]);
}

#[tokio::test]
async fn timeline_search_rejects_article_mode_before_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .timeline_search(QueryMode::ArtList, &filters())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidMode(_)));
}

#[tokio::test]
async fn timeline_search_ignores_num_records() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client
        .timeline_search(QueryMode::TimelineTone, &filters().with_num_records(1000))
        .await;
    assert!(result.is_ok());
}
