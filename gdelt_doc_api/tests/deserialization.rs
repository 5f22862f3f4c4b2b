use gdelt_doc_api::types::{ArticleList, ArticleResponse, TimelineResponse};
use gdelt_doc_api::{QueryMode, Sanitizer, Timeline};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[test]
fn deserialize_articles_full() {
    let json = load_fixture("articles.json");
    let resp: ArticleResponse = serde_json::from_str(&json).unwrap();
    let list = ArticleList::from(resp);
    assert_eq!(list.len(), 2);

    let article = &list.articles[0];
    assert_eq!(
        article.url,
        "https://www.example.com/news/airlines-carbon-offsets"
    );
    assert_eq!(article.title, "Airlines turn to carbon offsets as travel resumes");
    assert_eq!(article.seendate, "20200501T134500Z");
    assert_eq!(article.language, "English");
    assert!(article.seen_at().is_some());
}

#[test]
fn deserialize_empty_sentinel() {
    let resp: ArticleResponse = serde_json::from_str("{}").unwrap();
    assert!(resp.articles.is_empty());

    let resp: TimelineResponse = serde_json::from_str("{}").unwrap();
    assert!(resp.timeline.is_empty());
}

#[test]
fn control_characters_need_sanitizing() {
    let json = load_fixture("articles_control_chars.json");
    assert!(serde_json::from_str::<ArticleResponse>(&json).is_err());

    let value = Sanitizer::default().parse(&json).unwrap();
    let resp: ArticleResponse = serde_json::from_value(value).unwrap();
    assert_eq!(resp.articles[0].title, "Brokentitle with control chars");
}

#[test]
fn deserialize_timeline_ignores_query_details() {
    let json = load_fixture("timeline_vol.json");
    let resp: TimelineResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.timeline.len(), 1);
    assert_eq!(resp.timeline[0].series, "Volume Intensity");
    assert_eq!(resp.timeline[0].data.len(), 3);
    assert!(resp.timeline[0].data[0].norm.is_none());
}

#[test]
fn merge_multi_series_fixture() {
    let json = load_fixture("timeline_sourcecountry.json");
    let resp: TimelineResponse = serde_json::from_str(&json).unwrap();
    let timeline = Timeline::from_response(QueryMode::TimelineSourceCountry, resp).unwrap();

    assert_eq!(
        timeline.columns(),
        vec!["datetime", "United States", "United Kingdom"]
    );
    assert_eq!(timeline.rows[1].values, vec![Some(0.47), None]);
}

#[test]
fn deserialize_missing_value_returns_error() {
    let json = r#"{"timeline": [{"series": "Average Tone", "data": [{"date": "20200501T000000Z"}]}]}"#;
    assert!(serde_json::from_str::<TimelineResponse>(json).is_err());
}

#[test]
fn deserialize_article_with_null_fields() {
    let json = r#"{"articles": [{"url": "https://a.com/x", "title": "t", "socialimage": null, "url_mobile": null}]}"#;
    let value = Sanitizer::default().parse(json).unwrap();
    let list = ArticleList::from(serde_json::from_value::<ArticleResponse>(value).unwrap());
    assert_eq!(list.len(), 1);
    assert_eq!(list.articles[0].socialimage, "");
    assert_eq!(list.articles[0].url_mobile, "");
    assert_eq!(list.articles[0].url, "https://a.com/x");
}
