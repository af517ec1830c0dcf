use super::*;

const PROFILE_URL: &str = "https://www.youtube.com/@luigiskitchen";

fn page_with(data: &serde_json::Value) -> String {
    format!(r#"<html><script>var ytInitialData = {data};</script></html>"#)
}

#[test]
fn tabbed_header_and_video_renderers() {
    let data = serde_json::json!({
        "header": { "c4TabbedHeaderRenderer": {
            "title": "Luigi's Kitchen",
            "avatar": { "thumbnails": [
                { "url": "https://yt.example.com/a-small.jpg" },
                { "url": "https://yt.example.com/a-large.jpg" }
            ]},
            "badges": [{ "metadataBadgeRenderer": { "style": "BADGE_STYLE_TYPE_VERIFIED" } }],
            "subscriberCountText": { "simpleText": "12.3K subscribers" },
            "videosCountText": { "runs": [{ "text": "245" }, { "text": " videos" }] }
        }},
        "metadata": { "channelMetadataRenderer": {
            "title": "Luigi's Kitchen",
            "description": "Recipes from our trattoria"
        }},
        "contents": { "tabs": [{ "content": { "items": [
            { "videoRenderer": {
                "videoId": "abc123",
                "title": { "runs": [{ "text": "Perfect dough" }] },
                "viewCountText": { "simpleText": "1,204 views" },
                "thumbnail": { "thumbnails": [{ "url": "https://i.ytimg.com/vi/abc123/hq.jpg" }] }
            }}
        ]}}]}
    });

    let p = parse_profile(&page_with(&data), "luigiskitchen", PROFILE_URL);

    assert_eq!(p.strategy, ExtractionStrategy::EmbeddedState);
    assert_eq!(p.display_name, "Luigi's Kitchen");
    assert_eq!(p.bio, "Recipes from our trattoria");
    assert_eq!(p.avatar_url, "https://yt.example.com/a-large.jpg");
    assert!(p.verified);
    assert_eq!(p.followers, 12_300);
    assert_eq!(p.content_count, 245);
    assert_eq!(p.recent_items.len(), 1);
    assert_eq!(
        p.recent_items[0].url,
        "https://www.youtube.com/watch?v=abc123"
    );
    assert_eq!(p.recent_items[0].caption, "Perfect dough");
    assert_eq!(p.recent_items[0].views, 1_204);
    assert!(p.engagement_rate.is_none());
}

#[test]
fn page_header_view_model_rows() {
    let data = serde_json::json!({
        "header": { "pageHeaderRenderer": { "content": { "pageHeaderViewModel": {
            "title": { "dynamicTextViewModel": { "text": { "content": "Luigi's Kitchen" } } },
            "metadata": { "contentMetadataViewModel": { "metadataRows": [
                { "metadataParts": [{ "text": { "content": "@luigiskitchen" } }] },
                { "metadataParts": [
                    { "text": { "content": "1.2M subscribers" } },
                    { "text": { "content": "310 videos" } }
                ]}
            ]}},
            "image": { "decoratedAvatarViewModel": { "avatar": { "avatarViewModel": {
                "image": { "sources": [{ "url": "https://yt.example.com/avatar.jpg" }] }
            }}}}
        }}}}
    });

    let p = parse_profile(&page_with(&data), "luigiskitchen", PROFILE_URL);

    assert_eq!(p.strategy, ExtractionStrategy::AlternateEmbedded);
    assert_eq!(p.display_name, "Luigi's Kitchen");
    assert_eq!(p.followers, 1_200_000);
    assert_eq!(p.content_count, 310);
    assert_eq!(p.avatar_url, "https://yt.example.com/avatar.jpg");
}

#[test]
fn meta_tags_with_subscriber_text() {
    let page = r#"
        <meta property="og:title" content="Luigi's Kitchen">
        <meta property="og:description" content="Recipes from our trattoria">
        <span>4.5K subscribers</span>
    "#;

    let p = parse_profile(page, "luigiskitchen", PROFILE_URL);

    assert_eq!(p.strategy, ExtractionStrategy::MetaTags);
    assert_eq!(p.followers, 4_500);
    assert_eq!(p.bio, "Recipes from our trattoria");
}

#[test]
fn meta_without_subscribers_is_baseline() {
    let page = r#"<meta property="og:title" content="Luigi's Kitchen">"#;
    let p = parse_profile(page, "luigiskitchen", PROFILE_URL);
    assert_eq!(p.strategy, ExtractionStrategy::Baseline);
    assert!(p.display_name.is_empty());
}

#[test]
fn channel_id_profile_url() {
    struct NoFetch;
    #[async_trait::async_trait]
    impl PageFetcher for NoFetch {
        async fn fetch_page(&self, url: &str) -> Result<String, ScraperError> {
            Err(ScraperError::NotFound {
                url: url.to_owned(),
            })
        }
    }
    let extractor = YoutubeExtractor::new(Arc::new(NoFetch));
    assert_eq!(
        extractor.profile_url("UCabcdefghijklmnopqrstuv"),
        "https://www.youtube.com/channel/UCabcdefghijklmnopqrstuv"
    );
    assert_eq!(
        extractor.profile_url("luigiskitchen"),
        "https://www.youtube.com/@luigiskitchen"
    );
}
