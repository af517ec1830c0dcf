use super::*;

const URL: &str = "https://www.luigis.example.com/";

#[test]
fn json_ld_business_with_same_as_links() {
    let page = r#"
        <script type="application/ld+json">{
            "@context": "https://schema.org",
            "@graph": [
                { "@type": "WebSite", "name": "ignored" },
                {
                    "@type": "Restaurant",
                    "name": "Luigi&#39;s Trattoria",
                    "description": "Wood-fired pizza since 1987",
                    "telephone": "+1 217-555-0100",
                    "servesCuisine": "Italian",
                    "image": ["/img/hero.jpg", "https://cdn.example.com/b.jpg"],
                    "sameAs": [
                        "https://www.instagram.com/luigis/",
                        "https://www.youtube.com/@LuigisKitchen"
                    ]
                }
            ]
        }</script>
        <a href="mailto:ciao@luigis.example.com?subject=Hi">Email us</a>
    "#;

    let w = parse_website(page, URL);

    assert_eq!(w.strategy, ExtractionStrategy::EmbeddedState);
    assert_eq!(w.domain, "luigis.example.com");
    assert_eq!(w.name, "Luigi's Trattoria");
    assert_eq!(w.category, "Italian");
    assert_eq!(w.phone, "+1 217-555-0100");
    assert_eq!(w.email, "ciao@luigis.example.com");
    assert_eq!(
        w.image_urls,
        vec![
            "https://www.luigis.example.com/img/hero.jpg".to_string(),
            "https://cdn.example.com/b.jpg".to_string(),
        ]
    );
    let platforms: Vec<SourceKind> = w.social_links.iter().map(|l| l.platform).collect();
    assert_eq!(platforms, vec![SourceKind::Instagram, SourceKind::Youtube]);
    assert_eq!(w.social_links[0].handle, "luigis");
    assert_eq!(w.social_links[1].handle, "LuigisKitchen");
    assert!(w.is_active());
}

#[test]
fn next_data_page_props() {
    let data = serde_json::json!({
        "props": { "pageProps": {
            "restaurant": {
                "restaurantName": "Luigi's",
                "tagline": "Pizza & pasta",
                "phoneNumber": "217-555-0100",
                "heroImage": { "src": "https://cdn.example.com/hero.jpg" }
            }
        }}
    });
    let page = format!(
        r#"<script id="__NEXT_DATA__" type="application/json">{data}</script>"#
    );

    let w = parse_website(&page, URL);

    assert_eq!(w.strategy, ExtractionStrategy::AlternateEmbedded);
    assert_eq!(w.name, "Luigi's");
    assert_eq!(w.description, "Pizza & pasta");
    assert_eq!(w.phone, "217-555-0100");
    assert_eq!(w.image_urls, vec!["https://cdn.example.com/hero.jpg".to_string()]);
}

#[test]
fn title_segment_and_anchor_links() {
    let page = r#"
        <title>Luigi's Trattoria | Wood-fired pizza in Springfield</title>
        <meta name="description" content="Family-run since 1987.">
        <a href="tel:+12175550100">Call</a>
        <a href='https://www.tiktok.com/@luigis_pizza'>TikTok</a>
        <a href="https://www.tiktok.com/@someone_else">Friend</a>
        <a href="https://www.instagram.com/p/AbC123/">A post</a>
        <a href="https://www.instagram.com/luigis/">Instagram</a>
    "#;

    let w = parse_website(page, URL);

    assert_eq!(w.strategy, ExtractionStrategy::MetaTags);
    assert_eq!(w.name, "Luigi's Trattoria");
    assert_eq!(w.description, "Family-run since 1987.");
    assert_eq!(w.phone, "+12175550100");
    let links: Vec<(SourceKind, &str)> = w
        .social_links
        .iter()
        .map(|l| (l.platform, l.handle.as_str()))
        .collect();
    assert_eq!(
        links,
        vec![
            (SourceKind::Instagram, "luigis"),
            (SourceKind::Tiktok, "luigis_pizza"),
        ]
    );
}

#[test]
fn nameless_page_is_baseline_but_keeps_links() {
    let page = r#"<body><a href="https://instagram.com/luigis">ig</a></body>"#;

    let w = parse_website(page, URL);

    assert_eq!(w.strategy, ExtractionStrategy::Baseline);
    assert!(w.name.is_empty());
    assert!(!w.is_active());
    assert_eq!(w.social_links.len(), 1);
    assert_eq!(w.url, URL);
}
