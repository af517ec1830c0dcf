use super::*;

const MAPS_URL: &str = "https://www.google.com/maps/search/?api=1&query=Luigi%27s&hl=en";

fn query() -> ListingQuery {
    ListingQuery {
        name: "Luigi's Trattoria".to_string(),
        locality: "Springfield".to_string(),
    }
}

#[test]
fn json_ld_place_node() {
    let page = r#"<script type="application/ld+json">{
        "@context": "https://schema.org",
        "@type": "Restaurant",
        "name": "Luigi's Trattoria",
        "address": {
            "@type": "PostalAddress",
            "streetAddress": "12 Elm St",
            "addressLocality": "Springfield",
            "postalCode": "62701"
        },
        "telephone": "+1 217-555-0100",
        "url": "https://luigis.example.com",
        "priceRange": "$$",
        "servesCuisine": ["Italian", "Pizza"],
        "aggregateRating": { "ratingValue": "4.6", "ratingCount": 1204 },
        "geo": { "latitude": 39.78, "longitude": -89.65 },
        "openingHoursSpecification": [
            { "dayOfWeek": ["https://schema.org/Monday", "Tuesday"], "opens": "11:00", "closes": "22:00" }
        ],
        "image": "https://cdn.example.com/front.jpg"
    }</script>"#;

    let r = parse_listing(page, &query(), MAPS_URL);

    assert_eq!(r.strategy, ExtractionStrategy::EmbeddedState);
    assert_eq!(r.name, "Luigi's Trattoria");
    assert_eq!(r.slug, "luigi-s-trattoria");
    assert_eq!(r.address, "12 Elm St, Springfield, 62701");
    assert_eq!(r.phone, "+1 217-555-0100");
    assert_eq!(r.website, "https://luigis.example.com");
    assert_eq!(r.category, "Italian");
    assert_eq!(r.price_level, "$$");
    assert!((r.rating - 4.6).abs() < 1e-9);
    assert_eq!(r.review_count, 1204);
    assert!((r.longitude + 89.65).abs() < 1e-9);
    assert_eq!(r.hours, vec!["Monday: 11:00-22:00", "Tuesday: 11:00-22:00"]);
    assert_eq!(r.photo_urls, vec!["https://cdn.example.com/front.jpg"]);
    assert_eq!(r.maps_url, MAPS_URL);
    assert!(r.is_active());
}

#[test]
fn place_panel_dom() {
    let page = r#"
        <h1 class="DUwDvf">Luigi&#39;s Trattoria</h1>
        <span role="img" aria-label="4.5 stars "></span>
        <span role="img" aria-label="1,204 reviews"></span>
        <span aria-label="Price: Moderate">$$</span>
        <button jsaction="pane.rating.category">Italian restaurant</button>
        <button data-item-id="address" aria-label="Address: 12 Elm St, Springfield"></button>
        <button data-item-id="phone:tel:+12175550100" aria-label="Phone: (217) 555-0100"></button>
        <a data-item-id="authority" href="https://luigis.example.com/" aria-label="Website: luigis.example.com"></a>
        <div aria-label="Monday, 11 AM to 10 PM; Tuesday, Closed. Hide open hours for the week"></div>
        <a href="https://www.google.com/maps/place/Luigi's/@39.78,-89.65,17z/data=!3d39.7817!4d-89.6501"></a>
    "#;

    let r = parse_listing(page, &query(), MAPS_URL);

    assert_eq!(r.strategy, ExtractionStrategy::AlternateEmbedded);
    assert_eq!(r.name, "Luigi's Trattoria");
    assert!((r.rating - 4.5).abs() < 1e-9);
    assert_eq!(r.review_count, 1204);
    assert_eq!(r.price_level, "Moderate");
    assert_eq!(r.category, "Italian restaurant");
    assert_eq!(r.address, "12 Elm St, Springfield");
    assert_eq!(r.phone, "(217) 555-0100");
    assert_eq!(r.website, "https://luigis.example.com/");
    assert_eq!(r.hours, vec!["Monday, 11 AM to 10 PM", "Tuesday, Closed"]);
    assert!((r.latitude - 39.7817).abs() < 1e-9);
    assert!((r.longitude + 89.6501).abs() < 1e-9);
}

#[test]
fn og_tags_name_address_and_rating() {
    let page = r#"
        <meta property="og:title" content="Luigi's Trattoria · 12 Elm St, Springfield">
        <meta property="og:description" content="4.6 ★★★★★ (1.2K) · Italian restaurant">
    "#;

    let r = parse_listing(page, &query(), MAPS_URL);

    assert_eq!(r.strategy, ExtractionStrategy::MetaTags);
    assert_eq!(r.name, "Luigi's Trattoria");
    assert_eq!(r.address, "12 Elm St, Springfield");
    assert!((r.rating - 4.6).abs() < 1e-9);
    assert_eq!(r.review_count, 1_200);
    assert_eq!(r.category, "Italian restaurant");
}

#[test]
fn consent_page_is_baseline_with_requested_slug() {
    let page = "<html><title>Before you continue to Google</title></html>";

    let r = parse_listing(page, &query(), MAPS_URL);

    assert_eq!(r.strategy, ExtractionStrategy::Baseline);
    assert_eq!(r.name, "Luigi's Trattoria");
    assert_eq!(r.slug, "luigi-s-trattoria");
    assert_eq!(r.query, "Luigi's Trattoria Springfield");
    assert!(r.photo_urls.is_empty());
    assert!(!r.is_active());
}

#[test]
fn search_and_reviews_urls_are_encoded() {
    struct NoFetch;
    #[async_trait::async_trait]
    impl PageFetcher for NoFetch {
        async fn fetch_page(&self, url: &str) -> Result<String, ScraperError> {
            Err(ScraperError::NotFound {
                url: url.to_owned(),
            })
        }
    }
    let extractor = ListingExtractor::new(Arc::new(NoFetch)).with_base_url("http://127.0.0.1:9/");
    assert_eq!(
        extractor.search_url("Luigi's & Co Springfield"),
        "http://127.0.0.1:9/maps/search/?api=1&query=Luigi%27s+%26+Co+Springfield&hl=en"
    );
    assert!(extractor
        .reviews_url("Luigi's")
        .ends_with("&hl=en&tab=reviews"));
}
