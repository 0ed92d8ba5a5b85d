#[cfg(test)]
mod tests {
    use crate::{convert_rss, load_json_feed, normalize_pub_date, write_json_feed, AuthorResolver};
    use inkhaven_core::{FeedError, JSON_FEED_VERSION};

    const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>Inkhaven Daily</title>
    <link>https://inkhaven.example/</link>
    <atom:link href="https://inkhaven.example/rss.xml" rel="self" type="application/rss+xml"/>
    <description>Posts from residents &amp; friends</description>
    <image>
      <title>Logo title that must not leak</title>
      <link>https://inkhaven.example/logo.png</link>
    </image>
    <item>
      <title>Why I Write</title>
      <link>https://justismills.substack.com/p/why-i-write</link>
      <guid>https://justismills.substack.com/p/why-i-write</guid>
      <pubDate>Mon, 01 Dec 2025 00:00:00 GMT</pubDate>
    </item>
    <item>
      <title><![CDATA[Bayes & Beyond]]></title>
      <link>https://example.org/post</link>
      <guid>post-2</guid>
      <pubDate>sometime last week</pubDate>
    </item>
    <item>
      <link>https://jane-doe.substack.com/p/untitled</link>
    </item>
  </channel>
</rss>"#;

    fn resolver() -> AuthorResolver {
        AuthorResolver::bundled().unwrap()
    }

    #[test]
    fn test_channel_metadata() {
        let feed = convert_rss(SAMPLE_RSS, &resolver()).unwrap();
        assert_eq!(feed.version, JSON_FEED_VERSION);
        assert_eq!(feed.title, "Inkhaven Daily");
        assert_eq!(feed.home_page_url, "https://inkhaven.example/");
        assert_eq!(feed.feed_url, "https://inkhaven.com/feed.json");
        assert_eq!(feed.description, "Posts from residents & friends");
        assert_eq!(feed.items.len(), 3);
    }

    #[test]
    fn test_item_conversion() {
        let feed = convert_rss(SAMPLE_RSS, &resolver()).unwrap();

        let first = &feed.items[0];
        assert_eq!(first.id, "https://justismills.substack.com/p/why-i-write");
        assert_eq!(first.title, "Why I Write");
        assert_eq!(first.date_modified, "2025-12-01T00:00:00.000Z");
        assert_eq!(first.content_html, "");
        assert_eq!(first.author.name, "Justis Mills");
        assert_eq!(first.author.url, "https://justismills.substack.com/");

        let second = &feed.items[1];
        assert_eq!(second.id, "post-2");
        assert_eq!(second.title, "Bayes & Beyond");
        assert_eq!(second.date_modified, "sometime last week");
        assert_eq!(second.author.name, "example.org");
    }

    #[test]
    fn test_missing_item_fields_use_defaults() {
        let feed = convert_rss(SAMPLE_RSS, &resolver()).unwrap();
        let third = &feed.items[2];
        assert_eq!(third.title, "Untitled");
        assert_eq!(third.id, "https://jane-doe.substack.com/p/untitled");
        assert_eq!(third.date_modified, "");
        assert_eq!(third.author.name, "Jane Doe");
    }

    #[test]
    fn test_missing_channel_metadata_defaults() {
        let xml = "<rss><channel><item><link>https://example.org/a</link></item></channel></rss>";
        let feed = convert_rss(xml, &resolver()).unwrap();
        assert_eq!(feed.title, "Inkhaven Residency Publications");
        assert_eq!(feed.home_page_url, "https://inkhaven.com/");
        assert_eq!(
            feed.description,
            "Latest publications from Inkhaven Residency writers"
        );
        assert_eq!(feed.items[0].id, "https://example.org/a");
    }

    #[test]
    fn test_missing_channel_is_error() {
        let result = convert_rss("<rss><item/></rss>", &resolver());
        assert!(matches!(result, Err(FeedError::MissingChannel)));
    }

    #[test]
    fn test_malformed_xml_is_error() {
        let result = convert_rss("<rss><channel><title>x</channel></rss>", &resolver());
        assert!(matches!(result, Err(FeedError::MalformedXml { .. })));
    }

    #[test]
    fn test_pub_date_normalization() {
        assert_eq!(
            normalize_pub_date("Mon, 01 Dec 2025 00:00:00 GMT"),
            "2025-12-01T00:00:00.000Z"
        );
        assert_eq!(
            normalize_pub_date("Tue, 02 Dec 2025 09:30:00 +0200"),
            "2025-12-02T07:30:00.000Z"
        );
        assert_eq!(normalize_pub_date("not a date"), "not a date");
    }

    #[tokio::test]
    async fn test_json_feed_file_round_trip_keeps_unicode() {
        let xml = r#"<rss><channel><item>
            <title>Café notes</title>
            <link>https://agarriga.substack.com/p/cafe</link>
        </item></channel></rss>"#;
        let feed = convert_rss(xml, &resolver()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        write_json_feed(&path, &feed).await.unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(raw.contains("Café notes"));
        assert!(raw.contains("Adrià Garriga Alonso"));
        assert!(raw.contains("\n    \"version\""));

        let loaded = load_json_feed(&path).await.unwrap();
        assert_eq!(loaded, feed);
    }
}
