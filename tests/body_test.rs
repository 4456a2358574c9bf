mod common;

use common::{MockSource, alternative};
use email_body_extract::*;
use serde_json::json;

fn resolve(message: &FetchedMessage, source: &MockSource, options: &ResolveOptions) -> ResolvedBody {
    tokio_test::block_on(resolve_body(message, source, options))
}

#[test]
fn test_raw_html_returns_leaf_unchanged() {
    let html = "<html><body><p>Hi <b>there</b></p></body></html>";
    let message = FetchedMessage::new(7).with_structure(alternative());
    let source = MockSource::new().with_part("1", "plain").with_part("2", html);
    let options = ResolveOptions::default().with_projection(Projection::RawHtml);

    let body = resolve(&message, &source, &options);

    assert_eq!(body.as_text(), Some(html));
    assert_eq!(body.source_format, SourceFormat::Html);
    assert!(!body.truncated);
}

#[test]
fn test_html_is_sanitized_by_default() {
    let message = FetchedMessage::new(1).with_structure(alternative());
    let source = MockSource::new()
        .with_part("1", "plain version")
        .with_part("2", "<h1>News</h1><p>Read <a href=\"https://x.test\">more</a></p>");

    let body = resolve(&message, &source, &ResolveOptions::default());

    assert_eq!(body.as_text(), Some("News\n\nRead more"));
    assert_eq!(body.source_format, SourceFormat::Html);
}

#[test]
fn test_plain_leaf_used_without_html() {
    let message = FetchedMessage::new(2).with_structure(MimePart::leaf("text", "plain").with_part_id("1"));
    let source = MockSource::new().with_part("1", "Just text\nsecond line");

    let body = resolve(&message, &source, &ResolveOptions::default());

    assert_eq!(body.as_text(), Some("Just text\nsecond line"));
    assert_eq!(body.source_format, SourceFormat::Plain);
}

#[test]
fn test_default_projection_truncates_long_plain_body() {
    let long = "x".repeat(500);
    let message = FetchedMessage::new(3).with_structure(MimePart::leaf("text", "plain").with_part_id("1"));
    let source = MockSource::new().with_part("1", &long);

    let body = resolve(&message, &source, &ResolveOptions::default());
    let text = body.as_text().unwrap();

    assert_eq!(text.chars().count(), 203);
    assert!(text.ends_with("..."));
    assert!(body.truncated);
}

#[test]
fn test_full_and_raw_projections_are_not_truncated() {
    let long = "y".repeat(500);
    let message = FetchedMessage::new(3).with_structure(MimePart::leaf("text", "plain").with_part_id("1"));
    let source = MockSource::new().with_part("1", &long);

    for options in [
        ResolveOptions::default().with_projection(Projection::FullSanitized),
        ResolveOptions::default().with_projection(Projection::RawHtml),
        ResolveOptions::default().with_single_message(true),
    ] {
        let body = resolve(&message, &source, &options);
        assert_eq!(body.as_text(), Some(long.as_str()), "{options:?}");
        assert!(!body.truncated);
    }
}

#[test]
fn test_failed_html_fetch_falls_back_to_plain() {
    let message = FetchedMessage::new(4).with_structure(alternative());
    let source = MockSource::new()
        .with_part("1", "plain fallback")
        .with_failing_part("2");

    let body = resolve(&message, &source, &ResolveOptions::default());

    assert_eq!(body.as_text(), Some("plain fallback"));
    assert_eq!(body.source_format, SourceFormat::Plain);
    assert_eq!(source.calls(), vec!["part:2", "part:1"]);
}

#[test]
fn test_blank_html_leaf_falls_back_to_plain() {
    let message = FetchedMessage::new(4).with_structure(alternative());
    let source = MockSource::new()
        .with_part("1", "the real body")
        .with_part("2", "  \r\n ");

    let body = resolve(&message, &source, &ResolveOptions::default());

    assert_eq!(body.as_text(), Some("the real body"));
}

#[test]
fn test_encoded_leaves_are_decoded() {
    let structure = MimePart::multipart(
        "alternative",
        vec![
            MimePart::leaf("text", "plain")
                .with_part_id("1")
                .with_encoding("quoted-printable")
                .with_param("charset", "utf-8"),
            MimePart::leaf("text", "html")
                .with_part_id("2")
                .with_encoding("base64"),
        ],
    );
    let message = FetchedMessage::new(5).with_structure(structure);
    let source = MockSource::new()
        .with_part("1", "Caf=C3=A9 au lait")
        .with_part("2", "PHA+SGkgdGhlcmU8L3A+");

    let html = resolve(
        &message,
        &source,
        &ResolveOptions::default().with_projection(Projection::RawHtml),
    );
    assert_eq!(html.as_text(), Some("<p>Hi there</p>"));

    let source = MockSource::new()
        .with_part("1", "Caf=C3=A9 au lait")
        .with_failing_part("2");
    let plain = resolve(&message, &source, &ResolveOptions::default());
    assert_eq!(plain.as_text(), Some("Café au lait"));
}

#[test]
fn test_text_section_refetch_when_no_leaves() {
    let message = FetchedMessage::new(9);
    let source = MockSource::new().with_text_section("Hello from the TEXT section");

    let body = resolve(&message, &source, &ResolveOptions::default());

    assert_eq!(body.as_text(), Some("Hello from the TEXT section"));
    assert_eq!(body.source_format, SourceFormat::Plain);
    assert_eq!(source.calls(), vec!["refetch:TEXT"]);
}

#[test]
fn test_text_section_with_boundary_is_parsed_as_multipart() {
    let section = "--b1\r\n\
                   Content-Type: text/html; charset=utf-8\r\n\
                   \r\n\
                   <p>Only <i>HTML</i> here</p>\r\n\
                   --b1--\r\n";
    let message = FetchedMessage::new(10);
    let source = MockSource::new().with_text_section(section);

    let body = resolve(&message, &source, &ResolveOptions::default());

    assert_eq!(body.as_text(), Some("Only HTML here"));
    assert_eq!(body.source_format, SourceFormat::Html);
}

#[test]
fn test_prefetched_raw_message_is_parsed_before_refetch() {
    let raw = "From: a@example.com\r\n\
               Subject: Raw\r\n\
               Content-Type: text/plain\r\n\
               \r\n\
               Body from the raw message";
    let message = FetchedMessage::new(11).with_raw(raw);
    let source = MockSource::new().with_text_section("should not be used");

    let body = resolve(&message, &source, &ResolveOptions::default());

    assert_eq!(body.as_text(), Some("Body from the raw message"));
    assert!(source.calls().is_empty());
}

#[test]
fn test_nothing_retrievable_gives_empty_body() {
    let message = FetchedMessage::new(12).with_structure(alternative());
    let source = MockSource::new()
        .with_failing_part("1")
        .with_failing_part("2");

    let body = resolve(&message, &source, &ResolveOptions::default());

    assert!(body.is_empty());
    assert_eq!(body, ResolvedBody::empty());
    assert_eq!(source.calls(), vec!["part:2", "part:1", "refetch:TEXT"]);
}

#[test]
fn test_failed_text_refetch_gives_empty_body() {
    let message = FetchedMessage::new(18).with_structure(alternative());
    let source = MockSource::new()
        .with_failing_part("1")
        .with_failing_part("2")
        .with_text_section("never delivered")
        .with_failing_refetch();

    let body = resolve(&message, &source, &ResolveOptions::default());

    assert_eq!(body, ResolvedBody::empty());
    assert_eq!(source.calls(), vec!["part:2", "part:1", "refetch:TEXT"]);
}

#[test]
fn test_hierarchical_projection_returns_object() {
    let message = FetchedMessage::new(13).with_structure(alternative());
    let source = MockSource::new().with_part("2", "<p>a</p><p>b</p>");
    let options = ResolveOptions::default().with_projection(Projection::HierarchicalJson);

    let body = resolve(&message, &source, &options);

    assert!(matches!(body.content, BodyContent::Hierarchical(_)));
    assert!(!body.truncated);
    assert_eq!(
        serde_json::to_value(&body).unwrap(),
        json!({"text": {"p": ["a", "b"]}, "sourceFormat": "html", "truncated": false})
    );
}

#[test]
fn test_columnar_projection_without_tables_is_empty_mapping() {
    let message = FetchedMessage::new(14).with_structure(alternative());
    let source = MockSource::new().with_part("2", "<p>no tables here</p>");
    let options = ResolveOptions::default().with_projection(Projection::ColumnarJson);

    let body = resolve(&message, &source, &options);

    assert_eq!(serde_json::to_value(&body.content).unwrap(), json!({}));
}

#[test]
fn test_json_projection_passes_plain_text_through() {
    let message = FetchedMessage::new(15).with_structure(MimePart::leaf("text", "plain").with_part_id("1"));
    let source = MockSource::new().with_part("1", "plain only");
    let options = ResolveOptions::default().with_projection(Projection::ColumnarJson);

    let body = resolve(&message, &source, &options);

    assert_eq!(body.as_text(), Some("plain only"));
    assert_eq!(body.source_format, SourceFormat::Plain);
}

#[test]
fn test_attachment_text_leaf_is_not_a_body() {
    let structure = MimePart::multipart(
        "mixed",
        vec![
            MimePart::leaf("text", "plain")
                .with_part_id("1")
                .with_disposition(DispositionKind::Attachment, Some("notes.txt")),
            MimePart::leaf("text", "plain").with_part_id("2"),
        ],
    );
    let message = FetchedMessage::new(16).with_structure(structure);
    let source = MockSource::new()
        .with_part("1", "attached notes")
        .with_part("2", "actual body");

    let body = resolve(&message, &source, &ResolveOptions::default());

    assert_eq!(body.as_text(), Some("actual body"));
}

#[test]
fn test_attachment_html_leaf_is_used_when_it_is_the_only_text() {
    let structure = MimePart::leaf("text", "html")
        .with_part_id("1")
        .with_disposition(DispositionKind::Attachment, Some("page.html"));
    let message = FetchedMessage::new(17).with_structure(structure);
    let source = MockSource::new().with_part("1", "<p>only html</p>");
    let options = ResolveOptions::default().with_projection(Projection::RawHtml);

    let body = resolve(&message, &source, &options);

    assert_eq!(body.as_text(), Some("<p>only html</p>"));
    assert_eq!(body.source_format, SourceFormat::Html);
    assert_eq!(source.calls(), vec!["part:1"]);
}

#[test]
fn test_projection_parsing() {
    assert_eq!("raw-html".parse::<Projection>().unwrap(), Projection::RawHtml);
    assert_eq!("Columnar-JSON".parse::<Projection>().unwrap(), Projection::ColumnarJson);
    assert_eq!(Projection::FullSanitized.to_string(), "full-sanitized");
    assert!("markdown".parse::<Projection>().is_err());
}

#[test]
fn test_options_deserialize_with_defaults() {
    let options: ResolveOptions =
        serde_json::from_str(r#"{"projection": "hierarchical-json"}"#).unwrap();
    assert_eq!(options.projection, Projection::HierarchicalJson);
    assert_eq!(options.truncate_at, DEFAULT_TRUNCATE_AT);
    assert!(!options.single_message);
    assert!(!options.should_truncate());
    assert!(ResolveOptions::default().should_truncate());
}
