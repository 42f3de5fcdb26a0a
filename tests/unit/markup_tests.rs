/*!
 * Tests for extraction and reinjection on realistic content documents
 */

use epubtr::markup::extractor::{to_plain_text, BATCH_SEPARATOR};
use epubtr::markup::{extract, replace_spans, ExtractOptions};

const CHAPTER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="en">
<head>
  <title>Chapter 1</title>
  <!-- <p>commented out</p> -->
</head>
<body>
  <h1>Chapter 1</h1>
  <p class="first">It was a <em>bright</em> cold day in April.</p>
  <p>The clocks were striking&#160;thirteen.<br/>Winston hurried.</p>
  <p></p>
  <div class="quote"><p data-note="a > b">Quoted text</p></div>
</body>
</html>
"#;

#[test]
fn test_extract_withChapter_shouldReturnParagraphsInOrder() {
    let spans = extract(CHAPTER, &ExtractOptions::default());

    let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "It was a bright cold day in April.",
            "The clocks were striking&#160;thirteen.\nWinston hurried.",
            "",
            "Quoted text",
        ]
    );

    for span in &spans {
        let element = &CHAPTER[span.range.clone()];
        assert!(element.starts_with("<p"));
        assert!(element.ends_with("</p>"));
    }
}

#[test]
fn test_extract_twice_shouldBeDeterministic() {
    let options = ExtractOptions::default();
    assert_eq!(extract(CHAPTER, &options), extract(CHAPTER, &options));
}

#[test]
fn test_extract_withExtraTags_shouldIncludeHeadings() {
    let options = ExtractOptions::new(vec!["p".to_string(), "h1".to_string()], None);
    let spans = extract(CHAPTER, &options);

    assert_eq!(spans.len(), 5);
    assert_eq!(spans[0].text, "Chapter 1");
}

#[test]
fn test_replaceSpans_withTranslations_shouldKeepAttributesAndSurroundings() {
    let spans = extract(CHAPTER, &ExtractOptions::default());
    let substitutions = spans
        .iter()
        .filter(|s| !s.text.is_empty())
        .map(|s| (s.range.clone(), format!("FR:{}", s.text)))
        .collect();

    let rebuilt = replace_spans(CHAPTER, substitutions);

    assert!(rebuilt.contains(r#"<p class="first">FR:It was a bright cold day in April.</p>"#));
    assert!(rebuilt.contains(r#"<p data-note="a > b">FR:Quoted text</p>"#));
    assert!(rebuilt.contains("<p></p>"));
    assert!(rebuilt.contains("<h1>Chapter 1</h1>"));
    assert!(rebuilt.contains("<!-- <p>commented out</p> -->"));

    // Same number of units after rewriting
    assert_eq!(extract(&rebuilt, &ExtractOptions::default()).len(), spans.len());
}

#[test]
fn test_batchedExtraction_withFiveParagraphs_shouldGroupAndReinject() {
    let doc = "<body><p>1</p>\n<p>2</p>\n<p>3</p>\n<p>4</p>\n<p>5</p></body>";
    let options = ExtractOptions::new(vec!["p".to_string()], Some(2));
    let spans = extract(doc, &options);

    assert_eq!(spans.len(), 3);
    assert_eq!(spans[0].text, format!("1{}2", BATCH_SEPARATOR));
    assert_eq!(spans[0].members, 2);
    assert_eq!(spans[2].text, "5");
    assert_eq!(spans[2].members, 1);

    let substitutions = spans.iter().map(|s| (s.range.clone(), s.text.replace('\n', "|"))).collect();
    let rebuilt = replace_spans(doc, substitutions);

    assert_eq!(rebuilt, "<body><p>1||2</p>\n<p>3||4</p>\n<p>5</p></body>");
}

#[test]
fn test_toPlainText_withNestedInlineMarkup_shouldFlatten() {
    assert_eq!(to_plain_text("  <span><b>Bold</b> and <i>italic</i></span>\u{00A0}"), "Bold and italic");
    assert_eq!(to_plain_text("one<BR>two<br />three"), "one\ntwo\nthree");
}
