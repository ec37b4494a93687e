//! Integration tests for the search-result parser against a captured results page.

use torrentbd::parser::{ENGINE_URL, ParseStage, SearchResultParser};
use torrentbd::{Field, ResultRecord, format_result_line};

const SAMPLE: &str = include_str!("fixtures/sample_search_result.html");

fn parse_sample() -> SearchResultParser {
    let mut parser = SearchResultParser::new();
    parser.feed(SAMPLE);
    parser
}

#[test]
fn test_sample_page_yields_fifteen_results() {
    let parser = parse_sample();
    assert_eq!(parser.results().len(), 15);
}

#[test]
fn test_sample_page_final_state() {
    let parser = parse_sample();
    assert_eq!(parser.stage(), ParseStage::TableEnded);
    assert!(
        parser.current_row().is_empty(),
        "no partial row should remain after </table>: {:?}",
        parser.current_row()
    );
}

#[test]
fn test_every_result_has_all_fields() {
    let parser = parse_sample();
    for (i, record) in parser.results().iter().enumerate() {
        for field in Field::ALL {
            assert!(
                record.get(field).is_some(),
                "row {i} is missing {}: {record:?}",
                field.as_str()
            );
        }
        assert_eq!(record.engine_url(), Some(ENGINE_URL));
    }
}

#[test]
fn test_text_fields_are_cleaned() {
    let parser = parse_sample();
    for record in parser.results() {
        for field in [Field::Name, Field::Size, Field::Seeds, Field::Leech] {
            let value = record.get(field).unwrap_or_default();
            assert!(!value.contains(','), "{} has a comma: {value:?}", field.as_str());
            assert_eq!(value, value.trim(), "{} is not trimmed", field.as_str());
        }
    }
}

#[test]
fn test_links_are_absolute_and_entities_decoded() {
    let parser = parse_sample();
    let first = &parser.results()[0];
    assert_eq!(
        first.link(),
        Some("https://www.torrentbd.com/download.php?id=101&type=torrent")
    );
    assert_eq!(
        first.desc_link(),
        Some("https://www.torrentbd.com/torrents-details.php?id=101")
    );
    assert!(
        parser
            .results()
            .iter()
            .filter_map(ResultRecord::link)
            .all(|link| link.starts_with("https://www.torrentbd.com/"))
    );
}

#[test]
fn test_values_follow_page_order() {
    let parser = parse_sample();
    let results = parser.results();
    assert_eq!(results[0].name(), Some("Ubuntu 24.04 LTS Desktop amd64"));
    assert_eq!(results[0].seeds(), Some("1204"));
    assert_eq!(results[1].size(), Some("1024.5 MB"));
    assert_eq!(results[3].name(), Some("Tears of Steel & Extras"));
    assert_eq!(results[6].name(), Some("OpenTTD 14.1 Linux"));
    assert_eq!(results[14].leech(), Some("14"));
}

#[test]
fn test_sample_page_renders_result_lines() {
    let parser = parse_sample();
    let line = format_result_line(&parser.results()[1]);
    assert_eq!(
        line,
        "https://www.torrentbd.com/download.php?id=102&type=torrent|Big Buck Bunny (2008) 1080p|1074266112|312|8|https://www.torrentbd.com|https://www.torrentbd.com/torrents-details.php?id=102"
    );
}

#[test]
fn test_feeding_in_two_chunks_matches_single_feed() {
    // Split between rows so no tag is cut in half.
    let split = SAMPLE
        .find("  <tr class=\"tor-row\">\n    <td class=\"cat-icon\"><img src=\"/images/cat/tv.png\"")
        .expect("fixture contains a TV row");
    let mut parser = SearchResultParser::new();
    parser.feed(&SAMPLE[..split]);
    let partial = parser.results().len();
    parser.feed(&SAMPLE[split..]);

    assert_eq!(partial, 4);
    assert_eq!(parser.results(), parse_sample().results());
}

#[test]
fn test_feeding_byte_chunks_matches_single_feed() {
    // Fixed-size chunks cut through tags, attribute values and text alike.
    let expected = parse_sample();
    for chunk_len in [7, 64, 333] {
        let mut parser = SearchResultParser::new();
        let mut start = 0;
        while start < SAMPLE.len() {
            let mut end = (start + chunk_len).min(SAMPLE.len());
            while !SAMPLE.is_char_boundary(end) {
                end += 1;
            }
            parser.feed(&SAMPLE[start..end]);
            start = end;
        }
        assert_eq!(parser.results(), expected.results(), "chunk length {chunk_len}");
        assert_eq!(parser.stage(), ParseStage::TableEnded);
    }
}

#[test]
fn test_bogus_declarations_in_page_are_skipped() {
    let page = SAMPLE.replace("  <tr class=\"tor-row\">", "<![if !IE]><!x>  <tr class=\"tor-row\">");
    let mut parser = SearchResultParser::new();
    parser.feed(&page);
    assert_eq!(parser.results(), parse_sample().results());
    assert_eq!(parser.stage(), ParseStage::TableEnded);
}
