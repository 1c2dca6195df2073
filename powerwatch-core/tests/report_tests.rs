// Tests for report generation functionality

use powerwatch_core::model::{Edge, Node, Subgraph};
use powerwatch_core::report::{
    NO_RESULTS, ReportData, ReportFormat, display_tag, gather_report_data, generate_csv_report,
    generate_html_report, generate_json_report, generate_markdown_report, generate_text_report,
    rank_nodes, render, resolve_link, save_report, split_tags, tag_frequencies,
};
use powerwatch_core::search::{SearchKey, Strategy};
use std::str::FromStr;
use tempfile::TempDir;

fn node(name: &str, pagerank: f64, types: &str) -> Node {
    let mut node = Node::new(name).with_pagerank(pagerank);
    node.link = format!("/org/{}", name.replace(' ', "_"));
    node.types = types.to_string();
    node
}

fn sample_subgraph() -> Subgraph {
    let mut edges = vec![
        Edge::new("Larry Fink", "BlackRock", "board-member", ""),
        Edge::new("PNC", "BlackRock", "shareholder", ""),
        Edge::new("Vanguard", "BlackRock", "shareholder", ""),
    ];
    for edge in &mut edges {
        edge.relationship = edge.relationship_type.clone();
    }
    let mut blackrock = node("BlackRock", 0.9, "Business, Public-Company");
    blackrock.blurb = "Investment firm".to_string();
    blackrock.website = "https://www.blackrock.com".to_string();

    Subgraph::new(
        edges,
        vec![
            node("Larry Fink", 0.4, "Person, Business-Person"),
            blackrock,
            node("PNC", 0.2, "Business"),
            node("Vanguard", 0.8, "Business"),
        ],
    )
}

fn sample_report() -> ReportData {
    let key = SearchKey::new(Strategy::Milieu, "BlackRock", true);
    gather_report_data("session-1", &key, &sample_subgraph(), 100)
}

fn empty_report() -> ReportData {
    let key = SearchKey::new(Strategy::Nearest, "nobody", false);
    gather_report_data("session-1", &key, &Subgraph::default(), 100)
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text").unwrap(), ReportFormat::Text);
    assert_eq!(ReportFormat::from_str("json").unwrap(), ReportFormat::Json);
    assert_eq!(ReportFormat::from_str("csv").unwrap(), ReportFormat::Csv);
    assert_eq!(ReportFormat::from_str("html").unwrap(), ReportFormat::Html);
    assert_eq!(ReportFormat::from_str("markdown").unwrap(), ReportFormat::Markdown);
    assert_eq!(ReportFormat::from_str("md").unwrap(), ReportFormat::Markdown);
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert_eq!(ReportFormat::from_str("TEXT").unwrap(), ReportFormat::Text);
    assert_eq!(ReportFormat::from_str("Json").unwrap(), ReportFormat::Json);
}

#[test]
fn test_report_format_from_str_invalid() {
    assert!(ReportFormat::from_str("pdf").is_err());
    assert!(ReportFormat::from_str("").is_err());
}

// ============================================================================
// Ranking Tests
// ============================================================================

#[test]
fn test_rank_nodes_by_pagerank_descending() {
    let rows = rank_nodes(&sample_subgraph().nodes, 100);
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["BlackRock", "Vanguard", "Larry Fink", "PNC"]);
    assert_eq!(rows[0].rank, 1);
    assert_eq!(rows[3].rank, 4);
}

#[test]
fn test_rank_nodes_drops_duplicates() {
    let nodes = vec![node("A", 0.1, ""), node("A", 0.1, ""), node("B", 0.5, "")];
    let rows = rank_nodes(&nodes, 100);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "B");
}

#[test]
fn test_rank_nodes_top_n() {
    let rows = rank_nodes(&sample_subgraph().nodes, 2);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].name, "Vanguard");
}

#[test]
fn test_rank_nodes_truncates_website() {
    let mut long = node("Long", 0.1, "");
    long.website = "x".repeat(200);
    let rows = rank_nodes(&[long, node("Short", 0.0, "")], 10);
    assert_eq!(rows[0].website.as_ref().map(|w| w.len()), Some(90));
    assert_eq!(rows[1].website, None);
}

#[test]
fn test_resolve_link() {
    assert_eq!(
        resolve_link("/org/14922-BlackRock"),
        "https://littlesis.org/org/14922-BlackRock"
    );
    assert_eq!(resolve_link(""), "https://littlesis.org/");
}

// ============================================================================
// Tag Tests
// ============================================================================

#[test]
fn test_split_tags() {
    assert_eq!(
        split_tags("Business, Public-Company,,"),
        vec!["Business".to_string(), "Public-Company".to_string()]
    );
    assert!(split_tags("").is_empty());
}

#[test]
fn test_display_tag() {
    assert_eq!(display_tag("Public-Company"), "Public Company");
}

#[test]
fn test_tag_frequencies() {
    let tags = tag_frequencies(&sample_subgraph().nodes, 2);
    assert_eq!(tags[0], ("Business".to_string(), 3));
    assert_eq!(tags.len(), 2);
}

// ============================================================================
// Report Data Tests
// ============================================================================

#[test]
fn test_gather_report_data() {
    let data = sample_report();
    assert_eq!(data.search.strategy, "Milieu");
    assert!(data.search.both);
    assert_eq!(data.total_edges, 3);
    assert_eq!(data.total_nodes, 4);
    assert_eq!(data.relationships[0], ("shareholder".to_string(), 2));
}

// ============================================================================
// Generation Tests
// ============================================================================

#[test]
fn test_text_report_contents() {
    let report = generate_text_report(&sample_report());
    assert!(report.contains("Search:        BlackRock"));
    assert!(report.contains("Search Type:   Milieu"));
    assert!(report.contains("1. BlackRock"));
    assert!(report.contains("https://littlesis.org/org/BlackRock"));
    assert!(report.contains("Public Company"));
    assert!(!report.contains(NO_RESULTS));
}

#[test]
fn test_text_report_no_results() {
    let report = generate_text_report(&empty_report());
    assert!(report.contains(NO_RESULTS));
    assert!(!report.contains("RESULTS"));
}

#[test]
fn test_zero_top_n_is_not_no_results() {
    let key = SearchKey::new(Strategy::Milieu, "BlackRock", false);
    let data = gather_report_data("session-1", &key, &sample_subgraph(), 0);
    assert!(data.results.is_empty());
    assert!(data.total_nodes > 0);

    assert!(!generate_text_report(&data).contains(NO_RESULTS));
    assert!(!generate_markdown_report(&data).contains(NO_RESULTS));
    assert!(!generate_html_report(&data).contains(NO_RESULTS));
}

#[test]
fn test_json_report_is_valid() {
    let json = generate_json_report(&sample_report()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["report"]["metadata"]["generator"], "Powerwatch");
    assert_eq!(value["report"]["search"]["term"], "BlackRock");
    assert_eq!(value["report"]["results"].as_array().unwrap().len(), 4);
    assert_eq!(value["report"]["results"][0]["name"], "BlackRock");
}

#[test]
fn test_csv_report() {
    let csv = generate_csv_report(&sample_report()).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("rank,Node,link,Blurb,Summary,Website,Types,pagerank")
    );
    assert!(lines.next().unwrap().starts_with("1,BlackRock,"));
    assert_eq!(csv.lines().count(), 5);
}

#[test]
fn test_markdown_report() {
    let md = generate_markdown_report(&sample_report());
    assert!(md.starts_with("# Milieu search: BlackRock"));
    assert!(md.contains("| 1 | [BlackRock](https://littlesis.org/org/BlackRock) |"));

    let empty = generate_markdown_report(&empty_report());
    assert!(empty.contains(NO_RESULTS));
}

#[test]
fn test_html_report_escapes_text() {
    let mut subgraph = sample_subgraph();
    subgraph.nodes[0].blurb = "<script>alert('x')</script>".to_string();
    let key = SearchKey::new(Strategy::TextSearch, "a&b", false);
    let data = gather_report_data("s", &key, &subgraph, 100);

    let html = generate_html_report(&data);
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>"));
    assert!(html.contains("<title>a&amp;b</title>"));
    assert!(html.contains("?search=a%26b&tags=Business"));
}

#[test]
fn test_render_dispatch() {
    let data = sample_report();
    assert!(render(&data, ReportFormat::Json).unwrap().starts_with('{'));
    assert!(render(&data, ReportFormat::Html).unwrap().starts_with("<!DOCTYPE html>"));
    assert!(render(&data, ReportFormat::Csv).unwrap().starts_with("rank,"));
}

#[test]
fn test_save_report() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("report.txt");
    save_report("hello", &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
}
