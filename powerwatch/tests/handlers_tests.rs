use clap::{Arg, ArgAction, ArgMatches, Command};
use powerwatch::handlers::*;
use powerwatch_core::data::{DataSource, Dataset};
use powerwatch_core::model::{Edge, EdgeBindings, Node};
use powerwatch_core::search::{SearchKey, SearchSession, SessionOptions, Strategy};
use powerwatch_viz::VizConfig;
use rust_decimal::Decimal;
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

fn data_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("nodes.csv"),
        "Node,link,Blurb,Summary,Types,pagerank\n\
         BlackRock,/org/1,Investment firm,Asset manager,Business,0.9\n\
         Larry Fink,/person/2,CEO,,Person,0.4\n",
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("edges.csv"),
        "from_node,to_node,relationship_type,metadata\n\
         Larry Fink,BlackRock,board-member,\n\
         Larry Fink,Some PAC,contribution,$1000\n",
    )
    .unwrap();
    temp_dir
}

fn matches(args: &[&str]) -> ArgMatches {
    Command::new("powerwatch")
        .arg(Arg::new("TERM"))
        .arg(Arg::new("strategy").short('s').long("strategy"))
        .arg(Arg::new("both").long("both").action(ArgAction::SetTrue))
        .arg(Arg::new("data").short('d').long("data"))
        .arg(Arg::new("sqlite").long("sqlite"))
        .arg(
            Arg::new("keep-contributors")
                .long("keep-contributors")
                .action(ArgAction::SetTrue),
        )
        .try_get_matches_from(std::iter::once("powerwatch").chain(args.iter().copied()))
        .unwrap()
}

// ============================================================================
// Data Source Tests
// ============================================================================

#[test]
fn test_resolve_csv_dir() {
    let temp_dir = data_dir();
    let path = temp_dir.path().to_str().unwrap();

    let source = resolve_data_source(path, None).unwrap();
    assert_eq!(source, DataSource::CsvDir(temp_dir.path().to_path_buf()));
}

#[test]
fn test_resolve_missing_tables() {
    let temp_dir = TempDir::new().unwrap();
    let result = resolve_data_source(temp_dir.path().to_str().unwrap(), None);

    assert!(result.is_err());
    assert!(result.unwrap_err().contains("No nodes.csv found"));
}

#[test]
fn test_resolve_missing_sqlite() {
    let temp_dir = data_dir();
    let missing = temp_dir.path().join("nope.db");
    let result = resolve_data_source("./data", Some(missing.to_str().unwrap()));

    assert!(result.unwrap_err().contains("SQLite database not found"));
}

#[test]
fn test_session_options() {
    assert!(session_options(false).drop_contributors);
    assert!(!session_options(true).drop_contributors);
}

#[test]
fn test_load_session_drops_contributors() {
    let temp_dir = data_dir();
    let dir = temp_dir.path().to_str().unwrap();

    let session = load_session(&matches(&["-d", dir])).unwrap();
    assert_eq!(session.search_edges().len(), 1);
    assert_eq!(session.all_edges().len(), 2);

    let session = load_session(&matches(&["-d", dir, "--keep-contributors"])).unwrap();
    assert_eq!(session.search_edges().len(), 2);
}

// ============================================================================
// Search Request Tests
// ============================================================================

#[test]
fn test_parse_search_request() {
    let key = parse_search_request(&matches(&["  BlackRock ", "-s", "nearest", "--both"])).unwrap();
    // both is only meaningful for milieu
    assert_eq!(key, SearchKey::new(Strategy::Nearest, "BlackRock", false));
}

#[test]
fn test_parse_search_request_defaults_to_milieu() {
    let key = parse_search_request(&matches(&["BlackRock", "--both"])).unwrap();
    assert_eq!(key.strategy, Strategy::Milieu);
    assert!(key.both);
}

#[test]
fn test_parse_search_request_bad_strategy() {
    let result = parse_search_request(&matches(&["BlackRock", "-s", "bfs"]));
    assert!(result.unwrap_err().contains("bfs"));
}

#[test]
fn test_parse_search_request_requires_term() {
    assert!(parse_search_request(&matches(&[])).is_err());
}

// ============================================================================
// Plot Tests
// ============================================================================

#[tokio::test]
async fn test_plot_uses_session_bindings() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/auth/token/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok-1" })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/upload/datasets/"))
        .and(body_partial_json(json!({
            "edge_encodings": { "bindings": { "source": "from_node", "destination": "to_node" } }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": { "dataset_id": "ds-7" } })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/upload/datasets/ds-7/edges/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/upload/datasets/ds-7/nodes/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&mock_server)
        .await;

    let dataset = Dataset::new(
        vec![Node::new("Larry Fink"), Node::new("BlackRock")],
        vec![Edge::new("Larry Fink", "BlackRock", "board-member", "")],
    );
    let options = SessionOptions {
        bindings: EdgeBindings::natural(),
        ..SessionOptions::default()
    };
    let mut session = SearchSession::new(dataset, options);
    let subgraph = session
        .search(SearchKey::new(Strategy::Nearest, "BlackRock", false))
        .clone();

    let config = VizConfig::new("analyst", "secret")
        .with_endpoint(&mock_server.uri())
        .unwrap();
    let result = plot_with_config(config, &subgraph, session.filter().bindings())
        .await
        .unwrap();
    assert_eq!(result.dataset_id, "ds-7");
}

// ============================================================================
// Formatting Tests
// ============================================================================

#[test]
fn test_format_currency() {
    assert_eq!(format_currency(Decimal::new(120050, 2)), "$1,200.50");
    assert_eq!(format_currency(Decimal::ZERO), "$0.00");
    assert_eq!(format_currency(Decimal::new(1234567, 0)), "$1,234,567.00");
    assert_eq!(format_currency(Decimal::new(999, 0)), "$999.00");
    assert_eq!(format_currency(Decimal::new(-25, 1)), "-$2.50");
}
