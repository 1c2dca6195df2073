// Ranked result reports for a search subgraph

use crate::error::{DataError, Result};
use crate::model::{Node, Subgraph};
use crate::search::SearchKey;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use url::Url;

/// Entity links in the dataset are relative to this site.
pub const LINK_BASE: &str = "https://littlesis.org/";
pub const DEFAULT_TOP_N: usize = 100;
pub const NO_RESULTS: &str = "No results found, try another search term";

const WEBSITE_DISPLAY_LEN: usize = 90;
const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
    Html,
    Markdown,
}

impl FromStr for ReportFormat {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            "html" => Ok(ReportFormat::Html),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            _ => Err(DataError::InvalidFormat(s.to_string())),
        }
    }
}

/// One entry of the ranked result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub rank: usize,
    pub name: String,
    pub url: String,
    pub blurb: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub tags: Vec<String>,
    pub pagerank: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchInfo {
    pub session_id: String,
    pub term: String,
    pub strategy: String,
    pub both: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub search: SearchInfo,
    pub total_edges: usize,
    pub total_nodes: usize,
    pub results: Vec<ResultRow>,
    pub top_tags: Vec<(String, usize)>,
    pub relationships: Vec<(String, usize)>,
}

/// Resolve a dataset link against [`LINK_BASE`].
pub fn resolve_link(link: &str) -> String {
    Url::parse(LINK_BASE)
        .and_then(|base| base.join(link))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| link.to_string())
}

/// Split a `Types` cell into tags.
pub fn split_tags(types: &str) -> Vec<String> {
    types
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tag as displayed: dashes become spaces.
pub fn display_tag(tag: &str) -> String {
    tag.replace('-', " ")
}

/// Most frequent tags across `nodes`, ties by name.
pub fn tag_frequencies(nodes: &[Node], limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for node in nodes {
        for tag in split_tags(&node.types) {
            *counts.entry(tag).or_default() += 1;
        }
    }
    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.truncate(limit);
    sorted
}

/// Unique nodes ordered by pagerank, highest first, truncated to `top_n`.
pub fn rank_nodes(nodes: &[Node], top_n: usize) -> Vec<ResultRow> {
    let mut seen = HashSet::new();
    let mut unique: Vec<&Node> = nodes
        .iter()
        .filter(|n| seen.insert(n.name.as_str()))
        .collect();
    unique.sort_by(|a, b| b.pagerank.total_cmp(&a.pagerank));

    unique
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, node)| ResultRow {
            rank: i + 1,
            name: node.name.clone(),
            url: resolve_link(&node.link),
            blurb: node.blurb.clone(),
            summary: node.summary.clone(),
            website: (!node.website.is_empty())
                .then(|| node.website.chars().take(WEBSITE_DISPLAY_LEN).collect()),
            tags: split_tags(&node.types),
            pagerank: node.pagerank,
        })
        .collect()
}

pub fn gather_report_data(
    session_id: &str,
    key: &SearchKey,
    subgraph: &Subgraph,
    top_n: usize,
) -> ReportData {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for edge in &subgraph.edges {
        *counts.entry(edge.relationship.as_str()).or_default() += 1;
    }
    let mut relationships: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    relationships.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    ReportData {
        search: SearchInfo {
            session_id: session_id.to_string(),
            term: key.term.clone(),
            strategy: key.strategy.label().to_string(),
            both: key.both,
        },
        total_edges: subgraph.edges.len(),
        total_nodes: subgraph.nodes.len(),
        results: rank_nodes(&subgraph.nodes, top_n),
        top_tags: tag_frequencies(&subgraph.nodes, 10),
        relationships,
    }
}

pub fn render(data: &ReportData, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(data)),
        ReportFormat::Json => Ok(generate_json_report(data)?),
        ReportFormat::Csv => generate_csv_report(data),
        ReportFormat::Html => Ok(generate_html_report(data)),
        ReportFormat::Markdown => Ok(generate_markdown_report(data)),
    }
}

pub fn generate_text_report(data: &ReportData) -> String {
    let mut report = String::new();

    report.push_str(RULE);
    report.push_str("                      INFLUENCE & POWER NETWORKS\n");
    report.push_str(RULE);
    report.push('\n');

    report.push_str(&format!("Search:        {}\n", data.search.term));
    report.push_str(&format!("Search Type:   {}\n", data.search.strategy));
    if data.search.both {
        report.push_str("Direction:     both\n");
    }
    report.push_str(&format!("Relationships: {}\n", data.total_edges));
    report.push_str(&format!("Entities:      {}\n", data.total_nodes));
    report.push('\n');

    if data.total_nodes == 0 {
        report.push_str(NO_RESULTS);
        report.push('\n');
        return report;
    }

    if !data.relationships.is_empty() {
        report.push_str("Relationship types:\n");
        for (name, count) in data.relationships.iter().take(10) {
            report.push_str(&format!("  {:<30} {}\n", name, count));
        }
        report.push('\n');
    }

    if !data.top_tags.is_empty() {
        let tags: Vec<String> = data.top_tags.iter().map(|(t, _)| display_tag(t)).collect();
        report.push_str(&format!("Tags: {}\n\n", tags.join(" · ")));
    }

    report.push_str(RULE);
    report.push_str("RESULTS\n");
    report.push_str(RULE);
    report.push('\n');

    for row in &data.results {
        report.push_str(&format!("{}. {}\n", row.rank, row.name));
        report.push_str(&format!("   {}\n", row.url));
        if let Some(ref website) = row.website {
            report.push_str(&format!("   {}\n", website));
        }
        let mut line = String::new();
        if !row.blurb.is_empty() {
            line.push_str(&row.blurb);
        }
        if !row.summary.is_empty() {
            if !line.is_empty() {
                line.push_str(" · ");
            }
            line.push_str(&row.summary);
        }
        if !line.is_empty() {
            report.push_str(&wrap_text(&line, 80, "   "));
        }
        report.push('\n');
    }

    report
}

pub fn generate_json_report(data: &ReportData) -> std::result::Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Powerwatch",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "search": data.search,
            "summary": {
                "total_relationships": data.total_edges,
                "total_entities": data.total_nodes,
                "relationship_breakdown": data.relationships
                    .iter()
                    .map(|(name, count)| serde_json::json!({ "relationship": name, "count": count }))
                    .collect::<Vec<_>>(),
                "top_tags": data.top_tags
                    .iter()
                    .map(|(tag, count)| serde_json::json!({ "tag": tag, "count": count }))
                    .collect::<Vec<_>>()
            },
            "results": data.results
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_csv_report(data: &ReportData) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["rank", "Node", "link", "Blurb", "Summary", "Website", "Types", "pagerank"])?;
    for row in &data.results {
        writer.write_record([
            row.rank.to_string(),
            row.name.clone(),
            row.url.clone(),
            row.blurb.clone(),
            row.summary.clone(),
            row.website.clone().unwrap_or_default(),
            row.tags.join(", "),
            row.pagerank.to_string(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| DataError::IoError(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn generate_markdown_report(data: &ReportData) -> String {
    let mut report = String::new();
    report.push_str(&format!("# {} search: {}\n\n", data.search.strategy, data.search.term));
    report.push_str(&format!(
        "{} relationships, {} entities\n\n",
        data.total_edges, data.total_nodes
    ));

    if data.total_nodes == 0 {
        report.push_str(&format!("_{}_\n", NO_RESULTS));
        return report;
    }

    report.push_str("| # | Entity | Blurb | Pagerank |\n");
    report.push_str("|---|--------|-------|----------|\n");
    for row in &data.results {
        report.push_str(&format!(
            "| {} | [{}]({}) | {} | {:.4} |\n",
            row.rank,
            row.name.replace('|', "\\|"),
            row.url,
            row.blurb.replace('|', "\\|"),
            row.pagerank
        ));
    }
    report
}

/// Result cards, one `div` block per entity.
pub fn generate_html_report(data: &ReportData) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\">");
    html.push_str(&format!("<title>{}</title></head>\n<body>\n", escape_html(&data.search.term)));

    if data.total_nodes == 0 {
        html.push_str(&format!("<p>{}</p>\n", NO_RESULTS));
    }

    if !data.top_tags.is_empty() {
        let term = url::form_urlencoded::byte_serialize(data.search.term.as_bytes()).collect::<String>();
        for (tag, _) in &data.top_tags {
            let encoded_tag = url::form_urlencoded::byte_serialize(tag.as_bytes()).collect::<String>();
            html.push_str(&format!(
                "<a id=\"tags\" href=\"?search={}&tags={}\">{}</a>\n",
                term,
                encoded_tag,
                escape_html(&display_tag(tag))
            ));
        }
        html.push_str("<br><br>\n");
    }

    for row in &data.results {
        html.push_str(&format!(
            "<div style=\"font-size:122%;\">{}. <a href=\"{}\">{}</a></div>\n",
            row.rank,
            escape_html(&row.url),
            escape_html(&row.name)
        ));
        html.push_str("<div style=\"font-size:95%;\">\n");
        if let Some(ref website) = row.website {
            html.push_str(&format!(
                "<div style=\"color:grey;font-size:85%;\"><a href=\"{0}\">{0}</a></div>\n",
                escape_html(website)
            ));
        }
        html.push_str(&format!(
            "<div style=\"font-size:112%;float:left;font-style:italic;\">{} &middot;&nbsp;</div>\n",
            escape_html(&row.blurb)
        ));
        html.push_str(&format!(
            "<div style=\"float:left;font-style:normal;\">{} &middot;&nbsp;</div>\n",
            escape_html(&row.summary)
        ));
        html.push_str("</div>\n<br style=\"clear:both;\">\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let mut result = String::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.len() + word.len() + 1 > width - indent.len() && !current_line.is_empty() {
            result.push_str(indent);
            result.push_str(&current_line);
            result.push('\n');
            current_line.clear();
        }

        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        result.push_str(indent);
        result.push_str(&current_line);
        result.push('\n');
    }

    result
}
