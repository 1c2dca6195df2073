// Loading the node and edge tables

use crate::error::{DataError, Result};
use crate::model::{Edge, Node, NodeField};
use crate::normalize::{self, CONTRIBUTION};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const NODES_FILE: &str = "nodes.csv";
pub const EDGES_FILE: &str = "edges.csv";

const EDGE_COLUMNS: [&str; 4] = ["from_node", "to_node", "relationship_type", "metadata"];
const REQUIRED_EDGE_COLUMNS: [&str; 3] = ["from_node", "to_node", "relationship_type"];

/// Where the tables come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// A directory holding `nodes.csv` and `edges.csv`.
    CsvDir(PathBuf),
    /// A SQLite database with `nodes` and `edges` tables.
    Sqlite(PathBuf),
}

impl DataSource {
    pub fn load(&self) -> Result<Dataset> {
        match self {
            DataSource::CsvDir(dir) => Dataset::from_csv_dir(dir),
            DataSource::Sqlite(path) => Dataset::from_sqlite(path),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DataSource::CsvDir(dir) => format!("csv:{}", dir.display()),
            DataSource::Sqlite(path) => format!("sqlite:{}", path.display()),
        }
    }
}

/// The two base tables, read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Table sizes and relationship categories of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub nodes: usize,
    pub edges: usize,
    pub contributions: usize,
    pub dangling_edges: usize,
    /// Relationship categories, most frequent first.
    pub relationships: Vec<(String, usize)>,
}

impl Dataset {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn from_csv_dir(dir: &Path) -> Result<Self> {
        Self::from_csv_files(&dir.join(NODES_FILE), &dir.join(EDGES_FILE))
    }

    pub fn from_csv_files(nodes_path: &Path, edges_path: &Path) -> Result<Self> {
        info!("Loading data from {} and {}", nodes_path.display(), edges_path.display());
        let nodes = std::fs::File::open(nodes_path)?;
        let edges = std::fs::File::open(edges_path)?;
        Self::from_readers(nodes, edges)
    }

    /// Read both tables from CSV streams with a header row.
    ///
    /// Columns are located by header name, so extra columns (including a
    /// leading unnamed index column) are ignored. Empty cells become empty
    /// strings, and an unreadable `pagerank` becomes 0.
    pub fn from_readers<N: Read, E: Read>(nodes: N, edges: E) -> Result<Self> {
        let nodes = read_nodes(nodes)?;
        let edges = read_edges(edges)?;
        info!("Number of total relationships {}", edges.len());
        info!("Number of total entities {}", nodes.len());
        Ok(Self { nodes, edges })
    }

    pub fn from_sqlite(path: &Path) -> Result<Self> {
        let source = SqliteSource::open(path)?;
        let nodes = source.load_nodes()?;
        let edges = source.load_edges()?;
        info!(
            "Loaded {} entities and {} relationships from {}",
            nodes.len(),
            edges.len(),
            path.display()
        );
        Ok(Self { nodes, edges })
    }

    /// Copy with the derived edge columns computed.
    pub fn normalized(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            edges: normalize::normalize(&self.edges),
        }
    }

    /// Normalized edges that are not monetary contributions.
    pub fn without_contributions(&self) -> Vec<Edge> {
        self.edges
            .iter()
            .filter(|e| e.relationship != CONTRIBUTION)
            .cloned()
            .collect()
    }

    pub fn find_node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn stats(&self) -> DatasetStats {
        let names: HashSet<&str> = self.nodes.iter().map(|n| n.name.as_str()).collect();
        let dangling_edges = self
            .edges
            .iter()
            .filter(|e| !names.contains(e.from_node.as_str()) || !names.contains(e.to_node.as_str()))
            .count();

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for edge in &self.edges {
            *counts.entry(edge.relationship.as_str()).or_default() += 1;
        }
        let mut relationships: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect();
        relationships.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        DatasetStats {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
            contributions: self
                .edges
                .iter()
                .filter(|e| e.relationship == CONTRIBUTION)
                .count(),
            dangling_edges,
            relationships,
        }
    }
}

/// Header positions of a CSV table.
struct Columns {
    table: &'static str,
    index: HashMap<String, usize>,
}

impl Columns {
    fn new(table: &'static str, headers: &csv::StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Self { table, index }
    }

    fn require(&self, column: &str) -> Result<()> {
        if self.index.contains_key(column) {
            Ok(())
        } else {
            Err(DataError::MissingColumn {
                table: self.table.to_string(),
                column: column.to_string(),
            })
        }
    }

    fn get(&self, record: &csv::StringRecord, column: &str) -> String {
        self.index
            .get(column)
            .and_then(|&i| record.get(i))
            .unwrap_or("")
            .to_string()
    }
}

fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input)
}

fn parse_pagerank(raw: &str, node: &str) -> f64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0.0;
    }
    raw.parse::<f64>().unwrap_or_else(|_| {
        warn!("Unreadable pagerank '{}' for {}, using 0", raw, node);
        0.0
    })
}

fn read_nodes<R: Read>(input: R) -> Result<Vec<Node>> {
    let mut reader = csv_reader(input);
    let columns = Columns::new("nodes", reader.headers()?);
    columns.require(NodeField::Name.column())?;

    let mut nodes = Vec::new();
    for record in reader.records() {
        let record = record?;
        let name = columns.get(&record, NodeField::Name.column());
        let pagerank = parse_pagerank(&columns.get(&record, NodeField::Pagerank.column()), &name);
        nodes.push(Node {
            link: columns.get(&record, NodeField::Link.column()),
            blurb: columns.get(&record, NodeField::Blurb.column()),
            summary: columns.get(&record, NodeField::Summary.column()),
            website: columns.get(&record, NodeField::Website.column()),
            types: columns.get(&record, NodeField::Types.column()),
            revenue: columns.get(&record, NodeField::Revenue.column()),
            aliases: columns.get(&record, NodeField::Aliases.column()),
            name,
            pagerank,
        });
    }
    Ok(nodes)
}

fn read_edges<R: Read>(input: R) -> Result<Vec<Edge>> {
    let mut reader = csv_reader(input);
    let columns = Columns::new("edges", reader.headers()?);
    for column in REQUIRED_EDGE_COLUMNS {
        columns.require(column)?;
    }

    let mut edges = Vec::new();
    for record in reader.records() {
        let record = record?;
        edges.push(Edge::new(
            columns.get(&record, "from_node"),
            columns.get(&record, "to_node"),
            columns.get(&record, "relationship_type"),
            columns.get(&record, "metadata"),
        ));
    }
    Ok(edges)
}

/// Read-only access to a SQLite copy of the dataset.
pub struct SqliteSource {
    conn: Connection,
}

impl SqliteSource {
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    fn table_columns(&self, table: &str) -> Result<HashSet<String>> {
        let mut stmt = self.conn.prepare(&format!("PRAGMA table_info(\"{}\")", table))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<HashSet<_>>>()?;
        Ok(columns)
    }

    /// Select list with NULL standing in for optional columns the table lacks.
    fn select_list(
        &self,
        table: &'static str,
        wanted: &[&str],
        required: &[&str],
    ) -> Result<String> {
        let present = self.table_columns(table)?;
        for column in required {
            if !present.contains(*column) {
                return Err(DataError::MissingColumn {
                    table: table.to_string(),
                    column: column.to_string(),
                });
            }
        }

        let list: Vec<String> = wanted
            .iter()
            .map(|column| {
                if present.contains(*column) {
                    format!("\"{}\"", column)
                } else {
                    "NULL".to_string()
                }
            })
            .collect();
        Ok(list.join(", "))
    }

    pub fn load_nodes(&self) -> Result<Vec<Node>> {
        let wanted: Vec<&str> = NodeField::ALL.iter().map(|f| f.column()).collect();
        let select = self.select_list("nodes", &wanted, &[NodeField::Name.column()])?;
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM nodes ORDER BY rowid", select))?;

        let nodes = stmt
            .query_map([], |row| {
                let name = cell_text(row, 0)?;
                let pagerank = parse_pagerank(&cell_text(row, 8)?, &name);
                Ok(Node {
                    name,
                    link: cell_text(row, 1)?,
                    blurb: cell_text(row, 2)?,
                    summary: cell_text(row, 3)?,
                    website: cell_text(row, 4)?,
                    types: cell_text(row, 5)?,
                    revenue: cell_text(row, 6)?,
                    aliases: cell_text(row, 7)?,
                    pagerank,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(nodes)
    }

    pub fn load_edges(&self) -> Result<Vec<Edge>> {
        let select = self.select_list("edges", &EDGE_COLUMNS, &REQUIRED_EDGE_COLUMNS)?;
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM edges ORDER BY rowid", select))?;

        let edges = stmt
            .query_map([], |row| {
                Ok(Edge::new(
                    cell_text(row, 0)?,
                    cell_text(row, 1)?,
                    cell_text(row, 2)?,
                    cell_text(row, 3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(edges)
    }
}

// NULL reads as empty; numbers are kept in their textual form.
fn cell_text(row: &rusqlite::Row<'_>, i: usize) -> rusqlite::Result<String> {
    Ok(match row.get_ref(i)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(v) => v.to_string(),
        ValueRef::Real(v) => v.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    })
}
