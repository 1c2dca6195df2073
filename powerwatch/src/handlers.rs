use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use powerwatch_core::data::{DataSource, EDGES_FILE, NODES_FILE, SqliteSource};
use powerwatch_core::model::{EdgeBindings, Subgraph};
use powerwatch_core::report::{self, ReportFormat};
use powerwatch_core::search::{SearchKey, SearchSession, SessionOptions, Strategy};
use powerwatch_viz::{GraphistryClient, PlotResult, VizConfig};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

// Helpers for locating and loading the dataset

/// Pick the table source: an explicit SQLite file wins over the CSV directory.
pub fn resolve_data_source(data_dir: &str, sqlite: Option<&str>) -> Result<DataSource, String> {
    if let Some(db) = sqlite {
        let path = PathBuf::from(shellexpand::tilde(db).as_ref());
        if !SqliteSource::exists(&path) {
            return Err(format!("SQLite database not found: {}", path.display()));
        }
        return Ok(DataSource::Sqlite(path));
    }

    let dir = PathBuf::from(shellexpand::tilde(data_dir).as_ref());
    for file in [NODES_FILE, EDGES_FILE] {
        if !dir.join(file).is_file() {
            return Err(format!("No {} found in {}", file, dir.display()));
        }
    }
    Ok(DataSource::CsvDir(dir))
}

pub fn session_options(keep_contributors: bool) -> SessionOptions {
    SessionOptions {
        drop_contributors: !keep_contributors,
        ..SessionOptions::default()
    }
}

/// Load the tables named by the global arguments and open a session.
pub fn load_session(args: &ArgMatches) -> Result<SearchSession, String> {
    let data_dir = args
        .get_one::<String>("data")
        .map(String::as_str)
        .unwrap_or("./data");
    let sqlite = args.get_one::<String>("sqlite").map(String::as_str);
    let source = resolve_data_source(data_dir, sqlite)?;

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Loading {}", source.describe()));

    let dataset = match source.load() {
        Ok(dataset) => dataset,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(format!("Failed to load {}: {}", source.describe(), e));
        }
    };
    spinner.finish_and_clear();

    let keep_contributors = args.get_flag("keep-contributors");
    Ok(SearchSession::new(dataset, session_options(keep_contributors)))
}

/// Build the cache key for a `search` invocation.
pub fn parse_search_request(args: &ArgMatches) -> Result<SearchKey, String> {
    let term = args
        .get_one::<String>("TERM")
        .ok_or_else(|| "A search term is required".to_string())?;
    let strategy = args
        .get_one::<String>("strategy")
        .map(String::as_str)
        .unwrap_or("milieu");
    let strategy = Strategy::from_str(strategy).map_err(|e| e.to_string())?;

    Ok(SearchKey::new(strategy, term.trim(), args.get_flag("both")))
}

/// `$1,234.50` style rendering of an exact amount.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}${}.{}", sign, grouped, cents)
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn fail(message: &str) -> ! {
    eprintln!("{} {}", "✗".red().bold(), message);
    std::process::exit(1);
}

/// Upload `subgraph`, binding edge columns the same way the search did.
pub async fn plot_with_config(
    config: VizConfig,
    subgraph: &Subgraph,
    bindings: EdgeBindings,
) -> anyhow::Result<PlotResult> {
    let client = GraphistryClient::new(config)
        .context("Failed to build visualization client")?
        .with_bindings(bindings);
    let result = client
        .plot(subgraph)
        .await
        .context("Failed to upload graph")?;
    Ok(result)
}

async fn plot_subgraph(subgraph: &Subgraph, bindings: EdgeBindings) -> anyhow::Result<PlotResult> {
    let config = VizConfig::from_env().context("Visualization credentials are not configured")?;
    plot_with_config(config, subgraph, bindings).await
}

fn emit_report(content: &str, output: Option<&PathBuf>) {
    match output {
        Some(path) => {
            if let Err(e) = report::save_report(content, path) {
                fail(&format!("Failed to write {}: {}", path.display(), e));
            }
            println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => println!("{}", content),
    }
}

async fn run_search(
    session: &mut SearchSession,
    key: SearchKey,
    top_n: usize,
    format: ReportFormat,
    output: Option<&PathBuf>,
    plot: bool,
) {
    info!("Running {} search for '{}'", key.strategy.label(), key.term);
    let session_id = session.id().to_string();
    let subgraph = session.search(key.clone()).clone();

    let data = report::gather_report_data(&session_id, &key, &subgraph, top_n);
    match report::render(&data, format) {
        Ok(content) => emit_report(&content, output),
        Err(e) => fail(&format!("Failed to render report: {}", e)),
    }

    if plot {
        if subgraph.is_empty() {
            println!("{} {}", "→".blue(), report::NO_RESULTS);
            return;
        }
        match plot_subgraph(&subgraph, session.filter().bindings()).await {
            Ok(result) => println!(
                "{} Graph: {}",
                "✓".green().bold(),
                result.url.bright_white()
            ),
            Err(e) => fail(&format!("{:#}", e)),
        }
    }
}

pub async fn handle_search(args: &ArgMatches) {
    let key = parse_search_request(args).unwrap_or_else(|e| fail(&e));
    let top_n = args
        .get_one::<usize>("top")
        .copied()
        .unwrap_or(report::DEFAULT_TOP_N);
    let format = args
        .get_one::<String>("format")
        .map(|f| ReportFormat::from_str(f))
        .transpose()
        .unwrap_or_else(|e| fail(&e.to_string()))
        .unwrap_or(ReportFormat::Text);
    let output = args.get_one::<PathBuf>("output");

    let mut session = load_session(args).unwrap_or_else(|e| fail(&e));
    run_search(&mut session, key, top_n, format, output, args.get_flag("plot")).await;
}

pub async fn handle_random(args: &ArgMatches) {
    let top_n = args
        .get_one::<usize>("top")
        .copied()
        .unwrap_or(report::DEFAULT_TOP_N);
    let mut session = load_session(args).unwrap_or_else(|e| fail(&e));

    let entity = match session.random_entity(&mut rand::thread_rng()) {
        Some(name) => name.to_string(),
        None => fail("The node table is empty"),
    };
    println!("{} Random entity: {}", "→".blue(), entity.bright_white().bold());

    // a random pick is always explored as a milieu
    let key = SearchKey::new(Strategy::Milieu, entity, false);
    run_search(&mut session, key, top_n, ReportFormat::Text, None, false).await;
}

pub fn handle_contributions(args: &ArgMatches) {
    let entity = match args.get_one::<String>("ENTITY") {
        Some(entity) => entity.trim().to_string(),
        None => fail("An entity name is required"),
    };
    let both = args.get_flag("both");
    let session = load_session(args).unwrap_or_else(|e| fail(&e));

    if session.nodes().iter().all(|n| n.name != entity) {
        println!(
            "{} {} is not in the node table",
            "⚠".yellow().bold(),
            entity.bright_white()
        );
    }

    let summary = session.contributions(&entity, both);
    debug!("{:?}", summary);

    print_divider();
    println!("{}", "  CONTRIBUTIONS".bright_white().bold());
    print_divider();
    println!("{} Entity: {}", "→".blue(), summary.entity.bright_white());
    if both {
        println!("{} Direction: made and received", "→".blue());
    }
    println!(
        "{} Total: {}",
        "✓".green().bold(),
        format_currency(summary.total).bright_green().bold()
    );
    println!("  Contribution edges:  {}", summary.edges);
    println!("  Contributions:       {}", summary.contribution_count);
    if summary.no_data > 0 {
        println!("  Without amount data: {}", summary.no_data);
    }
    if summary.unknown > 0 {
        println!("  Unreadable amounts:  {}", summary.unknown);
    }
}

pub fn handle_top_contributors(args: &ArgMatches) {
    let limit = args.get_one::<usize>("limit").copied().unwrap_or(20);
    let session = load_session(args).unwrap_or_else(|e| fail(&e));
    let ranked = session.top_contributors(limit);

    if ranked.is_empty() {
        println!("{} No contribution edges in this dataset", "→".blue());
        return;
    }

    print_divider();
    println!("{}", "  TOP CONTRIBUTORS".bright_white().bold());
    print_divider();
    for (i, (name, total)) in ranked.iter().enumerate() {
        println!(
            "{:>4}. {:<45} {:>16}",
            i + 1,
            name,
            format_currency(*total).bright_green()
        );
    }
}

pub fn handle_stats(args: &ArgMatches) {
    let session = load_session(args).unwrap_or_else(|e| fail(&e));
    let stats = session.stats();

    print_divider();
    println!("{}", "  DATASET".bright_white().bold());
    print_divider();
    println!("{} Entities:            {}", "✓".green().bold(), stats.nodes);
    println!("{} Relationships:       {}", "✓".green().bold(), stats.edges);
    println!("{} Contributions:       {}", "✓".green().bold(), stats.contributions);
    println!(
        "{} Searchable edges:    {}",
        "✓".green().bold(),
        session.search_edges().len()
    );
    if stats.dangling_edges > 0 {
        println!(
            "{} Edges to unknown entities: {}",
            "⚠".yellow().bold(),
            stats.dangling_edges
        );
    }
    println!();
    println!("{}", "RELATIONSHIP TYPES".bright_blue().bold());
    for (name, count) in stats.relationships.iter().take(25) {
        println!("  {:<40} {}", name, count);
    }
}

