pub mod contribution;
pub mod data;
pub mod error;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod report;
pub mod search;

use colored::Colorize;

pub use contribution::{ContributionSummary, summarize_entity, top_contributors, total_for_entity};
pub use data::{DataSource, Dataset, DatasetStats};
pub use error::{DataError, Result};
pub use filter::{GraphFilter, TextMatch, filter_by_text};
pub use model::{Amount, Edge, EdgeBindings, Endpoint, Node, NodeField, Subgraph};
pub use normalize::{CONTRIBUTION, classify_relationship, normalize, parse_currency};
pub use search::{SearchKey, SearchSession, SessionOptions, Strategy};

pub fn print_banner() {
    let banner = r#"
  ┌─┐┌─┐┬ ┬┌─┐┬─┐┬ ┬┌─┐┌┬┐┌─┐┬ ┬
  ├─┘│ ││││├┤ ├┬┘│││├─┤ │ │  ├─┤
  ┴  └─┘└┴┘└─┘┴└─└┴┘┴ ┴ ┴ └─┘┴ ┴"#;
    println!("{}", banner.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "Influence & Power Networks".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
}
