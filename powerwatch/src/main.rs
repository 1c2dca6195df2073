use commands::command_argument_builder;
use powerwatch::handlers::{
    handle_contributions, handle_random, handle_search, handle_stats, handle_top_contributors,
};
use powerwatch_core::print_banner;
use tracing::Level;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_flag("verbose");

    init_tracing(quiet, verbose);

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    match chosen_command.subcommand() {
        Some(("search", primary_command)) => handle_search(primary_command).await,
        Some(("random", primary_command)) => handle_random(primary_command).await,
        Some(("contributions", primary_command)) => handle_contributions(primary_command),
        Some(("top-contributors", primary_command)) => handle_top_contributors(primary_command),
        Some(("stats", primary_command)) => handle_stats(primary_command),
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

// Logs go to stderr so reports on stdout can be piped.
fn init_tracing(quiet: bool, verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
