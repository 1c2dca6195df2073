use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("powerwatch")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("powerwatch")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Show debug logging")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-d --"data" <PATH>)
                .required(false)
                .help("Directory holding nodes.csv and edges.csv")
                .default_value("./data")
                .global(true),
        )
        .arg(
            arg!(--"sqlite" <PATH>)
                .required(false)
                .help("Read the nodes and edges tables from a SQLite database instead")
                .global(true),
        )
        .arg(
            arg!(--"keep-contributors")
                .required(false)
                .help("Include contribution edges in graph searches (dropped by default)")
                .action(clap::ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("search")
                .about("Search the network and list the most influential entities found")
                .arg(arg!(<TERM>).required(true).help("Entity name or text to search for"))
                .arg(
                    arg!(-s --"strategy" <STRATEGY>)
                        .required(false)
                        .help("Search type: text, milieu, nearest")
                        .value_parser(["text", "milieu", "nearest"])
                        .default_value("milieu"),
                )
                .arg(
                    arg!(--"both")
                        .required(false)
                        .help("Milieu only: follow neighbors in both directions")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-n --"top" <N>)
                        .required(false)
                        .help("Number of ranked results to show")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("100"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, csv, html, markdown")
                        .value_parser(["text", "json", "csv", "html", "markdown"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"plot")
                        .required(false)
                        .help("Upload the result graph for viewing (needs USERNAME and GRAPHISTRY_PASSWORD)")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("contributions")
                .about("Total monetary contributions made by an entity")
                .arg(arg!(<ENTITY>).required(true).help("Exact entity name"))
                .arg(
                    arg!(--"both")
                        .required(false)
                        .help("Also count contributions the entity received")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("top-contributors")
                .about("Rank contributors by total known amount")
                .arg(
                    arg!(-n --"limit" <N>)
                        .required(false)
                        .help("Number of contributors to list")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("20"),
                ),
        )
        .subcommand(
            command!("random")
                .about("Pick a random entity and show its milieu")
                .arg(
                    arg!(-n --"top" <N>)
                        .required(false)
                        .help("Number of ranked results to show")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("100"),
                ),
        )
        .subcommand(command!("stats").about("Show table sizes and relationship categories"))
}
