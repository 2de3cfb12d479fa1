use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use formkit::EditorOptions;
use log::LevelFilter;

mod commands;
mod io;

/// Convert, check and edit JSON-Schema form designs.
#[derive(Parser, Debug)]
#[command(name = "formkit", author, version, about, long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Editor options file (.toml or .json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write the result to this file instead of stdout (.json or .toml)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a data schema into its editable list form
    Editable {
        /// Data schema file
        schema: PathBuf,
    },
    /// Convert an editable schema back into a data schema
    Canonical {
        /// Editable schema file
        edit_schema: PathBuf,
    },
    /// List the control scopes a data schema offers
    Scopes {
        /// Data schema file
        schema: PathBuf,
        /// Include the root scope `#`
        #[arg(long)]
        root: bool,
    },
    /// Check that every layout scope of a bundle resolves
    Check {
        /// Bundle file with `schema` and `uischema`
        bundle: PathBuf,
    },
    /// Print the schema used by the structured editors
    Meta {
        /// Offer the scopes of this data schema in the layout editor
        #[arg(long)]
        scopes_from: Option<PathBuf>,
        /// Print the layout instead of the schema
        #[arg(long)]
        ui: bool,
        /// Target the layout editor instead of the schema editor
        #[arg(long, value_enum, default_value_t = commands::MetaTarget::Schema)]
        target: commands::MetaTarget,
    },
    /// Import a foreign JSON Schema document
    Import {
        /// JSON Schema file
        json_schema: PathBuf,
    },
    /// Apply edits to a bundle through the designer editors
    Apply {
        /// Bundle file with `schema` and `uischema`
        bundle: PathBuf,
        /// Editable schema replacing the data schema
        #[arg(long)]
        schema: Option<PathBuf>,
        /// Layout replacing the uischema
        #[arg(long)]
        uischema: Option<PathBuf>,
    },
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let options = match &cli.config {
        Some(path) => EditorOptions::load(path)?,
        None => EditorOptions::default(),
    };
    log::debug!("editor options: {options:?}");

    let output = cli.output.as_deref();
    match cli.command {
        Command::Editable { schema } => commands::editable(&schema, output),
        Command::Canonical { edit_schema } => commands::canonical(&edit_schema, output),
        Command::Scopes { schema, root } => commands::scopes(&schema, root, output),
        Command::Check { bundle } => commands::check(&bundle),
        Command::Meta {
            scopes_from,
            ui,
            target,
        } => commands::meta(target, scopes_from.as_deref(), ui, output),
        Command::Import { json_schema } => commands::import(&json_schema, output),
        Command::Apply {
            bundle,
            schema,
            uischema,
        } => commands::apply(
            &bundle,
            schema.as_deref(),
            uischema.as_deref(),
            options,
            output,
        ),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_meta() {
        let cli = Cli::parse_from(["formkit", "-vv", "meta", "--target", "uischema", "--ui"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Meta { ui, target, .. } => {
                assert!(ui);
                assert_eq!(target, commands::MetaTarget::Uischema);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_output_after_subcommand() {
        let cli = Cli::parse_from(["formkit", "editable", "form.json", "-o", "out.toml"]);
        assert_eq!(cli.output, Some(PathBuf::from("out.toml")));
    }
}
