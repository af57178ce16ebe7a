// Entrypoint for the CLI application.
// - Parses arguments, sets up logging and resolves the configuration.
// - Hands an API client to the UI layer for the chosen command.

use anyhow::Context;
use clap::Parser;
use mobsf_cli::{
    api::ApiClient,
    cli::{Args, Command},
    config::{ClientConfig, FileConfig},
    logging::init_logging,
    ui,
};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let file = FileConfig::discover(args.config.as_deref()).context("Failed to load config file")?;
    let config = ClientConfig::resolve(args.overrides(), file)?;
    log::debug!("Using server {}", config.server);
    let api = ApiClient::new(&config).context("Failed to build HTTP client")?;

    match args.command {
        Some(Command::Scan {
            file,
            pdf,
            json,
            score,
            delete,
        }) => ui::run_scan(
            api,
            file,
            ui::Extras {
                pdf,
                json,
                score,
                delete,
            },
        ),
        Some(Command::Recent { page, page_size }) => ui::show_recent(&api, page, page_size),
        Some(Command::Compare { first, second }) => ui::show_comparison(&api, &first, &second),
        Some(Command::Menu { file }) => ui::main_menu(api, file),
        None => ui::main_menu(api, None),
    }
}
