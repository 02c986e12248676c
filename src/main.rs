mod categorizer;
mod cli;
mod db;
mod dedup;
mod error;
mod fmt;
mod importer;
mod models;
mod reports;
mod settings;
mod statement;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{AccountsCommands, Cli, Commands, RulesCommands, TransactionsCommands};

fn init_logging(verbose: bool) {
    let default = if verbose { "bankreco=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init { data_dir, company } => cli::init::run(data_dir, company),
        Commands::Load { path } => cli::load::run(&path),
        Commands::Accounts { command } => match command {
            AccountsCommands::Add {
                name,
                number,
                account_type,
                format,
            } => cli::accounts::add(&name, number.as_deref(), &account_type, format.as_deref()),
            AccountsCommands::List => cli::accounts::list(),
            AccountsCommands::Primary { name } => cli::accounts::primary(&name),
            AccountsCommands::Activate { name } => cli::accounts::activate(&name, true),
            AccountsCommands::Deactivate { name } => cli::accounts::activate(&name, false),
        },
        Commands::Import {
            file,
            account,
            format,
        } => cli::import::run(&file, account.as_deref(), format.as_deref()),
        Commands::Categorize => cli::categorize::run(),
        Commands::Rules { command } => match command {
            RulesCommands::Add {
                pattern,
                expense_head,
                vendor,
                match_type,
                priority,
            } => cli::rules::add(&pattern, &expense_head, &vendor, &match_type, priority),
            RulesCommands::List => cli::rules::list(),
            RulesCommands::Delete { id } => cli::rules::delete(id),
        },
        Commands::Transactions { command } => match command {
            TransactionsCommands::List { filter } => cli::transactions::list(filter.into()),
            TransactionsCommands::Months => cli::transactions::months(),
            TransactionsCommands::Vendors => cli::transactions::vendors(),
            TransactionsCommands::Edit {
                id,
                expense_head,
                vendor,
                remark,
            } => cli::transactions::edit(id, expense_head.as_deref(), vendor.as_deref(), remark.as_deref()),
            TransactionsCommands::Delete { id } => cli::transactions::delete(id),
        },
        Commands::Export { filter, output } => cli::export::run(filter.into(), output),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
