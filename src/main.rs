mod api;
mod config;
mod contact;
mod nav;
mod search;
mod ui;
mod view;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use api::HttpContactsApi;
use config::Config;
use contact::{Contact, ContactId};
use view::ContactListView;

const LOG_ENV: &str = "CMGR_LOG";

#[derive(Parser, Debug)]
#[command(name = "cmgr", about = "Browse, search and delete contacts from a contacts service")]
struct Cli {
    /// Configuration file (defaults to <config dir>/cmgr/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Contacts service base URL, overriding `api.base_url`
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print contacts, or those whose name contains QUERY (tab-separated: id, name, mobile, email)
    List(ListArgs),
    /// Delete a contact and print the contacts that remain
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Case-insensitive name filter; without it every fetched contact is printed
    query: Option<String>,
}

#[derive(Args, Debug)]
struct DeleteArgs {
    #[arg(value_name = "ID")]
    id: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.command.is_some());

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(url) = cli.base_url.as_deref() {
        config.api.set_base_url(url)?;
    }
    tracing::info!(
        base_url = %config.api.base_url,
        config = ?config.config_path,
        "configuration loaded"
    );

    let api = HttpContactsApi::new(&config.api)?;
    let mut view = ContactListView::new(api)?;

    match cli.command {
        Some(Command::List(args)) => handle_list(&mut view, &args),
        Some(Command::Delete(args)) => handle_delete(&mut view, &args),
        None => handle_browse(view, &config),
    }
}

fn handle_browse(view: ContactListView, config: &Config) -> Result<()> {
    let app = ui::app::App::new(view, config);
    if let Some(route) = app.run()? {
        println!("{}", route);
    }
    Ok(())
}

fn handle_list(view: &mut ContactListView, args: &ListArgs) -> Result<()> {
    view.mount();
    view.settle();
    ensure_no_error(view)?;

    if let Some(query) = args.query.as_deref() {
        view.search(query);
        tracing::debug!(
            query = view.query(),
            matches = view.filtered_contacts().len(),
            "filtered contacts"
        );
    }
    print_contacts(view.filtered_contacts());
    Ok(())
}

fn handle_delete(view: &mut ContactListView, args: &DeleteArgs) -> Result<()> {
    view.delete(ContactId::new(args.id.as_str()));
    view.settle();
    ensure_no_error(view)?;

    print_contacts(view.filtered_contacts());
    Ok(())
}

fn ensure_no_error(view: &ContactListView) -> Result<()> {
    let message = &view.state().error_message;
    if !message.is_empty() {
        bail!("{}", message);
    }
    Ok(())
}

fn print_contacts(contacts: &[Contact]) {
    for contact in contacts {
        println!(
            "{}\t{}\t{}\t{}",
            contact.id,
            contact.name_or_blank(),
            contact.mobile_or_blank(),
            contact.email_or_blank()
        );
    }
}

/// Headless commands log to stderr only when `CMGR_LOG` is set, since their
/// errors are already reported on exit; the terminal view logs to a file so the
/// screen stays intact. Logging is skipped if the log file cannot be opened.
fn init_tracing(headless: bool) {
    if headless {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
        return;
    }

    let Ok(path) = config::log_path() else {
        return;
    };
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry().with(filter).with(layer).init();
}
