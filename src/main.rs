mod aggregate;
mod cli;
mod config;
mod domain;
mod format;
mod storage;
mod store;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::Parser;
use std::fs;
use tracing::warn;
use uuid::Uuid;

use crate::aggregate::{ReportRange, filter_by_range, totals};
use crate::cli::{AddArgs, Cli, Command, ReportArgs};
use crate::config::{Home, Settings, now_local};
use crate::domain::{Transaction, TransactionDraft, TypeFilter};
use crate::format::{capitalize, format_currency, format_display_date, render_report_document};
use crate::storage::{FileBlobStore, LoadStatus, StorageAdapter};
use crate::store::TransactionStore;

type Store = TransactionStore<FileBlobStore>;

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pursekeep=warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let home = Home::resolve(cli.home.clone())?;
    let cfg = Settings::load_or_create(&home)?;

    let backend = FileBlobStore::new(&home.data_dir);
    let mut store = TransactionStore::open(StorageAdapter::new(backend, cfg.storage_key.clone()));
    if let LoadStatus::Recovered { reason } = store.last_load() {
        eprintln!("Stored transactions could not be read ({reason}); starting with an empty list.");
    }

    match cli.command {
        Command::Add(args) => handle_add(&mut store, &cfg, args)?,
        Command::List(args) => {
            let rows = store.filter_by_type(args.kind.into());
            print_transactions(&rows, &cfg);
        }
        Command::Delete(args) => {
            let id = Uuid::parse_str(args.id.trim())
                .with_context(|| format!("Invalid transaction id: {}", args.id))?;
            let description = store.find(id).map(|t| t.description.clone());
            if store.remove(id) {
                println!(
                    "Deleted {id} ({}).",
                    description.as_deref().unwrap_or_default()
                );
            } else {
                println!("No transaction with id {id}.");
            }
            warn_if_unsaved(&store);
        }
        Command::Summary(args) => {
            let filter: TypeFilter = args.kind.into();
            print_summary(&store.filter_by_type(filter), &cfg);
        }
        Command::Report(args) => handle_report(&store, &cfg, args)?,
    }

    Ok(())
}

fn handle_add(store: &mut Store, cfg: &Settings, args: AddArgs) -> Result<()> {
    let date = args
        .date
        .unwrap_or_else(|| now_local().date().format("%Y-%m-%d").to_string());
    let draft = TransactionDraft {
        kind: args.kind,
        amount: args.amount,
        description: args.description,
        category: args.category,
        date,
    };
    let tx = draft.validate()?;
    let summary = format!(
        "Added {} {} \"{}\" [{}] on {} as {}",
        tx.kind,
        format_currency(tx.amount, &cfg.currency),
        tx.description,
        tx.category,
        format_display_date(&tx.date.format("%Y-%m-%d").to_string()),
        tx.id,
    );
    store.add(tx);
    println!(
        "{summary} ({}).",
        store.storage().backend().path_for(&cfg.storage_key).display()
    );
    warn_if_unsaved(store);
    Ok(())
}

fn warn_if_unsaved(store: &Store) {
    if let Some(err) = store.last_save_error() {
        eprintln!("Warning: changes were not saved ({err}); they only last for this run.");
    }
}

fn parse_as_of(raw: Option<&str>) -> Result<NaiveDateTime> {
    match raw {
        None => Ok(now_local()),
        Some(s) => Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid --as-of date: {s}. Expected YYYY-MM-DD"))?
            .and_time(NaiveTime::MIN)),
    }
}

fn handle_report(store: &Store, cfg: &Settings, args: ReportArgs) -> Result<()> {
    let as_of = parse_as_of(args.as_of.as_deref())?;
    let range: ReportRange = args.range.into();
    let subset = filter_by_range(store.all(), &range.bounds(as_of));
    let doc = render_report_document(
        range.heading(),
        now_local(),
        &totals(&subset),
        &subset,
        &cfg.currency,
    );

    match args.out {
        None => print!("{doc}"),
        Some(path) => match fs::write(&path, doc) {
            Ok(()) => println!("Wrote {} to {}", range.heading(), path.display()),
            Err(err) => {
                // Nothing to roll back: reports never touch the store.
                warn!(path = %path.display(), error = %err, "could not write report; skipping");
            }
        },
    }
    Ok(())
}

fn print_transactions(rows: &[Transaction], cfg: &Settings) {
    if rows.is_empty() {
        println!("(no transactions)");
        return;
    }

    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|t| {
            vec![
                format_display_date(&t.date.format("%Y-%m-%d").to_string()),
                t.description.clone(),
                t.category.clone(),
                capitalize(t.kind.as_str()),
                format_currency(t.amount, &cfg.currency),
                t.id.to_string(),
            ]
        })
        .collect();
    print_table(
        &["Date", "Description", "Category", "Type", "Amount", "ID"],
        &table,
    );
    println!();
    print_summary(rows, cfg);
}

fn print_summary(rows: &[Transaction], cfg: &Settings) {
    let t = totals(rows);
    println!("Income:\t{}", format_currency(t.income, &cfg.currency));
    println!("Expense:\t{}", format_currency(t.expense, &cfg.currency));
    println!("Balance:\t{}", format_currency(t.balance, &cfg.currency));
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();

    for row in rows {
        for (i, cell) in row.iter().take(cols).enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    fn print_row(cells: &[String], widths: &[usize]) {
        print!("|");
        for (i, w) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            print!(" {:width$} |", cell, width = *w);
        }
        println!();
    }

    fn print_sep(widths: &[usize]) {
        print!("|");
        for w in widths {
            print!("{}|", "-".repeat(w + 2));
        }
        println!();
    }

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    print_row(&header_cells, &widths);
    print_sep(&widths);
    for row in rows {
        print_row(row, &widths);
    }
}
