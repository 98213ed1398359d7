use crate::aggregate::ReportRange;
use crate::domain::TypeFilter;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pursekeep")]
#[command(about = "Local-first personal finance tracker", long_about = None)]
pub struct Cli {
    /// Override Pursekeep home directory (config/data subdirs will be created inside it).
    #[arg(long, env = "PURSEKEEP_HOME")]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Add(AddArgs),
    List(ListArgs),
    Delete(DeleteArgs),
    Summary(ListArgs),
    Report(ReportArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// income or expense
    pub kind: String,
    #[arg(allow_hyphen_values = true)]
    pub amount: String,
    pub description: String,

    #[arg(long, default_value = "")]
    pub category: String,

    /// Calendar date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TypeArg {
    All,
    Income,
    Expense,
}

impl From<TypeArg> for TypeFilter {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::All => TypeFilter::All,
            TypeArg::Income => TypeFilter::Income,
            TypeArg::Expense => TypeFilter::Expense,
        }
    }
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long = "type", value_enum, default_value_t = TypeArg::All)]
    pub kind: TypeArg,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub id: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RangeArg {
    Week,
    Month,
}

impl From<RangeArg> for ReportRange {
    fn from(arg: RangeArg) -> Self {
        match arg {
            RangeArg::Week => ReportRange::Week,
            RangeArg::Month => ReportRange::Month,
        }
    }
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[arg(value_enum)]
    pub range: RangeArg,

    /// Write the printable document here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Pin "today" (YYYY-MM-DD) instead of reading the clock.
    #[arg(long)]
    pub as_of: Option<String>,
}
