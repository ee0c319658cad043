//! Command-line front end: one subcommand per report, JSON on stdout.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use godown_config::{Config, ConfigManager};
use godown_core::{
    Clock, SettlementRequest, SystemClock, DEFAULT_FLAT_RATE_ENTITY, DEFAULT_QUALITIES,
};
use godown_domain::EventFilter;
use serde::Serialize;

use crate::{desk::BookRef, errors::CliError, utils::build_info, ReportDesk};

#[derive(Parser, Debug)]
#[command(name = "godown", version, about = "Warehouse rental, interest and settlement reports")]
pub struct Cli {
    /// Config file. Defaults to `<data root>/config/config.json`.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Book file to report on.
    #[arg(long, global = true, value_name = "FILE", conflicts_with = "book")]
    pub file: Option<PathBuf>,

    /// Named book in the data root. Falls back to `default_book` from the config.
    #[arg(long, global = true, value_name = "NAME")]
    pub book: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rental due per stockist position
    RentalDue {
        #[arg(long, value_name = "YYYY-MM-DD")]
        as_of: Option<NaiveDate>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Interest receivable from every stockist
    InterestReceivable {
        #[arg(long, value_name = "YYYY-MM-DD")]
        as_of: Option<NaiveDate>,
    },
    /// Interest payable on company borrowing
    InterestPayable {
        #[arg(long, value_name = "YYYY-MM-DD")]
        as_of: Option<NaiveDate>,
    },
    /// Principal still owed on company borrowing
    LoanDue,
    /// Final settlement for one stockist at an agreed rate per kg
    FinalReport {
        #[arg(long)]
        stockist: String,
        #[arg(long, value_name = "YYYY-MM-DD")]
        as_of: Option<NaiveDate>,
        /// Agreed price per kg
        #[arg(long)]
        rate: f64,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Breakeven price per ton for each quality grade
    Breakeven {
        #[arg(long, default_value = DEFAULT_FLAT_RATE_ENTITY)]
        entity: String,
        #[arg(long)]
        commodity: String,
        /// Quality grades to report; repeat the flag for several
        #[arg(long = "quality")]
        qualities: Vec<String>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        as_of: Option<NaiveDate>,
    },
    /// Warehousing, financing and trading income
    ProfitLoss {
        #[arg(long, value_name = "YYYY-MM-DD")]
        as_of: Option<NaiveDate>,
    },
    /// Statement for one stockist
    Statement {
        #[arg(long)]
        stockist: String,
        #[arg(long, value_name = "YYYY-MM-DD")]
        as_of: Option<NaiveDate>,
    },
    /// List books in the data root
    Books,
    /// Print build metadata
    Version,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub commodity: Option<String>,
    #[arg(long)]
    pub warehouse: Option<String>,
    #[arg(long)]
    pub quality: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> EventFilter {
        let mut filter = EventFilter::all();
        if let Some(commodity) = &self.commodity {
            filter = filter.commodity(commodity.as_str());
        }
        if let Some(warehouse) = &self.warehouse {
            filter = filter.warehouse(warehouse.as_str());
        }
        if let Some(quality) = &self.quality {
            filter = filter.quality(quality.as_str());
        }
        filter
    }
}

pub fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    let output = execute(cli, &SystemClock)?;
    println!("{output}");
    Ok(())
}

/// Runs one parsed command and returns the rendered report.
pub fn execute(cli: Cli, clock: &dyn Clock) -> Result<String, CliError> {
    if let Command::Version = cli.command {
        return render(&build_info::current());
    }

    let config = load_config(cli.config.as_ref())?;
    let desk = match &cli.file {
        Some(_) => ReportDesk::new(crate::policy_from_config(&config)),
        None => ReportDesk::from_config(&config)?,
    };

    if let Command::Books = cli.command {
        return render(&desk.list_books()?);
    }

    let book_ref = match (cli.file, cli.book.or(config.default_book.clone())) {
        (Some(path), _) => BookRef::File(path),
        (None, Some(name)) => BookRef::Named(name),
        (None, None) => {
            return Err(CliError::Input(
                "no book selected; pass --file or --book".into(),
            ))
        }
    };
    let book = desk.open_book(&book_ref)?;
    let today = clock.today();

    match cli.command {
        Command::RentalDue { as_of, filter } => {
            render(&desk.rental_due(&book, as_of.unwrap_or(today), &filter.to_filter()))
        }
        Command::InterestReceivable { as_of } => {
            render(&desk.interest_receivable(&book, as_of.unwrap_or(today)))
        }
        Command::InterestPayable { as_of } => {
            render(&desk.interest_payable(&book, as_of.unwrap_or(today)))
        }
        Command::LoanDue => render(&desk.loan_due(&book)),
        Command::FinalReport {
            stockist,
            as_of,
            rate,
            filter,
        } => {
            let request = SettlementRequest::new(stockist, as_of.unwrap_or(today), rate)
                .with_filter(filter.to_filter());
            render(&desk.final_settlement(&book, &request)?)
        }
        Command::Breakeven {
            entity,
            commodity,
            qualities,
            as_of,
        } => {
            let qualities: Vec<&str> = if qualities.is_empty() {
                DEFAULT_QUALITIES.to_vec()
            } else {
                qualities.iter().map(String::as_str).collect()
            };
            render(&desk.breakeven(&book, &entity, &commodity, &qualities, as_of.unwrap_or(today))?)
        }
        Command::ProfitLoss { as_of } => render(&desk.profit_loss(&book, as_of.unwrap_or(today))),
        Command::Statement { stockist, as_of } => {
            render(&desk.stockist_statement(&book, &stockist, as_of.unwrap_or(today))?)
        }
        Command::Books | Command::Version => Err(CliError::Input("command already handled".into())),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config, CliError> {
    let manager = match path {
        Some(path) => ConfigManager::new(path.clone()),
        None => {
            let root = Config::default().resolve_data_root();
            ConfigManager::new(root.join("config").join("config.json"))
        }
    };
    Ok(manager.load()?)
}

fn render<T: Serialize + ?Sized>(report: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(report).map_err(|err| CliError::Output(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn filter_args_drop_blank_values() {
        let args = FilterArgs {
            commodity: Some("Maize".into()),
            warehouse: Some("  ".into()),
            quality: None,
        };
        let filter = args.to_filter();
        assert_eq!(filter.commodity.as_deref(), Some("Maize"));
        assert!(filter.warehouse.is_none());
    }

    #[test]
    fn parses_report_arguments() {
        let cli = Cli::try_parse_from([
            "godown",
            "--file",
            "book.json",
            "final-report",
            "--stockist",
            "Ravi",
            "--as-of",
            "2024-01-31",
            "--rate",
            "21.5",
            "--commodity",
            "Maize",
        ])
        .expect("parse");
        match cli.command {
            Command::FinalReport { as_of, rate, filter, .. } => {
                assert_eq!(as_of, NaiveDate::from_ymd_opt(2024, 1, 31));
                assert_eq!(rate, 21.5);
                assert_eq!(filter.commodity.as_deref(), Some("Maize"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
