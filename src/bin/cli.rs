//! FolioDB CLI
//!
//! Command-line interface for working with a FolioDB data directory.

use clap::{Parser, Subcommand};
use foliodb::{Config, Database, PageCapacity};
use tracing_subscriber::{fmt, EnvFilter};

/// FolioDB CLI
#[derive(Parser, Debug)]
#[command(name = "foliodb-cli")]
#[command(about = "Embedded paginated table store with bitmap indexes")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./foliodb_data")]
    data_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a table
    CreateTable {
        /// Table name
        table: String,

        /// Column names
        columns: Vec<String>,

        /// Tuples per page (0 = single unbounded page)
        #[arg(short, long, default_value = "200")]
        capacity: i64,
    },

    /// Insert a tuple
    Insert {
        /// Table name
        table: String,

        /// Field values, in column order
        fields: Vec<String>,
    },

    /// Select tuples matching col=val constraints (all tuples if none)
    Select {
        /// Table name
        table: String,

        /// Equality constraints as col=val
        constraints: Vec<String>,
    },

    /// Build a bitmap index on a column
    CreateIndex {
        /// Table name
        table: String,

        /// Column to index
        column: String,
    },

    /// Print the bitmap of a value on an indexed column
    Bits {
        table: String,
        column: String,
        value: String,
    },

    /// Report pages the backend has lost
    Validate { table: String },

    /// Restore lost pages from table metadata
    Recover { table: String },

    /// Print the full trace of a table
    Trace { table: String },

    /// Print what the backend currently holds
    BackendTrace,

    /// Clear all durable state
    Reset,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,foliodb=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> foliodb::Result<()> {
    let config = Config::builder().data_dir(&args.data_dir).build();
    let db = Database::open(config)?;

    match args.command {
        Commands::CreateTable {
            table,
            columns,
            capacity,
        } => {
            let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
            db.create_table_with_capacity(&table, PageCapacity::from_raw(capacity), &columns)?;
            println!("Created table '{}'", table);
        }
        Commands::Insert { table, fields } => {
            let outcome = db.insert(&table, fields)?;
            println!(
                "Inserted at page {}, global index {}",
                outcome.page_number, outcome.global_index
            );
            if !outcome.is_clean() {
                println!("Failed sub-writes: {:?}", outcome.failed_writes);
            }
        }
        Commands::Select { table, constraints } => {
            if constraints.is_empty() {
                for tuple in db.select_all(&table)? {
                    println!("{}", tuple.join(" | "));
                }
            } else {
                let pairs: Vec<(&str, &str)> = constraints
                    .iter()
                    .map(|c| {
                        c.split_once('=').ok_or_else(|| {
                            foliodb::FolioError::InvalidSchema(format!(
                                "constraint '{}' is not col=val",
                                c
                            ))
                        })
                    })
                    .collect::<foliodb::Result<_>>()?;
                let cols: Vec<&str> = pairs.iter().map(|(c, _)| *c).collect();
                let vals: Vec<&str> = pairs.iter().map(|(_, v)| *v).collect();

                let selection = db.select_where(&table, &cols, &vals)?;
                for tuple in &selection.tuples {
                    println!("{}", tuple.join(" | "));
                }
                println!(
                    "-- {} rows via {} path in {} ms",
                    selection.report.result_count,
                    selection.report.path,
                    selection.report.elapsed.as_millis()
                );
            }
        }
        Commands::CreateIndex { table, column } => {
            db.create_index(&table, &column)?;
            println!("Built index on '{}.{}'", table, column);
        }
        Commands::Bits {
            table,
            column,
            value,
        } => {
            println!("{}", db.bits_for_value(&table, &column, &value)?);
        }
        Commands::Validate { table } => {
            let report = db.validate(&table)?;
            println!(
                "Missing pages: {:?} ({} tuples at risk)",
                report.missing_pages,
                report.at_risk.len()
            );
        }
        Commands::Recover { table } => {
            let report = db.recover(&table)?;
            println!("Restored pages: {:?}", report.restored_pages);
        }
        Commands::Trace { table } => {
            println!("{}", db.full_trace(&table));
        }
        Commands::BackendTrace => {
            println!("{}", db.backend_trace()?);
        }
        Commands::Reset => {
            db.reset()?;
            println!("Workspace reset");
        }
    }

    Ok(())
}
