//! cql-rest-verify CLI - Compare captured CQL rows with REST API rows.

use clap::{Parser, Subcommand};
use cql_rest_verify::source::from_json_value;
use cql_rest_verify::{
    normalize, parse_rest_rows, ColumnTypeTag, Config, RawValue, RowVerifier, TypedFixture,
    VerifyError, VerifyResult,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "cql-rest-verify")]
#[command(about = "Compare Cassandra rows read over CQL with the same rows read over REST")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a captured typed fixture against a captured REST response
    Compare {
        /// Typed fixture (JSON with column types and driver rows)
        #[arg(long)]
        typed: PathBuf,

        /// REST rows response body
        #[arg(long)]
        rest: PathBuf,
    },

    /// Print the canonical form of a value
    Normalize {
        /// Declared column type of the value
        #[arg(long)]
        column_type: Option<String>,

        /// Read VALUE as a tagged typed value (e.g. {"uuid": "..."}) instead of plain JSON
        #[arg(long)]
        typed: bool,

        /// The value, as JSON
        value: String,
    },

    /// Print whether a column type is compared or ignored
    Classify {
        /// Column type tag, e.g. "map<double, text>"
        tag: String,
    },

    /// Validate the configuration
    Validate,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> Result<(), VerifyError> {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(&cli.verbosity, &cli.log_format).map_err(VerifyError::Config)?;

    let config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::default(),
    }
    .with_env_overrides()?;

    match cli.command {
        Commands::Compare { typed, rest } => {
            let fixture = TypedFixture::load(&typed)?;
            let body = std::fs::read_to_string(&rest)?;
            let rest_rows = parse_rest_rows(&body)
                .map_err(|e| VerifyError::fixture(rest.display().to_string(), e.to_string()))?;

            let verifier = RowVerifier::from_config(&config);
            let table = verifier.verify_rows(
                &fixture.table_ref(),
                &fixture.rows(),
                &rest_rows,
                &fixture.schema(),
            )?;

            let mut total = VerifyResult::new();
            total.add_table(table);

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&total)?);
            } else {
                print_summary(&total);
            }

            if !total.is_in_sync() {
                return Err(VerifyError::Differences(total.total_differences));
            }
        }

        Commands::Normalize {
            column_type,
            typed,
            value,
        } => {
            let tag = column_type.map(ColumnTypeTag::parse).transpose()?;
            let raw: RawValue = if typed {
                serde_json::from_str(&value)?
            } else {
                from_json_value(&serde_json::from_str(&value)?)
            };
            let normalized = normalize(&raw, tag.as_ref())?;

            if cli.output_json {
                println!("{}", serde_json::json!({ "canonical": normalized.canonical() }));
            } else {
                println!("{}", normalized);
            }
        }

        Commands::Classify { tag } => {
            let tag = ColumnTypeTag::parse(tag)?;
            let policy = config.ignore_policy();
            let rule = policy.matching_rule(&tag).filter(|rule| rule.ignore);

            if cli.output_json {
                println!(
                    "{}",
                    serde_json::json!({
                        "tag": tag.as_str(),
                        "ignore": rule.is_some(),
                        "reason": rule.and_then(|r| r.reason.clone()),
                    })
                );
            } else {
                match rule {
                    Some(rule) => match &rule.reason {
                        Some(reason) => println!("ignore ({})", reason),
                        None => println!("ignore"),
                    },
                    None => println!("compare"),
                }
            }
        }

        Commands::Validate => {
            config.validate()?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}

fn print_summary(result: &VerifyResult) {
    for table in &result.tables {
        if table.skipped {
            println!(
                "  - Skipped {} ({})",
                table.table_name,
                table.skip_reason.as_deref().unwrap_or("filtered")
            );
            continue;
        }

        let status = if table.is_in_sync() {
            "✓ In sync"
        } else {
            "✗ Differs"
        };
        println!(
            "  {} {} (CQL rows: {}, REST rows: {}, columns compared: {})",
            status,
            table.table_name,
            table.cql_row_count,
            table.rest_row_count,
            table.columns_compared
        );
        for ignored in &table.ignored_columns {
            println!("    ignored {} ({})", ignored.column, ignored.column_type);
        }
        for set in &table.column_set_mismatches {
            println!(
                "    row {} columns differ: CQL only {:?}, REST only {:?}",
                set.row_index, set.cql_only, set.rest_only
            );
        }
        for mismatch in &table.column_mismatches {
            println!("    {}", mismatch.to_string().replace('\n', "\n      "));
        }
    }

    println!("\nVerification Summary:");
    println!("  Tables checked: {}", result.tables_checked);
    println!("  Tables in sync: {}", result.tables_in_sync);
    println!("  Tables with differences: {}", result.tables_with_differences);
    println!("  Tables skipped: {}", result.tables_skipped);
    println!("  Rows compared: {}", result.total_rows_compared);
    println!("  Differences: {}", result.total_differences);
    println!("  Duration: {:.2}s", result.duration_ms as f64 / 1000.0);
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries command output
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
