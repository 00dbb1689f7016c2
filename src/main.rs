//! orders-eda CLI: exploratory analysis and KPI tables for an orders CSV

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use orders_eda::analysis::inspect;
use orders_eda::io::{read_orders, write_outputs};
use orders_eda::{AnalysisConfig, Result};

#[derive(Parser, Debug)]
#[command(name = "orders-eda", version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the full analysis and write tables and the report
    Analyze {
        /// Orders CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory (overrides the configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (YAML or TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip writing report.json
        #[arg(long)]
        no_json: bool,
    },
    /// Print row count, missing values and numeric summaries
    Inspect {
        /// Orders CSV file
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn init_logging(configured: &str, verbose: u8) {
    let level = match verbose {
        0 => configured,
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn analyze(
    input: PathBuf,
    output: Option<PathBuf>,
    config_file: Option<PathBuf>,
    no_json: bool,
    verbose: u8,
) -> Result<()> {
    let mut config = AnalysisConfig::load_with_precedence(config_file)?;
    if let Some(dir) = output {
        config.output.directory = dir;
    }
    if no_json {
        config.output.write_json = false;
    }
    init_logging(&config.logging.level, verbose);

    let table = read_orders(&input)?;
    let report = orders_eda::run(&table, &config)?;

    for line in report.summary_lines() {
        log::info!("{}", line);
    }

    write_outputs(&report, &config.output)?;
    Ok(())
}

fn inspect_file(input: PathBuf, verbose: u8) -> Result<()> {
    init_logging("warn", verbose);

    let table = read_orders(&input)?;
    let derived = orders_eda::derive_features(&table);
    let inspection = inspect(&derived)?;

    println!("rows: {}", inspection.rows);
    println!(
        "{:<22} {:>8} {:>12} {:>12} {:>12} {:>12}",
        "column", "missing", "mean", "std", "min", "max"
    );
    for column in &inspection.columns {
        match &column.stats {
            Some(s) => println!(
                "{:<22} {:>8} {:>12.3} {:>12.3} {:>12.3} {:>12.3}",
                column.column.as_str(),
                column.missing,
                s.mean,
                s.std,
                s.min,
                s.max
            ),
            None => println!("{:<22} {:>8}", column.column.as_str(), column.missing),
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            input,
            output,
            config,
            no_json,
        } => analyze(input, output, config, no_json, cli.verbose),
        Commands::Inspect { input } => inspect_file(input, cli.verbose),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
