use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use odstable_core::{ColumnType, OdsDocument, ReadOptions, SheetSelector};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::prelude::*;

mod formatter;

#[derive(Parser)]
#[command(name = "odstable")]
#[command(about = "Print one sheet of an ODS spreadsheet as a typed table", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the ODS file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Sheet name, or 0-based sheet index
    #[arg(short, long, value_parser = parse_sheet)]
    sheet: Option<SheetSelector>,

    /// Rows to discard before data begins (the header row is exempt)
    #[arg(long, value_name = "N")]
    skip_lines: Option<usize>,

    /// Treat the first row as data; requires --column-names
    #[arg(long)]
    no_header: bool,

    /// Maximum number of data rows
    #[arg(short = 'n', long, value_name = "N")]
    row_limit: Option<usize>,

    /// Comma separated column types (text, number, datetime, boolean)
    #[arg(long, value_delimiter = ',', value_parser = parse_column_type)]
    column_types: Option<Vec<ColumnType>>,

    /// Comma separated column names
    #[arg(long, value_delimiter = ',')]
    column_names: Option<Vec<String>>,

    /// Path to read options file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// List sheet names and exit
    #[arg(long)]
    list_sheets: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output for scripting
    Json,
}

fn parse_sheet(s: &str) -> Result<SheetSelector, String> {
    s.parse().map_err(|e: odstable_core::OdsError| e.to_string())
}

fn parse_column_type(s: &str) -> Result<ColumnType, String> {
    s.parse().map_err(|e: odstable_core::OdsError| e.to_string())
}

impl Cli {
    /// Config file values, overridden by any flag given on the command line
    fn read_options(&self) -> Result<ReadOptions> {
        let mut options = match &self.config {
            Some(path) => ReadOptions::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => ReadOptions::default(),
        };

        if let Some(sheet) = &self.sheet {
            options.sheet = Some(sheet.clone());
        }
        if let Some(skip_lines) = self.skip_lines {
            options.skip_lines = skip_lines;
        }
        if self.no_header {
            options.header = false;
        }
        if let Some(row_limit) = self.row_limit {
            options.row_limit = Some(row_limit);
        }
        if let Some(types) = &self.column_types {
            options.column_types = Some(types.clone());
        }
        if let Some(names) = &self.column_names {
            options.column_names = Some(names.clone());
        }

        debug!("Read options: {:?}", options);
        Ok(options)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let options = cli.read_options()?;

    let document = OdsDocument::open(&cli.file)
        .with_context(|| format!("Failed to open file: {}", cli.file.display()))?;

    if cli.list_sheets {
        let names = document
            .sheet_names()
            .context("Failed to list sheet names")?;
        match cli.format {
            OutputFormat::Human => formatter::print_sheet_names_human(&cli.file, &names),
            OutputFormat::Json => formatter::print_sheet_names_json(&cli.file, &names)?,
        }
        return Ok(());
    }

    let table = document
        .read_table(&options)
        .with_context(|| format!("Failed to read table from: {}", cli.file.display()))?;

    match cli.format {
        OutputFormat::Human => formatter::print_human(&cli.file, &table),
        OutputFormat::Json => formatter::print_json(&cli.file, &table)?,
    }

    Ok(())
}
