// stdsheet CLI - standards data <-> spreadsheet workbook conversion

mod exit_codes;
mod logger;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;
use stdsheet_config::{MissingTable, Settings};
use stdsheet_engine::document::CanonicalDocument;
use stdsheet_engine::{ConvertError, ExtractOptions, LayoutOptions, MissingTablePolicy};
use stdsheet_io::{json, pipeline, ReadOptions};

use exit_codes::{convert_exit_code, EXIT_ROUNDTRIP_DIFFS, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "stdsheet")]
#[command(about = "Convert building-standards JSON data to an editable workbook and back")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/stdsheet/config.toml)
    #[arg(long, global = true, env = "STDSHEET_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// More diagnostics on stderr (-v notes, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge JSON fragments and write them as one workbook
    #[command(after_help = "\
Fragments are merged left to right; a later fragment's top-level key replaces
an earlier one. The merged document must have exactly `constants`, `formulas`
and `tables`.

Examples:
  stdsheet to-xlsx data/constants.json data/formulas.json data/tables.json -o standards.xlsx")]
    ToXlsx {
        /// JSON fragments, merged in order
        #[arg(required = true)]
        fragments: Vec<PathBuf>,

        /// Output workbook
        #[arg(long, short = 'o')]
        output: PathBuf,
    },

    /// Read an edited workbook back into JSON
    #[command(after_help = "\
Every sheet except the constants/formulas sheets becomes one category keyed by
sheet name. Output is key-sorted unless --no-sort is given.

Examples:
  stdsheet from-xlsx standards.xlsx -o standards.json
  stdsheet from-xlsx standards.xlsx --snapshot-dir snapshots/ | jq 'keys'")]
    FromXlsx {
        /// Workbook to read (xlsx, xls, xlsb, ods)
        input: PathBuf,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Keep sheet and field order instead of sorting keys
        #[arg(long)]
        no_sort: bool,

        /// Also write each sheet's result to DIR/<sheet>.json
        #[arg(long, value_name = "DIR")]
        snapshot_dir: Option<PathBuf>,

        /// Fail on sheets that have no table region
        #[arg(long)]
        strict_tables: bool,
    },

    /// Write fragments to a workbook in memory, read it back, report differences
    #[command(after_help = "\
Exit code 1 means at least one table category did not come back unchanged
(for example a string \"true\" that reads back as a boolean).

Examples:
  stdsheet roundtrip data/*.json
  stdsheet roundtrip data/*.json -o reread.json")]
    Roundtrip {
        /// JSON fragments, merged in order
        #[arg(required = true)]
        fragments: Vec<PathBuf>,

        /// Write the re-read document here (omit to skip)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Keep sheet and field order instead of sorting keys
        #[arg(long)]
        no_sort: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> ExitCode {
    let Cli { config, verbose, quiet, command } = Cli::parse();
    logger::init(logger::level_for(verbose, quiet));

    let result = load_settings(config.as_deref()).and_then(|settings| match command {
        Commands::ToXlsx { fragments, output } => cmd_to_xlsx(&settings, fragments, output),
        Commands::FromXlsx { input, output, no_sort, snapshot_dir, strict_tables } => {
            cmd_from_xlsx(&settings, input, output, no_sort, snapshot_dir, strict_tables)
        }
        Commands::Roundtrip { fragments, output, no_sort } => {
            cmd_roundtrip(&settings, fragments, output, no_sort)
        }
        Commands::Config => cmd_config(&settings, config.as_deref()),
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ConvertError> for CliError {
    fn from(err: ConvertError) -> Self {
        let hint = match &err {
            ConvertError::Schema(_) => {
                Some("a document needs top-level `constants`, `formulas` and `tables` arrays".to_string())
            }
            ConvertError::MissingTable { .. } => {
                Some("add a row whose first cell is the sentinel, or drop --strict-tables".to_string())
            }
            _ => None,
        };
        Self { code: convert_exit_code(&err), message: err.to_string(), hint }
    }
}

// ============================================================================
// settings
// ============================================================================

fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    match path {
        Some(path) => Settings::load_from(path)
            .map_err(|e| CliError::usage(e).with_hint("see `stdsheet config` for the expected layout")),
        None => Ok(Settings::load()),
    }
}

fn layout_options(settings: &Settings) -> LayoutOptions {
    LayoutOptions {
        sentinel: settings.workbook.sentinel.clone(),
        constants_sheet: settings.workbook.constants_sheet.clone(),
        formulas_sheet: settings.workbook.formulas_sheet.clone(),
    }
}

fn read_options(
    settings: &Settings,
    no_sort: bool,
    snapshot_dir: Option<PathBuf>,
    strict_tables: bool,
) -> ReadOptions {
    let missing_table = if strict_tables {
        MissingTablePolicy::Error
    } else {
        match settings.read.missing_table {
            MissingTable::Allow => MissingTablePolicy::Allow,
            MissingTable::Error => MissingTablePolicy::Error,
        }
    };

    ReadOptions {
        extract: ExtractOptions {
            sentinel: settings.workbook.sentinel.clone(),
            skip_sheets: settings.effective_skip_sheets(),
            missing_table,
        },
        sort_keys: settings.effective_sort_keys() && !no_sort,
        snapshot_dir: snapshot_dir.or_else(|| settings.read.snapshot_dir.clone()),
    }
}

// ============================================================================
// to-xlsx
// ============================================================================

fn cmd_to_xlsx(settings: &Settings, fragments: Vec<PathBuf>, output: PathBuf) -> Result<(), CliError> {
    pipeline::write_workbook_file(&fragments, &output, &layout_options(settings))?;
    Ok(())
}

// ============================================================================
// from-xlsx
// ============================================================================

fn cmd_from_xlsx(
    settings: &Settings,
    input: PathBuf,
    output: Option<PathBuf>,
    no_sort: bool,
    snapshot_dir: Option<PathBuf>,
    strict_tables: bool,
) -> Result<(), CliError> {
    let options = read_options(settings, no_sort, snapshot_dir, strict_tables);
    let doc = pipeline::read_workbook_file(&input, &options)?;

    // Already sorted by the pipeline when requested
    let text = json::to_pretty_string(&Value::Object(doc), false)?;
    write_output(output.as_deref(), &text)
}

// ============================================================================
// roundtrip
// ============================================================================

fn cmd_roundtrip(
    settings: &Settings,
    fragments: Vec<PathBuf>,
    output: Option<PathBuf>,
    no_sort: bool,
) -> Result<(), CliError> {
    let document = Value::Object(json::load(&fragments)?);
    let canonical = CanonicalDocument::from_value(&document)?;

    let (bytes, export) = pipeline::to_workbook_with(&document, &layout_options(settings))?;
    log::info!("workbook: {} ({} bytes)", export.summary(), bytes.len());

    let options = read_options(settings, no_sort, None, false);
    let reread = pipeline::from_workbook_with(&bytes, &options)?;

    let mut differing = Vec::new();
    for table in &canonical.tables {
        let name = table.name().unwrap_or_default();
        if reread.get(name) != Some(&table.to_value()) {
            differing.push(name.to_string());
        }
    }

    if let Some(path) = output.as_deref() {
        let text = json::to_pretty_string(&Value::Object(reread), false)?;
        write_output(Some(path), &text)?;
    }

    if differing.is_empty() {
        log::info!("{} table(s) round-trip unchanged", canonical.tables.len());
        return Ok(());
    }

    for name in &differing {
        log::warn!("table '{}' changed on round trip", name);
    }
    Err(CliError {
        code: EXIT_ROUNDTRIP_DIFFS,
        message: format!("{} of {} table(s) changed", differing.len(), canonical.tables.len()),
        hint: Some("text cells that parse as JSON (\"42\", \"true\") read back decoded".to_string()),
    })
}

// ============================================================================
// config
// ============================================================================

fn cmd_config(settings: &Settings, explicit: Option<&Path>) -> Result<(), CliError> {
    let path = explicit.map(Path::to_path_buf).unwrap_or_else(Settings::config_path);
    let text = settings.to_toml().map_err(CliError::usage)?;
    write_output(None, &format!("# {}\n{}", path.display(), text))
}

fn write_output(path: Option<&Path>, text: &str) -> Result<(), CliError> {
    match path {
        Some(path) => std::fs::write(path, text).map_err(|e| ConvertError::io(path.display().to_string(), e))?,
        None => io::stdout()
            .write_all(text.as_bytes())
            .map_err(|e| ConvertError::io("<stdout>", e))?,
    }
    Ok(())
}
