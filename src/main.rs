use clap::{Parser, Subcommand};
use doc_merge::config::OutputFormat;
use doc_merge::convert::PandocConverter;
use doc_merge::render::DocxRenderer;
use doc_merge::source::TabularSource;
use doc_merge::template::TemplateDoc;
use doc_merge::{batch, config, output, template};
use std::path::PathBuf;

/// Shared inputs for commands that read a template and a data source.
#[derive(clap::Args, Clone)]
struct InputArgs {
    /// DOCX template containing {Spalte} placeholder tokens
    #[arg(long)]
    template: PathBuf,

    /// Delimiter-separated data source with a header row
    #[arg(long)]
    data: PathBuf,

    /// Cell delimiter of the data source (overrides config)
    #[arg(long)]
    delimiter: Option<char>,
}

#[derive(Parser)]
#[command(name = "doc-merge")]
#[command(about = "Mail-merge batch document generator")]
#[command(long_about = "\
Mail-merge batch document generator

A DOCX template with {Spalte} placeholder tokens plus a delimiter-separated
data source produce one filled document per row, packaged into a single ZIP
archive.

Workflow:

  1. Author a DOCX template. Placeholders are {Spaltenname} tokens matching
     the column names of the data source. 'doc-merge gen-template' writes a
     starter document.
  2. Export the data source with a header row (semicolon-delimited by
     default, the common German spreadsheet export).
  3. Pick a filename pattern, e.g. Rechnung_{Kundennummer}_{Nachname}.
     A row whose pattern expands to a blank name falls back to Entry_<n>.
  4. Run 'doc-merge merge --template brief.docx --data daten.csv'. The
     archive (dokumente.zip) holds one document per row; rows that fail to
     render are reported and skipped, never silently dropped.

Placeholders with no matching column are left verbatim. Run 'doc-merge
check' to list them before generating, and 'doc-merge gen-config' to print
a documented merge.toml.")]
#[command(version)]
struct Cli {
    /// Config file with defaults for all options
    #[arg(long, default_value = "merge.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full batch and write the output archive
    Merge(MergeArgs),
    /// Validate template and data source without generating documents
    Check(CheckArgs),
    /// Print a stock merge.toml with all options documented
    GenConfig,
    /// Write a starter DOCX template demonstrating the token syntax
    GenTemplate(GenTemplateArgs),
}

#[derive(clap::Args)]
struct MergeArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Filename pattern with {Spalte} tokens (overrides config)
    #[arg(long)]
    filename_template: Option<String>,

    /// Formats to generate per row (overrides config)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Path of the output archive (overrides config archive_name)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(clap::Args)]
struct CheckArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Filename pattern to check against the columns (overrides config)
    #[arg(long)]
    filename_template: Option<String>,

    /// Emit the report as JSON instead of the tree display
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct GenTemplateArgs {
    /// Where to write the starter template
    #[arg(long, default_value = "template.docx")]
    out: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Command::Merge(args) => {
            let (template, source) = load_inputs(&args.input, &cfg)?;
            let options = batch::BatchOptions {
                filename_template: args
                    .filename_template
                    .unwrap_or_else(|| cfg.filename_template.clone()),
                format: args.format.unwrap_or(cfg.output.format),
            };

            let converter = PandocConverter::new(&cfg.convert.pandoc);
            let report = batch::run(&template, &source, &DocxRenderer, &converter, &options)?;

            let out = args
                .out
                .unwrap_or_else(|| PathBuf::from(&cfg.archive_name));
            std::fs::write(&out, &report.archive)?;
            output::print_merge_output(&report, &out.display().to_string());
        }
        Command::Check(args) => {
            let (template, source) = load_inputs(&args.input, &cfg)?;
            let pattern = args
                .filename_template
                .unwrap_or_else(|| cfg.filename_template.clone());
            let report = batch::preflight(&template, &source, &pattern)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_check_output(&report);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::GenTemplate(args) => {
            let bytes = template::starter_template()?;
            std::fs::write(&args.out, bytes)?;
            println!("Wrote {}", args.out.display());
        }
    }

    Ok(())
}

/// Load template and source with the effective delimiter.
fn load_inputs(
    input: &InputArgs,
    cfg: &config::MergeConfig,
) -> Result<(TemplateDoc, TabularSource), Box<dyn std::error::Error>> {
    let delimiter = input.delimiter.unwrap_or(cfg.source.delimiter);
    if !delimiter.is_ascii() {
        return Err("delimiter must be a single ASCII character".into());
    }
    let template = TemplateDoc::from_path(&input.template)?;
    let source = TabularSource::from_path(&input.data, delimiter as u8)?;
    Ok((template, source))
}
