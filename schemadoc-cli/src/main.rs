use clap::{Args, Parser, Subcommand, ValueEnum};
use schemadoc::{
    parse_config, CatalogSnapshot, DocumentSetBuilder, FsSink, MemorySink, PublishingTarget,
    RenderOption, RenderOptions, RunConfig,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;

/// schemadoc: render a database catalog as cross-linked Markdown
#[derive(Parser)]
#[command(name = "schemadoc", version, about)]
struct Cli {
    /// Run configuration file (YAML); flags override its fields
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "yaml", global = true)]
    format: OutputFormat,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the documents and write them below the document root
    Build {
        #[command(flatten)]
        run: RunArgs,

        /// Render everything but write nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show where every document goes and how it is linked
    Paths {
        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Catalog snapshot (YAML, or JSON by extension)
    #[arg(long)]
    catalog: PathBuf,

    /// Publishing target: standalone, platform-wiki, embedded-wiki (or 0, 1, 2)
    #[arg(long, value_parser = parse_target)]
    target: Option<PublishingTarget>,

    /// Render option; repeat for several. Replaces the options of the config file
    #[arg(long = "option", value_enum)]
    options: Vec<OptionArg>,

    /// Document root
    #[arg(long)]
    root: Option<PathBuf>,

    /// Publish directory below the root
    #[arg(long)]
    path: Option<String>,

    /// Image directory
    #[arg(long)]
    image_path: Option<String>,

    /// Name of the overview document
    #[arg(long)]
    overview_name: Option<String>,

    /// Name of the table of contents document
    #[arg(long)]
    toc_name: Option<String>,

    /// Create the document root if it does not exist
    #[arg(long)]
    create_root: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OptionArg {
    SuppressBacklink,
    GroupByKind,
    IncludeDdl,
    EmitToc,
}

impl From<OptionArg> for RenderOption {
    fn from(arg: OptionArg) -> Self {
        match arg {
            OptionArg::SuppressBacklink => RenderOption::SuppressBacklink,
            OptionArg::GroupByKind => RenderOption::GroupByKind,
            OptionArg::IncludeDdl => RenderOption::IncludeDdl,
            OptionArg::EmitToc => RenderOption::EmitToc,
        }
    }
}

fn parse_target(s: &str) -> Result<PublishingTarget, String> {
    s.parse().map_err(|e: schemadoc::SchemaDocError| e.to_string())
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        Command::Build { run, dry_run } => {
            let config = run_config(cli.config.as_deref(), run)?;
            let catalog = CatalogSnapshot::load(&run.catalog)?;
            let builder = DocumentSetBuilder::new(&catalog, &config)?;

            let report = if *dry_run {
                builder.publish(&mut MemorySink::new())?
            } else {
                let mut sink =
                    FsSink::open(&config.root, builder.resolver().base_path(), config.create_root)?;
                builder.publish(&mut sink)?
            };
            print_output(&report, &cli.format)?;
        }

        Command::Paths { run } => {
            let config = run_config(cli.config.as_deref(), run)?;
            let catalog = CatalogSnapshot::load(&run.catalog)?;
            let documents = DocumentSetBuilder::new(&catalog, &config)?.build()?;
            let listing: Vec<_> = documents.iter().collect();
            print_output(&listing, &cli.format)?;
        }
    }

    Ok(())
}

/// The config file, if any, with command-line flags applied on top.
fn run_config(
    config_file: Option<&Path>,
    args: &RunArgs,
) -> Result<RunConfig, Box<dyn std::error::Error>> {
    let mut config = match config_file {
        Some(path) => parse_config(path)?,
        None => {
            let target = args
                .target
                .ok_or("No publishing target: pass --target or --config")?;
            RunConfig::new(target, RenderOptions::empty())
        }
    };

    if let Some(target) = args.target {
        config.target = target;
    }
    if !args.options.is_empty() {
        config.options = args.options.iter().map(|o| RenderOption::from(*o)).collect();
    }
    if let Some(root) = &args.root {
        config.root = root.clone();
    }
    if let Some(path) = &args.path {
        config.path = Some(path.clone());
    }
    if let Some(image_path) = &args.image_path {
        config.image_path = Some(image_path.clone());
    }
    if let Some(name) = &args.overview_name {
        config.overview_name = Some(name.clone());
    }
    if let Some(name) = &args.toc_name {
        config.toc_name = Some(name.clone());
    }
    config.create_root |= args.create_root;

    log::debug!("Run configuration: {:?}", config);
    Ok(config)
}

fn print_output<T: Serialize>(
    value: &T,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}
