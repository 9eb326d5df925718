//! flowgen CLI - Command-line interface
//!
//! Commands:
//!   generate   - Write js/client.js for a design
//!   transform  - Print the transform function between two types
//!   schema     - Print the JSON schema of an input format

use clap::{Parser, Subcommand};
use flowgen::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flowgen", version, about = "Flow client generator for API designs")]
struct Cli {
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the client module
    Generate {
        /// Design file
        design: PathBuf,
        /// Output directory, js/client.js is written below it
        #[arg(long)]
        out: Option<PathBuf>,
        /// Client request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Scheme used by the client
        #[arg(long)]
        scheme: Option<String>,
        /// Host addressed by the client
        #[arg(long)]
        host: Option<String>,
        /// Generator version the design requires
        #[arg(long = "version")]
        api_version: Option<String>,
        /// Configuration file (default: ./flowgen.yaml when present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Add a provenance header
        #[arg(long)]
        provenance: bool,
    },
    /// Print the transform function between two named types
    Transform {
        /// Design file
        design: PathBuf,
        /// Source type name
        #[arg(long)]
        source: String,
        /// Target type name
        #[arg(long)]
        target: String,
        /// Function name
        #[arg(long)]
        name: Option<String>,
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the JSON schema of the design or configuration format
    Schema {
        /// design | config
        #[arg(default_value = "list")]
        name: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Generate {
            design,
            out,
            timeout,
            scheme,
            host,
            api_version,
            config,
            provenance,
        } => cmd_generate(
            &design,
            config.as_deref(),
            Overrides {
                out_dir: out,
                timeout_secs: timeout,
                scheme,
                host,
                version: api_version,
                provenance: provenance.then_some(true),
            },
        ),
        Command::Transform {
            design,
            source,
            target,
            name,
            output,
        } => cmd_transform(&design, &source, &target, name.as_deref(), output.as_deref()),
        Command::Schema { name } => cmd_schema(&name),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "flowgen=warn",
        1 => "flowgen=debug",
        _ => "flowgen=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    match path {
        Some(path) => GeneratorConfig::load(path),
        None => GeneratorConfig::load_from_dir(Path::new(".")),
    }
}

fn cmd_generate(design_path: &Path, config: Option<&Path>, overrides: Overrides) -> Result<()> {
    let design = Design::load(design_path)?;
    let config = load_config(config)?.merge(&overrides);
    info!(design = %design.name, out_dir = %config.out_dir.display(), "loaded design");

    let source = design_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| design.name.clone());
    let files = Generator::new(&design, config).with_source(source).generate()?;
    for file in files.iter().filter(|f| f.is_file()) {
        println!("✓ {}", file.display());
    }
    Ok(())
}

fn cmd_transform(
    design_path: &Path,
    source: &str,
    target: &str,
    name: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let design = Design::load(design_path)?;
    let config = load_config(None)?;
    let code = TransformGenerator::new(&design, &config.render).transform(
        &design.named_type(source)?,
        &design.named_type(target)?,
        name,
    )?;

    match output {
        Some(path) => {
            fs::write(path, code)?;
            println!("✓ {}", path.display());
        }
        None => print!("{}", code),
    }
    Ok(())
}

fn cmd_schema(name: &str) -> Result<()> {
    match name {
        "list" => {
            println!("Available schemas: design, config");
            Ok(())
        }
        "design" => print_schema::<Design>(),
        "config" => print_schema::<GeneratorConfig>(),
        _ => Err(format!("Unknown schema: {}", name).into()),
    }
}

fn print_schema<T: schemars::JsonSchema>() -> Result<()> {
    let schema = schemars::schema_for!(T);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
