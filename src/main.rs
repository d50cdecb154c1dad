use clap::Parser;
use log::{info, LevelFilter};
use std::path::PathBuf;

use gatt_gen::pipeline::{self, Selection};
use gatt_gen::GenError;

#[derive(Parser)]
#[command(name = "gattgen")]
#[command(about = "Zephyr GATT service generator", long_about = None)]
struct Cli {
    /// Input JSON configuration file(s)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "generated")]
    output: PathBuf,

    /// Generate header files
    #[arg(long)]
    header: bool,

    /// Generate source files
    #[arg(long)]
    source: bool,

    /// Check configuration only (no generation)
    #[arg(long)]
    check: bool,

    /// Verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

fn main() -> Result<(), GenError> {
    let cli = Cli::parse();
    env_logger::Builder::new().filter_level(log_level(cli.verbose)).init();

    // Every file is loaded before anything is generated
    let specs = pipeline::load_all(&cli.files)?;

    if cli.check {
        for analyzed in pipeline::check_all(&specs)? {
            info!(
                "  {}: {} characteristics, {} attributes",
                analyzed.spec.name,
                analyzed.fields.len(),
                analyzed.layout.attribute_count()
            );
        }
        for file_path in &cli.files {
            println!("✓ {} - Configuration OK", file_path.display());
        }
        return Ok(());
    }

    // If no output flags specified, generate everything
    let selection = if !cli.header && !cli.source {
        Selection::ALL
    } else {
        Selection {
            header: cli.header,
            source: cli.source,
        }
    };

    let written = pipeline::generate_into(&specs, &cli.output, selection)?;
    info!("{} file(s) written to {}", written.len(), cli.output.display());

    for file_path in &cli.files {
        println!("✓ {} - Generated successfully", file_path.display());
    }

    Ok(())
}
