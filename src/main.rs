use clap::Parser;
use std::path::PathBuf;
use std::process;

use seagen::config::Inputs;
use seagen::diagnostic::{render_diagnostics, Diagnostic};
use seagen::source::Sources;
use seagen::{generate, write_output, GenerateOptions, Project};

#[derive(Parser)]
#[command(
    name = "seagen",
    version,
    about = "Generate C node definitions and rewrite dispatchers from a sea-of-nodes schema"
)]
struct Cli {
    /// Folder holding one .sea schema and any number of .rules files
    folder: PathBuf,
    /// Output directory (default: the input folder)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Prefix of generated identifiers and file names
    #[arg(long, default_value = "p9")]
    prefix: String,
    /// Log each parsed form and rule (-vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = GenerateOptions::with_prefix(&cli.prefix);
    if let Err(diag) = options.validate() {
        fail(&[diag], &Sources::new());
    }

    let project = match Inputs::discover(&cli.folder).and_then(|inputs| Project::load(&inputs)) {
        Ok(p) => p,
        Err(diag) => fail(&[diag], &Sources::new()),
    };

    let output = match generate(&project, &options) {
        Ok(out) => out,
        Err(diags) => fail(&diags, project.sources()),
    };

    let out_dir = cli.output.unwrap_or(cli.folder);
    if let Err(diag) = write_output(&output, &out_dir, &options) {
        fail(&[diag], &Sources::new());
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn fail(diagnostics: &[Diagnostic], sources: &Sources) -> ! {
    render_diagnostics(diagnostics, sources);
    process::exit(1);
}
