use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::error;

use background_knockout::export::resolve_output_path;
use background_knockout::{BackgroundVariant, FsEnvironment, ProcessOptions, Session};

#[derive(Parser)]
#[command(
    name = "bg-knockout",
    about = "Knock out solid black or white backgrounds and stack the results into one PNG",
    version,
    after_help = "Images are layered in the order given; the first one sets the canvas size.\n\
                  Directories contribute their images sorted by file name."
)]
struct Cli {
    /// Input image files or directories
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Background colour to remove (black or white)
    #[arg(short = 'b', long, default_value = "black")]
    variant: BackgroundVariant,

    /// Output file or directory (default: ./processed-image.png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(opts: &ProcessOptions) {
    let level = if opts.quiet {
        "error"
    } else if opts.verbose {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let opts = ProcessOptions {
        variant: cli.variant,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };
    init_logging(&opts);

    let output = resolve_output_path(cli.output.as_deref());

    let mut env = FsEnvironment::new(cli.inputs, output);
    let mut session = Session::new(opts.clone());
    let mut reporter = |message: &str| {
        if !opts.quiet {
            eprintln!("{message}");
        }
    };

    if !opts.quiet {
        eprintln!("{} removal", opts.variant.title());
        eprintln!();
    }

    match session.select_files(&mut env, &mut reporter) {
        Ok(0) => {
            error!("no images could be loaded");
            process::exit(1);
        }
        Ok(_) => {}
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }

    if let Err(e) = session.process(&mut env, &mut reporter) {
        error!("processing failed: {e}");
        process::exit(1);
    }

    if let Err(e) = session.export(&mut env) {
        error!("export failed: {e}");
        process::exit(1);
    }

    if !opts.quiet {
        eprintln!("[OK] {}", env.output().display());
    }
    session.go_home(&mut env);
}
