//! Canvas Compose CLI
//!
//! Usage:
//!   canvas-compose [OPTIONS] [FILE]
//!
//! Options:
//!   -a, --ascii     Print a character preview of the composited raster
//!   -d, --debug     Print the canvas tree with solved locations
//!   -s, --strict    Fail when the layout produces warnings
//!   -v              Raise log verbosity (repeatable)
//!   -h, --help      Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use canvas_compose::{render_with_config, RenderConfig, RenderError, DEFAULT_LEGEND};

#[derive(Parser)]
#[command(name = "canvas-compose")]
#[command(about = "Solve and composite nested canvases described in TOML")]
struct Cli {
    /// Scene file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Print a character preview of the composited raster
    #[arg(short, long)]
    ascii: bool,

    /// Debug mode: print the canvas tree with solved locations
    #[arg(short, long)]
    debug: bool,

    /// Fail when the layout produces warnings
    #[arg(short, long)]
    strict: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    // If no input file and stdin is a terminal (interactive), show intro help
    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let filename = cli
        .input
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string());

    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let config = RenderConfig::new()
        .with_debug(cli.debug)
        .with_strict(cli.strict);
    match render_with_config(&source, config) {
        Ok((report, raster)) => {
            print!("{}", report);
            if cli.ascii {
                println!("{}", raster.to_ascii(DEFAULT_LEGEND));
            }
        }
        Err(RenderError::Scene(e)) => {
            eprint!("{}", e.format(&source, &filename));
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_intro() {
    println!(
        r##"Canvas Compose - constraint layout for nested canvases

USAGE:
    canvas-compose [OPTIONS] [FILE]
    cat scene.toml | canvas-compose

OPTIONS:
    -a, --ascii    Print a character preview of the raster
    -d, --debug    Show the canvas tree with locations
    -s, --strict   Fail on layout warnings
    -v             More logging (repeat for more)
    -h, --help     Print help

QUICK START:
    [image]
    width = 40
    height = 20

    [[canvas]]
    name = "plot"
    background = "#0000ff"

    [[fix]]
    kind = "relation"
    first = "master"
    first_part = "left"
    second = "plot"
    second_part = "left"
    offset = 4

Add one fix per free edge of every canvas; the report lists every
constraint and the solved location of each canvas."##
    );
}
