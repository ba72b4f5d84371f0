use std::io::{stderr, stdin, IsTerminal};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser};
use colored::Colorize;
use tracing_subscriber::filter::EnvFilter;

use lc3_vm::term::{PipedConsole, TermConsole};
use lc3_vm::{Console, Image, RunState, RuntimeError};

/// Exit status when the program hits a fatal fault.
const EXIT_FAULT: i32 = 2;
/// Exit status when the user interrupts execution.
const EXIT_INTERRUPTED: i32 = -2;

/// Run an assembled LC3 program image.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// `.obj` image to run: big-endian words, origin first
    path: PathBuf,

    /// Produce minimal output, suited for blackbox tests
    #[arg(short, long)]
    minimal: bool,

    /// Increase the level of verbosity. Can be used multiple times.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    const fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "lc3_vm=debug,warn",
            2..=u8::MAX => "lc3_vm=trace,warn",
        }
    }

    fn filter_layer(&self) -> EnvFilter {
        // Parse log level from env, or infer from args
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.log_filter()))
    }
}

fn main() -> miette::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(args.filter_layer())
        .with_writer(stderr)
        .with_ansi(stderr().is_terminal())
        .without_time()
        .with_target(false)
        .init();

    miette::set_hook(Box::new(|_| {
        Box::new(miette::MietteHandlerOpts::new().build())
    }))?;

    if !args.minimal {
        file_message(MsgColor::Green, "Loading", &args.path);
    }
    let image = Image::read(&args.path)?;

    if !args.minimal {
        message(MsgColor::Green, "Running", "program image");
    }
    match execute(&image) {
        Ok(()) => {
            if !args.minimal {
                file_message(MsgColor::Green, "Completed", &args.path);
            }
            Ok(())
        }
        Err(RuntimeError::Interrupted) => {
            println!();
            if !args.minimal {
                message(MsgColor::Red, "Interrupted", "by user");
            }
            process::exit(EXIT_INTERRUPTED);
        }
        Err(err) => {
            println!();
            eprintln!("{:?}", miette::Report::new(err));
            process::exit(EXIT_FAULT);
        }
    }
}

/// Run the image on the host console.
///
/// The terminal is restored before this returns, whatever the outcome.
fn execute(image: &Image) -> Result<(), RuntimeError> {
    if stdin().is_terminal() {
        run_on(image, TermConsole::new()?)
    } else {
        run_on(image, PipedConsole::new())
    }
}

fn run_on(image: &Image, console: impl Console) -> Result<(), RuntimeError> {
    let mut state = RunState::new(image, console);
    state.run()
}

enum MsgColor {
    Green,
    Red,
}

fn file_message(color: MsgColor, left: &str, right: &Path) {
    let right = format!("target {}", right.display());
    message(color, left, &right);
}

fn message<S>(color: MsgColor, left: S, right: S)
where
    S: Colorize + std::fmt::Display,
{
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Red => left.red(),
    };
    println!("{left:>12} {right}");
}
