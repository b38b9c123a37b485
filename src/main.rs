// intcode: suspendable stack-machine interpreter with a time-travel debugger

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use intcode::debugger::{DebugError, Session};
use intcode::interpreter::Engine;
use intcode::pipeline::{self, PipelineConfig, Topology};
use intcode::program::Program;
use intcode::ui::App;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(name = "intcode", version)]
#[command(about = "Run, chain, and debug integer stack-machine programs")]
struct Cli {
    /// Abort any engine after this many executed instructions
    #[arg(long, global = true)]
    max_steps: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a program to completion and print its outputs
    Run {
        /// Program file (comma-separated integers)
        file: PathBuf,

        /// Input value; repeat for several
        #[arg(long = "input", allow_negative_numbers = true)]
        inputs: Vec<i64>,

        /// Overwrite a word before running, as ADDR=VALUE
        #[arg(long = "patch", value_parser = parse_patch)]
        patches: Vec<(usize, i64)>,

        /// Print the word at ADDR after the program halts
        #[arg(long = "peek")]
        peeks: Vec<usize>,
    },

    /// Chain one engine per phase and print the final signal
    Amplify(ChainArgs),

    /// Try every phase ordering and print the best signal
    Search(ChainArgs),

    /// Record an execution and browse it in the terminal UI
    Debug {
        /// Program file (comma-separated integers)
        file: PathBuf,

        /// Input value; repeat for several
        #[arg(long = "input", allow_negative_numbers = true)]
        inputs: Vec<i64>,

        /// Memory budget for recorded snapshots, in bytes
        #[arg(long, default_value_t = 1024 * 1024 * 1024)]
        snapshot_limit: usize,
    },
}

#[derive(clap::Args, Debug)]
struct ChainArgs {
    /// Program file (comma-separated integers)
    file: PathBuf,

    /// Phase settings, one per engine
    #[arg(
        long,
        value_delimiter = ',',
        required = true,
        allow_negative_numbers = true
    )]
    phases: Vec<i64>,

    /// Signal fed to the first engine
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    signal: i64,

    /// Route the last engine's output back into the first
    #[arg(long)]
    feedback: bool,
}

impl ChainArgs {
    fn topology(&self) -> Topology {
        if self.feedback {
            Topology::Feedback
        } else {
            Topology::Linear
        }
    }
}

fn parse_patch(text: &str) -> Result<(usize, i64), String> {
    let (address, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected ADDR=VALUE, got '{}'", text))?;
    let address = address
        .trim()
        .parse()
        .map_err(|e| format!("bad address '{}': {}", address, e))?;
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("bad value '{}': {}", value, e))?;
    Ok((address, value))
}

fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_program(path: &Path) -> Result<Program, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    let program = Program::parse(&text)?;
    info!(path = %path.display(), words = program.len(), "loaded program");
    Ok(program)
}

fn main() {
    let cli = Cli::parse();

    // Log lines would corrupt the alternate screen
    match cli.command {
        Command::Debug { .. } => init_logging("error"),
        _ => init_logging("warn,intcode=info"),
    }

    if let Err(err) = execute_command(cli) {
        error!("{}", err);
        process::exit(1);
    }
}

fn execute_command(cli: Cli) -> CliResult {
    let config = PipelineConfig {
        max_steps: cli.max_steps,
    };

    match cli.command {
        Command::Run {
            file,
            inputs,
            patches,
            peeks,
        } => {
            let program = load_program(&file)?.patched(&patches)?;
            let mut engine = Engine::new(&program);
            engine.set_step_limit(cli.max_steps);

            let outputs = engine.run_to_halt(&inputs)?;
            for value in &outputs {
                println!("{}", value);
            }
            for address in peeks {
                println!("[{}] = {}", address, engine.peek(address));
            }

            if !engine.is_halted() {
                return Err(format!(
                    "program is waiting for input at ip {} after consuming every --input value",
                    engine.ip()
                )
                .into());
            }
            info!(
                steps = engine.steps_executed(),
                outputs = outputs.len(),
                "program halted"
            );
        }
        Command::Amplify(args) => {
            let program = load_program(&args.file)?;
            let signal =
                pipeline::amplify(&program, &args.phases, args.signal, args.topology(), config)?;
            println!("{}", signal);
        }
        Command::Search(args) => {
            let program = load_program(&args.file)?;
            let best = pipeline::max_signal(
                &program,
                &args.phases,
                args.signal,
                args.topology(),
                config,
            )?;
            info!(phases = ?best.phases, "best phase ordering");
            println!("{}", best.signal);
        }
        Command::Debug {
            file,
            inputs,
            snapshot_limit,
        } => {
            let program = load_program(&file)?;
            let mut session = Session::new(&program, &inputs, snapshot_limit)?;
            session.set_step_limit(cli.max_steps);

            // A fault or a spent snapshot budget keeps the partial history browsable
            match session.run() {
                Ok(()) | Err(DebugError::Fault(_)) | Err(DebugError::SnapshotLimit(_)) => {}
                Err(err) => return Err(err.into()),
            }
            session.rewind_to_start();

            run_tui(session)?;
        }
    }

    Ok(())
}

fn run_tui(session: Session) -> CliResult {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        warn!(error = %err, "terminal UI stopped");
        return Err(err.into());
    }

    Ok(())
}
