use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::ast_printer::AstPrinter;
use rox::error::{ErrorSink, LoxError};
use rox::interpreter::Interpreter;
use rox::parser::Parser;
use rox::scanner::Scanner;
use rox::Status;

/// Exit status for lexical, syntax and static errors.
const EXIT_STATIC: u8 = 65;

/// Exit status for runtime errors.
const EXIT_RUNTIME: u8 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: Option<PathBuf>,

        /// Print tokens as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parses a Lox program and prints its syntax tree
    Parse {
        filename: Option<PathBuf>,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a Lox program
    Run { filename: Option<PathBuf> },

    /// Starts an interactive prompt
    Repl,
}

/// Prints every error to stderr and counts them.
#[derive(Default)]
struct StderrSink {
    reported: usize,
}

impl ErrorSink for StderrSink {
    fn report(&mut self, error: LoxError) {
        debug!("Reporting error from line {:?}", error.line());
        self.reported += 1;
        eprintln!("{}", error);
    }
}

/// Reads the contents of a file into a Vec<u8>
fn read_file(filename: PathBuf) -> Result<Vec<u8>> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // Timestamp, module (crate prefix stripped) and source line per record.
    Builder::new()
        .format(|buf, record| {
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rox::").unwrap_or(module);
            writeln!(
                buf,
                "{} [{}:{}] {} - {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                module,
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn missing_file(command: &str) -> ExitCode {
    info!("No filepath provided for {}", command);
    println!("No input filepath was provided. Exiting...");
    ExitCode::SUCCESS
}

fn tokenize(buf: &[u8], json: bool) -> Result<ExitCode> {
    let mut sink = StderrSink::default();
    let tokens = Scanner::new(buf).scan_tokens(&mut sink);

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }

    if sink.reported > 0 {
        debug!("Tokenization failed, exiting with code {}", EXIT_STATIC);
        return Ok(ExitCode::from(EXIT_STATIC));
    }

    info!("Tokenization completed successfully");
    Ok(ExitCode::SUCCESS)
}

fn parse(buf: &[u8], json: bool) -> Result<ExitCode> {
    let mut sink = StderrSink::default();
    let tokens = Scanner::new(buf).scan_tokens(&mut sink);
    let statements = Parser::new(tokens).parse(&mut sink);

    if sink.reported > 0 {
        return Ok(ExitCode::from(EXIT_STATIC));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&statements)?);
    } else {
        println!("{}", AstPrinter.print_program(&statements));
    }

    info!("Parse subcommand completed");
    Ok(ExitCode::SUCCESS)
}

fn evaluate(buf: &[u8]) -> Result<ExitCode> {
    let mut sink = StderrSink::default();
    let tokens = Scanner::new(buf).scan_tokens(&mut sink);
    let expr = Parser::new(tokens).parse_expression(&mut sink);

    let expr = match expr {
        Some(expr) if sink.reported == 0 => expr,
        _ => return Ok(ExitCode::from(EXIT_STATIC)),
    };

    let mut interpreter = Interpreter::new();

    match interpreter.evaluate(&expr) {
        Ok(value) => {
            debug!("Evaluated to: {}", value);
            println!("{}", value);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            sink.report(e);
            Ok(ExitCode::from(EXIT_RUNTIME))
        }
    }
}

fn run(buf: &[u8]) -> Result<ExitCode> {
    let mut sink = StderrSink::default();
    let mut interpreter = Interpreter::new();

    let code = match rox::run(&mut interpreter, buf, &mut sink) {
        Status::Completed => {
            info!("Program executed successfully");
            ExitCode::SUCCESS
        }
        Status::StaticError => ExitCode::from(EXIT_STATIC),
        Status::RuntimeError => ExitCode::from(EXIT_RUNTIME),
    };

    Ok(code)
}

/// Line‑at‑a‑time prompt over one interpreter; errors never end the session.
fn repl() -> Result<ExitCode> {
    let mut interpreter = Interpreter::new();
    let mut sink = StderrSink::default();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        let status = rox::run(&mut interpreter, line.as_bytes(), &mut sink);
        debug!("REPL line finished with {:?}", status);
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        Builder::new().filter_level(log::LevelFilter::Off).init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => match filename {
            Some(filename) => tokenize(&read_file(filename)?, json),
            None => Ok(missing_file("Tokenize")),
        },

        Commands::Parse { filename, json } => match filename {
            Some(filename) => parse(&read_file(filename)?, json),
            None => Ok(missing_file("Parse")),
        },

        Commands::Evaluate { filename } => match filename {
            Some(filename) => evaluate(&read_file(filename)?),
            None => Ok(missing_file("Evaluate")),
        },

        Commands::Run { filename } => match filename {
            Some(filename) => run(&read_file(filename)?),
            None => Ok(missing_file("Run")),
        },

        Commands::Repl => repl(),
    }
}
