//! Kuji CLI
//!
//! Usage:
//!   kuji                                    # Interactive mode (stdin, one tick per line)
//!   kuji --replay signs.jsonl               # Replay a recorded detection log
//!   kuji --serve                            # HTTP API server
//!   kuji --list                             # Show the jutsu catalogue
//!   kuji --replay signs.jsonl --json        # JSON output

use std::io::{self, BufRead, BufReader, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use colored::Colorize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kuji::core::{
    parse_replay, run_replay, run_server, AcceptReport, Catalogue, DetectionParser, LineCommand,
    Recognizer,
};
use kuji::types::{ReasonCode, TickOutput};
use kuji::{Error, MatchPolicy, RecognizerConfig, VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "kuji",
    version = VERSION,
    about = "Kuji - recognize hand-sign sequences and name the jutsu",
    long_about = "Kuji consumes classified hand signs (id + confidence per detection),\n\
                  keeps a deduplicated trail of recent signs and names the jutsu\n\
                  once the trail equals a catalogue sequence.\n\n\
                  Modes:\n  \
                  --interactive  Type detections, one tick per line (default)\n  \
                  --replay FILE  Replay a JSON-lines detection log\n  \
                  --serve        HTTP API server mode\n\n\
                  Interactive line format:\n  \
                  5:0.91 ram:0.8   sign id or label, optional confidence\n  \
                  c                clear the sign history\n  \
                  quit             exit\n\n\
                  Display:\n  \
                  SHOWING_TRAIL - signs currently being performed\n  \
                  SHOWING_MATCH - recognized jutsu name"
)]
struct Args {
    /// Interactive mode - read detection lines from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Replay a JSON-lines detection log ("-" for stdin)
    #[arg(short, long, value_name = "FILE")]
    replay: Option<String>,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Print the catalogue and exit
    #[arg(short, long)]
    list: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// JSON catalogue (default: built-in)
    #[arg(long, value_name = "FILE")]
    catalogue: Option<String>,

    /// TOML recognizer config
    #[arg(long, value_name = "FILE")]
    config: Option<String>,

    /// Minimum detection confidence
    #[arg(long)]
    score_threshold: Option<f64>,

    /// Seconds without a new sign before the history is cleared
    #[arg(long)]
    inactivity_timeout: Option<f64>,

    /// Seconds a recognized jutsu stays on screen
    #[arg(long)]
    display_time: Option<f64>,

    /// Catalogue language index (0 = native, 1 = English in the built-in catalogue)
    #[arg(long)]
    language: Option<usize>,

    /// Label language for the sign trail (default: 0, native labels)
    #[arg(long)]
    trail_language: Option<usize>,

    /// Matching policy: full_window or suffix
    #[arg(long)]
    match_policy: Option<MatchPolicy>,

    /// Separator between trail labels
    #[arg(long)]
    trail_separator: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Show per-detection outcomes
    #[arg(long)]
    verbose: bool,
}

impl Args {
    /// File config (or defaults) with CLI overrides applied
    fn recognizer_config(&self) -> Result<RecognizerConfig, Error> {
        let mut config = match &self.config {
            Some(path) => RecognizerConfig::load(path)?,
            None => RecognizerConfig::default(),
        };
        if let Some(v) = self.score_threshold {
            config.score_threshold = v;
        }
        if let Some(v) = self.inactivity_timeout {
            config.inactivity_timeout = v;
        }
        if let Some(v) = self.display_time {
            config.match_display_duration = v;
        }
        if let Some(v) = self.language {
            config.language = v;
        }
        if let Some(v) = self.trail_language {
            config.trail_language = v;
        }
        if let Some(v) = self.match_policy {
            config.match_policy = v;
        }
        if let Some(v) = &self.trail_separator {
            config.trail_separator = v.clone();
        }
        Ok(config)
    }

    fn build_recognizer(&self) -> Result<Recognizer, Error> {
        let catalogue = match &self.catalogue {
            Some(path) => Catalogue::load(path)?,
            None => Catalogue::builtin()?,
        };
        let recognizer = Recognizer::new(Arc::new(catalogue), self.recognizer_config()?)?;
        info!(
            sequences = recognizer.catalogue().sequences().len(),
            digest = %recognizer.catalogue().digest(),
            "catalogue loaded"
        );
        Ok(recognizer)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging();

    if args.no_color {
        colored::control::set_override(false);
    }

    let result = if args.list {
        run_list(&args)
    } else if args.serve {
        run_serve(&args).await
    } else if let Some(ref path) = args.replay {
        if args.interactive {
            warn!("--interactive ignored in replay mode");
        }
        run_replay_file(path, &args)
    } else {
        // interactive is also the default mode
        run_interactive(&args)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} [{}] {}", "error:".red().bold(), e.code(), e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays parseable
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kuji=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Print the catalogue
fn run_list(args: &Args) -> Result<(), Error> {
    let recognizer = args.build_recognizer()?;
    let catalogue = recognizer.catalogue();
    let config = recognizer.config();

    println!("{}", format!("Kuji catalogue {}", &catalogue.digest()[..12]).bold());
    for (index, entry) in catalogue.sequences().iter().enumerate() {
        println!(
            "  {:>3}  {}  {}",
            index,
            entry
                .display_name(config.language, &config.category_separator)
                .bright_yellow(),
            catalogue
                .render(entry.symbols.iter().copied(), config.trail_language, " ")
                .dimmed()
        );
    }
    Ok(())
}

/// Run the HTTP API
async fn run_serve(args: &Args) -> Result<(), Error> {
    let recognizer = args.build_recognizer()?;
    run_server(&args.addr, recognizer).await
}

/// Replay a recorded detection log
fn run_replay_file(path: &str, args: &Args) -> Result<(), Error> {
    let mut recognizer = args.build_recognizer()?;

    let events = if path == "-" {
        parse_replay(io::stdin().lock())?
    } else {
        let file = std::fs::File::open(path)?;
        parse_replay(BufReader::new(file))?
    };
    info!(events = events.len(), path, "replaying");

    for output in run_replay(&mut recognizer, &events) {
        print_output(&output, args);
    }
    Ok(())
}

/// Interactive mode: one tick per stdin line, wall-clock time
fn run_interactive(args: &Args) -> Result<(), Error> {
    let mut recognizer = args.build_recognizer()?;
    let catalogue = Arc::clone(recognizer.catalogue());
    let parser = DetectionParser::new(&catalogue);
    let started = Instant::now();

    if !args.json {
        print_header(&recognizer);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if !args.json {
            print!("{} ", "印>".cyan());
            stdout.flush()?;
        }

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let now = started.elapsed().as_secs_f64();

        match parser.parse_line(&line) {
            Ok(LineCommand::Quit) => {
                if !args.json {
                    println!("\nSession ended. Ticks: {}", recognizer.tick_count());
                }
                break;
            }
            Ok(LineCommand::Reset) => {
                recognizer.reset();
                let mut output = recognizer.current_output(now);
                output.reason = ReasonCode::R002_HISTORY_RESET;
                print_output(&output, args);
            }
            Ok(LineCommand::Tick(detections)) => {
                let (output, report) = recognizer.tick_with_report(&detections, now);
                log_rejects(&report);
                if args.verbose && !args.json {
                    print_outcomes(&report);
                }
                print_output(&output, args);
            }
            Err(e) => {
                warn!(error = %e, "ignoring line");
            }
        }
    }
    Ok(())
}

fn log_rejects(report: &AcceptReport) {
    for detection in report.unknown() {
        warn!(
            symbol = detection.symbol,
            confidence = detection.confidence,
            "unknown sign id rejected"
        );
    }
}

fn print_header(recognizer: &Recognizer) {
    let config = recognizer.config();
    println!("{}", format!("Kuji v{} - hand-sign sequence recognizer", VERSION).bold());
    println!(
        "threshold={:.2} | timeout={:.1}s | display={:.1}s | jutsu={}",
        config.score_threshold,
        config.inactivity_timeout,
        config.match_display_duration,
        recognizer.catalogue().sequences().len()
    );
    println!("Enter detections as `id:confidence` or `label:confidence`. 'c' clears, 'quit' exits.");
    println!();
}

fn print_outcomes(report: &AcceptReport) {
    for (detection, reason) in &report.outcomes {
        let line = format!(
            "    {}:{:.2} → {}",
            detection.symbol,
            detection.confidence,
            reason.code()
        );
        if reason.is_rejection() {
            println!("{}", line.dimmed());
        } else {
            println!("{}", line.green());
        }
    }
}

fn print_output(output: &TickOutput, args: &Args) {
    if args.json {
        match serde_json::to_string(output) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!(error = %e, "failed to serialize output"),
        }
    } else if args.no_color {
        println!("{}", output.to_parseable_string());
    } else {
        println!("{}", output.to_terminal_string());
    }
}
