mod config;

use std::fs;
use std::io;
use std::path::Path;
use std::process;
use std::rc::Rc;
use std::sync::Once;

use qlisp::{Environment, Error, FileModules, Value, evaluate, register_builtins};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, warn};

use config::{MODULE_PATH_VAR, Mode, PRELUDE_VAR, Prelude, ReplConfig, history_path};

/// The standard prelude shipped with the binary
const BUNDLED_PRELUDE: &str = include_str!("../lib/std.lisp");

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber, but only when `RUST_LOG` asks for one
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr).with_target(true))
                .with(filter)
                .init();
        }
    });
}

/// A root environment with builtins, module loading and the prelude in place
fn new_environment(config: &ReplConfig) -> Result<Environment, String> {
    let env = Environment::with_modules(Rc::new(FileModules::new(&config.module_root)));
    register_builtins(&env);
    load_prelude(&env, &config.prelude)?;
    Ok(env)
}

fn load_prelude(env: &Environment, prelude: &Prelude) -> Result<(), String> {
    let source = match prelude {
        Prelude::None => return Ok(()),
        Prelude::Bundled => BUNDLED_PRELUDE.to_string(),
        Prelude::File(path) => match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "prelude not found, skipping");
                return Ok(());
            }
            Err(e) => {
                return Err(format!(
                    "Failed to read prelude '{}': {e}",
                    path.display()
                ));
            }
        },
    };

    evaluate(env, &source, true)
        .map(|_| ())
        .map_err(|e| format!("Failed to load prelude: {}", describe(e)))
}

/// Render an evaluation failure the way the REPL reports it
fn describe(error: Error) -> String {
    match error {
        Error::Runtime(e) => Value::Error(e).to_string(),
        other => format!("Parse error: {other}"),
    }
}

fn repl(config: &ReplConfig) -> Result<(), String> {
    let env = new_environment(config)?;
    let mut editor = DefaultEditor::new().map_err(|e| format!("Failed to start editor: {e}"))?;

    let history = history_path();
    if let Some(path) = &history {
        // No history yet on first run
        if editor.load_history(path).is_err() {
            debug!(path = %path.display(), "no history loaded");
        }
    }

    println!("qlisp REPL");
    println!("Type expressions to evaluate; exit, Ctrl-C or Ctrl-D to quit");
    println!();

    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(format!("Failed to read input: {e}")),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(input);

        if input == "(exit)" || input == "exit" {
            break;
        }

        match evaluate(&env, input, false) {
            Ok(result) => println!("{result}"),
            Err(e) => eprintln!("{}", describe(e)),
        }
    }

    if let Some(path) = &history {
        if let Some(dir) = path.parent() {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!(path = %dir.display(), error = %e, "failed to create history directory");
            }
        }
        if let Err(e) = editor.save_history(path) {
            warn!(path = %path.display(), error = %e, "failed to save history");
        }
    }

    Ok(())
}

fn run_file(config: &ReplConfig, path: &Path) -> Result<(), String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read file '{}': {e}", path.display()))?;

    let env = new_environment(config)?;
    evaluate(&env, &contents, true)
        .map(|_| ())
        .map_err(describe)
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  qlisp [options]              Start interactive REPL");
    eprintln!("  qlisp [options] <file.lisp>  Run a qlisp file");
    eprintln!("  qlisp --help                 Show this help message");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --prelude <path>  Load <path> instead of the bundled prelude");
    eprintln!("  --no-prelude      Start without a prelude");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  {PRELUDE_VAR}     Prelude file, overridden by the options above");
    eprintln!("  {MODULE_PATH_VAR}        Directory `import` loads modules from (default: .)");
    eprintln!("  RUST_LOG          Enable diagnostic logging, e.g. RUST_LOG=qlisp=debug");
}

fn main() {
    init_tracing();

    let config = match ReplConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            print_usage();
            process::exit(1);
        }
    };

    let result = match &config.mode {
        Mode::Help => {
            print_usage();
            Ok(())
        }
        Mode::Repl => repl(&config),
        Mode::RunFile(path) => run_file(&config, path),
    };

    if let Err(e) = result {
        eprintln!("{e}");
        process::exit(1);
    }
}
