//! Command-line and environment configuration for the `qlisp` binary.

use std::path::PathBuf;

/// Environment variable naming a prelude file to load instead of the bundled one
pub const PRELUDE_VAR: &str = "QLISP_PRELUDE";
/// Environment variable naming the directory `import` resolves modules against
pub const MODULE_PATH_VAR: &str = "QLISP_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Repl,
    RunFile(PathBuf),
    Help,
}

/// Which standard library to load before any user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prelude {
    /// The `lib/std.lisp` compiled into the binary
    Bundled,
    /// A file on disk; a missing file is skipped
    File(PathBuf),
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplConfig {
    pub mode: Mode,
    pub prelude: Prelude,
    pub module_root: PathBuf,
}

impl ReplConfig {
    /// Build the configuration from the process arguments and environment
    pub fn from_env() -> Result<Self, String> {
        Self::parse(std::env::args().skip(1), |name| std::env::var(name).ok())
    }

    /// Build the configuration from `args` (without the program name) and an
    /// environment lookup. Flags take precedence over environment variables.
    pub fn parse(
        args: impl IntoIterator<Item = String>,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        let mut mode = Mode::Repl;
        let mut prelude = match var(PRELUDE_VAR) {
            Some(path) if !path.is_empty() => Prelude::File(PathBuf::from(path)),
            _ => Prelude::Bundled,
        };
        let module_root = var(MODULE_PATH_VAR)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Self::help(prelude, module_root)),
                "--no-prelude" => prelude = Prelude::None,
                "--prelude" => {
                    let path = args
                        .next()
                        .ok_or_else(|| "--prelude requires a path".to_string())?;
                    prelude = Prelude::File(PathBuf::from(path));
                }
                flag if flag.starts_with("--") => return Err(format!("Unknown option '{flag}'")),
                file => {
                    if mode != Mode::Repl {
                        return Err("Too many arguments".to_string());
                    }
                    mode = Mode::RunFile(PathBuf::from(file));
                }
            }
        }

        Ok(ReplConfig {
            mode,
            prelude,
            module_root,
        })
    }

    fn help(prelude: Prelude, module_root: PathBuf) -> Self {
        ReplConfig {
            mode: Mode::Help,
            prelude,
            module_root,
        }
    }
}

/// Where REPL history is kept between sessions
pub fn history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("qlisp").join("history"))
}
