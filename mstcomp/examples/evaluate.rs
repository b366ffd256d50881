use std::{io::Write, path::PathBuf};

use clap::Parser;
use mstcomp::prelude::*;
use mstir::prelude::*;
use termcolor::{ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Compile a real-valued expression and evaluate it once
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Expression to evaluate, e.g. "2 * pi * r"
    pub expression: String,

    /// Binding of the form `name=value` (repeatable)
    #[arg(short, long = "arg")]
    pub args: Vec<String>,

    /// Backend overriding the configuration file
    #[arg(short, long)]
    pub backend: Option<BackendKind>,

    /// Disable constant folding
    #[arg(long, default_value_t = false)]
    pub no_fold: bool,

    /// Configuration file (defaults to the user configuration)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

fn binding(arg: &str) -> Result<(Symbol, f64), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected `name=value`, got `{arg}`"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for `{name}`: {e}"))?;
    Ok((Symbol::new(name.trim()), value))
}

fn run(args: Args) -> Result<f64, String> {
    let path = args.config.unwrap_or_else(PipelineConfig::default_path);
    let mut config = PipelineConfig::load_or_default(&path).map_err(|e| e.to_string())?;
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if args.no_fold {
        config.fold_constants = false;
    }

    let bindings = args
        .args
        .iter()
        .map(|arg| binding(arg))
        .collect::<Result<Bindings<f64>, _>>()?;

    let expr = Toolchain::new(config)
        .build_real(&args.expression)
        .map_err(|e| e.to_string())?;
    expr.invoke(&bindings).map_err(|e| e.to_string())
}

fn main() {
    let args = Args::parse();

    let mut error_color = ColorSpec::new();
    error_color.set_fg(Some(termcolor::Color::Red));
    error_color.set_intense(true);

    let mut ok_color = ColorSpec::new();
    ok_color.set_fg(Some(termcolor::Color::Green));
    ok_color.set_intense(true);

    let stdout = StandardStream::stdout(ColorChoice::Auto);
    let mut stdout = stdout.lock();

    let code = match run(args) {
        Ok(value) => {
            stdout.set_color(&ok_color).unwrap();
            write!(stdout, "=").unwrap();
            stdout.reset().unwrap();
            writeln!(stdout, " {value}").unwrap();
            0
        }
        Err(e) => {
            stdout.set_color(&error_color).unwrap();
            write!(stdout, "error:").unwrap();
            stdout.reset().unwrap();
            writeln!(stdout, " {e}").unwrap();
            1
        }
    };
    stdout.flush().unwrap();
    std::process::exit(code);
}
