use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pt_parser::parse_python;
use pt_transform::{TransformOptions, Transformer};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "py2ts", about = "py2ts — translate Python modules to TypeScript")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, transform, and emit a TypeScript module.
    Transpile {
        /// Input .py file.
        input: PathBuf,
        /// Output file (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Import path of the runtime package.
        #[arg(long, default_value = "@py2ts/runtime")]
        runtime: String,
        /// Also write <output>.meta.json with the runtime-symbol set and
        /// hoisted imports.
        #[arg(long)]
        meta: bool,
    },
    /// Parse and transform the file, reporting errors without emitting.
    Check {
        input: PathBuf,
    },
    /// Parse the file and dump the Python AST.
    Parse {
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Transpile {
            input,
            output,
            runtime,
            meta,
        } => {
            let source = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let filename = input.display().to_string();

            let parsed = parse_python(&source, &filename)?;
            let options = TransformOptions {
                runtime_module: runtime.clone(),
                ..TransformOptions::default()
            };
            let result = Transformer::new(options).transform(&parsed.body)?;
            let text = pt_generate::emit_module(&result, &runtime);
            debug!(bytes = text.len(), "emitted module");

            match &output {
                Some(path) => std::fs::write(path, &text)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => print!("{text}"),
            }

            if meta {
                let payload = serde_json::json!({
                    "runtime_symbols": result.runtime_symbols,
                    "hoisted_imports": result.hoisted_imports,
                });
                let meta_path = match &output {
                    Some(path) => format!("{}.meta.json", path.display()),
                    None => format!("{filename}.meta.json"),
                };
                std::fs::write(&meta_path, serde_json::to_string_pretty(&payload)?)
                    .with_context(|| format!("failed to write {meta_path}"))?;
                eprintln!("Meta written to {meta_path}");
            }
        }
        Commands::Check { input } => {
            let source = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let filename = input.display().to_string();
            let parsed = parse_python(&source, &filename)?;
            Transformer::default().transform(&parsed.body)?;
            eprintln!("OK: {filename}");
        }
        Commands::Parse { input } => {
            let source = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let filename = input.display().to_string();
            let parsed = parse_python(&source, &filename)?;
            println!("{:#?}", parsed.body);
        }
    }

    Ok(())
}
