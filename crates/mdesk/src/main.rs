use std::io::IsTerminal as _;
use std::process::ExitCode;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use mdesk_errors::Renderer;
use mdesk_inputs::SourceFile;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Checks and inspects metadata documents")]
struct Options {
    /// When to color diagnostics.
    #[arg(long, value_enum, default_value_t = Color::Auto, global = true)]
    color: Color,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parses every file and reports its diagnostics.
    Check {
        #[arg(required = true)]
        paths: Vec<Utf8PathBuf>,
    },
    /// Prints the syntax tree of a file.
    Dump { path: Utf8PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum Color {
    Auto,
    Always,
    Never,
}

impl Color {
    fn renderer(self) -> Renderer {
        let styled = match self {
            Self::Auto => std::io::stderr().is_terminal(),
            Self::Always => true,
            Self::Never => false,
        };
        if styled { Renderer::styled() } else { Renderer::plain() }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let options = Options::parse();
    let renderer = options.color.renderer();

    match options.command {
        Command::Check { paths } => {
            let mut failed = false;
            for path in paths {
                let parse = mdesk_parse::parse_whole_file(path);
                let file = parse.tree().file();
                for diagnostic in parse.diagnostics() {
                    eprintln!("{}", diagnostic.render(&renderer, file));
                }
                failed |= parse.diagnostics().has_errors();
            }

            Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
        }
        Command::Dump { path } => {
            let file =
                SourceFile::read(path.clone()).with_context(|| format!("failed to read `{path}`"))?;
            let parse = mdesk_parse::parse_whole_string(path, file.bytes());
            tracing::debug!(diagnostics = parse.diagnostics().len(), "dumping tree");

            print!("{}", parse.tree().debug_dump());
            for diagnostic in parse.diagnostics() {
                eprintln!("{}", diagnostic.render(&renderer, parse.tree().file()));
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
