use clap::{Parser as ClapParser, Subcommand};
use jsontemplate::cli::{self, CliError, RenderOptions, RenderResult};
use jsontemplate::{to_json, to_json_pretty};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "jsontemplate")]
#[command(about = "jsontemplate - Transform JSON documents with JSON-shaped templates")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template against JSON input
    Render {
        /// Template source, or @FILE to read it from a file
        template: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Fail when a query references a missing key
        #[arg(long)]
        strict: bool,
    },

    /// Compile a template without rendering it
    Check {
        /// Template source, or @FILE to read it from a file
        template: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            template,
            input,
            pretty,
            strict,
        } => run_render(template, input, pretty, strict),
        Commands::Check { template } => run_check(template),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn template_source(arg: String) -> Result<String, CliError> {
    match arg.strip_prefix('@') {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Ok(arg),
    }
}

fn run_check(template: String) -> Result<(), CliError> {
    let options = RenderOptions {
        template: template_source(template)?,
        syntax_only: true,
        ..Default::default()
    };
    cli::execute_render(&options)?;
    println!("Template is valid");
    Ok(())
}

fn run_render(
    template: String,
    input: Option<String>,
    pretty: bool,
    strict: bool,
) -> Result<(), CliError> {
    let mut options = RenderOptions {
        template: template_source(template)?,
        input,
        pretty,
        strict,
        syntax_only: false,
    };

    // Compact output from stdin is streamed document by document.
    if options.input.is_none() && !pretty && !atty::is(atty::Stream::Stdin) {
        let compiled = options.compile()?;
        cli::stream_render(&compiled, io::stdin().lock(), io::stdout().lock())?;
        return Ok(());
    }

    if options.input.is_none() && !atty::is(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        options.input = Some(buffer);
    }

    if let RenderResult::Success(outputs) = cli::execute_render(&options)? {
        for output in outputs {
            if pretty {
                println!("{}", to_json_pretty(&output));
            } else {
                println!("{}", to_json(&output));
            }
        }
    }
    Ok(())
}
