//! html2nodes - Convert HTML into a JSON node forest

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use html2nodes::{ParseOptions, Result, parse_html_bytes};

#[derive(Parser)]
#[command(name = "html2nodes")]
#[command(version, about = "Convert HTML into a keyed tree of render nodes", long_about = None)]
#[command(after_help = "EXAMPLES:
    html2nodes page.html                    Print the node forest as JSON
    html2nodes page.html -s .article -p     Only the first .article, pretty-printed
    curl -s https://example.com | html2nodes --base-url https://example.com/")]
struct Cli {
    /// Input HTML file, or `-` for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    input: String,

    /// Only convert the first element matching this CSS selector
    #[arg(short, long)]
    selector: Option<String>,

    /// Treat images as block-level elements
    #[arg(long)]
    image_as_block: bool,

    /// Resolve relative links and sources against this URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Fail on any markup error instead of recovering
    #[arg(long)]
    strict: bool,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pretty: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let bytes = if cli.input == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(&cli.input)?
    };

    let mut options = ParseOptions::new()
        .with_image_as_block(cli.image_as_block)
        .with_strict(cli.strict);
    if let Some(selector) = &cli.selector {
        options = options.with_selector(selector.as_str());
    }
    if let Some(base) = &cli.base_url {
        options = options.with_base_url(base)?;
    }

    let tree = parse_html_bytes(&bytes, &options)?;
    let json = if cli.pretty {
        serde_json::to_string_pretty(&tree)
    } else {
        serde_json::to_string(&tree)
    }
    .map_err(io::Error::from)?;
    println!("{json}");
    Ok(())
}
