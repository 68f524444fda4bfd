//! Suggest command - run the suggestion engine on plain text.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Args;

use postlens_core::{SuggestionEngine, SuggestionStyle};

use super::{load_config, OutputFormat};

/// Arguments for the suggest command.
#[derive(Args)]
pub struct SuggestArgs {
    /// Text file to analyze (default: stdin)
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Prefix suggestions with icons
    #[arg(long)]
    decorate: bool,
}

pub async fn run(args: SuggestArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let style = if args.decorate {
        SuggestionStyle::Decorated
    } else {
        config.suggestions.style
    };

    let text = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let suggestions = SuggestionEngine::new().with_style(style).analyze(&text);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&suggestions)?),
        OutputFormat::Text => {
            for suggestion in &suggestions {
                println!("{}", suggestion);
            }
        }
    }

    Ok(())
}
