//! third-eye-cli: Command-line tool for Third Eye capture debugging
//!
//! Drives the same dispatcher as the MCP server, configured from the same
//! `THIRD_EYE_*` environment variables, without the MCP protocol overhead.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value, json};
use third_eye_core::{
    dispatch::{CAPTURE, CAPTURE_REGION, LIST_DISPLAYS, ToolDispatcher, ToolResponse},
    model::CaptureOutput,
    util::encode::decode_base64,
};
use third_eye_mcp_server::config::ServerConfig;

#[derive(Parser)]
#[command(name = "third-eye-cli")]
#[command(version, about = "CLI tool for Third Eye capture debugging and testing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Maximum output width in pixels (100-4096)
    #[arg(long, default_value_t = 1920)]
    max_width: i64,
    /// Seconds to wait before capturing (0-10)
    #[arg(long, default_value_t = 0.0)]
    delay: f64,
    /// Skip the delay
    #[arg(long)]
    instant: bool,
    /// Output PNG file path
    #[arg(short, long)]
    out: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List all displays
    ListDisplays,
    /// Capture a full display
    Capture {
        /// Display index (0-based)
        #[arg(long, default_value_t = 0)]
        display_index: i64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Capture a rectangle in desktop coordinates
    CaptureRegion {
        #[arg(long)]
        x:      i64,
        #[arg(long)]
        y:      i64,
        #[arg(long)]
        width:  i64,
        #[arg(long)]
        height: i64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Call any tool by name with raw JSON arguments
    Call {
        /// Tool name, e.g. screen.capture
        tool: String,
        /// JSON object of arguments
        #[arg(long)]
        args: Option<String>,
        /// Write the image (if any) to this file
        #[arg(short, long)]
        out:  Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("third_eye_cli=info".parse()?)
                .add_directive("third_eye_core=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ServerConfig::from_env().context("Invalid configuration")?;
    let dispatcher = config
        .build_dispatcher()
        .context("Failed to initialize capture backend")?;
    tracing::info!("Using {} backend", config.backend);

    match cli.command {
        Commands::ListDisplays => list_displays(&dispatcher).await?,
        Commands::Capture {
            display_index,
            output,
        } => {
            let args = json!({
                "displayIndex": display_index,
                "maxWidth": output.max_width,
                "delay": output.delay,
                "instant": output.instant,
            });
            run(&dispatcher, CAPTURE, args, Some(output.out)).await?;
        }
        Commands::CaptureRegion {
            x,
            y,
            width,
            height,
            output,
        } => {
            let args = json!({
                "x": x,
                "y": y,
                "width": width,
                "height": height,
                "maxWidth": output.max_width,
                "delay": output.delay,
                "instant": output.instant,
            });
            run(&dispatcher, CAPTURE_REGION, args, Some(output.out)).await?;
        }
        Commands::Call { tool, args, out } => {
            let args = match args {
                Some(raw) => serde_json::from_str(&raw).context("--args must be a JSON object")?,
                None => Value::Object(Map::new()),
            };
            run(&dispatcher, &tool, args, out).await?;
        }
    }

    Ok(())
}

async fn list_displays(dispatcher: &ToolDispatcher) -> Result<()> {
    let displays = match dispatcher.dispatch(LIST_DISPLAYS, None).await {
        ToolResponse::Displays(displays) => displays,
        other => return report(other),
    };

    println!("Found {} display(s):\n", displays.len());
    for display in displays {
        println!(
            "  [{}] {}{}",
            display.index,
            display.name,
            if display.is_primary { " (primary)" } else { "" }
        );
        println!("      {}x{} at ({}, {})", display.width, display.height, display.x, display.y);
    }

    Ok(())
}

async fn run(
    dispatcher: &ToolDispatcher,
    tool: &str,
    args: Value,
    out: Option<PathBuf>,
) -> Result<()> {
    let Value::Object(arguments) = args else {
        anyhow::bail!("Tool arguments must be a JSON object");
    };

    match dispatcher.dispatch(tool, Some(arguments)).await {
        ToolResponse::Image(output) => save_capture(&output, out),
        other => report(other),
    }
}

fn save_capture(output: &CaptureOutput, out: Option<PathBuf>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&output.metadata)?);

    if let Some(path) = out {
        let bytes = decode_base64(&output.image_base64)?;
        fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("✓ Screenshot saved to {}", path.display());
    }

    Ok(())
}

fn report(response: ToolResponse) -> Result<()> {
    match response {
        ToolResponse::Displays(displays) => {
            println!("{}", serde_json::to_string_pretty(&displays)?);
            Ok(())
        }
        ToolResponse::Image(output) => save_capture(&output, None),
        ToolResponse::Error {
            message,
            empty_state: true,
        } => {
            println!("{}", message);
            Ok(())
        }
        ToolResponse::Error { message, .. } => anyhow::bail!(message),
    }
}
