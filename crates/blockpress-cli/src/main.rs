use blockpress_renderer::{
    DirectoryUploader, ImageReference, process_markdown_file, render_blocks,
    resolve_and_render_file,
};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod config;

use config::{MediaConfig, default_config_path, load_config};

#[derive(Parser)]
#[command(version, about = "Blockpress - publish markdown posts as block editor HTML", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the block document for a post without uploading anything
    Render {
        /// Markdown file to render
        file: PathBuf,
    },
    /// Upload local images and print the post as JSON
    Publish {
        /// Markdown file to publish
        file: PathBuf,

        /// Directory uploaded images are copied into
        #[arg(long, env = "BLOCKPRESS_MEDIA_DIR")]
        media_dir: Option<PathBuf>,

        /// Public URL the media directory is served from
        #[arg(long, env = "BLOCKPRESS_MEDIA_URL")]
        media_url: Option<String>,

        /// Path to config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the title and local image references as JSON
    Extract {
        /// Markdown file to inspect
        file: PathBuf,
    },
}

#[derive(Serialize)]
struct Extraction<'a> {
    title: Option<&'a str>,
    images: &'a [ImageReference],
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette()?;
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render { file } => render_post(file).await?,
        Commands::Publish {
            file,
            media_dir,
            media_url,
            config,
        } => {
            let flags = MediaConfig {
                media_dir,
                media_url,
            };
            publish_post(file, flags, config).await?;
        }
        Commands::Extract { file } => extract_post(file).await?,
    }

    Ok(())
}

async fn render_post(file: PathBuf) -> Result<()> {
    if !file.exists() {
        return Err(miette::miette!("Post not found: {}", file.display()));
    }
    let markdown = tokio::fs::read_to_string(&file).await.into_diagnostic()?;
    print!("{}", render_blocks(&markdown));
    Ok(())
}

async fn publish_post(
    file: PathBuf,
    flags: MediaConfig,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let file_config = match config_path.or_else(default_config_path) {
        Some(path) => load_config(&path)?,
        None => MediaConfig::default(),
    };
    let media = file_config.merge(flags);

    let media_dir = media.media_dir.ok_or_else(|| {
        miette::miette!("No media directory. Pass --media-dir or set media-dir in the config file")
    })?;
    let media_url = media.media_url.ok_or_else(|| {
        miette::miette!("No media URL. Pass --media-url or set media-url in the config file")
    })?;

    tracing::info!("Publishing {} with media in {}", file.display(), media_dir.display());
    let uploader = DirectoryUploader::new(media_dir, media_url);
    let start = std::time::Instant::now();
    let post = resolve_and_render_file(&file, &uploader).await?;
    tracing::info!(
        "Rendered in {:.2}s, {} image(s) uploaded",
        start.elapsed().as_secs_f64(),
        post.uploaded_count
    );

    println!("{}", serde_json::to_string_pretty(&post).into_diagnostic()?);
    Ok(())
}

async fn extract_post(file: PathBuf) -> Result<()> {
    let processed = process_markdown_file(&file).await?;
    let extraction = Extraction {
        title: processed.title.as_deref(),
        images: &processed.local_images,
    };
    println!("{}", serde_json::to_string_pretty(&extraction).into_diagnostic()?);
    Ok(())
}

/// Logs go to stderr so stdout stays machine readable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Report errors with their cause chain. Colors and hyperlinks only when
/// stderr is a terminal, so redirected output stays plain.
fn init_miette() -> Result<()> {
    let styled = std::io::stderr().is_terminal();
    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .with_cause_chain()
                .terminal_links(styled)
                .color(styled)
                .context_lines(2)
                .build(),
        )
    }))
    .map_err(|err| miette::miette!("Failed to install the error reporter: {err}"))?;
    miette::set_panic_hook();
    Ok(())
}
