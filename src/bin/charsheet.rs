use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "charsheet", version)]
struct Cli {
    /// JSON config file (defaults apply when omitted).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory that sheet paths resolve against (overrides config and environment).
    #[arg(long, global = true)]
    asset_root: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite the selection into a single PNG sheet.
    Render(RenderArgs),
    /// Write a zip archive in one of the export layouts.
    Export(ExportArgs),
    /// Print the selection as `character.json`.
    Json(CharacterArgs),
    /// Print the credits of every drawn layer.
    Credits(CreditsArgs),
}

#[derive(Args, Debug)]
struct CharacterArgs {
    /// Catalog JSON describing items, layers and custom animations.
    #[arg(long)]
    catalog: PathBuf,

    /// A `character.json` document describing the selection.
    #[arg(long)]
    selection: PathBuf,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    character: CharacterArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Make the pink mask colour transparent before writing.
    #[arg(long)]
    remove_mask: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    character: CharacterArgs,

    #[arg(long, value_enum, default_value_t = ModeChoice::Full)]
    mode: ModeChoice,

    /// Selection group to include in a `categories` export (repeatable).
    #[arg(long = "group")]
    groups: Vec<String>,

    /// Directory the archive is written into.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct CreditsArgs {
    #[command(flatten)]
    character: CharacterArgs,

    #[arg(long, value_enum, default_value_t = CreditsFormat::Txt)]
    format: CreditsFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Full,
    Animations,
    Items,
    ItemAnimations,
    Categories,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CreditsFormat {
    Txt,
    Csv,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.asset_root)?;
    match cli.cmd {
        Command::Render(args) => cmd_render(config, args).await,
        Command::Export(args) => cmd_export(config, args).await,
        Command::Json(args) => cmd_json(config, args),
        Command::Credits(args) => cmd_credits(config, args),
    }
}

fn load_config(
    path: Option<&Path>,
    asset_root: Option<PathBuf>,
) -> anyhow::Result<charsheet::CompositorConfig> {
    let config = match path {
        Some(p) => charsheet::CompositorConfig::from_json_file(p)?,
        None => charsheet::CompositorConfig::default(),
    };
    let mut config = config.with_env_overrides()?;
    if let Some(root) = asset_root {
        config.asset_root = root;
    }
    Ok(config)
}

fn open_session(
    config: charsheet::CompositorConfig,
    args: &CharacterArgs,
) -> anyhow::Result<charsheet::Session> {
    let catalog = charsheet::Catalog::from_json_file(&args.catalog)?;
    let json = std::fs::read_to_string(&args.selection)
        .with_context(|| format!("read selection '{}'", args.selection.display()))?;

    let mut session = charsheet::Session::from_asset_root(config, catalog)?;
    session
        .import_character(&json)
        .with_context(|| format!("parse selection '{}'", args.selection.display()))?;
    tracing::info!(
        body_type = %session.selection().body_type,
        layers = session.resolved().draw_list.len(),
        "selection loaded"
    );
    Ok(session)
}

async fn cmd_render(config: charsheet::CompositorConfig, args: RenderArgs) -> anyhow::Result<()> {
    let mut session = open_session(config, &args.character)?;
    match session.redraw().await? {
        charsheet::CompositeOutcome::Completed(stats) => {
            if stats.missing > 0 {
                tracing::warn!(missing = stats.missing, "some sheets could not be loaded");
            }
        }
        charsheet::CompositeOutcome::Skipped => anyhow::bail!("composite pass was skipped"),
    }

    let mut sheet = session.sheet().await;
    if args.remove_mask {
        let cleared = sheet.surface.remove_color(charsheet::PINK_MASK);
        tracing::debug!(cleared, "removed mask colour");
    }
    let png = sheet.surface.encode_png()?;

    if let Some(parent) = args.out.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    tokio::fs::write(&args.out, png)
        .await
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({}x{})",
        args.out.display(),
        sheet.surface.width(),
        sheet.surface.height()
    );
    Ok(())
}

async fn cmd_export(config: charsheet::CompositorConfig, args: ExportArgs) -> anyhow::Result<()> {
    let compression_level = config.compression_level;
    let mut session = open_session(config, &args.character)?;
    session.redraw().await?;

    let mode = match args.mode {
        ModeChoice::Full => charsheet::ExportMode::Full,
        ModeChoice::Animations => charsheet::ExportMode::Animations,
        ModeChoice::Items => charsheet::ExportMode::Items,
        ModeChoice::ItemAnimations => charsheet::ExportMode::ItemAnimations,
        ModeChoice::Categories => {
            if args.groups.is_empty() {
                anyhow::bail!("categories export needs at least one --group");
            }
            charsheet::ExportMode::Categories {
                groups: args.groups,
            }
        }
    };

    let mut archive = charsheet::ZipArchive::in_memory(compression_level);
    let report = session.export(&mode, &mut archive).await?;
    let bytes = archive.into_bytes()?;

    tokio::fs::create_dir_all(&args.out_dir)
        .await
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    let out = args.out_dir.join(&report.archive_name);
    tokio::fs::write(&out, bytes)
        .await
        .with_context(|| format!("write archive '{}'", out.display()))?;

    if let Some(summary) = report.failure_summary() {
        eprintln!("{summary}");
    }
    eprintln!("wrote {} ({} entries)", out.display(), report.exported.len());
    Ok(())
}

fn cmd_json(config: charsheet::CompositorConfig, args: CharacterArgs) -> anyhow::Result<()> {
    let session = open_session(config, &args)?;
    println!("{}", session.character().to_json_pretty()?);
    Ok(())
}

fn cmd_credits(config: charsheet::CompositorConfig, args: CreditsArgs) -> anyhow::Result<()> {
    let session = open_session(config, &args.character)?;
    let credits = &session.resolved().credits;
    let out = match args.format {
        CreditsFormat::Txt => charsheet::credits_to_txt(credits),
        CreditsFormat::Csv => charsheet::credits_to_csv(credits),
    };
    print!("{out}");
    Ok(())
}
