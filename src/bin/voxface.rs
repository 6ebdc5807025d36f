use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "voxface", version, about = "Audio-driven talking avatar renderer")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single avatar frame as a PNG.
    Frame(FrameArgs),
    /// Render an avatar video with the source audio muxed in (requires
    /// `ffmpeg` on PATH; degrades to a silent video without it).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input audio file (.wav, .mp3, .flac).
    #[arg(long)]
    audio: PathBuf,

    /// Output PNG path.
    #[arg(long, default_value = "output.png")]
    out: PathBuf,

    /// Pipeline configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input audio file (.wav, .mp3, .flac).
    #[arg(long)]
    audio: PathBuf,

    /// Output video path.
    #[arg(long, default_value = "output.mp4")]
    out: PathBuf,

    /// Frames per second (overrides the config when given).
    #[arg(long)]
    fps: Option<u32>,

    /// Pipeline configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<voxface::PipelineConfig> {
    match path {
        Some(p) => Ok(voxface::PipelineConfig::load(p)?),
        None => Ok(voxface::PipelineConfig::default()),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let _cfg = load_config(args.config.as_ref())?;

    let ctx = voxface::ModelContext::with_reference_stages();
    let frame = voxface::render_frame(&ctx, &args.audio)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

/// An explicit --fps always wins, even when it equals the config value.
fn effective_fps(flag: Option<u32>, cfg_fps: u32) -> u32 {
    flag.unwrap_or(cfg_fps)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_ref())?;
    let fps = effective_fps(args.fps, cfg.fps);

    let ctx = voxface::ModelContext::with_reference_stages();
    let opts = voxface::RenderOpts { fps };
    let summary = voxface::render_to_video(&ctx, &args.audio, &args.out, &opts)?;

    if summary.audio_muxed {
        eprintln!(
            "wrote {} ({} frames, {})",
            summary.out_path.display(),
            summary.frames,
            summary.codec.label()
        );
    } else {
        // Degraded run: still a success, but say why the audio is missing.
        eprintln!(
            "warning: output has no audio track ({})",
            summary
                .degradation
                .as_deref()
                .unwrap_or("mux tool unavailable")
        );
        eprintln!(
            "wrote silent video {} ({} frames, {})",
            summary.out_path.display(),
            summary.frames,
            summary.codec.label()
        );
    }
    Ok(())
}
