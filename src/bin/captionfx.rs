use std::path::{Path, PathBuf};

use anyhow::Context as _;
use captionfx::{
    CancelToken, CaptionFxResult, CpuRasterizer, ExportConfig, ExportObserver, ExportOutcome,
    ExportPipeline, ExportRequest, ExportState, FfmpegPlatform, FilterSelection, FontSizeTier,
    JsonFileProvider, OutputFormat, StyleConfig, resolve_segments,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "captionfx", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Burn captions and effects into a clip (requires `ffmpeg`/`ffprobe` on PATH).
    Render(RenderArgs),
    /// Render one composited frame as a PNG.
    Frame(FrameArgs),
    /// List the output formats the local ffmpeg can encode, most preferred first.
    Formats,
}

#[derive(Args, Debug)]
struct LookArgs {
    /// Source clip.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Segment JSON: an array of `{start, end, text, emotion}`.
    #[arg(long)]
    segments: PathBuf,

    /// Caption style id (ryu_classic, ken_fire, akuma_rage, chun_lightning).
    #[arg(long, default_value = "ryu_classic")]
    style: String,

    /// Source colour filter.
    #[arg(long, value_enum, default_value_t = FilterArg::None)]
    filter: FilterArg,

    /// Caption size tier.
    #[arg(long = "font-size", value_enum, default_value_t = FontSizeArg::Medium)]
    font_size: FontSizeArg,

    /// Export config JSON; missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory with extra caption fonts (Press Start 2P, Russo One).
    #[arg(long = "font-dir")]
    font_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    look: LookArgs,

    /// Directory the artifact is saved into (overrides the config).
    #[arg(long = "out-dir")]
    out_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    look: LookArgs,

    /// Source time in seconds.
    #[arg(long)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FilterArg {
    None,
    Grayscale,
    Sepia,
    Contrast,
    Invert,
}

impl From<FilterArg> for FilterSelection {
    fn from(v: FilterArg) -> Self {
        match v {
            FilterArg::None => FilterSelection::None,
            FilterArg::Grayscale => FilterSelection::Grayscale,
            FilterArg::Sepia => FilterSelection::Sepia,
            FilterArg::Contrast => FilterSelection::Contrast,
            FilterArg::Invert => FilterSelection::Invert,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FontSizeArg {
    Small,
    Medium,
    Large,
}

impl From<FontSizeArg> for FontSizeTier {
    fn from(v: FontSizeArg) -> Self {
        match v {
            FontSizeArg::Small => FontSizeTier::Small,
            FontSizeArg::Medium => FontSizeTier::Medium,
            FontSizeArg::Large => FontSizeTier::Large,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Formats => cmd_formats(),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ExportConfig> {
    match path {
        Some(p) => ExportConfig::from_json_file(p)
            .with_context(|| format!("load config '{}'", p.display())),
        None => Ok(ExportConfig::default()),
    }
}

fn build_request(look: &LookArgs) -> ExportRequest {
    let provider = JsonFileProvider::new(&look.segments);
    ExportRequest {
        source: look.in_path.clone(),
        segments: resolve_segments(&provider, &look.in_path),
        style: StyleConfig::lookup(&look.style).clone(),
        filter: look.filter.into(),
        font_size: look.font_size.into(),
    }
}

struct BarObserver {
    bar: ProgressBar,
}

impl BarObserver {
    fn new() -> anyhow::Result<Self> {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg:>10} [{bar:40}] {pos:>3}%")
                .context("progress bar template")?
                .progress_chars("=> "),
        );
        Ok(Self { bar })
    }
}

impl ExportObserver for BarObserver {
    fn state_changed(&mut self, state: ExportState) {
        if state == ExportState::Preparing {
            self.bar.set_position(0);
        }
        self.bar.set_message(state.to_string());
    }

    fn progress(&mut self, percent: u8) {
        self.bar.set_position(u64::from(percent));
    }

    fn finished(&mut self, _outcome: &CaptionFxResult<ExportOutcome>) {
        self.bar.finish_and_clear();
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.look.config.as_deref())?;
    if let Some(dir) = args.out_dir {
        cfg.output_dir = dir;
    }
    let request = build_request(&args.look);
    let mut platform =
        FfmpegPlatform::from_config(&cfg).with_font_dir(args.look.font_dir.clone());
    let pipeline = ExportPipeline::new(cfg);

    let mut observer = BarObserver::new()?;
    let outcome = pipeline
        .run(&mut platform, request, &mut observer, &CancelToken::new())
        .with_context(|| format!("export '{}'", args.look.in_path.display()))?;

    match outcome {
        ExportOutcome::Done(report) => {
            eprintln!(
                "wrote {} ({}, {} frames, {} bytes)",
                report.saved_to.display(),
                report.format,
                report.frames,
                report.bytes
            );
        }
        ExportOutcome::Cancelled { frames } => {
            eprintln!("cancelled after {frames} frames");
        }
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.look.config.as_deref())?;
    let request = build_request(&args.look);

    let info = captionfx::assets::media::probe_video(&args.look.in_path)?;
    let canvas = info.natural_canvas()?;
    let source = captionfx::assets::media::decode_frame_at(&info, args.time)?;

    let mut backend = CpuRasterizer::with_font_dir(args.look.font_dir.as_deref());
    let pipeline = ExportPipeline::new(cfg);
    let (plan, frame) = pipeline.preview(&request, &mut backend, canvas, &source)?;
    tracing::debug!(overlays = plan.overlay_count(), "preview planned");

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_rgba(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_formats() -> anyhow::Result<()> {
    let supported = captionfx::encode::format::probe_ffmpeg_formats()?;
    for format in OutputFormat::PREFERENCE {
        let mark = if supported.contains(&format) { "yes" } else { "no" };
        println!("{:<28} .{:<5} {mark}", format.mime_type(), format.extension());
    }
    Ok(())
}
