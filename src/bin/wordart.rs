use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "wordart", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite styled text over a background image.
    Render(RenderArgs),
    /// Render styled text on a transparent canvas plus its glyph mask.
    Preview(PreviewArgs),
    /// List registered styles.
    List(ListArgs),
    /// Render every style once and report failures.
    Validate(ValidateArgs),
    /// Re-serialize a loaded style into a descriptor file.
    Record(RecordArgs),
}

#[derive(Args, Debug)]
struct ContextArgs {
    /// Directory of style descriptors (`*.svg`).
    #[arg(long, default_value = "styles")]
    styles_dir: PathBuf,

    /// Extra font directory (repeatable); system fonts are always loaded.
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Color-to-style mapping JSON.
    #[arg(long, default_value = "config/style_color_mapping.json")]
    mapping: PathBuf,
}

impl ContextArgs {
    fn load(&self) -> anyhow::Result<wordart::RenderContext> {
        let paths = wordart::ContextPaths {
            styles_dir: self.styles_dir.clone(),
            font_dirs: self.font_dirs.clone(),
            mapping: Some(self.mapping.clone()),
        };
        let (ctx, report) = wordart::RenderContext::load(&paths)?;
        for failure in &report.failed {
            eprintln!(
                "skipped {}: {}",
                failure.path.display(),
                failure.message
            );
        }
        if ctx.registry.is_empty() {
            anyhow::bail!("no styles loaded from '{}'", self.styles_dir.display());
        }
        Ok(ctx)
    }
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// Style name, `random`, or `auto` to match the background color.
    #[arg(long, default_value = "random")]
    style: String,

    /// Seed; 0 draws a fresh one.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Fixed font size in pixels instead of fitting.
    #[arg(long)]
    font_size: Option<f32>,

    /// Font family to use instead of the style's own.
    #[arg(long, conflicts_with = "random_font")]
    font: Option<String>,

    /// Pick a random installed font with the request seed.
    #[arg(long)]
    random_font: bool,

    #[arg(long, value_enum, default_value_t = wordart::WrapMode::Greedy)]
    wrap: wordart::WrapMode,

    #[arg(long, value_enum, default_value_t = wordart::EffectSet::Full)]
    effects: wordart::EffectSet,

    #[arg(long, default_value_t = 0.25)]
    margin_top: f32,
    #[arg(long, default_value_t = 0.15)]
    margin_bottom: f32,
    #[arg(long, default_value_t = 0.1)]
    margin_left: f32,
    #[arg(long, default_value_t = 0.1)]
    margin_right: f32,
}

impl LayoutArgs {
    fn margins(&self) -> wordart::Margins {
        wordart::Margins {
            top: self.margin_top,
            bottom: self.margin_bottom,
            left: self.margin_left,
            right: self.margin_right,
        }
    }

    fn fit(&self) -> wordart::FitOptions {
        wordart::FitOptions {
            wrap: self.wrap,
            ..wordart::FitOptions::default()
        }
    }

    fn font(&self) -> wordart::FontChoice {
        match (&self.font, self.random_font) {
            (_, true) => wordart::FontChoice::Random,
            (Some(family), false) => wordart::FontChoice::Family(family.clone()),
            (None, false) => wordart::FontChoice::Auto,
        }
    }
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    ctx: ContextArgs,

    #[command(flatten)]
    layout: LayoutArgs,

    /// Background image.
    #[arg(long)]
    background: PathBuf,

    /// Text to draw; `\n` forces a line break.
    #[arg(long)]
    text: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Opacity of the text block, 0..=1.
    #[arg(long, default_value_t = 1.0)]
    opacity: f32,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    ctx: ContextArgs,

    #[command(flatten)]
    layout: LayoutArgs,

    #[arg(long)]
    text: String,

    #[arg(long, default_value_t = 512)]
    width: u32,

    #[arg(long, default_value_t = 512)]
    height: u32,

    /// How `--seed` evolves before rendering.
    #[arg(long, value_enum, default_value_t = wordart::SeedMode::Fixed)]
    seed_mode: wordart::SeedMode,

    /// Output PNG path for the transparent image.
    #[arg(long)]
    out: PathBuf,

    /// Output PNG path for the glyph mask (grayscale).
    #[arg(long)]
    mask_out: Option<PathBuf>,

    /// Coverage above this fraction becomes opaque in the saved mask; negative keeps soft edges.
    #[arg(long, default_value_t = 0.05, allow_negative_numbers = true)]
    mask_threshold: f32,
}

#[derive(Parser, Debug)]
struct ListArgs {
    #[command(flatten)]
    ctx: ContextArgs,

    /// Print as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    #[command(flatten)]
    ctx: ContextArgs,

    #[arg(long, default_value_t = 512)]
    width: u32,

    #[arg(long, default_value_t = 256)]
    height: u32,

    /// Text to render; defaults to each style's sample text.
    #[arg(long)]
    text: Option<String>,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct RecordArgs {
    #[command(flatten)]
    ctx: ContextArgs,

    /// Style to record.
    #[arg(long)]
    style: String,

    /// Directory the descriptor is written to.
    #[arg(long)]
    out_dir: PathBuf,

    /// Also write the parsed parameters as JSON next to the descriptor.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Preview(args) => cmd_preview(args),
        Command::List(args) => cmd_list(args),
        Command::Validate(args) => cmd_validate(args),
        Command::Record(args) => cmd_record(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let ctx = args.ctx.load()?;
    let background = image::open(&args.background)
        .with_context(|| format!("read background '{}'", args.background.display()))?
        .to_rgba8();
    let text = unescape_newlines(&args.text);

    let req = wordart::RenderRequest {
        style: wordart::StyleSelector::parse(&args.layout.style),
        margins: args.layout.margins(),
        opacity: args.opacity,
        seed: wordart::Seed(args.layout.seed),
        font_size: args.layout.font_size,
        effects: args.layout.effects,
        fit: args.layout.fit(),
        font: args.layout.font(),
        ..wordart::RenderRequest::new(&background, &text)
    };
    let mut engine = wordart::TextEngine::new();
    let out = wordart::render_full(&ctx, &mut engine, &req)?;

    save_png(&args.out, &out.frame.to_straight_image()?)?;
    if !out.layout.fits {
        eprintln!("warning: text overflows the safe area at the minimum font size");
    }
    eprintln!(
        "wrote {} (style {}, size {}, seed {})",
        args.out.display(),
        out.style_name,
        out.font_size,
        out.seed
    );
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let ctx = args.ctx.load()?;
    let text = unescape_newlines(&args.text);

    let req = wordart::PreviewRequest {
        style: wordart::StyleSelector::parse(&args.layout.style),
        seed: args.seed_mode.next(args.layout.seed),
        margins: args.layout.margins(),
        effects: args.layout.effects,
        font_size: args.layout.font_size,
        fit: args.layout.fit(),
        font: args.layout.font(),
        ..wordart::PreviewRequest::new(&text, args.width, args.height)
    };
    let mut engine = wordart::TextEngine::new();
    let out = wordart::render_preview(&ctx, &mut engine, &req)?;

    save_png(&args.out, &out.frame.to_straight_image()?)?;
    if let Some(mask_path) = &args.mask_out {
        let mask = if args.mask_threshold >= 0.0 {
            out.mask.binarize(args.mask_threshold)
        } else {
            out.mask.clone()
        };
        let gray = image::GrayImage::from_raw(mask.width, mask.height, mask.data)
            .context("mask buffer does not match its dimensions")?;
        if let Some(parent) = mask_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        gray.save(mask_path)
            .with_context(|| format!("write png '{}'", mask_path.display()))?;
    }
    eprintln!(
        "wrote {} (style {}, size {}, seed {})",
        args.out.display(),
        out.style_name,
        out.font_size,
        out.seed
    );
    Ok(())
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let ctx = args.ctx.load()?;
    if args.json {
        let entries: Vec<serde_json::Value> = ctx
            .registry
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": ctx.mapping.description(&t.name),
                    "effects": t.uses().iter().map(|u| u.role().as_str()).collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for t in ctx.registry.iter() {
        let roles = t
            .uses()
            .iter()
            .map(|u| u.role().as_str())
            .collect::<Vec<_>>()
            .join(",");
        match ctx.mapping.description(&t.name) {
            Some(d) => println!("{}\t{}\t{}", t.name, roles, d),
            None => println!("{}\t{}", t.name, roles),
        }
    }
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let ctx = args.ctx.load()?;
    let opts = wordart::ValidateOptions {
        width: args.width,
        height: args.height,
        text: args.text.as_deref().map(unescape_newlines),
        threads: args.threads,
        ..wordart::ValidateOptions::default()
    };
    let checks = wordart::validate_registry(&ctx, &opts)?;
    let mut failed = 0usize;
    for c in &checks {
        match &c.error {
            None if c.passed() => println!("ok\t{}\t{} px", c.name, c.covered_pixels),
            None => {
                failed += 1;
                println!("FAIL\t{}\tempty mask", c.name);
            }
            Some(e) => {
                failed += 1;
                println!("FAIL\t{}\t{e}", c.name);
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} styles failed", checks.len());
    }
    Ok(())
}

fn cmd_record(args: RecordArgs) -> anyhow::Result<()> {
    let ctx = args.ctx.load()?;
    let template = ctx.registry.get(&args.style)?;
    let path = wordart::record_style(&template, &args.out_dir)?;
    if args.json {
        let json_path = path.with_extension("json");
        let text = serde_json::to_string_pretty(template.as_ref())?;
        std::fs::write(&json_path, text)
            .with_context(|| format!("write '{}'", json_path.display()))?;
    }
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn save_png(path: &Path, img: &image::RgbaImage) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))
}

/// Shells make literal newlines awkward, so `\n` in arguments breaks lines.
fn unescape_newlines(s: &str) -> String {
    s.replace("\\n", "\n")
}
