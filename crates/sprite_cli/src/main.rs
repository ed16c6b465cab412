use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use sprite_render::{
    export_animation, export_spritesheet, export_still, rasterize, ArtPack, Bitmap, FrameSequence,
    Palette, Session, SessionConfig,
};

mod script;

use script::Trigger;

#[derive(Parser, Debug)]
#[command(author, version, about = "Rasterize glyph grid sprites and export PNG/GIF files")]
struct Cli {
    /// JSON art pack replacing the built-in sprites and palettes
    #[arg(long, global = true)]
    pack: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a sprite to the terminal using truecolor blocks
    Preview(PreviewArgs),
    /// Rasterize one sprite and write it as PNG
    Render(RenderArgs),
    /// Write one PNG per palette into a directory
    Palettes(PalettesArgs),
    /// Write a sequence of sprites as a looping GIF
    Animate(AnimateArgs),
    /// Write a sequence of sprites as a horizontal PNG strip
    Sheet(SheetArgs),
    /// Run a display session over a scripted list of triggers
    Play(PlayArgs),
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Sprite name from the art pack
    #[arg(default_value = "mario_stand")]
    sprite: String,
    #[command(flatten)]
    settings: SpriteSettings,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Sprite name from the art pack
    #[arg(default_value = "mario_stand")]
    sprite: String,
    /// Output file path
    #[arg(short, long)]
    output: PathBuf,
    #[command(flatten)]
    settings: SpriteSettings,
}

#[derive(Parser, Debug)]
struct PalettesArgs {
    /// Sprite name from the art pack
    #[arg(default_value = "mario_stand")]
    sprite: String,
    /// Output directory for `<sprite>_<palette>.png` files
    #[arg(short, long)]
    out_dir: PathBuf,
    /// Edge length in pixels of one grid cell
    #[arg(long, default_value_t = 8)]
    scale: u32,
}

#[derive(Parser, Debug)]
struct AnimateArgs {
    /// Sprite names, in playback order
    #[arg(required = true)]
    frames: Vec<String>,
    /// Output GIF path
    #[arg(short, long)]
    output: PathBuf,
    /// Playback speed
    #[arg(long, default_value_t = 4.0)]
    fps: f64,
    #[command(flatten)]
    settings: SpriteSettings,
}

#[derive(Parser, Debug)]
struct SheetArgs {
    /// Sprite names, left to right
    #[arg(required = true)]
    frames: Vec<String>,
    /// Output PNG path
    #[arg(short, long)]
    output: PathBuf,
    #[command(flatten)]
    settings: SpriteSettings,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Comma separated triggers, e.g. `2,anim,tick:0.3,wave,still:out.png,gif:out.gif`
    #[arg(long, value_delimiter = ',')]
    events: Vec<Trigger>,
    /// JSON session configuration
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
struct SpriteSettings {
    /// Palette name or 1-based index
    #[arg(long, default_value = "nes")]
    palette: String,
    /// Edge length in pixels of one grid cell
    #[arg(long, default_value_t = 8)]
    scale: u32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let pack = load_pack(cli.pack.as_deref())?;
    match cli.command {
        Commands::Preview(args) => preview(&pack, args),
        Commands::Render(args) => render(&pack, args),
        Commands::Palettes(args) => palettes(&pack, args),
        Commands::Animate(args) => animate(&pack, args),
        Commands::Sheet(args) => sheet(&pack, args),
        Commands::Play(args) => play(pack, args),
    }
}

fn load_pack(path: Option<&Path>) -> Result<ArtPack> {
    match path {
        Some(path) => {
            ArtPack::from_path(path).with_context(|| format!("failed to load art pack {:?}", path))
        },
        None => ArtPack::builtin().context("failed to load built-in art pack"),
    }
}

fn preview(pack: &ArtPack, args: PreviewArgs) -> Result<()> {
    let palette = args.settings.palette(pack)?;
    let grid = pack.sprite(&args.sprite)?;

    for row in grid.rows() {
        let mut line = String::new();
        for &glyph in row {
            match palette.lookup(glyph) {
                Some(color) => {
                    line.push_str(&format!("\x1b[48;2;{};{};{}m  ", color[0], color[1], color[2]))
                },
                None => line.push_str("\x1b[0m  "),
            }
        }
        println!("{}\x1b[0m", line);
    }

    Ok(())
}

fn render(pack: &ArtPack, args: RenderArgs) -> Result<()> {
    let palette = args.settings.palette(pack)?;
    let grid = pack.sprite(&args.sprite)?;
    let bitmap = rasterize(grid, palette, args.settings.scale)
        .with_context(|| format!("failed to rasterize {:?}", args.sprite))?;

    export_still(&bitmap, &args.output)
        .with_context(|| format!("failed to write {:?}", args.output))?;
    info!("saved {}", args.output.display());
    Ok(())
}

fn palettes(pack: &ArtPack, args: PalettesArgs) -> Result<()> {
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create output directory {:?}", args.out_dir))?;
    let grid = pack.sprite(&args.sprite)?;

    let progress = ProgressBar::new(pack.palettes().len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} palettes")
            .context("invalid progress template")?
            .progress_chars("=> "),
    );

    for palette in pack.palettes().iter() {
        let bitmap = rasterize(grid, palette, args.scale)
            .with_context(|| format!("failed to rasterize with palette {}", palette.name()))?;
        let path = args.out_dir.join(format!("{}_{}.png", args.sprite, palette.name()));
        export_still(&bitmap, &path).with_context(|| format!("failed to write {:?}", path))?;
        progress.inc(1);
    }

    progress.finish_with_message(format!("Sprites written to {:?}", args.out_dir));
    Ok(())
}

fn animate(pack: &ArtPack, args: AnimateArgs) -> Result<()> {
    let palette = args.settings.palette(pack)?;
    let sequence = build_sequence(pack, &args.frames, palette, args.settings.scale, args.fps)?;

    export_animation(&sequence.bitmaps(), &sequence.frame_delays_cs(), &args.output)
        .with_context(|| format!("failed to write {:?}", args.output))?;
    info!("saved {} ({} frames)", args.output.display(), sequence.len());
    Ok(())
}

fn sheet(pack: &ArtPack, args: SheetArgs) -> Result<()> {
    let palette = args.settings.palette(pack)?;
    let bitmaps = args
        .frames
        .iter()
        .map(|name| {
            let grid = pack.sprite(name)?;
            rasterize(grid, palette, args.settings.scale)
        })
        .collect::<Result<Vec<Bitmap>, _>>()?;

    export_spritesheet(&bitmaps.iter().collect::<Vec<_>>(), &args.output)
        .with_context(|| format!("failed to write {:?}", args.output))?;
    info!("saved {}", args.output.display());
    Ok(())
}

fn play(pack: ArtPack, args: PlayArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => SessionConfig::from_path(path)
            .with_context(|| format!("failed to load session config {:?}", path))?,
        None => SessionConfig::default(),
    };
    let mut session = Session::new(pack, config).context("failed to start session")?;

    for trigger in args.events {
        match trigger {
            Trigger::SelectPalette(index) => session.on_select_palette(index)?,
            Trigger::ToggleAnimation => {
                info!("animation {}", on_off(session.on_toggle_animation()));
            },
            Trigger::ToggleDistortion => {
                info!("wave {}", on_off(session.on_toggle_distortion()));
            },
            Trigger::ToggleRotation => {
                info!("rotation {}", on_off(session.on_toggle_rotation()));
            },
            Trigger::Tick(dt) => session.update(dt),
            Trigger::ExportStill(path) => {
                session
                    .on_export_still(&path)
                    .with_context(|| format!("failed to write {:?}", path))?;
                info!("saved {}", path.display());
            },
            Trigger::ExportAnimation(path) => {
                session
                    .on_export_animation(&path)
                    .with_context(|| format!("failed to write {:?}", path))?;
                info!("saved {}", path.display());
            },
            Trigger::ExportCanvas(path) => {
                session
                    .on_export_canvas(&path)
                    .with_context(|| format!("failed to write {:?}", path))?;
                info!("saved {}", path.display());
            },
        }
    }

    Ok(())
}

fn build_sequence(
    pack: &ArtPack,
    names: &[String],
    palette: &Palette,
    scale: u32,
    fps: f64,
) -> Result<FrameSequence> {
    let grids = names
        .iter()
        .map(|name| pack.sprite(name).cloned())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FrameSequence::from_grids(grids, palette, scale, fps)?)
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

impl SpriteSettings {
    fn palette<'a>(&self, pack: &'a ArtPack) -> Result<&'a Palette> {
        let palettes = pack.palettes();
        match self.palette.parse::<usize>() {
            Ok(index) => Ok(palettes.select(index)?),
            Err(_) => palettes
                .by_name(&self.palette)
                .with_context(|| format!("unknown palette {:?}", self.palette)),
        }
    }
}
