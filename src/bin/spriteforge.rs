use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "spriteforge", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose every frame of a capture and export frames, GIF and spritesheet.
    Build(BuildArgs),
    /// Print the content hash table of a sprite directory.
    Index(IndexArgs),
    /// Print the content hash of individual images.
    Hash(HashArgs),
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Capture JSON.
    #[arg(long)]
    capture: PathBuf,

    /// Directory with the sprite images referenced by the capture.
    #[arg(long)]
    sprites: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Extra transform overrides (JSON array), merged over the built-in table.
    #[arg(long)]
    overrides: Option<PathBuf>,

    /// Transparent margin around each frame in the spritesheet.
    #[arg(long, default_value_t = spriteforge::DEFAULT_CELL_PADDING)]
    padding: u32,

    /// Compose frames on several threads.
    #[arg(long)]
    parallel: bool,

    /// Thread count for --parallel (defaults to the number of CPUs).
    #[arg(long)]
    threads: Option<usize>,

    /// GIF quantizer speed, 1 (best) to 30 (fastest).
    #[arg(long, default_value_t = 10)]
    gif_speed: i32,

    /// Image format of the per-frame files.
    #[arg(long, value_enum, default_value_t = FrameFormat::Png)]
    frame_format: FrameFormat,

    /// Skip the animated GIF.
    #[arg(long)]
    no_gif: bool,

    /// Skip the spritesheet.
    #[arg(long)]
    no_atlas: bool,

    /// Also write the spritesheet layout as JSON next to the sheet.
    #[arg(long)]
    layout: bool,
}

#[derive(Parser, Debug)]
struct IndexArgs {
    /// Sprite directory to scan.
    #[arg(long)]
    sprites: PathBuf,
}

#[derive(Parser, Debug)]
struct HashArgs {
    /// Image files.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FrameFormat {
    Png,
    Webp,
}

impl FrameFormat {
    fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Webp => image::ImageFormat::WebP,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Build(args) => cmd_build(args),
        Command::Index(args) => cmd_index(args),
        Command::Hash(args) => cmd_hash(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_build(args: BuildArgs) -> anyhow::Result<()> {
    let overrides = args
        .overrides
        .as_deref()
        .map(spriteforge::OverrideTable::from_path)
        .transpose()
        .context("load transform overrides")?;

    let opts = spriteforge::AssembleOpts {
        parallel: args.parallel,
        threads: args.threads,
    };
    let progress = |p: spriteforge::Progress<'_>| {
        if p.total == 0 {
            eprintln!("indexing sprites...");
        } else if p.key.is_empty() {
            eprintln!("assembled {} frames", p.total);
        } else {
            eprintln!("[{}/{}] {}", p.done, p.total, p.key);
        }
    };
    let assembly = spriteforge::assemble_from_paths(
        &args.capture,
        &args.sprites,
        overrides.as_ref(),
        &opts,
        Some(&progress),
    )?;

    for skipped in &assembly.skipped {
        eprintln!("skipped {}: {}", skipped.path.display(), skipped.reason);
    }
    let dropped = assembly.dropped_parts();
    if dropped > 0 {
        eprintln!("{dropped} part(s) could not be drawn (use -v for details)");
    }

    let frames_dir = args.out.join("frames");
    let written = spriteforge::save_frames(
        assembly
            .frames
            .iter()
            .map(|f| (f.key.as_str(), &f.trimmed)),
        &frames_dir,
        args.frame_format.image_format(),
    )?;
    println!("wrote {} frames to {}", written.len(), frames_dir.display());

    if assembly.frames.is_empty() {
        eprintln!("capture has no frames; skipping GIF and spritesheet");
        return Ok(());
    }

    let stem = capture_stem(&args.capture);
    if !args.no_gif {
        let gif_path = args.out.join(format!("{stem}.gif"));
        let gif_opts = spriteforge::GifOpts {
            speed: args.gif_speed,
        };
        assembly.export_gif(&gif_opts, &gif_path)?;
        println!("wrote {}", gif_path.display());
    }

    if !args.no_atlas {
        let atlas = assembly.atlas(&spriteforge::AtlasOpts {
            padding: args.padding,
        })?;
        let sheet_path = args.out.join(format!("{stem}_spritesheet.png"));
        spriteforge::export_atlas(&atlas, &sheet_path)?;
        println!(
            "wrote {} ({}x{})",
            sheet_path.display(),
            atlas.image.width(),
            atlas.image.height()
        );
        if args.layout {
            let layout_path = args.out.join(format!("{stem}_spritesheet.json"));
            spriteforge::export_layout(&atlas.layout, &layout_path)?;
            println!("wrote {}", layout_path.display());
        }
    }

    Ok(())
}

fn cmd_index(args: IndexArgs) -> anyhow::Result<()> {
    let report = spriteforge::scan_dir(&args.sprites)?;
    for (hash, path) in report.index.sorted() {
        println!("{hash}  {}", path.display());
    }
    for skipped in &report.skipped {
        eprintln!("skipped {}: {}", skipped.path.display(), skipped.reason);
    }
    eprintln!(
        "{} indexed, {} skipped, {} scanned",
        report.index.len(),
        report.skipped.len(),
        report.scanned
    );
    Ok(())
}

fn cmd_hash(args: HashArgs) -> anyhow::Result<()> {
    for path in &args.files {
        let img = image::open(path).with_context(|| format!("open image '{}'", path.display()))?;
        println!("{}  {}", spriteforge::content_hash(&img), path.display());
    }
    Ok(())
}

fn capture_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "capture".to_string())
}
