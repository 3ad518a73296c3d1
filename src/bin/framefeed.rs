use std::{fs, path::PathBuf};

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framefeed::{
    ElementType, Interpolation, NativeLogLevel, OutputFormat, StreamKind, VideoReader,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framefeed probe input.mp4 --json\n  framefeed dump input.mp4 --out frames --width 224 --height 224 --count 100\n  framefeed completions zsh > _framefeed";

#[derive(Debug, Parser)]
#[command(
    name = "framefeed",
    version,
    about = "Inspect video containers and dump decoded frames",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the stream table of a container file.
    #[command(
        about = "Print stream diagnostics",
        visible_alias = "info",
        after_help = "Examples:\n  framefeed probe input.mp4\n  framefeed probe input.mp4 --json"
    )]
    Probe {
        /// Input media path.
        input: PathBuf,

        /// Output machine-readable JSON instead of human text.
        #[arg(long)]
        json: bool,
    },

    /// Decode frames to numbered PNG files.
    #[command(
        about = "Dump decoded frames as images",
        after_help = "Examples:\n  framefeed dump input.mp4 --out frames\n  framefeed dump input.mp4 --out frames --width 64 --height 64 --gray --count 10"
    )]
    Dump(DumpArgs),

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

#[derive(Debug, Args)]
struct DumpArgs {
    /// Input media path.
    input: PathBuf,

    /// Output directory for frame images.
    #[arg(long)]
    out: PathBuf,

    /// Output width in pixels (defaults to the native width).
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels (defaults to the native height).
    #[arg(long)]
    height: Option<u32>,

    /// Produce single-channel grayscale frames instead of RGB.
    #[arg(long)]
    gray: bool,

    /// Sample depth: uint8 | uint16.
    #[arg(long, default_value = "uint8")]
    element: String,

    /// Resampling algorithm: nearest | fast-bilinear | bilinear | bicubic | area | lanczos.
    #[arg(long, default_value = "bilinear")]
    interpolation: String,

    /// Stop after this many frames (defaults to the whole stream).
    #[arg(long)]
    count: Option<u64>,

    /// Decode this stream index instead of the container's best video stream.
    #[arg(long)]
    stream: Option<usize>,
}

fn parse_element(value: &str) -> Option<ElementType> {
    match value.to_ascii_lowercase().as_str() {
        "uint8" | "u8" => Some(ElementType::Uint8),
        "uint16" | "u16" => Some(ElementType::Uint16),
        _ => None,
    }
}

fn parse_interpolation(value: &str) -> Option<Interpolation> {
    match value.to_ascii_lowercase().as_str() {
        "nearest" | "point" => Some(Interpolation::Nearest),
        "fast-bilinear" => Some(Interpolation::FastBilinear),
        "bilinear" => Some(Interpolation::Bilinear),
        "bicubic" => Some(Interpolation::Bicubic),
        "area" => Some(Interpolation::Area),
        "lanczos" => Some(Interpolation::Lanczos),
        _ => None,
    }
}

fn probe(input: &PathBuf, as_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let reader = VideoReader::open(input)?;

    if as_json {
        let streams: Vec<_> = reader
            .stream_infos()
            .map(|info| {
                json!({
                    "index": info.index,
                    "kind": info.kind.to_string(),
                    "decoder": info.decoder_name,
                    "average_frame_rate": info.average_frame_rate,
                    "start_time": info.start_time,
                    "duration": info.duration,
                    "bit_rate": info.bit_rate,
                    "resolution": info.resolution.map(|(w, h)| json!({"width": w, "height": h})),
                    "active": info.index == reader.active_stream_index(),
                })
            })
            .collect();
        let document = json!({
            "path": input.display().to_string(),
            "stream_count": reader.stream_count(),
            "streams": streams,
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    println!(
        "{} {} ({} streams)",
        "file:".bold(),
        input.display(),
        reader.stream_count(),
    );
    for info in reader.stream_infos() {
        let marker = if info.index == reader.active_stream_index() {
            "*".green().bold().to_string()
        } else {
            " ".to_string()
        };
        let line = info.to_string();
        match info.kind {
            StreamKind::Video => println!("{marker} {}", line.cyan()),
            _ => println!("{marker} {}", line.dimmed()),
        }
    }
    Ok(())
}

fn dump(args: &DumpArgs) -> Result<(), Box<dyn std::error::Error>> {
    let element = parse_element(&args.element)
        .ok_or(format!("unsupported --element: {}", args.element))?;
    let interpolation = parse_interpolation(&args.interpolation)
        .ok_or(format!("unsupported --interpolation: {}", args.interpolation))?;

    let mut reader = VideoReader::open(&args.input)?;
    if args.stream.is_some() {
        reader.select_stream(args.stream)?;
    }

    let (native_height, native_width) = reader.native_size();
    let channels = if args.gray { 1 } else { 3 };
    let format = OutputFormat::new(
        args.height.unwrap_or(native_height),
        args.width.unwrap_or(native_width),
        channels,
        element,
        interpolation,
    )?;

    fs::create_dir_all(&args.out)?;

    let bar = match args.count {
        Some(total) => ProgressBar::new(total),
        None => ProgressBar::new_spinner(),
    };
    bar.set_style(
        ProgressStyle::with_template("{spinner} {pos} frames {msg}")
            .expect("valid progress template"),
    );

    let mut written = 0u64;
    while args.count.is_none_or(|limit| written < limit) {
        let Some(frame) = reader.next_frame(Some(&format))? else {
            break;
        };
        let image = frame
            .to_image()
            .ok_or("frame buffer has no image representation")?;
        let path = args.out.join(format!("frame_{written:06}.png"));
        image.save(&path)?;
        written += 1;
        bar.inc(1);
    }
    bar.finish_and_clear();

    println!(
        "{} {} frames -> {}",
        "done:".green().bold(),
        written,
        args.out.display(),
    );
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(level) = &cli.log_level {
        let parsed: NativeLogLevel = level
            .parse()
            .map_err(|_| format!("unsupported --log-level: {level}"))?;
        framefeed::set_native_log_level(parsed);
    }

    match cli.command {
        Commands::Probe { input, json } => probe(&input, json),
        Commands::Dump(args) => dump(&args),
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
            Ok(())
        }
    }
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
