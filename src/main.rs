use clap::{Parser, Subcommand};
use image::DynamicImage;
use log::{Level, debug};
use pixkit::batch::{self, BatchOperation};
use pixkit::color::{self, ChannelHistogram, Effect, PaletteStrategy};
use pixkit::config::{self, ToolConfig};
use pixkit::imaging::{
    Adjustments, CropRect, FilterKind, FlipDirection, ImageBackend, ImageOperation, ImagingError,
    OutputFormat, Quality, ResizeParams, RustBackend, WatermarkPosition, WatermarkSpec,
    parse_color, process_file,
};
use pixkit::{layout, output};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "pixkit")]
#[command(about = "Everyday raster image operations and color analysis")]
#[command(long_about = "\
Everyday raster image operations and color analysis

Single-image commands read INPUT and write OUTPUT; the output format follows
the OUTPUT extension (.jpg .jpeg .png .bmp .gif .tiff .webp).

Settings that are not command-line flags (JPEG quality, palette strategy,
contact sheet geometry, worker count) live in pixkit.toml, read from the
working directory or from --config.

Run 'pixkit gen-config' to generate a documented pixkit.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./pixkit.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize an image
    Resize {
        input: PathBuf,
        output: PathBuf,
        /// Target width
        #[arg(long)]
        width: Option<u32>,
        /// Target height
        #[arg(long)]
        height: Option<u32>,
        /// Stretch to exactly WIDTHxHEIGHT instead of keeping the aspect ratio
        #[arg(long)]
        no_aspect: bool,
    },
    /// Apply a convolution filter
    Filter {
        input: PathBuf,
        output: PathBuf,
        /// blur, contour, detail, edge_enhance, edge_enhance_more, emboss,
        /// find_edges, sharpen, smooth, smooth_more, gaussian_blur, unsharp_mask
        filter_type: String,
    },
    /// Adjust brightness, contrast, saturation and sharpness (1.0 = unchanged)
    Adjust {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, default_value_t = 1.0)]
        brightness: f32,
        #[arg(long, default_value_t = 1.0)]
        contrast: f32,
        #[arg(long, default_value_t = 1.0)]
        saturation: f32,
        #[arg(long, default_value_t = 1.0)]
        sharpness: f32,
    },
    /// Crop a rectangle out of an image
    Crop {
        input: PathBuf,
        output: PathBuf,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    /// Rotate counter-clockwise by ANGLE degrees
    Rotate {
        input: PathBuf,
        output: PathBuf,
        #[arg(allow_negative_numbers = true)]
        angle: f32,
        /// Keep the original canvas size instead of growing it
        #[arg(long)]
        no_expand: bool,
    },
    /// Mirror horizontally or vertically
    Flip {
        input: PathBuf,
        output: PathBuf,
        /// horizontal or vertical
        #[arg(default_value = "horizontal")]
        direction: String,
    },
    /// Re-encode in another format
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// JPEG, PNG, BMP, GIF, TIFF or WEBP
        #[arg(long, default_value = "PNG")]
        format: String,
    },
    /// Shrink to fit a box, keeping the aspect ratio
    Thumbnail {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"], default_values_t = [128, 128])]
        size: Vec<u32>,
    },
    /// Stamp a text watermark
    Watermark {
        input: PathBuf,
        output: PathBuf,
        text: String,
        /// top-left, top-right, bottom-left, bottom-right or center
        #[arg(long, default_value = "bottom-right")]
        position: String,
        /// Text alpha, 0-255
        #[arg(long, default_value_t = 128)]
        opacity: u32,
    },
    /// Print format, size, color mode and EXIF tags as JSON
    Metadata { input: PathBuf },
    /// Arrange images in a grid
    Collage {
        output: PathBuf,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Images per row (default from config)
        #[arg(long)]
        cols: Option<u32>,
        /// Gap around and between images (default from config)
        #[arg(long)]
        padding: Option<u32>,
    },
    /// Apply an artistic effect
    Effect {
        input: PathBuf,
        output: PathBuf,
        /// sepia, grayscale, invert, posterize or solarize
        #[arg(default_value = "sepia")]
        effect_type: String,
    },
    /// Apply one operation to every image in a directory
    Batch {
        input_dir: PathBuf,
        output_dir: PathBuf,
        /// resize, filter, adjust, effect or thumbnail
        operation: String,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        #[arg(long)]
        filter_type: Option<String>,
        #[arg(long)]
        effect_type: Option<String>,
        #[arg(long, default_value_t = 1.0)]
        brightness: f32,
        #[arg(long, default_value_t = 1.0)]
        contrast: f32,
        #[arg(long, default_value_t = 1.0)]
        saturation: f32,
        #[arg(long, default_value_t = 1.0)]
        sharpness: f32,
        #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"], default_values_t = [128, 128])]
        size: Vec<u32>,
    },
    /// Add a solid border
    Border {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, default_value_t = 10)]
        width: u32,
        /// black, white, red, green, blue or #rrggbb
        #[arg(long, default_value = "black")]
        color: String,
    },
    /// Darken toward the edges
    Vignette {
        input: PathBuf,
        output: PathBuf,
        /// 0.0 (none) to 1.0 (edges fully dark)
        #[arg(long, default_value_t = 0.5)]
        strength: f32,
    },
    /// Paste OVERLAY onto BACKGROUND
    Composite {
        background: PathBuf,
        overlay: PathBuf,
        output: PathBuf,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        x: i64,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        y: i64,
        /// 0.0 to 1.0; below 1.0 replaces the overlay's own alpha
        #[arg(long, default_value_t = 1.0)]
        opacity: f32,
    },
    /// Lay out thumbnails on a sheet
    ContactSheet {
        output: PathBuf,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Sheet width in pixels (default from config)
        #[arg(long)]
        width: Option<u32>,
        /// Gap around and between thumbnails (default from config)
        #[arg(long)]
        margin: Option<u32>,
    },
    /// Summarize per-channel histograms
    Histogram {
        input: PathBuf,
        /// Also write the full histogram as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List dominant colors
    Palette {
        input: PathBuf,
        /// Number of colors (default from config)
        #[arg(long)]
        colors: Option<usize>,
        /// auto, kmeans or frequency (default from config)
        #[arg(long)]
        strategy: Option<String>,
    },
    /// Write one image per RGB channel
    Channels { input: PathBuf, output_dir: PathBuf },
    /// Print a stock pixkit.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logger(cli.verbose, cli.quiet);

    let result = match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(())
        }
        command => config::load_config(cli.config.as_deref())
            .map_err(Into::into)
            .and_then(|config| run(command, &config)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("Command failed: {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &ToolConfig) -> CliResult {
    init_thread_pool(&config.processing);
    let backend = RustBackend::with_quality(Quality::new(config.output.quality));

    match command {
        Command::Resize {
            input,
            output,
            width,
            height,
            no_aspect,
        } => {
            let params = ResizeParams::new(width, height, !no_aspect)?;
            single(&backend, &input, &output, ImageOperation::Resize(params))?;
        }
        Command::Filter {
            input,
            output,
            filter_type,
        } => {
            let kind: FilterKind = filter_type.parse()?;
            single(&backend, &input, &output, ImageOperation::Filter(kind))?;
        }
        Command::Adjust {
            input,
            output,
            brightness,
            contrast,
            saturation,
            sharpness,
        } => {
            let adjustments = Adjustments::new(brightness, contrast, saturation, sharpness)?;
            single(&backend, &input, &output, ImageOperation::Adjust(adjustments))?;
        }
        Command::Crop {
            input,
            output,
            x,
            y,
            width,
            height,
        } => {
            let rect = CropRect {
                x,
                y,
                width,
                height,
            };
            single(&backend, &input, &output, ImageOperation::Crop(rect))?;
        }
        Command::Rotate {
            input,
            output,
            angle,
            no_expand,
        } => {
            let op = ImageOperation::rotate(angle, !no_expand)?;
            single(&backend, &input, &output, op)?;
        }
        Command::Flip {
            input,
            output,
            direction,
        } => {
            let direction: FlipDirection = direction.parse()?;
            single(&backend, &input, &output, ImageOperation::Flip(direction))?;
        }
        Command::Convert {
            input,
            output,
            format,
        } => {
            let format: OutputFormat = format.parse()?;
            single(&backend, &input, &output, ImageOperation::Convert(format))?;
        }
        Command::Thumbnail {
            input,
            output,
            size,
        } => {
            let op = ImageOperation::thumbnail(size[0], size[1])?;
            single(&backend, &input, &output, op)?;
        }
        Command::Watermark {
            input,
            output,
            text,
            position,
            opacity,
        } => {
            let position: WatermarkPosition = position.parse()?;
            let spec = WatermarkSpec::new(&text, position, opacity)?;
            single(&backend, &input, &output, ImageOperation::Watermark(spec))?;
        }
        Command::Metadata { input } => {
            let info = backend.identify(&input)?;
            output::print(output::format_metadata(&info)?);
        }
        Command::Collage {
            output: out,
            inputs,
            cols,
            padding,
        } => {
            let cols = cols.unwrap_or(config.collage.cols);
            let padding = padding.unwrap_or(config.collage.padding);
            let images = layout::load_all(&backend, &inputs)?;
            let canvas = layout::collage(&images, cols as usize, padding)?;
            backend.save(&DynamicImage::ImageRgb8(canvas), &out, None)?;
            output::print(output::format_collage(images.len(), cols));
        }
        Command::Effect {
            input,
            output,
            effect_type,
        } => {
            let effect: Effect = effect_type.parse()?;
            single(&backend, &input, &output, ImageOperation::Effect(effect))?;
        }
        Command::Batch {
            input_dir,
            output_dir,
            operation,
            width,
            height,
            filter_type,
            effect_type,
            brightness,
            contrast,
            saturation,
            sharpness,
            size,
        } => {
            let op = match operation.parse::<BatchOperation>()? {
                BatchOperation::Resize => {
                    ImageOperation::Resize(ResizeParams::new(width, height, true)?)
                }
                BatchOperation::Filter => {
                    let name = required(filter_type, "--filter-type", "filter")?;
                    ImageOperation::Filter(name.parse()?)
                }
                BatchOperation::Adjust => ImageOperation::Adjust(Adjustments::new(
                    brightness, contrast, saturation, sharpness,
                )?),
                BatchOperation::Effect => {
                    let name = required(effect_type, "--effect-type", "effect")?;
                    ImageOperation::Effect(name.parse()?)
                }
                BatchOperation::Thumbnail => ImageOperation::thumbnail(size[0], size[1])?,
            };
            run_batch(&backend, &input_dir, &output_dir, &op)?;
        }
        Command::Border {
            input,
            output,
            width,
            color,
        } => {
            let color = parse_color(&color)?;
            single(
                &backend,
                &input,
                &output,
                ImageOperation::Border { width, color },
            )?;
        }
        Command::Vignette {
            input,
            output,
            strength,
        } => {
            let op = ImageOperation::vignette(strength)?;
            single(&backend, &input, &output, op)?;
        }
        Command::Composite {
            background,
            overlay,
            output: out,
            x,
            y,
            opacity,
        } => {
            let bg = backend.load(&background)?;
            let top = backend.load(&overlay)?;
            let merged = layout::composite(&bg, &top, (x, y), opacity)?;
            backend.save(&DynamicImage::ImageRgba8(merged), &out, None)?;
            output::print(output::format_composite((x, y), opacity));
        }
        Command::ContactSheet {
            output: out,
            inputs,
            width,
            margin,
        } => {
            let width = width.unwrap_or(config.contact_sheet.width);
            let margin = margin.unwrap_or(config.contact_sheet.margin);
            let images = layout::load_all(&backend, &inputs)?;
            let sheet = layout::contact_sheet(&images, width, margin)?;
            backend.save(&DynamicImage::ImageRgb8(sheet), &out, None)?;
            output::print(output::format_contact_sheet(images.len()));
        }
        Command::Histogram { input, output: json } => {
            let img = backend.load(&input)?;
            let histogram = ChannelHistogram::summarize(&img);
            let means = histogram.means()?;
            if let Some(path) = &json {
                histogram.write_json(path)?;
            }
            output::print(output::format_histogram(
                &input,
                (img.width(), img.height()),
                &histogram,
                &means,
                json.as_deref(),
            ));
        }
        Command::Palette {
            input,
            colors,
            strategy,
        } => {
            let mut options = config.palette.options();
            if let Some(colors) = colors {
                options.colors = colors;
            }
            if let Some(strategy) = strategy {
                options.strategy = strategy.parse::<PaletteStrategy>()?;
            }
            let img = backend.load(&input)?;
            let swatches = color::extract_palette(&img, &options)?;
            output::print_palette(&input, &swatches);
        }
        Command::Channels { input, output_dir } => {
            let paths = color::channels::save_channels(&backend, &input, &output_dir)?;
            output::print(output::format_channels(&output_dir, &paths));
        }
        Command::GenConfig => print!("{}", config::stock_config_toml()),
    }

    Ok(())
}

/// Load, apply and save one image, then report where it went.
fn single(
    backend: &RustBackend,
    input: &Path,
    output: &Path,
    op: ImageOperation,
) -> Result<(), ImagingError> {
    let (width, height) = process_file(backend, input, output, &op)?;
    debug!("{} wrote {width}x{height}", op.name());
    output::print_saved(output);
    Ok(())
}

fn required(value: Option<String>, flag: &str, operation: &str) -> Result<String, ImagingError> {
    value.ok_or_else(|| {
        ImagingError::InvalidParameter(format!("{flag} is required for batch {operation}"))
    })
}

/// Run a batch with a printer thread draining progress events.
fn run_batch(
    backend: &RustBackend,
    input_dir: &Path,
    output_dir: &Path,
    op: &ImageOperation,
) -> Result<(), ImagingError> {
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_batch_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = batch::process_directory(backend, input_dir, output_dir, op, Some(tx));
    // The sender is dropped by now, so the printer drains and exits.
    printer.join().ok();
    output::print_batch_summary(&result?);
    Ok(())
}

/// `-q` → error, default → warn, `-v` → debug, `-vv` → trace.
fn setup_logger(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::Error
    } else {
        match verbose {
            0 => Level::Warn,
            1 => Level::Debug,
            _ => Level::Trace,
        }
    };
    simple_logger::init_with_level(level).ok();
    debug!("Log level: {level}");
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
