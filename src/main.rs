//! caption-band - Entry Point

use anyhow::{bail, Context};
use caption_band::engine::config::{CaptionStyle, FontFamily, Position, SizeSearch};
use caption_band::output::{write_outputs, BatchResponse};
use caption_band::rendering::library::DEFAULT_FONTS_DIR;
use caption_band::{load_image, load_request, CaptionRequest, Captioner, FontLibrary};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

/// Render caption bands onto an image
#[derive(Parser, Debug)]
#[command(name = "caption-band")]
#[command(version)]
#[command(about = "Fits styled caption text into a band and composites it onto an image")]
pub struct Args {
    /// Source image path
    #[arg(short, long)]
    pub image: Option<String>,

    /// Caption markup (<b>, <i>, <u>, <br>); repeat for a batch
    #[arg(short, long = "text")]
    pub texts: Vec<String>,

    /// JSON request file with image, text and style fields
    #[arg(short, long)]
    pub request: Option<PathBuf>,

    #[arg(long)]
    pub font_family: Option<FontFamily>,

    /// top or bottom
    #[arg(long)]
    pub position: Option<Position>,

    /// Band height as a fraction of the image height
    #[arg(long)]
    pub background_height: Option<f32>,

    /// Band color, e.g. "rgba(0, 0, 0, 180)"
    #[arg(long)]
    pub background_color: Option<String>,

    #[arg(long)]
    pub text_color: Option<String>,

    /// Horizontal margin, percent of the image width
    #[arg(long)]
    pub margin_horizontal: Option<u32>,

    /// Top margin, percent of the band height
    #[arg(long)]
    pub margin_top: Option<u32>,

    /// Bottom margin, percent of the band height
    #[arg(long)]
    pub margin_bottom: Option<u32>,

    /// Fraction of the band used for the fade-in ramp
    #[arg(long)]
    pub transition: Option<f32>,

    /// Font size search strategy: linear or binary
    #[arg(long)]
    pub search: Option<SizeSearch>,

    /// Directory holding <Family>/static/<Family>-<Style>.ttf faces
    #[arg(long, default_value = DEFAULT_FONTS_DIR)]
    pub fonts_dir: PathBuf,

    /// Directory for text_NN_{background,text,combined}.png files
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Print a JSON batch response with base64 PNGs instead of writing files
    #[arg(long)]
    pub json: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Apply command-line overrides on top of a request's style.
    fn apply_style_overrides(&self, mut style: CaptionStyle) -> CaptionStyle {
        if let Some(family) = self.font_family {
            style.font_family = family;
        }
        if let Some(position) = self.position {
            style.text_position = position;
        }
        if let Some(height) = self.background_height {
            style.background_height = height;
        }
        if let Some(color) = &self.background_color {
            style.background_color = color.clone();
        }
        if let Some(color) = &self.text_color {
            style.text_color = color.clone();
        }
        if let Some(margin) = self.margin_horizontal {
            style.margin_horizontal = margin;
        }
        if let Some(margin) = self.margin_top {
            style.margin_top = margin;
        }
        if let Some(margin) = self.margin_bottom {
            style.margin_bottom = margin;
        }
        if let Some(transition) = self.transition {
            style.transition_proportion = transition;
        }
        style
    }
}

/// Fully resolved job: defaults, then request file, then flags
#[derive(Debug)]
struct Job {
    image: String,
    texts: Vec<String>,
    style: CaptionStyle,
    search: SizeSearch,
}

fn resolve_job(args: &Args) -> anyhow::Result<Job> {
    let request = match &args.request {
        Some(path) => load_request(path)
            .with_context(|| format!("failed to read request {}", path.display()))?,
        None => CaptionRequest::default(),
    };

    let image = match args.image.clone().or(request.image) {
        Some(image) => image,
        None => bail!("no source image given (use --image or a request file)"),
    };
    let texts = if args.texts.is_empty() {
        request.text.into_vec()
    } else {
        args.texts.clone()
    };

    Ok(Job {
        image,
        texts,
        style: args.apply_style_overrides(request.style),
        search: args.search.or(request.search).unwrap_or_default(),
    })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    caption_band::logging::init(args.log_file.as_deref()).context("failed to initialize logging")?;

    let job = resolve_job(&args)?;
    info!(image = %job.image, texts = job.texts.len(), style = ?job.style, "caption job resolved");

    let source = load_image(&job.image).with_context(|| format!("failed to load {}", job.image))?;
    let captioner = Captioner::new(FontLibrary::new(&args.fonts_dir)).with_search(job.search);
    let results = captioner.caption_batch(&source, &job.texts, &job.style);

    let failures = results.iter().filter(|result| result.is_err()).count();

    if args.json {
        let response = BatchResponse::from_results(&results);
        println!(
            "{}",
            serde_json::to_string_pretty(&response).context("failed to serialize response")?
        );
    } else {
        for (index, result) in results.iter().enumerate() {
            match result {
                Ok(output) => {
                    let paths = write_outputs(&args.out_dir, index, output)
                        .with_context(|| format!("failed to write outputs for text {}", index + 1))?;
                    info!(index, font_size = ?output.font_size, files = ?paths, "caption written");
                }
                Err(err) => error!(index, error = %err, "caption failed"),
            }
        }
    }

    if failures > 0 && failures == results.len() {
        bail!("all {} caption(s) failed", failures);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_does_not_error() {
        let result = Args::try_parse_from(["caption-band", "--help"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_no_args_defaults() {
        let args = Args::parse_from(["caption-band"]);
        assert_eq!(args.image, None);
        assert!(args.texts.is_empty());
        assert_eq!(args.fonts_dir, PathBuf::from(DEFAULT_FONTS_DIR));
        assert_eq!(args.out_dir, PathBuf::from("."));
        assert!(!args.json);
    }

    #[test]
    fn test_repeated_text_builds_batch() {
        let args = Args::parse_from(["caption-band", "-i", "a.png", "-t", "one", "--text", "two"]);
        assert_eq!(args.texts, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_style_flags_parse() {
        let args = Args::parse_from([
            "caption-band",
            "--font-family",
            "roboto",
            "--position",
            "top",
            "--search",
            "binary",
            "--margin-top",
            "5",
        ]);
        assert_eq!(args.font_family, Some(FontFamily::Roboto));
        assert_eq!(args.position, Some(Position::Top));
        assert_eq!(args.search, Some(SizeSearch::Binary));
        assert_eq!(args.margin_top, Some(5));
    }

    #[test]
    fn test_unknown_family_is_rejected() {
        let result = Args::try_parse_from(["caption-band", "--font-family", "Comic"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_request_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(
            &path,
            r#"{"image": "req.png", "text": ["a", "b"], "text_position": "top", "margin_top": 3}"#,
        )
        .unwrap();

        let args = Args::parse_from([
            "caption-band",
            "--request",
            path.to_str().unwrap(),
            "--position",
            "bottom",
        ]);
        let job = resolve_job(&args).unwrap();
        assert_eq!(job.image, "req.png");
        assert_eq!(job.texts.len(), 2);
        assert_eq!(job.style.text_position, Position::Bottom);
        assert_eq!(job.style.margin_top, 3);
        assert_eq!(job.search, SizeSearch::Linear);
    }

    #[test]
    fn test_missing_image_is_an_error() {
        let args = Args::parse_from(["caption-band", "--text", "hi"]);
        assert!(resolve_job(&args).is_err());
    }
}
