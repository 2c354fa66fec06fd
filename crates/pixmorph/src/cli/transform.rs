//! The `pixmorph transform` command for transforming a single image.

use anyhow::Context;
use clap::Args;
use pixmorph_core::pipeline::{CropOptions, FilterOptions, ResizeOptions};
use pixmorph_core::{
    CallerId, Config, ErrorResponse, ImageId, JsonCatalog, MemoryImageStore, Pixmorph,
    TransformError, TransformationRequest,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Arguments for the `transform` command.
#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Stored image to transform, looked up in the catalog
    #[arg(long, conflicts_with = "location", required_unless_present = "location")]
    pub image: Option<String>,

    /// Image catalog (JSON array of records). Defaults to storage.catalog_path
    #[arg(long, requires = "image")]
    pub catalog: Option<PathBuf>,

    /// Fetch this location directly: URL, file:// URI or local path
    #[arg(long)]
    pub location: Option<String>,

    /// Resize to exactly WIDTHxHEIGHT
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    pub resize: Option<ResizeOptions>,

    /// Crop WIDTHxHEIGHT+X+Y from the resized image
    #[arg(long, value_name = "WxH+X+Y", value_parser = parse_crop)]
    pub crop: Option<CropOptions>,

    /// Rotate by whole degrees, positive is clockwise
    #[arg(long, allow_negative_numbers = true)]
    pub rotate: Option<f64>,

    /// Convert to grayscale
    #[arg(long)]
    pub grayscale: bool,

    /// Apply a sepia tone
    #[arg(long)]
    pub sepia: bool,

    /// Output format: jpeg, png, webp, tiff, avif, gif
    #[arg(short, long)]
    pub format: Option<String>,

    /// JSON request file; flags given on the command line override it
    #[arg(long)]
    pub request: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Caller identity used for rate limiting
    #[arg(long, default_value = "local", env = "PIXMORPH_CALLER")]
    pub caller: String,
}

/// Execute the transform command.
pub async fn execute(args: TransformArgs, config: Config) -> anyhow::Result<()> {
    let request = build_request(&args)?;
    let caller = CallerId::new(args.caller.as_str());
    tracing::debug!("Request: {}", serde_json::to_string(&request)?);

    let result = match (&args.image, &args.location) {
        (Some(id), _) => {
            let catalog_path = match &args.catalog {
                Some(path) => expand(path),
                None => config.catalog_path(),
            };
            let store = JsonCatalog::load(&catalog_path)
                .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?;
            let pixmorph = Pixmorph::new(config, Arc::new(store))?;
            pixmorph.submit(&caller, &ImageId::new(id.as_str()), &request).await
        }
        (None, Some(location)) => {
            let pixmorph = Pixmorph::new(config, Arc::new(MemoryImageStore::new()))?;
            pixmorph.transform_location(&caller, location, &request).await
        }
        (None, None) => anyhow::bail!("Either --image or --location is required"),
    };

    let image = match result {
        Ok(image) => image,
        Err(e) => {
            // stdout carries image bytes, so the failure body goes to stderr.
            let response = report_failure(&e, &mut std::io::stderr().lock())?;
            anyhow::bail!("Transformation failed ({}): {}", response.kind.http_status(), e);
        }
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &image.bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(
                "Wrote {} ({}x{}, {} bytes, {})",
                path.display(),
                image.width,
                image.height,
                image.bytes.len(),
                image.content_type
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&image.bytes)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Write the JSON failure body to `out`.
fn report_failure(err: &TransformError, out: &mut impl Write) -> anyhow::Result<ErrorResponse> {
    let response = ErrorResponse::from(err);
    writeln!(out, "{}", serde_json::to_string_pretty(&response)?)?;
    Ok(response)
}

/// Merge the optional request file with the stage flags.
fn build_request(args: &TransformArgs) -> anyhow::Result<TransformationRequest> {
    let mut request = match &args.request {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read request {}", path.display()))?;
            TransformationRequest::from_json(&json)?
        }
        None => TransformationRequest::default(),
    };

    if args.resize.is_some() {
        request.resize = args.resize;
    }
    if args.crop.is_some() {
        request.crop = args.crop;
    }
    if args.rotate.is_some() {
        request.rotate = args.rotate;
    }
    if args.grayscale || args.sepia {
        let filters = request.filters.get_or_insert_with(FilterOptions::default);
        filters.grayscale |= args.grayscale;
        filters.sepia |= args.sepia;
    }
    if let Some(format) = &args.format {
        request.format = Some(format.clone());
    }

    Ok(request)
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

/// Parse `WIDTHxHEIGHT`.
fn parse_size(s: &str) -> Result<ResizeOptions, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    Ok(ResizeOptions {
        width: w.trim().parse().map_err(|e| format!("bad width {w:?}: {e}"))?,
        height: h.trim().parse().map_err(|e| format!("bad height {h:?}: {e}"))?,
    })
}

/// Parse `WIDTHxHEIGHT+X+Y`.
fn parse_crop(s: &str) -> Result<CropOptions, String> {
    let mut parts = s.split('+');
    let size = parts.next().unwrap_or_default();
    let (x, y) = match (parts.next(), parts.next(), parts.next()) {
        (Some(x), Some(y), None) => (x, y),
        _ => return Err(format!("expected WIDTHxHEIGHT+X+Y, got {s:?}")),
    };
    let size = parse_size(size)?;
    Ok(CropOptions {
        width: size.width,
        height: size.height,
        x: x.trim().parse().map_err(|e| format!("bad x offset {x:?}: {e}"))?,
        y: y.trim().parse().map_err(|e| format!("bad y offset {y:?}: {e}"))?,
    })
}
