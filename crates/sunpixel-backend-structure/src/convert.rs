//! The conversion entry point: image bytes in, structure bytes out.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use sunpixel_spec::{
    resolve_size, ConversionReport, ConvertError, ConvertResult, ConvertWarning, GridDimensions,
    ProgressEvent, ProgressSink, SizePolicy, Stage, StageTiming, StructureFormat,
    StructureMetadata, Suggestion, WarningCode, REPORT_VERSION,
};
use tracing::{debug, info, warn};

use crate::decode::{decode, image_format};
use crate::encode::{check_size, encode_structure, DEFAULT_NAME};
use crate::palette::{load_palette, DEFAULT_SELECTION};
use crate::resample::resample;
use crate::source::PaletteSource;
use crate::voxel::{build_with_progress, VoxelGrid};
use crate::write::{output_path, write_structure};

/// Caller-facing conversion settings.
///
/// Deserializable from JSON so that callers other than the CLI can build it
/// from a request body; every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertOptions {
    /// Requested grid width. Used only together with `height`.
    pub width: Option<u32>,
    /// Requested grid height. Used only together with `width`.
    pub height: Option<u32>,
    /// Palette names to merge.
    pub palettes: Vec<String>,
    pub format: StructureFormat,
    pub size_policy: SizePolicy,
    /// Structure name. [`convert_file`] uses the output file stem when unset.
    pub name: Option<String>,
    pub metadata: Option<StructureMetadata>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            palettes: DEFAULT_SELECTION.iter().map(|s| s.to_string()).collect(),
            format: StructureFormat::Schem,
            size_policy: SizePolicy::Requested,
            name: None,
            metadata: None,
        }
    }
}

impl ConvertOptions {
    /// The requested size, if both extents were given.
    pub fn requested_size(&self) -> Option<GridDimensions> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(GridDimensions::new(w, h)),
            _ => None,
        }
    }
}

/// A finished conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub voxels: VoxelGrid,
    /// Encoded structure file contents.
    pub bytes: Vec<u8>,
    pub report: ConversionReport,
}

/// Forwards pipeline progress to a sink, keeping percentages non-decreasing.
struct Reporter<P> {
    sink: P,
    percent: u8,
}

impl<P: ProgressSink> Reporter<P> {
    fn new(sink: P) -> Self {
        Self { sink, percent: 0 }
    }

    /// Update progress without a log line.
    fn advance(&mut self, percent: u8, stage: Stage, message: impl Into<String>) {
        self.percent = self.percent.max(percent.min(100));
        self.sink
            .update(ProgressEvent::new(self.percent, stage, message));
    }

    /// Update progress and append the message to the log.
    fn step(&mut self, percent: u8, stage: Stage, message: impl Into<String>) {
        let message = message.into();
        self.log(&message);
        self.advance(percent, stage, message);
    }

    fn log(&mut self, message: &str) {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.sink.log(&format!("[{stamp}] {message}"));
    }

    fn fail(&mut self, error: &ConvertError) {
        let message = format!("conversion failed: {error}");
        self.log(&message);
        self.sink
            .update(ProgressEvent::new(self.percent, Stage::Error, message));
    }
}

/// Percent within `[start, end]` for `done` out of `total`.
fn span_percent(start: u8, end: u8, done: u32, total: u32) -> u8 {
    if total == 0 {
        return end;
    }
    let width = u64::from(end - start);
    start + (width * u64::from(done.min(total)) / u64::from(total)) as u8
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Convert an image into a structure file.
///
/// `extension` names the image type ("png", "jpg", "jpeg"). Progress goes to
/// `sink`: events are non-decreasing in percent and end with either a
/// [`Stage::Done`] event at 100 or a single [`Stage::Error`] event.
///
/// # Errors
///
/// Any [`ConvertError`]; the error is also reported to `sink`.
pub fn convert<S, P>(
    image: &[u8],
    extension: &str,
    options: &ConvertOptions,
    source: &S,
    sink: P,
) -> ConvertResult<Conversion>
where
    S: PaletteSource + ?Sized,
    P: ProgressSink,
{
    let mut reporter = Reporter::new(sink);
    match run(image, extension, options, source, &mut reporter) {
        Ok(conversion) => Ok(conversion),
        Err(error) => {
            warn!(%error, "conversion failed");
            reporter.fail(&error);
            Err(error)
        }
    }
}

fn run<S, P>(
    image: &[u8],
    extension: &str,
    options: &ConvertOptions,
    source: &S,
    reporter: &mut Reporter<P>,
) -> ConvertResult<Conversion>
where
    S: PaletteSource + ?Sized,
    P: ProgressSink,
{
    let mut timings = Vec::new();
    let mut warnings: Vec<ConvertWarning> = Vec::new();
    reporter.step(5, Stage::Init, "starting conversion");
    let image_kind = image_format(extension)?;

    // Palette
    let start = Instant::now();
    reporter.step(
        10,
        Stage::Palette,
        format!("loading palettes: {}", options.palettes.join(", ")),
    );
    let loaded = load_palette(source, &options.palettes)?;
    for warning in &loaded.warnings {
        reporter.log(&warning.to_string());
    }
    warnings.extend(loaded.warnings);
    reporter.step(
        30,
        Stage::Palette,
        format!(
            "loaded {} colors from {} palettes",
            loaded.table.len(),
            loaded.definitions.len()
        ),
    );
    timings.push(StageTiming::new("palette", elapsed_ms(start)));

    // Decode
    let start = Instant::now();
    reporter.step(35, Stage::Decode, format!("decoding {image_kind} image"));
    let pixels = decode(image, image_kind)?;
    let original = pixels.dimensions();
    reporter.step(40, Stage::Decode, format!("decoded image: {original} pixels"));
    timings.push(StageTiming::new("decode", elapsed_ms(start)));

    let resolved = resolve_size(original, options.requested_size(), options.size_policy);
    check_size(options.format, resolved.dimensions)?;
    if let (SizePolicy::Requested, Suggestion::Adjust(alternative)) =
        (options.size_policy, resolved.suggestion)
    {
        let warning = ConvertWarning::new(
            WarningCode::AspectRatioMismatch,
            format!(
                "requested {} does not keep the {original} aspect ratio; suggested {alternative}",
                resolved.dimensions
            ),
        );
        warn!(requested = %resolved.dimensions, suggested = %alternative, "aspect ratio mismatch");
        reporter.log(&warning.to_string());
        warnings.push(warning);
    }

    // Resample
    let start = Instant::now();
    let target = resolved.dimensions;
    reporter.step(45, Stage::Resample, format!("resampling to {target}"));
    let grid = resample(&pixels, target);
    timings.push(StageTiming::new("resample", elapsed_ms(start)));

    // Match
    let start = Instant::now();
    reporter.step(50, Stage::Match, format!("matching {} cells", target.cell_count()));
    let mut last = 50;
    let voxels = build_with_progress(&grid, &loaded.table, |done, total| {
        let percent = span_percent(50, 90, done, total);
        if percent > last {
            last = percent;
            reporter.advance(
                percent,
                Stage::Match,
                format!("matched {done}/{total} rows"),
            );
        }
    })?;
    reporter.step(
        90,
        Stage::Match,
        format!("built grid with {} block types", voxels.palette.len()),
    );
    timings.push(StageTiming::new("match", elapsed_ms(start)));

    // Serialize
    let start = Instant::now();
    reporter.step(90, Stage::Serialize, format!("writing {}", options.format));
    let name = options.name.as_deref().unwrap_or(DEFAULT_NAME);
    let bytes = encode_structure(options.format, &voxels, name, options.metadata.as_ref())?;
    reporter.step(
        95,
        Stage::Serialize,
        format!("encoded {} bytes", bytes.len()),
    );
    timings.push(StageTiming::new("serialize", elapsed_ms(start)));

    let report = ConversionReport {
        report_version: REPORT_VERSION,
        width: voxels.width,
        height: voxels.height,
        cell_count: voxels.cell_count(),
        palette_size: voxels.palette.len(),
        format: options.format,
        source: original,
        suggestion: resolved.suggestion,
        warnings,
        hash: blake3::hash(&bytes).to_hex().to_string(),
        timings,
    };

    info!(
        width = report.width,
        height = report.height,
        cells = report.cell_count,
        format = %report.format,
        "conversion finished"
    );
    reporter.step(
        100,
        Stage::Done,
        format!(
            "done: {}x{} structure, {} blocks",
            report.width, report.height, report.cell_count
        ),
    );

    Ok(Conversion {
        voxels,
        bytes,
        report,
    })
}

/// Convert the image at `input` and write the structure next to `output`.
///
/// The format's extension is appended to `output` when missing, and the
/// structure name defaults to the output file stem. Returns the written path.
/// Nothing is written if the conversion fails.
pub fn convert_file<S, P>(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
    source: &S,
    sink: P,
) -> ConvertResult<(PathBuf, Conversion)>
where
    S: PaletteSource + ?Sized,
    P: ProgressSink,
{
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    // Reject the extension before reading a possibly large file.
    image_format(extension)?;
    let image = fs::read(input)?;

    let path = output_path(output, options.format);
    let mut options = options.clone();
    if options.name.is_none() {
        options.name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string);
    }

    let conversion = convert(&image, extension, &options, source, sink)?;
    write_structure(&path, &conversion.bytes)?;
    debug!(input = %input.display(), output = %path.display(), "wrote conversion");
    Ok((path, conversion))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PixelBuffer;
    use crate::encode::read_structure;
    use crate::source::MemorySource;
    use pretty_assertions::assert_eq;
    use sunpixel_spec::{ErrorCode, NullProgress, ProgressLog, Rgb};

    const PALETTE: &str = r#"# Test
{
    "(255, 0, 0)": ["minecraft:red_wool", 14],
    "(0, 0, 255)": ["minecraft:blue_wool", 11],
    "(255, 255, 255)": ["minecraft:white_wool", 0]
}"#;

    fn source() -> MemorySource {
        MemorySource::new().with("test", PALETTE)
    }

    fn options() -> ConvertOptions {
        ConvertOptions {
            palettes: vec!["test".to_string()],
            ..Default::default()
        }
    }

    fn png(buffer: &PixelBuffer) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, buffer.width, buffer.height);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&buffer.to_rgb8()).unwrap();
        }
        out
    }

    fn solid(width: u32, height: u32, color: Rgb) -> Vec<u8> {
        png(&PixelBuffer::new(width, height, color))
    }

    #[test]
    fn test_oversized_grid_fails_before_resampling() {
        let image = solid(1, 1, Rgb::new(255, 0, 0));
        for (width, height) in [(70_000, 70_000), (u32::MAX, u32::MAX)] {
            let options = ConvertOptions {
                width: Some(width),
                height: Some(height),
                ..options()
            };
            let mut log = ProgressLog::new();
            let err = convert(&image, "png", &options, &source(), &mut log).unwrap_err();
            assert_eq!(err.error_code(), ErrorCode::Serialization);
            assert!(log.events.iter().all(|e| e.stage != Stage::Resample));
            assert_eq!(log.last().unwrap().stage, Stage::Error);
        }
    }

    #[test]
    fn test_options_defaults() {
        let options: ConvertOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.palettes, vec!["wool", "concrete"]);
        assert_eq!(options.format, StructureFormat::Schem);
        assert_eq!(options.requested_size(), None);

        let half = ConvertOptions {
            width: Some(10),
            ..Default::default()
        };
        assert_eq!(half.requested_size(), None);
    }

    #[test]
    fn test_options_reject_unknown_fields() {
        assert!(serde_json::from_str::<ConvertOptions>(r#"{"colour": 1}"#).is_err());
    }

    #[test]
    fn test_solid_red_single_block() {
        let image = solid(2, 2, Rgb::new(255, 0, 0));
        let opts = ConvertOptions {
            width: Some(1),
            height: Some(1),
            ..options()
        };
        let conversion = convert(&image, "png", &opts, &source(), NullProgress).unwrap();

        assert_eq!(conversion.voxels.palette, vec!["minecraft:red_wool"]);
        assert_eq!(conversion.voxels.indices, vec![0]);
        assert_eq!(conversion.voxels.aux, vec![14]);
        assert_eq!(conversion.report.cell_count, 1);
        assert_eq!(conversion.report.source, GridDimensions::new(2, 2));
        assert_eq!(conversion.report.hash, blake3::hash(&conversion.bytes).to_hex().to_string());
    }

    #[test]
    fn test_original_size_when_unrequested() {
        let image = solid(3, 2, Rgb::new(0, 0, 250));
        let conversion = convert(&image, "png", &options(), &source(), NullProgress).unwrap();
        assert_eq!(conversion.report.dimensions(), GridDimensions::new(3, 2));
        assert_eq!(conversion.report.cell_count, 6);
        assert_eq!(conversion.report.suggestion, Suggestion::Keep);
    }

    #[test]
    fn test_aspect_mismatch_warns_and_honors_request() {
        let image = solid(200, 200, Rgb::WHITE);
        let opts = ConvertOptions {
            width: Some(100),
            height: Some(50),
            ..options()
        };
        let conversion = convert(&image, "png", &opts, &source(), NullProgress).unwrap();
        assert_eq!(conversion.report.dimensions(), GridDimensions::new(100, 50));
        assert_eq!(
            conversion.report.suggestion,
            Suggestion::Adjust(GridDimensions::new(50, 50))
        );
        assert!(conversion.report.has_warning(WarningCode::AspectRatioMismatch));
    }

    #[test]
    fn test_suggested_policy_uses_alternative() {
        let image = solid(200, 200, Rgb::WHITE);
        let opts = ConvertOptions {
            width: Some(100),
            height: Some(50),
            size_policy: SizePolicy::Suggested,
            ..options()
        };
        let conversion = convert(&image, "png", &opts, &source(), NullProgress).unwrap();
        assert_eq!(conversion.report.dimensions(), GridDimensions::new(50, 50));
        assert!(!conversion.report.has_warning(WarningCode::AspectRatioMismatch));
    }

    #[test]
    fn test_progress_monotonic_and_done() {
        let image = solid(4, 16, Rgb::new(250, 5, 5));
        let mut log = ProgressLog::new();
        convert(&image, "png", &options(), &source(), &mut log).unwrap();

        assert!(log.is_monotonic());
        assert_eq!(log.events.first().unwrap().percent, 5);
        let last = log.last().unwrap();
        assert_eq!((last.percent, last.stage), (100, Stage::Done));
        assert!(log.events.iter().any(|e| e.stage == Stage::Match && e.percent > 50));
        assert!(log.lines.iter().all(|l| l.starts_with('[') && l.as_bytes()[9] == b']'));
    }

    #[test]
    fn test_failure_ends_with_error_event() {
        let mut log = ProgressLog::new();
        let err = convert(b"not an image", "png", &options(), &source(), &mut log).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ImageDecode);

        assert!(log.is_monotonic());
        let last = log.last().unwrap();
        assert_eq!(last.stage, Stage::Error);
        assert_eq!(log.events.iter().filter(|e| e.stage.is_terminal()).count(), 1);
    }

    #[test]
    fn test_error_taxonomy() {
        let image = solid(1, 1, Rgb::WHITE);
        let err = convert(&image, "gif", &options(), &source(), NullProgress).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::UnsupportedImageFormat);

        let missing = ConvertOptions {
            palettes: vec!["nope".to_string()],
            ..Default::default()
        };
        let err = convert(&image, "png", &missing, &source(), NullProgress).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::EmptyPalette);
    }

    #[test]
    fn test_each_format_reads_back() {
        let image = solid(5, 3, Rgb::new(10, 10, 240));
        for format in StructureFormat::ALL {
            let opts = ConvertOptions {
                format,
                ..options()
            };
            let conversion = convert(&image, "png", &opts, &source(), NullProgress).unwrap();
            let decoded = read_structure(format, &conversion.bytes).unwrap();
            assert_eq!((decoded.width, decoded.length), (5, 3));
            assert_eq!(decoded.palette, vec!["minecraft:blue_wool"]);
            assert_eq!(decoded.placed_count(), 15);
        }
    }

    #[test]
    fn test_convert_file_writes_with_extension_and_stem_name() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.png");
        fs::write(&input, solid(2, 2, Rgb::new(255, 0, 0))).unwrap();

        let opts = ConvertOptions {
            format: StructureFormat::Json,
            ..options()
        };
        let (path, _) = convert_file(
            &input,
            &dir.path().join("out").join("mural"),
            &opts,
            &source(),
            NullProgress,
        )
        .unwrap();

        assert_eq!(path, dir.path().join("out").join("mural.json"));
        let decoded = read_structure(StructureFormat::Json, &fs::read(&path).unwrap()).unwrap();
        assert_eq!(decoded.name.as_deref(), Some("mural"));
    }

    #[test]
    fn test_convert_file_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.png");
        fs::write(&input, b"garbage").unwrap();
        let output = dir.path().join("out.schem");

        assert!(convert_file(&input, &output, &options(), &source(), NullProgress).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_span_percent() {
        assert_eq!(span_percent(50, 90, 0, 10), 50);
        assert_eq!(span_percent(50, 90, 5, 10), 70);
        assert_eq!(span_percent(50, 90, 10, 10), 90);
        assert_eq!(span_percent(50, 90, 3, 0), 90);
    }
}
