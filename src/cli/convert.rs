//! The conversion run.
//!
//! ```text
//! image glob ──► filters ──► candidates ──par──► policy ──► sink
//!                                                             │
//!                        code glob (only if anything converted)┘
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::{
    config::RunConfig,
    debug,
    image::codec::{Codec, RasterCodec},
    log,
    logger::{self, ProgressLine},
    policy::{Outcome, Policy},
    select::{Filters, PathSet},
    sink::{ResultSink, Workspace},
    utils::{glob, plural::plural_count},
};

/// Counters for the closing summary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub candidates: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunReport {
    fn tally(candidates: usize, outcomes: &[Outcome]) -> Self {
        let converted = outcomes.iter().filter(|o| o.is_converted()).count();
        let failed = outcomes.iter().filter(|o| o.is_failed()).count();
        Self {
            candidates,
            converted,
            skipped: candidates - converted - failed,
            failed,
        }
    }
}

/// Run one conversion pass with the native codec.
pub fn run(config: &RunConfig) -> Result<RunReport> {
    run_with(config, &RasterCodec::new())
}

/// Run one conversion pass.
///
/// Fatal errors (unreadable workspace inputs, bad patterns, log write
/// failures) are returned. Per-candidate failures are logged, recorded and
/// counted.
pub fn run_with<C: Codec>(config: &RunConfig, codec: &C) -> Result<RunReport> {
    let workspace = Workspace::new(&config.workdir);

    let files = glob::resolve(&config.image_glob)
        .with_context(|| format!("failed to resolve image glob `{}`", config.image_glob))?;
    let filters = Filters::load(&workspace, config).context("failed to load workspace inputs")?;
    let candidates = filters.select(&files);
    if let Some(staged) = filters.staged() {
        debug!("select"; "{} staged", plural_count(staged.len(), "path"));
    }
    debug!(
        "select";
        "{} matched, {} selected",
        plural_count(files.len(), "file"),
        candidates.len()
    );

    log!("convert"; "Converting images to alternative format...");

    if candidates.is_empty() {
        log!("convert"; "No images need converting.");
        return Ok(RunReport::default());
    }

    // Siblings are every glob match, staged or not
    let siblings: PathSet = files.into_iter().collect();
    let policy = Policy::new(codec, &siblings, config);
    let sink = ResultSink::new(&workspace);

    let progress = ProgressLine::new("convert", "images", candidates.len());
    let outcomes = candidates
        .par_iter()
        .map(|source| {
            let outcome = policy.evaluate(source);
            sink.record(&outcome)
                .with_context(|| format!("failed to record result for {}", source.display()))?;
            print_outcome(source, &outcome);
            progress.inc();
            Ok(outcome)
        })
        .collect::<Result<Vec<_>>>()?;
    progress.finish();

    let report = RunReport::tally(candidates.len(), &outcomes);

    if report.converted == 0 && report.failed == 0 {
        log!("convert"; "No images need converting.");
    } else if sink.any_converted() {
        record_code_search(config, &filters, &sink)?;
    }

    Ok(report)
}

fn print_outcome(source: &Path, outcome: &Outcome) {
    match outcome {
        Outcome::Converted { target, kind, .. } => {
            logger::success(&converted_line(source));
            debug!("convert"; "{} -> {} ({:?})", source.display(), target.display(), kind);
        }
        Outcome::Failed { error, .. } => {
            logger::failure(&source.display().to_string(), &error.to_string());
        }
        Outcome::Skipped => debug!("convert"; "skipped {}", source.display()),
    }
}

/// Status line for a conversion; names the source, the target is in the logs.
fn converted_line(source: &Path) -> String {
    format!("Converted {}", source.display())
}

/// Record the code files that may reference a converted image.
fn record_code_search(config: &RunConfig, filters: &Filters, sink: &ResultSink) -> Result<()> {
    let Some(pattern) = &config.code_glob else {
        return Ok(());
    };

    let files = glob::resolve(pattern)
        .with_context(|| format!("failed to resolve code glob `{pattern}`"))?;
    let files = filters.restrict_to_staged(files);
    debug!("convert"; "{} to search for references", plural_count(files.len(), "code file"));

    sink.record_code_search(&files)
        .context("failed to write code search list")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::DEFAULT_DIR;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        workspace: Workspace,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            fs::create_dir_all(dir.path().join("img")).unwrap();
            fs::create_dir_all(dir.path().join("src")).unwrap();
            let workspace = Workspace::new(dir.path().join(DEFAULT_DIR));
            workspace.reset().unwrap();
            fs::write(workspace.exclusions(), "").unwrap();
            Self { dir, workspace }
        }

        fn path(&self, rel: &str) -> PathBuf {
            self.dir.path().join(rel)
        }

        /// Write a small image, encoded as `format` whatever the extension says.
        fn image(&self, rel: &str, format: ImageFormat) -> PathBuf {
            let path = self.path(rel);
            DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([200, 100, 50])))
                .save_with_format(&path, format)
                .unwrap();
            path
        }

        fn png(&self, rel: &str) -> PathBuf {
            self.image(rel, ImageFormat::Png)
        }

        fn stage(&self, paths: &[&PathBuf]) {
            let content: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
            fs::write(self.workspace.staged_files(), content.join("\n")).unwrap();
        }

        fn config(&self, image_pattern: &str) -> RunConfig {
            RunConfig {
                image_glob: format!("{}/img/{}", self.dir.path().display(), image_pattern),
                workdir: self.workspace.root().to_path_buf(),
                ..RunConfig::default()
            }
        }

        fn lines(&self, path: &Path) -> Vec<PathBuf> {
            fs::read_to_string(path)
                .unwrap()
                .lines()
                .map(PathBuf::from)
                .collect()
        }
    }

    #[test]
    fn test_staged_png_converts_to_webp() {
        let fx = Fixture::new();
        let png = fx.png("img/a.png");
        fx.stage(&[&png]);

        let report = run(&fx.config("*.png")).unwrap();

        assert_eq!(report.converted, 1);
        assert!(fx.path("img/a.webp").exists());
        assert!(fx.workspace.conversion_marker().exists());
        assert_eq!(fx.lines(&fx.workspace.converted_sources()), vec![png]);
        assert_eq!(
            fx.lines(&fx.workspace.converted_targets()),
            vec![fx.path("img/a.webp")]
        );
    }

    #[test]
    fn test_unstaged_image_is_left_alone() {
        let fx = Fixture::new();
        let staged = fx.png("img/a.png");
        fx.png("img/b.png");
        fx.stage(&[&staged]);

        let report = run(&fx.config("*.png")).unwrap();

        assert_eq!(report.candidates, 1);
        assert!(fx.path("img/a.webp").exists());
        assert!(!fx.path("img/b.webp").exists());
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let fx = Fixture::new();
        let png = fx.png("img/a.png");
        fx.stage(&[&png]);
        let config = fx.config("*.(png|webp)");

        assert_eq!(run(&config).unwrap().converted, 1);

        fx.workspace.reset().unwrap();
        let report = run(&config).unwrap();
        assert_eq!(report.converted, 0);
        assert!(!fx.workspace.conversion_marker().exists());
    }

    #[test]
    fn test_svg_skipped_without_svg_processing() {
        let fx = Fixture::new();
        let svg = fx.path("img/a.svg");
        fs::write(
            &svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"/>"#,
        )
        .unwrap();
        fx.stage(&[&svg]);

        let report = run(&fx.config("*.svg")).unwrap();

        assert_eq!(report.skipped, 1);
        assert!(!fx.path("img/a.webp").exists());
        assert!(!fx.workspace.conversion_marker().exists());
    }

    #[test]
    fn test_webp_only_is_skipped_without_fallback() {
        let fx = Fixture::new();
        let webp = fx.image("img/a.webp", ImageFormat::WebP);
        fx.stage(&[&webp]);

        let report = run(&fx.config("*.webp")).unwrap();

        assert_eq!(report.skipped, 1);
        assert!(!fx.path("img/a.png").exists());
        assert!(!fx.workspace.conversion_marker().exists());
    }

    #[test]
    fn test_fallback_for_migrated_jpeg() {
        let fx = Fixture::new();
        let jpg = fx.image("img/a.jpg", ImageFormat::Jpeg);
        let webp = fx.image("img/a.webp", ImageFormat::WebP);
        fx.stage(&[&jpg, &webp]);
        let config = RunConfig {
            create_fallback_image: true,
            ..fx.config("*.{jpg,webp}")
        };

        let report = run(&config).unwrap();

        assert_eq!(report.converted, 1);
        assert!(fx.path("img/a.png").exists());
        assert_eq!(
            fx.lines(&fx.workspace.converted_targets()),
            vec![fx.path("img/a.png")]
        );
    }

    #[test]
    fn test_broken_image_is_recorded_and_run_continues() {
        let fx = Fixture::new();
        let broken = fx.path("img/broken.png");
        fs::write(&broken, b"definitely not an image").unwrap();
        let good = fx.png("img/good.png");
        fx.stage(&[&broken, &good]);

        let report = run(&fx.config("*.png")).unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.converted, 1);
        assert_eq!(fx.lines(&fx.workspace.errors()), vec![broken]);
        assert!(fx.path("img/good.webp").exists());
    }

    #[test]
    fn test_only_failures_leave_no_marker() {
        let fx = Fixture::new();
        let mislabeled = fx.png("img/a.jpg");
        fx.stage(&[&mislabeled]);

        let report = run(&fx.config("*.jpg")).unwrap();

        assert_eq!(report.failed, 1);
        assert!(!fx.workspace.conversion_marker().exists());
        assert!(!fx.path("img/a.webp").exists());
    }

    #[test]
    fn test_missing_staged_list_is_fatal() {
        let fx = Fixture::new();
        fx.png("img/a.png");

        assert!(run(&fx.config("*.png")).is_err());
        assert!(!fx.path("img/a.webp").exists());
    }

    #[test]
    fn test_excluded_image_is_skipped() {
        let fx = Fixture::new();
        let png = fx.png("img/vendor-logo.png");
        fx.stage(&[&png]);
        fs::write(fx.workspace.exclusions(), "vendor-").unwrap();

        let report = run(&fx.config("*.png")).unwrap();

        assert_eq!(report.candidates, 0);
        assert!(!fx.path("img/vendor-logo.webp").exists());
    }

    #[test]
    fn test_code_search_is_restricted_to_staged() {
        let fx = Fixture::new();
        let png = fx.png("img/a.png");
        let app = fx.path("src/app.vue");
        fs::write(&app, "<img src=\"a.png\">").unwrap();
        fs::write(fx.path("src/other.vue"), "").unwrap();
        fx.stage(&[&png, &app]);
        let config = RunConfig {
            code_glob: Some(format!("{}/src/*.vue", fx.dir.path().display())),
            ..fx.config("*.png")
        };

        run(&config).unwrap();

        assert_eq!(fx.lines(&fx.workspace.code_search_files()), vec![app]);
    }

    #[test]
    fn test_code_search_skipped_when_nothing_converted() {
        let fx = Fixture::new();
        let webp = fx.image("img/a.webp", ImageFormat::WebP);
        fs::write(fx.path("src/app.vue"), "").unwrap();
        fx.stage(&[&webp]);
        let config = RunConfig {
            code_glob: Some(format!("{}/src/*.vue", fx.dir.path().display())),
            override_staged_files: true,
            ..fx.config("*.webp")
        };

        run(&config).unwrap();

        assert!(!fx.workspace.code_search_files().exists());
    }

    #[test]
    fn test_shared_base_name_writes_target_once() {
        let fx = Fixture::new();
        let jpg = fx.image("img/a.jpg", ImageFormat::Jpeg);
        let png = fx.png("img/a.png");
        fx.stage(&[&jpg, &png]);

        let report = run(&fx.config("*.(jpg|png)")).unwrap();

        assert_eq!(report.converted, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(
            fx.lines(&fx.workspace.converted_targets()),
            vec![fx.path("img/a.webp")]
        );
        assert_eq!(fx.lines(&fx.workspace.converted_sources()).len(), 1);
        assert_eq!(fx.lines(&fx.workspace.errors()).len(), 1);
    }

    #[test]
    fn test_animated_gif_becomes_animated_webp() {
        use image::codecs::gif::GifEncoder;
        use image::{Delay, Frame, Rgba, RgbaImage};

        let fx = Fixture::new();
        let gif = fx.path("img/anim.gif");
        let mut encoder = GifEncoder::new(fs::File::create(&gif).unwrap());
        encoder
            .encode_frames((0..3u8).map(|i| {
                Frame::from_parts(
                    RgbaImage::from_pixel(4, 4, Rgba([i * 80, 10, 10, 255])),
                    0,
                    0,
                    Delay::from_numer_denom_ms(100, 1),
                )
            }))
            .unwrap();
        drop(encoder);
        fx.stage(&[&gif]);

        let report = run(&fx.config("*.gif")).unwrap();

        assert_eq!(report.converted, 1);
        let probe = RasterCodec
            .probe(&crate::image::codec::Input::File(fx.path("img/anim.webp")))
            .unwrap();
        assert_eq!(probe.frames, 3);
    }

    #[test]
    fn test_converted_line_names_the_source() {
        assert_eq!(
            converted_line(Path::new("img/a.png")),
            "Converted img/a.png"
        );
    }
}
