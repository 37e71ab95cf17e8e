//! Per-candidate conversion policy.
//!
//! Each candidate goes through the same state machine, independently of
//! every other candidate:
//!
//! ```text
//!            ┌────────────┐  svg, svg processing off
//! source ──► │ ext gate   │ ─────────────────────────► Skip
//!            └─────┬──────┘  bmp: decode to raw pixels
//!                  ▼
//!            ┌────────────┐  probe failed
//!            │ probe      │ ─────────────────────────► Fail(Metadata)
//!            └─────┬──────┘
//!                  ▼
//!            ┌────────────┐  actual format ∉ ext family
//!            │ consistent │ ─────────────────────────► Fail(FormatMismatch)
//!            └─────┬──────┘
//!                  ▼
//!            ┌────────────┐  no migrated sibling
//!            │ migrated?  │ ─────────────────────────► Emit(<base>.webp, Primary)
//!            └─────┬──────┘
//!                  ▼         fallback requested, no legacy sibling
//!            ┌────────────┐ ─────────────────────────► Emit(<base>.png|gif, Fallback)
//!            │ fallback?  │
//!            └─────┬──────┘
//!                  ▼
//!                 Skip
//! ```
//!
//! The sibling set is the full image glob result of the run: the policy
//! never touches the filesystem to ask whether a derivative exists.
//!
//! Candidates sharing a base name (`a.jpg`, `a.png`) derive the same target.
//! The first to reach the encoder claims it; later ones fail with
//! [`ConvertError::TargetTaken`] instead of writing the file again.


use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::config::RunConfig;
use crate::image::codec::{Codec, CodecError, EncodeParams, Input};
use crate::image::format::{DerivedPaths, Ext, ImageFormat, extension_of};
use crate::select::PathSet;

/// Vector sources smaller than this are encoded losslessly.
const SMALL_SVG_BYTES: u64 = 1024;

/// Which derivative a conversion produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// The alternative format (WebP).
    Primary,
    /// A legacy-format copy for consumers without WebP support.
    Fallback,
}

/// Per-candidate failures. None of them stops the run.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("error processing metadata: {0}")]
    Metadata(CodecError),

    #[error("has extension `{ext}` but metadata format of `{actual}`")]
    FormatMismatch { ext: String, actual: ImageFormat },

    #[error("error processing image: {0}")]
    Encode(CodecError),

    #[error("target `{}` is already produced by another image", target.display())]
    TargetTaken { target: PathBuf },
}

/// A conversion the policy decided on.
#[derive(Debug)]
pub struct Plan {
    pub input: Input,
    pub target: PathBuf,
    pub kind: TargetKind,
    pub params: EncodeParams,
}

/// Classification of one candidate.
#[derive(Debug)]
pub enum Decision {
    Emit(Plan),
    Skip,
    Fail(ConvertError),
}

/// Final outcome of one candidate.
#[derive(Debug)]
pub enum Outcome {
    Converted {
        source: PathBuf,
        target: PathBuf,
        kind: TargetKind,
    },
    Skipped,
    Failed {
        source: PathBuf,
        error: ConvertError,
    },
}

impl Outcome {
    pub const fn is_converted(&self) -> bool {
        matches!(self, Self::Converted { .. })
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Conversion policy for one run.
///
/// `Sync`: candidates can be evaluated from any number of threads. The only
/// mutable state is the set of claimed targets.
pub struct Policy<'a, C: Codec + ?Sized> {
    codec: &'a C,
    siblings: &'a PathSet,
    config: &'a RunConfig,
    claimed: Mutex<FxHashSet<PathBuf>>,
}

impl<'a, C: Codec + ?Sized> Policy<'a, C> {
    pub fn new(codec: &'a C, siblings: &'a PathSet, config: &'a RunConfig) -> Self {
        Self {
            codec,
            siblings,
            config,
            claimed: Mutex::new(FxHashSet::default()),
        }
    }

    /// Classify and, when a conversion is due, encode it.
    pub fn evaluate(&self, source: &Path) -> Outcome {
        let plan = match self.classify(source) {
            Decision::Emit(plan) => plan,
            Decision::Skip => return Outcome::Skipped,
            Decision::Fail(error) => return failed(source, error),
        };

        if !self.claimed.lock().insert(plan.target.clone()) {
            return failed(source, ConvertError::TargetTaken { target: plan.target });
        }

        match self.codec.encode(&plan.input, &plan.target, &plan.params) {
            Ok(()) => Outcome::Converted {
                source: source.to_path_buf(),
                target: plan.target,
                kind: plan.kind,
            },
            Err(err) => failed(source, ConvertError::Encode(err)),
        }
    }

    /// Decide what to do with `source` without writing anything.
    pub fn classify(&self, source: &Path) -> Decision {
        match self.plan(source) {
            Ok(Some(plan)) => Decision::Emit(plan),
            Ok(None) => Decision::Skip,
            Err(error) => Decision::Fail(error),
        }
    }

    fn plan(&self, source: &Path) -> Result<Option<Plan>, ConvertError> {
        let ext = extension_of(source);
        let mut small_svg = false;

        let input = match ext {
            "svg" => {
                if !self.config.process_svg_files {
                    return Ok(None);
                }
                let size = fs::metadata(source)
                    .map_err(|err| ConvertError::Metadata(CodecError::Io(source.into(), err)))?
                    .len();
                small_svg = size < SMALL_SVG_BYTES;
                Input::File(source.to_path_buf())
            }
            "bmp" => self
                .codec
                .decode_bitmap(source)
                .map_err(ConvertError::Metadata)?,
            _ => Input::File(source.to_path_buf()),
        };

        let probe = self.codec.probe(&input).map_err(ConvertError::Metadata)?;
        if !probe.format.matches_extension(ext) {
            return Err(ConvertError::FormatMismatch {
                ext: ext.to_string(),
                actual: probe.format,
            });
        }

        let derived = DerivedPaths::new(source);

        let migrated = derived
            .select(&Ext::MIGRATED)
            .any(|path| path == source || self.siblings.contains(path));
        if !migrated {
            let lossless = small_svg
                || matches!(
                    probe.format,
                    ImageFormat::Gif | ImageFormat::Bmp | ImageFormat::Raw
                );
            return Ok(Some(Plan {
                input,
                target: derived.get(Ext::Webp).to_path_buf(),
                kind: TargetKind::Primary,
                params: EncodeParams::webp(lossless),
            }));
        }

        if !self.config.create_fallback_image {
            return Ok(None);
        }

        // The source itself does not count as an existing fallback
        let has_legacy = derived
            .select(&Ext::LEGACY)
            .any(|path| path != source && self.siblings.contains(path));
        if has_legacy {
            return Ok(None);
        }

        let (ext, params) = if probe.is_animated() {
            (Ext::Gif, EncodeParams::gif())
        } else {
            (Ext::Png, EncodeParams::png())
        };
        let target = derived.get(ext);
        if target == source {
            return Ok(None);
        }

        Ok(Some(Plan {
            input,
            target: target.to_path_buf(),
            kind: TargetKind::Fallback,
            params,
        }))
    }
}

fn failed(source: &Path, error: ConvertError) -> Outcome {
    Outcome::Failed {
        source: source.to_path_buf(),
        error,
    }
}
