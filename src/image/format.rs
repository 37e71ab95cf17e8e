//! Image format families and per-candidate derived paths.
//!
//! Two vocabularies live here:
//!
//! - [`ImageFormat`]: the *actual* format family a file decodes as
//!   (what the codec reports after probing)
//! - [`Ext`]: the fixed set of extensions a candidate may have siblings for,
//!   used to build the [`DerivedPaths`] table
//!
//! Extension synonyms collapse into one family (`jpg`/`jpe`/`jfif` → jpeg,
//! `tif` → tiff, the high-efficiency container names → heif).

use std::path::{Path, PathBuf};

/// Extensions of the jpeg family.
pub const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg", "jpe", "jif", "jfif", "jfi"];

/// Extensions of the high-efficiency (heif) family.
pub const HEIF_EXTENSIONS: &[&str] = &[
    "heif", "heifs", "heic", "heics", "avci", "avcs", "avif", "avifs",
];

/// Actual format family of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Svg,
    Tiff,
    Bmp,
    Heif,
    Webp,
    /// Decoded pixels with no container (synthesized from a raw bitmap).
    Raw,
}

impl ImageFormat {
    /// Family expected for a file extension.
    ///
    /// Matching is exact: `JPG` is not a jpeg extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        if JPEG_EXTENSIONS.contains(&ext) {
            return Some(Self::Jpeg);
        }
        if HEIF_EXTENSIONS.contains(&ext) {
            return Some(Self::Heif);
        }
        match ext {
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "svg" => Some(Self::Svg),
            "tif" | "tiff" => Some(Self::Tiff),
            "bmp" => Some(Self::Bmp),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Canonical lowercase name, as printed in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Svg => "svg",
            Self::Tiff => "tiff",
            Self::Bmp => "bmp",
            Self::Heif => "heif",
            Self::Webp => "webp",
            Self::Raw => "raw",
        }
    }

    /// Whether a file with extension `ext` may legitimately contain this format.
    ///
    /// `Raw` always matches: it only comes from pixels the bitmap decoder
    /// just produced.
    pub fn matches_extension(self, ext: &str) -> bool {
        self == Self::Raw || Self::from_extension(ext) == Some(self)
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Extensions tracked in a candidate's [`DerivedPaths`] table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ext {
    Jpg,
    Jpeg,
    Png,
    Gif,
    Svg,
    Tif,
    Tiff,
    Bmp,
    Heif,
    Heifs,
    Heic,
    Heics,
    Avci,
    Avcs,
    Avif,
    Avifs,
    Webp,
}

impl Ext {
    pub const COUNT: usize = 17;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Jpg,
        Self::Jpeg,
        Self::Png,
        Self::Gif,
        Self::Svg,
        Self::Tif,
        Self::Tiff,
        Self::Bmp,
        Self::Heif,
        Self::Heifs,
        Self::Heic,
        Self::Heics,
        Self::Avci,
        Self::Avcs,
        Self::Avif,
        Self::Avifs,
        Self::Webp,
    ];

    /// Formats a candidate is considered migrated to: the primary target
    /// plus every high-efficiency container.
    pub const MIGRATED: [Self; 9] = [
        Self::Webp,
        Self::Heif,
        Self::Heifs,
        Self::Heic,
        Self::Heics,
        Self::Avci,
        Self::Avcs,
        Self::Avif,
        Self::Avifs,
    ];

    /// Formats that already serve as a fallback for older consumers.
    pub const LEGACY: [Self; 8] = [
        Self::Jpg,
        Self::Jpeg,
        Self::Png,
        Self::Gif,
        Self::Svg,
        Self::Tif,
        Self::Tiff,
        Self::Bmp,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Svg => "svg",
            Self::Tif => "tif",
            Self::Tiff => "tiff",
            Self::Bmp => "bmp",
            Self::Heif => "heif",
            Self::Heifs => "heifs",
            Self::Heic => "heic",
            Self::Heics => "heics",
            Self::Avci => "avci",
            Self::Avcs => "avcs",
            Self::Avif => "avif",
            Self::Avifs => "avifs",
            Self::Webp => "webp",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Sibling paths of one candidate: same directory and base name, one entry
/// per [`Ext`].
#[derive(Debug, Clone)]
pub struct DerivedPaths {
    paths: [PathBuf; Ext::COUNT],
}

impl DerivedPaths {
    pub fn new(source: &Path) -> Self {
        Self {
            paths: Ext::ALL.map(|ext| source.with_extension(ext.as_str())),
        }
    }

    #[inline]
    pub fn get(&self, ext: Ext) -> &Path {
        &self.paths[ext.index()]
    }

    /// Iterate the derived paths for a set of extensions.
    pub fn select<'a>(&'a self, exts: &'a [Ext]) -> impl Iterator<Item = &'a Path> + 'a {
        exts.iter().map(|ext| self.get(*ext))
    }
}

/// Extension of a path as written (no case folding), or `""`.
pub fn extension_of(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or_default()
}
