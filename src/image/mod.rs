//! Image formats and codecs.
//!
//! # Modules
//!
//! - [`format`]: format families, extension kinds and derived paths
//! - [`codec`]: probing and encoding behind the [`codec::Codec`] trait

pub mod codec;
pub mod format;
