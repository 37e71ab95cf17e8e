//! High-efficiency container detection (HEIF/HEIC/AVIF).
//!
//! These files are ISO-BMFF: a leading `ftyp` box carries a major brand and
//! a list of compatible brands. Only the box header is inspected; pixel data
//! is never decoded.

/// Brands that identify a high-efficiency image or image sequence.
const BRANDS: &[&[u8; 4]] = &[
    b"heic", b"heix", b"heim", b"heis", b"hevc", b"hevx", b"hevm", b"hevs", b"mif1", b"msf1",
    b"avif", b"avis", b"avci", b"avcs",
];

/// Check whether `bytes` start with an `ftyp` box naming a known brand.
pub fn is_heif(bytes: &[u8]) -> bool {
    if bytes.len() < 16 || &bytes[4..8] != b"ftyp" {
        return false;
    }

    let box_len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let end = box_len.clamp(16, bytes.len());

    // major brand at 8..12, minor version at 12..16, compatible brands after
    let major = &bytes[8..12];
    if is_known(major) {
        return true;
    }
    bytes[16..end].chunks_exact(4).any(is_known)
}

fn is_known(brand: &[u8]) -> bool {
    BRANDS.iter().any(|b| b.as_slice() == brand)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ftyp(major: &[u8; 4], compatible: &[&[u8; 4]]) -> Vec<u8> {
        let len = 16 + compatible.len() * 4;
        let mut out = Vec::with_capacity(len);
        out.extend_from_slice(&(len as u32).to_be_bytes());
        out.extend_from_slice(b"ftyp");
        out.extend_from_slice(major);
        out.extend_from_slice(&[0, 0, 0, 0]);
        for brand in compatible {
            out.extend_from_slice(*brand);
        }
        out
    }

    #[test]
    fn test_major_brand() {
        assert!(is_heif(&ftyp(b"heic", &[])));
        assert!(is_heif(&ftyp(b"avif", &[b"mif1"])));
    }

    #[test]
    fn test_compatible_brand() {
        assert!(is_heif(&ftyp(b"xxxx", &[b"isom", b"mif1"])));
    }

    #[test]
    fn test_rejects_mp4_and_garbage() {
        assert!(!is_heif(&ftyp(b"isom", &[b"mp41"])));
        assert!(!is_heif(b"\x89PNG\r\n\x1a\n0000000000"));
        assert!(!is_heif(b"short"));
    }
}
