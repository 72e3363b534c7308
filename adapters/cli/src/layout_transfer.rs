use art_gallery_core::{Point, Settings};
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const LAYOUT_DOMAIN: &str = "gallery";
const LAYOUT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded layout payload.
pub(crate) const LAYOUT_HEADER: &str = "gallery:v1";
const FIELD_DELIMITER: char = ':';

/// Everything needed to rebuild a game: the settings, the floor-plan seed and
/// the guards in placement order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct GalleryLayout {
    /// Settings the game was started with.
    pub(crate) settings: Settings,
    /// Seed that reproduces the floor plan.
    pub(crate) seed: u64,
    /// Guard positions in the order they were placed.
    pub(crate) guards: Vec<LayoutGuard>,
}

/// Guard position captured within a layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct LayoutGuard {
    pub(crate) x: f64,
    pub(crate) y: f64,
}

impl From<Point> for LayoutGuard {
    fn from(point: Point) -> Self {
        Self {
            x: point.x(),
            y: point.y(),
        }
    }
}

impl From<LayoutGuard> for Point {
    fn from(guard: LayoutGuard) -> Self {
        Point::new(guard.x, guard.y)
    }
}

impl GalleryLayout {
    /// Encodes the layout into a single-line string that can be pasted back later.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let json = serde_json::to_vec(self).map_err(LayoutTransferError::Serialize)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{LAYOUT_HEADER}{FIELD_DELIMITER}{encoded}"))
    }

    /// Decodes a layout from its string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != LAYOUT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != LAYOUT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
        serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)
    }
}

/// Errors that can occur while encoding or decoding layout codes.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout code was empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("layout code is missing the prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("layout code is missing the version")]
    MissingVersion,
    /// The payload segment was missing.
    #[error("layout code is missing the payload")]
    MissingPayload,
    /// The code used an unexpected prefix segment.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The code used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse layout payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The layout could not be serialised.
    #[error("could not serialise layout: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> GalleryLayout {
        GalleryLayout {
            settings: Settings::new(7, 4, 0.4, true).expect("valid settings"),
            seed: 0xdead_beef,
            guards: vec![
                LayoutGuard { x: 0.25, y: -1.5 },
                LayoutGuard { x: -3.0, y: 2.125 },
            ],
        }
    }

    #[test]
    fn round_trip_populated_layout() {
        let layout = layout();
        let encoded = layout.encode().expect("layout encodes");
        assert!(encoded.starts_with(&format!("{LAYOUT_HEADER}:")));
        assert!(!encoded.contains(char::is_whitespace));

        let decoded = GalleryLayout::decode(&encoded).expect("layout decodes");
        assert_eq!(layout, decoded);
    }

    #[test]
    fn decode_tolerates_surrounding_whitespace() {
        let encoded = layout().encode().expect("layout encodes");
        let decoded = GalleryLayout::decode(&format!("  {encoded}\n")).expect("layout decodes");
        assert_eq!(decoded.seed, 0xdead_beef);
    }

    #[test]
    fn decode_rejects_foreign_codes() {
        assert!(matches!(
            GalleryLayout::decode("   "),
            Err(LayoutTransferError::EmptyPayload)
        ));
        assert!(matches!(
            GalleryLayout::decode("atlas:v1:e30"),
            Err(LayoutTransferError::InvalidPrefix(prefix)) if prefix == "atlas"
        ));
        assert!(matches!(
            GalleryLayout::decode("gallery:v2:e30"),
            Err(LayoutTransferError::UnsupportedVersion(version)) if version == "v2"
        ));
        assert!(matches!(
            GalleryLayout::decode("gallery:v1"),
            Err(LayoutTransferError::MissingPayload)
        ));
        assert!(matches!(
            GalleryLayout::decode("gallery:v1:***"),
            Err(LayoutTransferError::InvalidEncoding(_))
        ));
        assert!(matches!(
            GalleryLayout::decode("gallery:v1:e30"),
            Err(LayoutTransferError::InvalidPayload(_))
        ));
    }

    #[test]
    fn points_convert_both_ways() {
        let guard = LayoutGuard::from(Point::new(1.5, -2.0));
        assert_eq!(Point::from(guard), Point::new(1.5, -2.0));
    }
}
