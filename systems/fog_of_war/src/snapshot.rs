//! Persistence format for fog-of-war state.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use overland_core::{Event, FogOfWarState, GridBounds};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::FogOfWar;

const SNAPSHOT_DOMAIN: &str = "fog";
const SNAPSHOT_VERSION: &str = "v1";
const FIELD_DELIMITER: char = ':';

/// Identifier prefix emitted before the encoded snapshot payload.
pub const SNAPSHOT_HEADER: &str = "fog:v1";

/// Row-major copy of every cell state, one byte per cell.
///
/// Bytes encode `0 = Unknown`, `1 = Explored`, `2 = Visible`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FogSnapshot {
    /// Number of columns in the captured map.
    pub width: u32,
    /// Number of rows in the captured map.
    pub height: u32,
    /// Encoded cell states, `width * height` bytes long.
    pub states: Vec<u8>,
}

impl FogSnapshot {
    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    #[must_use]
    pub fn encode(&self) -> String {
        let encoded = STANDARD_NO_PAD.encode(&self.states);
        format!("{SNAPSHOT_HEADER}:{}x{}:{encoded}", self.width, self.height)
    }

    /// Decodes a snapshot from its single-line string form.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] when a segment is missing, unexpected or
    /// malformed, when the payload is not valid base64, or when the payload
    /// length does not match the dimensions.
    pub fn decode(value: &str) -> Result<Self, SnapshotError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SnapshotError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(SnapshotError::MissingPrefix)?;
        let version = parts.next().ok_or(SnapshotError::MissingVersion)?;
        let dimensions = parts.next().ok_or(SnapshotError::MissingDimensions)?;
        let payload = parts.next().ok_or(SnapshotError::MissingPayload)?;
        if let Some(extra) = parts.next() {
            return Err(SnapshotError::UnexpectedSegment(extra.to_owned()));
        }

        if domain != SNAPSHOT_DOMAIN {
            return Err(SnapshotError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(version.to_owned()));
        }

        let (width, height) = parse_dimensions(dimensions)?;
        let states = STANDARD_NO_PAD.decode(payload.as_bytes())?;
        let snapshot = Self {
            width,
            height,
            states,
        };
        snapshot.check_length()?;
        Ok(snapshot)
    }

    fn check_length(&self) -> Result<(), SnapshotError> {
        let expected = u64::from(self.width) * u64::from(self.height);
        let actual = self.states.len() as u64;
        if actual == expected {
            Ok(())
        } else {
            Err(SnapshotError::LengthMismatch { expected, actual })
        }
    }
}

/// Errors produced while applying or decoding fog snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot dimensions differ from the map the engine is bound to.
    #[error("snapshot is {width}x{height} but the map is {expected_width}x{expected_height}")]
    DimensionMismatch {
        /// Width of the bound map.
        expected_width: u32,
        /// Height of the bound map.
        expected_height: u32,
        /// Width recorded in the snapshot.
        width: u32,
        /// Height recorded in the snapshot.
        height: u32,
    },
    /// The state payload does not hold one byte per cell.
    #[error("snapshot holds {actual} states but its dimensions require {expected}")]
    LengthMismatch {
        /// Number of cells implied by the dimensions.
        expected: u64,
        /// Number of state bytes present.
        actual: u64,
    },
    /// The provided string was empty or contained only whitespace.
    #[error("snapshot string was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    #[error("snapshot string is missing the prefix")]
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    #[error("snapshot string is missing the version")]
    MissingVersion,
    /// The encoded snapshot did not include the map dimensions.
    #[error("snapshot string is missing the map dimensions")]
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    #[error("snapshot string is missing the payload")]
    MissingPayload,
    /// The encoded snapshot carried a segment after the payload.
    #[error("unexpected snapshot segment '{0}' after the payload")]
    UnexpectedSegment(String),
    /// The encoded snapshot used an unexpected prefix segment.
    #[error("snapshot prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    #[error("snapshot version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The map dimensions could not be parsed.
    #[error("could not parse map dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode snapshot payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
}

impl FogOfWar {
    /// Captures the current state of every cell.
    ///
    /// An engine that is not bound yet produces an empty `0x0` snapshot.
    #[must_use]
    pub fn capture(&self) -> FogSnapshot {
        let (width, height) = dimensions(self.bounds);
        FogSnapshot {
            width,
            height,
            states: self.states.iter().map(|state| state.as_u8()).collect(),
        }
    }

    /// Restores cell states from a snapshot of the same map size.
    ///
    /// Unrecognised state bytes are restored as [`FogOfWarState::Unknown`].
    /// Every cell whose state changes emits [`Event::FogStateChanged`].
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::DimensionMismatch`] when the snapshot was taken
    /// on a map of another size and [`SnapshotError::LengthMismatch`] when it
    /// does not hold one byte per cell. The engine is left untouched.
    pub fn apply(
        &mut self,
        snapshot: &FogSnapshot,
        out: &mut Vec<Event>,
    ) -> Result<(), SnapshotError> {
        let (expected_width, expected_height) = dimensions(self.bounds);
        if (snapshot.width, snapshot.height) != (expected_width, expected_height) {
            return Err(SnapshotError::DimensionMismatch {
                expected_width,
                expected_height,
                width: snapshot.width,
                height: snapshot.height,
            });
        }
        snapshot.check_length()?;

        for (index, &byte) in snapshot.states.iter().enumerate() {
            if let Some(cell) = self.bounds.coord_at(index) {
                self.set_state(cell, FogOfWarState::from_u8(byte), out);
            }
        }
        tracing::debug!(
            width = snapshot.width,
            height = snapshot.height,
            "fog snapshot applied"
        );
        Ok(())
    }
}

fn dimensions(bounds: GridBounds) -> (u32, u32) {
    (
        u32::try_from(bounds.width()).unwrap_or(0),
        u32::try_from(bounds.height()).unwrap_or(0),
    )
}

fn parse_dimensions(value: &str) -> Result<(u32, u32), SnapshotError> {
    let (width, height) = value
        .split_once('x')
        .ok_or_else(|| SnapshotError::InvalidDimensions(value.to_owned()))?;
    let width = width
        .parse()
        .map_err(|_| SnapshotError::InvalidDimensions(value.to_owned()))?;
    let height = height
        .parse()
        .map_err(|_| SnapshotError::InvalidDimensions(value.to_owned()))?;
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> FogSnapshot {
        FogSnapshot {
            width: 3,
            height: 2,
            states: vec![0, 1, 2, 2, 1, 0],
        }
    }

    #[test]
    fn text_form_carries_header_and_dimensions() {
        let encoded = snapshot().encode();
        assert!(encoded.starts_with("fog:v1:3x2:"));
        assert_eq!(FogSnapshot::decode(&encoded).expect("decodes"), snapshot());
    }

    #[test]
    fn decode_rejects_foreign_and_malformed_strings() {
        assert!(matches!(
            FogSnapshot::decode("   "),
            Err(SnapshotError::EmptyPayload)
        ));
        assert!(matches!(
            FogSnapshot::decode("maze:v1:3x2:AAEC"),
            Err(SnapshotError::InvalidPrefix(prefix)) if prefix == "maze"
        ));
        assert!(matches!(
            FogSnapshot::decode("fog:v2:3x2:AAEC"),
            Err(SnapshotError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            FogSnapshot::decode("fog:v1:3by2:AAEC"),
            Err(SnapshotError::InvalidDimensions(_))
        ));
        assert!(matches!(
            FogSnapshot::decode("fog:v1:3x2"),
            Err(SnapshotError::MissingPayload)
        ));
        assert!(matches!(
            FogSnapshot::decode("fog:v1:3x2:!!!"),
            Err(SnapshotError::InvalidEncoding(_))
        ));
        assert!(matches!(
            FogSnapshot::decode("fog:v1:3x2:AAEC:junk"),
            Err(SnapshotError::UnexpectedSegment(segment)) if segment == "junk"
        ));
    }

    #[test]
    fn decode_checks_payload_length() {
        let short = FogSnapshot {
            width: 3,
            height: 2,
            states: vec![0, 1, 2],
        };
        assert!(matches!(
            FogSnapshot::decode(&short.encode()),
            Err(SnapshotError::LengthMismatch {
                expected: 6,
                actual: 3
            })
        ));
    }

    #[test]
    fn unbound_engine_captures_nothing() {
        let fog = FogOfWar::new();
        assert_eq!(
            fog.capture(),
            FogSnapshot {
                width: 0,
                height: 0,
                states: Vec::new(),
            }
        );
    }
}
