//! Wire types for the paddle trainer
//!
//! Uses postcard for compact binary serialization. Two families of messages live
//! here: the per-tick [`Frame`] a renderer draws from, and the whole-session
//! [`SessionSnapshot`] used for save/load.

use postcard::{from_bytes, take_from_bytes, to_allocvec};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current layout version of [`SessionSnapshot`].
pub const SNAPSHOT_VERSION: u16 = 1;

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("failed to encode message: {0}")]
    Encode(#[source] postcard::Error),

    #[error("failed to decode message: {0}")]
    Decode(#[source] postcard::Error),

    #[error("snapshot version {found} is not supported (expected {expected})")]
    VersionMismatch { found: u16, expected: u16 },
}

// ============================================================================
// Render frame
// ============================================================================

/// Axis-aligned box in field coordinates (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxState {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Everything a renderer needs to draw one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub tick: u64,
    pub field_width: f32,
    pub field_height: f32,
    pub left_paddle: BoxState,
    pub right_paddle: BoxState,
    pub ball: BoxState,
    pub score_left: u32,
    pub score_right: u32,
    pub difficulty: f32,
    pub reward_left: f32,
    pub reward_right: f32,
    /// Human-readable events appended during this tick
    pub events: Vec<String>,
}

// ============================================================================
// Session snapshot
// ============================================================================

/// Tunables the session was running with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettingsState {
    pub width: f32,
    pub height: f32,
    pub ball_speed: f32,
    pub paddle_speed: f32,
    pub max_difficulty: f32,
    pub difficulty_increase_rate: f32,
    pub difficulty_decrease_rate: f32,
    pub hit_streak_threshold: u32,
    pub miss_streak_threshold: u32,
    pub speed_increase_rate: f32,
    pub max_speed_multiplier: f32,
    pub max_events: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub speed: f32,
}

/// ChaCha generator position, enough to continue the exact random sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: [u8; 32],
    pub stream: u64,
    pub word_pos: u128,
}

/// Opaque controller state, tagged with the registry kind that can restore it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerBlob {
    pub kind: String,
    pub data: Vec<u8>,
}

/// Per-side session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideState {
    pub score: u32,
    pub hits: u32,
    pub total_reward: f32,
    /// Cumulative reward per shaping term, in `RewardTerms` field order
    pub reward_terms: [f32; 8],
    pub last_distance: f32,
    /// Paddle top edge; x and size are derived from the settings
    pub paddle_y: f32,
    pub controller: ControllerBlob,
}

/// Whole-session save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Must stay the first field: it is peeked before the full decode
    pub version: u16,
    pub tick: u64,
    pub settings: SettingsState,
    pub ball: BallState,
    pub left: SideState,
    pub right: SideState,
    pub difficulty: f32,
    pub consecutive_hits: u32,
    pub consecutive_misses: u32,
    /// 0 = left, 1 = right
    pub last_hit: Option<u8>,
    pub ticks_since_last_hit: u32,
    pub last_speed_multiplier: f32,
    pub rng: RngState,
}

// ============================================================================
// Serialization Helpers
// ============================================================================

impl Frame {
    /// Serialize frame to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtoError> {
        to_allocvec(self).map_err(ProtoError::Encode)
    }

    /// Deserialize frame from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtoError> {
        from_bytes(bytes).map_err(ProtoError::Decode)
    }
}

impl SessionSnapshot {
    /// Serialize snapshot to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProtoError> {
        to_allocvec(self).map_err(ProtoError::Encode)
    }

    /// Deserialize snapshot from bytes, rejecting other layout versions
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtoError> {
        let (found, _) = take_from_bytes::<u16>(bytes).map_err(ProtoError::Decode)?;
        if found != SNAPSHOT_VERSION {
            return Err(ProtoError::VersionMismatch {
                found,
                expected: SNAPSHOT_VERSION,
            });
        }
        from_bytes(bytes).map_err(ProtoError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(kind: &str, score: u32) -> SideState {
        SideState {
            score,
            hits: 4,
            total_reward: -1.25,
            reward_terms: [0.1, -0.02, 0.3, 0.0, 0.05, -0.05, 0.1, 0.2],
            last_distance: 120.5,
            paddle_y: 240.0,
            controller: ControllerBlob {
                kind: kind.to_string(),
                data: vec![1, 2, 3],
            },
        }
    }

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            version: SNAPSHOT_VERSION,
            tick: 4321,
            settings: SettingsState {
                width: 800.0,
                height: 600.0,
                ball_speed: 5.0,
                paddle_speed: 5.0,
                max_difficulty: 2.0,
                difficulty_increase_rate: 0.001,
                difficulty_decrease_rate: 0.0005,
                hit_streak_threshold: 10,
                miss_streak_threshold: 5,
                speed_increase_rate: 0.1,
                max_speed_multiplier: 2.0,
                max_events: 32,
            },
            ball: BallState {
                x: 400.0,
                y: 300.0,
                dx: 4.0,
                dy: -3.0,
                speed: 5.0,
            },
            left: side("learning", 3),
            right: side("scripted", 7),
            difficulty: 1.2,
            consecutive_hits: 0,
            consecutive_misses: 12,
            last_hit: Some(1),
            ticks_since_last_hit: 40,
            last_speed_multiplier: 1.1,
            rng: RngState {
                seed: [7; 32],
                stream: 0,
                word_pos: 1 << 70,
            },
        }
    }

    #[test]
    fn test_snapshot_serialization() {
        let msg = snapshot();
        let bytes = msg.to_bytes().expect("Serialization should succeed");
        let decoded = SessionSnapshot::from_bytes(&bytes).expect("Deserialization should succeed");
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_snapshot_rejects_other_version() {
        let mut msg = snapshot();
        msg.version = SNAPSHOT_VERSION + 1;
        let bytes = msg.to_bytes().expect("Serialization should succeed");
        match SessionSnapshot::from_bytes(&bytes) {
            Err(ProtoError::VersionMismatch { found, expected }) => {
                assert_eq!(found, SNAPSHOT_VERSION + 1);
                assert_eq!(expected, SNAPSHOT_VERSION);
            }
            other => panic!("Expected version mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_snapshot_rejects_truncated_bytes() {
        let bytes = snapshot().to_bytes().expect("Serialization should succeed");
        let truncated = &bytes[..bytes.len() / 2];
        assert!(matches!(
            SessionSnapshot::from_bytes(truncated),
            Err(ProtoError::Decode(_))
        ));
        assert!(matches!(
            SessionSnapshot::from_bytes(&[]),
            Err(ProtoError::Decode(_))
        ));
    }

    #[test]
    fn test_frame_serialization() {
        let msg = Frame {
            tick: 100,
            field_width: 800.0,
            field_height: 600.0,
            left_paddle: BoxState {
                x: 16.0,
                y: 240.0,
                width: 16.0,
                height: 120.0,
            },
            right_paddle: BoxState {
                x: 768.0,
                y: 240.0,
                width: 16.0,
                height: 120.0,
            },
            ball: BoxState {
                x: 394.0,
                y: 294.0,
                width: 12.0,
                height: 12.0,
            },
            score_left: 5,
            score_right: 3,
            difficulty: 1.0,
            reward_left: 0.4,
            reward_right: -0.2,
            events: vec!["Side 1 hit the ball".to_string()],
        };
        let bytes = msg.to_bytes().expect("Serialization should succeed");
        let decoded = Frame::from_bytes(&bytes).expect("Deserialization should succeed");
        assert_eq!(decoded.tick, 100);
        assert_eq!(decoded.events, msg.events);
        assert_eq!(decoded.ball, msg.ball);
    }
}
