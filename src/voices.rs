//! Voice persona registry
//!
//! Maps a public voice id (e.g. "male-deep") to the acoustic defaults used
//! when driving the speech engine. The table is fixed at compile time and
//! looked up by id; unknown ids resolve to the default persona.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Voice id used when a request names no voice or an unknown one
pub const DEFAULT_VOICE_ID: &str = "female-standard";

/// Grouping shown to clients when listing personas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VoiceCategory {
    Standard,
    Accent,
    #[serde(rename = "Celebrity-like")]
    CelebrityLike,
}

/// Acoustic defaults for a voice persona
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceProfile {
    /// Public identifier, unique across the table
    pub id: &'static str,

    /// Human readable name
    pub display_name: &'static str,

    pub category: VoiceCategory,

    /// Speaking rate in words per minute at speed 1.0
    pub base_rate: u32,

    /// Index into the engine's installed voice list
    pub backend_voice_index: usize,

    /// Engine pitch on a 0-99 scale (50 is the engine default)
    pub base_pitch: u8,
}

/// Public listing entry for a persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceOption {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub category: VoiceCategory,
}

static PROFILES: [VoiceProfile; 8] = [
    VoiceProfile {
        id: "female-standard",
        display_name: "Sarah (Female)",
        category: VoiceCategory::Standard,
        base_rate: 200,
        backend_voice_index: 0,
        base_pitch: 50,
    },
    VoiceProfile {
        id: "male-standard",
        display_name: "David (Male)",
        category: VoiceCategory::Standard,
        base_rate: 180,
        backend_voice_index: 1,
        base_pitch: 30,
    },
    VoiceProfile {
        id: "female-british",
        display_name: "Emma (British)",
        category: VoiceCategory::Accent,
        base_rate: 190,
        backend_voice_index: 0,
        base_pitch: 55,
    },
    VoiceProfile {
        id: "male-british",
        display_name: "James (British)",
        category: VoiceCategory::Accent,
        base_rate: 175,
        backend_voice_index: 1,
        base_pitch: 35,
    },
    VoiceProfile {
        id: "female-australian",
        display_name: "Olivia (Australian)",
        category: VoiceCategory::Accent,
        base_rate: 185,
        backend_voice_index: 0,
        base_pitch: 52,
    },
    VoiceProfile {
        id: "male-deep",
        display_name: "Morgan (Deep)",
        category: VoiceCategory::CelebrityLike,
        base_rate: 160,
        backend_voice_index: 1,
        base_pitch: 20,
    },
    VoiceProfile {
        id: "female-smooth",
        display_name: "Scarlett (Smooth)",
        category: VoiceCategory::CelebrityLike,
        base_rate: 170,
        backend_voice_index: 0,
        base_pitch: 45,
    },
    VoiceProfile {
        id: "male-energetic",
        display_name: "Ryan (Energetic)",
        category: VoiceCategory::CelebrityLike,
        base_rate: 220,
        backend_voice_index: 1,
        base_pitch: 40,
    },
];

static BY_ID: Lazy<HashMap<&'static str, &'static VoiceProfile>> =
    Lazy::new(|| PROFILES.iter().map(|p| (p.id, p)).collect());

/// Look up a persona by id
///
/// Never fails: ids missing from the table resolve to the
/// [`DEFAULT_VOICE_ID`] persona.
pub fn resolve(voice_id: &str) -> &'static VoiceProfile {
    BY_ID
        .get(voice_id)
        .copied()
        .unwrap_or_else(|| BY_ID[DEFAULT_VOICE_ID])
}

/// Check whether an id names a known persona
pub fn is_known(voice_id: &str) -> bool {
    BY_ID.contains_key(voice_id)
}

/// All personas in listing order
pub fn profiles() -> &'static [VoiceProfile] {
    &PROFILES
}

/// Listing entries in the order clients display them
pub fn options() -> Vec<VoiceOption> {
    PROFILES
        .iter()
        .map(|p| VoiceOption {
            id: p.id,
            name: p.display_name,
            category: p.category,
        })
        .collect()
}
