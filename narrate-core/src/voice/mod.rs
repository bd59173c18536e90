//! Voice assignment: maps free-form script + hint input onto the fixed voice
//! roster of the speech backend.
//!
//! ```text
//! gender hint ─► normalize_hint ─► parse_gender_hint ─┐
//!                                                     ├─► VoiceResolver ─► VoiceSelection
//! script ──────► parse_speaker_lines ─► labels ───────┘
//! ```
//!
//! Every resolution is a pure function of its inputs and the injected
//! [`VoicePool`]; the per-gender rotation indices live only for one call.

pub mod gender;
pub mod normalize;
pub mod resolver;
pub mod script;

pub use gender::{classify_token, parse_gender_hint, GenderHint};
pub use normalize::normalize_hint;
pub use resolver::VoiceResolver;
pub use script::{distinct_labels, parse_speaker_lines, SpeakerLine};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{NarrateError, Result};

/// Speaker gender tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Gender::Male => "male",
            Gender::Female => "female",
        })
    }
}

/// Identifier of a prebuilt backend voice (e.g. `"Kore"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceId(pub String);

impl VoiceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VoiceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A script speaker label paired with the voice that reads its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerVoice {
    pub speaker: String,
    pub gender: Gender,
    pub voice: VoiceId,
}

/// Outcome of voice resolution, ready to be described to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode")]
pub enum VoiceSelection {
    Single { voice: VoiceId },
    Pair { speakers: [SpeakerVoice; 2] },
}

impl VoiceSelection {
    pub fn speaker_count(&self) -> usize {
        match self {
            VoiceSelection::Single { .. } => 1,
            VoiceSelection::Pair { .. } => 2,
        }
    }
}

const DEFAULT_MALE_VOICES: &[&str] = &[
    "Puck",
    "Charon",
    "Fenrir",
    "Orus",
    "Enceladus",
    "Iapetus",
    "Algieba",
    "Algenib",
    "Rasalgethi",
    "Alnilam",
    "Schedar",
    "Achird",
    "Zubenelgenubi",
    "Sadaltager",
    "Umbriel",
];

const DEFAULT_FEMALE_VOICES: &[&str] = &[
    "Kore",
    "Zephyr",
    "Leda",
    "Aoede",
    "Callirrhoe",
    "Autonoe",
    "Despina",
    "Erinome",
    "Laomedeia",
    "Achernar",
    "Gacrux",
    "Pulcherrima",
    "Vindemiatrix",
    "Sadachbia",
    "Sulafat",
];

/// Ordered voice rosters, one per gender. The first entry of each list is
/// that gender's default voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoicePool {
    male: Vec<VoiceId>,
    female: Vec<VoiceId>,
}

impl VoicePool {
    /// Build a pool from raw names. Blank names are dropped.
    ///
    /// # Errors
    /// Returns `NarrateError::EmptyVoicePool` if either list ends up empty.
    pub fn new<M, F, S>(male: M, female: F) -> Result<Self>
    where
        M: IntoIterator<Item = S>,
        F: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let male = clean_names(male);
        let female = clean_names(female);
        if male.is_empty() {
            return Err(NarrateError::EmptyVoicePool(Gender::Male));
        }
        if female.is_empty() {
            return Err(NarrateError::EmptyVoicePool(Gender::Female));
        }
        Ok(Self { male, female })
    }

    pub fn voices(&self, gender: Gender) -> &[VoiceId] {
        match gender {
            Gender::Male => &self.male,
            Gender::Female => &self.female,
        }
    }

    /// Default voice for `gender` (head of its list).
    pub fn default_voice(&self, gender: Gender) -> &VoiceId {
        &self.voices(gender)[0]
    }
}

impl Default for VoicePool {
    fn default() -> Self {
        Self {
            male: DEFAULT_MALE_VOICES.iter().map(|&v| VoiceId::from(v)).collect(),
            female: DEFAULT_FEMALE_VOICES.iter().map(|&v| VoiceId::from(v)).collect(),
        }
    }
}

fn clean_names<I, S>(names: I) -> Vec<VoiceId>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| n.as_ref().trim().to_string())
        .filter(|n| !n.is_empty())
        .map(VoiceId)
        .collect()
}
