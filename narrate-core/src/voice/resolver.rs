//! `VoiceResolver` — turns script + hints into concrete voice ids.

use tracing::debug;

use super::gender::{hint_is_male, GenderHint};
use super::script::{distinct_labels, parse_speaker_lines};
use super::{Gender, SpeakerVoice, VoiceId, VoicePool, VoiceSelection};
use crate::error::{NarrateError, Result};

/// Resolves speakers to voices against an injected [`VoicePool`].
#[derive(Debug, Clone, Default)]
pub struct VoiceResolver {
    pool: VoicePool,
}

impl VoiceResolver {
    pub fn new(pool: VoicePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }

    /// Dispatch on the requested speaker count.
    ///
    /// # Errors
    /// `UnsupportedVoiceCount` for counts other than 1 or 2, plus every error
    /// of [`resolve_two_voices`](Self::resolve_two_voices).
    pub fn resolve(
        &self,
        speaker_count: usize,
        script: &str,
        gender_hint: &str,
    ) -> Result<VoiceSelection> {
        match speaker_count {
            1 => Ok(VoiceSelection::Single {
                voice: self.resolve_single_voice(gender_hint),
            }),
            2 => Ok(VoiceSelection::Pair {
                speakers: self.resolve_two_voices(script, gender_hint)?,
            }),
            n => Err(NarrateError::UnsupportedVoiceCount(n)),
        }
    }

    /// Default male voice when the hint names a male speaker, default female
    /// voice otherwise (including an empty hint).
    pub fn resolve_single_voice(&self, gender_hint: &str) -> VoiceId {
        let gender = if hint_is_male(gender_hint) {
            Gender::Male
        } else {
            Gender::Female
        };
        let voice = self.pool.default_voice(gender).clone();
        debug!(%gender, %voice, "resolved single voice");
        voice
    }

    /// Assign one voice to each of the two speakers in `script`.
    ///
    /// # Errors
    /// - `MissingSpeakerLabels` when no line carries a `label:` prefix.
    /// - `SpeakerCountMismatch` unless exactly two distinct labels appear.
    /// - `GenderCountMismatch` when the hint names a count other than 0 or 2.
    pub fn resolve_two_voices(&self, script: &str, gender_hint: &str) -> Result<[SpeakerVoice; 2]> {
        let lines = parse_speaker_lines(script);
        if lines.is_empty() {
            return Err(NarrateError::MissingSpeakerLabels);
        }

        let labels = distinct_labels(&lines);
        let [first, second]: [String; 2] = labels
            .try_into()
            .map_err(|l: Vec<String>| NarrateError::SpeakerCountMismatch { found: l.len() })?;

        let hint = GenderHint::parse(gender_hint);
        let genders = match hint.tags.as_slice() {
            [] => [Gender::Male, Gender::Female],
            &[a, b] => [a, b],
            _ => {
                return Err(NarrateError::GenderCountMismatch {
                    found: hint.requested,
                });
            }
        };

        let mut rotation = Rotation::default();
        let speakers = [
            self.assign(first, genders[0], &mut rotation),
            self.assign(second, genders[1], &mut rotation),
        ];
        debug!(
            first = %speakers[0].voice,
            second = %speakers[1].voice,
            "resolved two-speaker voices"
        );
        Ok(speakers)
    }

    fn assign(&self, speaker: String, gender: Gender, rotation: &mut Rotation) -> SpeakerVoice {
        let voices = self.pool.voices(gender);
        let voice = voices[rotation.next(gender) % voices.len()].clone();
        SpeakerVoice {
            speaker,
            gender,
            voice,
        }
    }
}

/// Per-gender pick counters for a single resolution call.
#[derive(Debug, Default)]
struct Rotation {
    male: usize,
    female: usize,
}

impl Rotation {
    fn next(&mut self, gender: Gender) -> usize {
        let slot = match gender {
            Gender::Male => &mut self.male,
            Gender::Female => &mut self.female,
        };
        let idx = *slot;
        *slot += 1;
        idx
    }
}
