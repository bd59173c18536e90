use std::io::Cursor;
use std::sync::Arc;

use narrate_core::audio::{PcmFormat, RawAudioBuffer, WAV_HEADER_LEN};
use narrate_core::{
    Gender, NarrateError, NarrationRequest, Narrator, NarratorConfig, SpeechSynthesizer,
    SynthesisRequest, SynthesizerHandle, VoicePool, VoiceSelection,
};
use parking_lot::Mutex;

/// Records every request and answers with a fixed PCM ramp.
struct RecordingSynth {
    seen: Arc<Mutex<Vec<SynthesisRequest>>>,
    frames: usize,
}

impl SpeechSynthesizer for RecordingSynth {
    fn name(&self) -> &str {
        "recording"
    }

    fn synthesize(
        &mut self,
        request: &SynthesisRequest,
    ) -> std::result::Result<RawAudioBuffer, NarrateError> {
        self.seen.lock().push(request.clone());
        let bytes = (0..self.frames as i16)
            .flat_map(|s| s.to_le_bytes())
            .collect();
        Ok(RawAudioBuffer::new(bytes, PcmFormat::SPEECH_API))
    }
}

/// Fails every call the way an API rejection would.
struct RejectingSynth;

impl SpeechSynthesizer for RejectingSynth {
    fn name(&self) -> &str {
        "rejecting"
    }

    fn synthesize(
        &mut self,
        _request: &SynthesisRequest,
    ) -> std::result::Result<RawAudioBuffer, NarrateError> {
        Err(NarrateError::Api {
            code: 429,
            status: "RESOURCE_EXHAUSTED".into(),
            message: "quota exceeded".into(),
        })
    }
}

fn recording_narrator(frames: usize) -> (Narrator, Arc<Mutex<Vec<SynthesisRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let synth = RecordingSynth {
        seen: Arc::clone(&seen),
        frames,
    };
    let config = NarratorConfig {
        voice_pool: VoicePool::new(["Orus", "Fenrir"], ["Leda", "Aoede"]).unwrap(),
        ..NarratorConfig::default()
    };
    (Narrator::new(config, SynthesizerHandle::new(synth)), seen)
}

#[test]
fn two_speaker_dialogue_round_trips_through_backend_and_encoder() {
    let (narrator, seen) = recording_narrator(2_400);
    let narration = narrator
        .generate(&NarrationRequest {
            script: "Host: Welcome back.\nGuest: Glad to be here.\nHost: Let's begin.".into(),
            speaker_count: 2,
            gender_hint: "2 nữ".into(),
            accent_hint: "British".into(),
            trailing_silence_secs: 0.5,
        })
        .expect("narration should succeed");

    let requests = seen.lock();
    assert_eq!(requests.len(), 1, "exactly one synthesis attempt");
    assert!(requests[0].text.contains("British accent"));
    assert!(requests[0].text.ends_with("Host: Let's begin."));

    match &narration.voices {
        VoiceSelection::Pair { speakers } => {
            assert_eq!(speakers[0].speaker, "Host");
            assert_eq!(speakers[1].speaker, "Guest");
            assert!(speakers.iter().all(|s| s.gender == Gender::Female));
            assert_eq!(speakers[0].voice.as_str(), "Leda");
            assert_eq!(speakers[1].voice.as_str(), "Aoede");
        }
        other => panic!("expected pair selection, got {other:?}"),
    }

    let bytes = narration.container.as_bytes();
    assert_eq!(bytes.len(), WAV_HEADER_LEN + 2_400 * 2 + 24_000);

    let reader = hound::WavReader::new(Cursor::new(bytes.to_vec())).expect("valid wav");
    assert_eq!(reader.spec().sample_rate, 24_000);
    assert_eq!(reader.duration(), 2_400 + 12_000);
    let samples: Vec<i16> = reader
        .into_samples::<i16>()
        .collect::<Result<_, _>>()
        .expect("decode samples");
    assert_eq!(samples[1_234], 1_234);
    assert!(samples[2_400..].iter().all(|&s| s == 0));
}

#[test]
fn resolution_failures_never_reach_backend() {
    let (narrator, seen) = recording_narrator(10);

    let cases = [
        ("plain prose with no labels", "", 2),
        ("A: only one speaker\nA: still me", "", 2),
        ("A: one\nB: two\nC: three", "", 2),
        ("A: one\nB: two", "1 nam 1 nam 1 nu", 2),
        ("A: one\nB: two", "", 5),
    ];
    for (script, hint, count) in cases {
        let result = narrator.generate(&NarrationRequest {
            script: script.into(),
            speaker_count: count,
            gender_hint: hint.into(),
            ..Default::default()
        });
        assert!(result.is_err(), "expected failure for {script:?} / {hint:?}");
    }
    assert!(seen.lock().is_empty());
}

#[test]
fn error_kinds_are_distinguishable() {
    let (narrator, _) = recording_narrator(10);
    let run = |script: &str, hint: &str| {
        narrator
            .generate(&NarrationRequest {
                script: script.into(),
                speaker_count: 2,
                gender_hint: hint.into(),
                ..Default::default()
            })
            .unwrap_err()
    };

    assert!(matches!(run("no labels", ""), NarrateError::MissingSpeakerLabels));
    assert!(matches!(
        run("A: x\nA: y", ""),
        NarrateError::SpeakerCountMismatch { found: 1 }
    ));
    assert!(matches!(
        run("A: x\nB: y", "3 nam 1 nu"),
        NarrateError::GenderCountMismatch { found: 4 }
    ));
}

#[test]
fn backend_failure_is_surfaced_verbatim() {
    let narrator = Narrator::new(
        NarratorConfig::default(),
        SynthesizerHandle::new(RejectingSynth),
    );
    let err = narrator
        .generate(&NarrationRequest {
            script: "Hello".into(),
            ..Default::default()
        })
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "speech API error 429 (RESOURCE_EXHAUSTED): quota exceeded"
    );
}

#[test]
fn single_speaker_ignores_labels_and_uses_default_voice() {
    let (narrator, seen) = recording_narrator(100);
    let narration = narrator
        .generate(&NarrationRequest {
            script: "A: hi\nB: hello\nC: hey".into(),
            speaker_count: 1,
            gender_hint: "giọng nam".into(),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(
        narration.voices,
        VoiceSelection::Single {
            voice: "Orus".into()
        }
    );
    assert_eq!(seen.lock()[0].text, "A: hi\nB: hello\nC: hey");
    assert_eq!(narration.container.payload().len(), 200);
}
