//! Speaker-labelled script parsing.
//!
//! A line opens a new speaker turn when it starts with a label made of
//! letters, digits and spaces followed immediately by a colon:
//!
//! ```text
//! Alice: Good morning.
//! Bob 2: Morning!
//!   and how are you?        ← continuation of Bob 2's turn
//! ```

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

const SPEAKER_LINE_PATTERN: &str = r"^([\p{L}\p{M}\p{N} ]+):(.*)$";

static SPEAKER_LINE_REGEX: OnceLock<Regex> = OnceLock::new();

fn speaker_line_regex() -> &'static Regex {
    SPEAKER_LINE_REGEX
        .get_or_init(|| Regex::new(SPEAKER_LINE_PATTERN).expect("invalid regex pattern"))
}

/// One speaker turn of a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeakerLine {
    pub label: String,
    pub text: String,
}

/// Split `script` into speaker turns.
///
/// Lines without a label are appended to the preceding turn; lines before the
/// first label are dropped. Labels are trimmed of surrounding spaces.
pub fn parse_speaker_lines(script: &str) -> Vec<SpeakerLine> {
    let re = speaker_line_regex();
    let mut out: Vec<SpeakerLine> = Vec::new();

    for line in script.lines() {
        let labelled = re.captures(line).and_then(|caps| {
            let label = caps.get(1)?.as_str().trim();
            if label.is_empty() {
                return None;
            }
            let text = caps.get(2).map_or("", |m| m.as_str()).trim();
            Some((label.to_string(), text.to_string()))
        });

        match (labelled, out.last_mut()) {
            (Some((label, text)), _) => out.push(SpeakerLine { label, text }),
            (None, Some(prev)) => {
                let extra = line.trim();
                if !extra.is_empty() {
                    if !prev.text.is_empty() {
                        prev.text.push('\n');
                    }
                    prev.text.push_str(extra);
                }
            }
            (None, None) => {}
        }
    }
    out
}

/// Distinct labels in order of first appearance.
pub fn distinct_labels(lines: &[SpeakerLine]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for line in lines {
        if !labels.iter().any(|l| l == &line.label) {
            labels.push(line.label.clone());
        }
    }
    labels
}
