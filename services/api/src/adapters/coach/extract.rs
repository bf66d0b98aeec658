//! services/api/src/adapters/coach/extract.rs
//!
//! Turns a model's free-text completion into domain values.
//!
//! Models often wrap the JSON they were asked for in prose or code fences, so
//! the parser scans for balanced `{...}` / `[...]` spans (skipping brackets
//! inside string literals) and tries each one in order until one deserializes.

use interview_prep_core::domain::{AiFeedback, Difficulty, GeneratedQuestion};
use interview_prep_core::ports::AiError;
use interview_prep_core::validation::{validate_question_input, QuestionInput};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Balanced spans that open with `open`, in order of their start, found
/// lazily. Openers inside a string literal never start a span; an
/// unterminated quote ends at the next newline, as a JSON string must.
pub fn json_candidates(text: &str, open: char) -> Candidates<'_> {
    let close = match open {
        '{' => Some('}'),
        '[' => Some(']'),
        _ => None,
    };
    Candidates {
        text,
        chars: text.char_indices(),
        open,
        close,
        in_string: false,
        escaped: false,
    }
}

pub struct Candidates<'a> {
    text: &'a str,
    chars: std::str::CharIndices<'a>,
    open: char,
    close: Option<char>,
    in_string: bool,
    escaped: bool,
}

impl<'a> Iterator for Candidates<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let close = self.close?;
        while let Some((start, c)) = self.chars.next() {
            if self.in_string {
                match c {
                    _ if self.escaped => self.escaped = false,
                    '\\' => self.escaped = true,
                    '"' | '\n' => self.in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => self.in_string = true,
                c if c == self.open => {
                    let rest = &self.text[start..];
                    if let Some(len) = balanced_end(rest, self.open, close) {
                        return Some(&rest[..len]);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

/// Byte length of the balanced span at the start of `text`, if it closes.
fn balanced_end(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(index + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// Deserializes the first candidate that fits `T`.
fn first_parsable<T: DeserializeOwned>(text: &str, open: char, what: &str) -> Result<T, AiError> {
    let mut last_error = None;
    for candidate in json_candidates(text, open) {
        match serde_json::from_str::<T>(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e),
        }
    }
    match last_error {
        None => Err(AiError::Parse(format!("no JSON {what} found in AI response"))),
        Some(e) => Err(AiError::Parse(format!("invalid {what} in AI response: {e}"))),
    }
}

//=========================================================================================
// Feedback
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFeedback {
    summary: String,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvements: Vec<String>,
    #[serde(alias = "overall_score", alias = "score")]
    overall_score: f64,
}

pub fn parse_feedback(text: &str) -> Result<AiFeedback, AiError> {
    let raw: RawFeedback = first_parsable(text, '{', "feedback object")?;

    if !raw.overall_score.is_finite() || !(0.0..=10.0).contains(&raw.overall_score) {
        return Err(AiError::Parse(format!(
            "feedback score {} is outside 0-10",
            raw.overall_score
        )));
    }

    Ok(AiFeedback {
        summary: raw.summary.trim().to_string(),
        strengths: raw.strengths,
        improvements: raw.improvements,
        // Range checked above.
        overall_score: raw.overall_score.round() as u8,
    })
}

//=========================================================================================
// Generated questions
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGeneratedQuestion {
    title: String,
    description: String,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    category: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default, alias = "answer", alias = "suggested_answer")]
    suggested_answer: Option<String>,
}

/// `"system design"` and `"System-Design"` both become `SYSTEM_DESIGN`.
pub fn normalize_enum_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

/// All-or-nothing: one invalid element fails the whole batch. Elements past
/// `count` are dropped before validation.
pub fn parse_generated_questions(
    text: &str,
    requested: Difficulty,
    count: u8,
) -> Result<Vec<GeneratedQuestion>, AiError> {
    let mut raw: Vec<RawGeneratedQuestion> = first_parsable(text, '[', "question array")?;
    if raw.is_empty() {
        return Err(AiError::Parse("AI returned no questions".to_string()));
    }
    raw.truncate(usize::from(count));

    raw.into_iter()
        .enumerate()
        .map(|(index, q)| {
            let input = QuestionInput {
                title: q.title,
                description: q.description,
                difficulty: q
                    .difficulty
                    .as_deref()
                    .map(normalize_enum_name)
                    .unwrap_or_else(|| requested.as_str().to_string()),
                category: normalize_enum_name(&q.category),
                tags: q.tags,
                company_name: None,
                company_id: None,
            };
            let valid = validate_question_input(&input).map_err(|errors| {
                AiError::Parse(format!("generated question {index} is invalid: {errors}"))
            })?;
            Ok(GeneratedQuestion {
                title: valid.title,
                description: valid.description,
                difficulty: valid.difficulty,
                category: valid.category,
                tags: valid.tags,
                suggested_answer: q
                    .suggested_answer
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty()),
            })
        })
        .collect()
}
