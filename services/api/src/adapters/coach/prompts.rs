//! services/api/src/adapters/coach/prompts.rs
//!
//! Prompt text for the interview coach. Every prompt asks for bare JSON, but
//! the parser in `extract` still tolerates prose around it.

use interview_prep_core::domain::{Category, Difficulty};

/// A vendor-neutral prompt. Backends without a system role concatenate the two parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

impl Prompt {
    /// Both parts as one block of text.
    pub fn combined(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}

pub const TEMPERATURE: f32 = 0.7;

const FEEDBACK_INSTRUCTIONS: &str = r#"You are an expert technical interview coach. Analyze the interview answer you are given and provide structured feedback.

Return ONLY a JSON object of this exact shape, with no surrounding text:
{
  "summary": "1-2 sentence overall assessment",
  "strengths": ["strength 1", "strength 2"],
  "improvements": ["improvement 1", "improvement 2"],
  "overallScore": 7
}

"overallScore" is an integer from 0 to 10. Be constructive and specific. Focus on clarity, structure, technical accuracy, and communication."#;

const GENERATION_INSTRUCTIONS: &str = r#"You are an expert technical interviewer who writes realistic interview questions.

Return ONLY a JSON array, with no surrounding text. Each element must have this exact shape:
{
  "title": "short question title, 5 to 200 characters",
  "description": "the full question as asked in an interview, 10 to 5000 characters",
  "difficulty": "{difficulties}",
  "category": "{categories}",
  "tags": ["up to 10 short tags"],
  "suggestedAnswer": "a concise model answer"
}"#;

fn choices<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}

pub fn feedback(question: &str, answer: &str) -> Prompt {
    Prompt {
        system: FEEDBACK_INSTRUCTIONS.to_string(),
        user: format!("Question: \"{question}\"\n\nUser's Answer: \"{answer}\""),
        max_tokens: 500,
    }
}

pub fn question_generation(topic: &str, difficulty: Difficulty, count: u8) -> Prompt {
    let system = GENERATION_INSTRUCTIONS
        .replace("{difficulties}", &choices(&Difficulty::ALL))
        .replace("{categories}", &choices(&Category::ALL));
    Prompt {
        system,
        user: format!(
            "Write exactly {count} distinct {difficulty} interview questions about: \"{topic}\"."
        ),
        max_tokens: 400 * u32::from(count.max(1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_prompt_lists_every_enum_value() {
        let prompt = question_generation("Rust ownership", Difficulty::Hard, 3);
        assert!(prompt.system.contains("EASY | MEDIUM | HARD"));
        assert!(prompt.system.contains("TECHNICAL | BEHAVIORAL | SYSTEM_DESIGN | CODING"));
        assert!(prompt.user.contains("exactly 3 distinct HARD"));
        assert!(prompt.user.contains("Rust ownership"));
        assert_eq!(prompt.max_tokens, 1200);
    }

    #[test]
    fn feedback_prompt_embeds_question_and_answer() {
        let prompt = feedback("What is a mutex?", "A lock.");
        assert!(prompt.user.contains("\"What is a mutex?\""));
        assert!(prompt.user.contains("\"A lock.\""));
        assert!(prompt.combined().starts_with("You are an expert technical interview coach"));
    }
}
