//! Reduction of free-text chatbot replies to numeric scores.
//!
//! The ladder, in order: exactly one digit run in the reply wins outright;
//! otherwise a clarification question goes to the judge and the first digit
//! run of its reply wins; otherwise the original candidates are recorded as
//! a quoted list for manual resolution; otherwise the `NONE` sentinel. The
//! judge call fails soft: any error falls through to the last two rungs.

use crate::judge::JudgeClient;
use crate::model::ScoreOutcome;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DIGIT_RUNS: Regex = Regex::new(r"\d+").expect("digit-run pattern");
}

/// Assign a score to one evaluative reply.
pub async fn assign_score(response: &str, judge: Option<&dyn JudgeClient>) -> ScoreOutcome {
    let candidates = digit_runs(response);

    if candidates.len() == 1 {
        if let Ok(value) = candidates[0].parse::<u32>() {
            tracing::debug!("score extracted from a single digit run");
            return ScoreOutcome::Value(value);
        }
    }

    if let Some(judge) = judge {
        let question = clarification_question(response, &candidates);
        match judge.ask(&question).await {
            Ok(reply) => {
                if let Some(first) = digit_runs(&reply).first() {
                    if let Ok(value) = first.parse::<u32>() {
                        tracing::debug!(judge = judge.judge_name(), "score resolved by judge");
                        return ScoreOutcome::Value(value);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(judge = judge.judge_name(), "judge unavailable: {e}");
            }
        }
    }

    if candidates.is_empty() {
        tracing::warn!("no numeric content in reply");
        ScoreOutcome::Missing
    } else {
        tracing::warn!("reply holds {} candidate numbers, leaving for manual resolution", candidates.len());
        ScoreOutcome::Ambiguous(quoted_list(&candidates))
    }
}

/// Clarification question for the judge, embedding the original reply and
/// the ambiguous candidates.
pub fn clarification_question(response: &str, candidates: &[String]) -> String {
    format!(
        "Consider the following answer: {} - \
         This prompt contains the following mentioned numbers: {:?} - \
         Please give me the final assigned score as numerical value, read the scenario very carefully!",
        response, candidates
    )
}

fn digit_runs(text: &str) -> Vec<String> {
    DIGIT_RUNS.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

fn quoted_list(candidates: &[String]) -> String {
    candidates
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(",")
}
