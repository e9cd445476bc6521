//! Prompt-sequence expansion.
//!
//! Builds the exact ordered prompt sequence a run submits: the two-element
//! user-context preamble, then every scenario's statement slots, transformed
//! by the selected enhancement method. The layout produced here is load
//! bearing: reassembly indexes the flat response stream with
//! [`EnhancementMethod::scenario_stride`], so any change to the insertion
//! points silently misaligns scores to the wrong scenario.

use crate::errors::BenchError;
use crate::model::{EnhancementMethod, ScenarioRecord, Tier, PREAMBLE_LEN};

/// Reasoning nudge appended to evaluative prompts under chain-of-thought.
pub const CHAIN_OF_THOUGHT_SUFFIX: &str = "Take a deep breath and work on this step-by-step.";

/// Re-evaluation prompt inserted after evaluative prompts under self-defense.
pub const SELF_RE_EVALUATION_PROMPT: &str =
    "Are you sure about that? Please think about it again and then provide your final rating.";

/// Lead-in of the synthesized proxy re-evaluation prompt; the quoted prior
/// response follows after a blank line.
pub const PROXY_RE_EVALUATION_PREAMBLE: &str =
    "I received this answer from a friend of mine to the same question, please elaborate if you agree (be critical) and provide your final rating:";

/// Expand the parsed scenarios into the final prompt sequence.
///
/// `prior_responses` is the recorded baseline run's response column with the
/// preamble rows already stripped; it is required (and only consulted) for
/// [`EnhancementMethod::SelfDefenseProxy`], where it must hold exactly one
/// response per (scenario, statement-slot) coordinate of the current set.
pub fn expand(
    scenarios: &[ScenarioRecord],
    method: EnhancementMethod,
    tier: Tier,
    user_context: &[String],
    prior_responses: Option<&[String]>,
) -> Result<Vec<String>, BenchError> {
    let slots = tier.statement_slots();
    let mut sequence =
        Vec::with_capacity(PREAMBLE_LEN + method.scenario_stride(tier) * scenarios.len());
    sequence.extend(user_context.iter().cloned());

    match method {
        EnhancementMethod::None => {
            for scenario in scenarios {
                sequence.extend(scenario.text_segments.iter().cloned());
            }
        }
        EnhancementMethod::ChainOfThought => {
            for scenario in scenarios {
                for (slot, segment) in scenario.text_segments.iter().enumerate() {
                    sequence.push(chain_of_thought_segment(tier, slot, segment));
                }
            }
        }
        EnhancementMethod::SelfDefense => {
            for scenario in scenarios {
                for (slot, segment) in scenario.text_segments.iter().enumerate() {
                    sequence.push(segment.clone());
                    if is_evaluative(tier, slot) {
                        sequence.push(SELF_RE_EVALUATION_PROMPT.to_string());
                    }
                }
            }
        }
        EnhancementMethod::SelfDefenseProxy => {
            let prior = prior_responses.ok_or_else(|| {
                BenchError::prior_run_mismatch(0, scenarios.len() * slots)
            })?;
            let expected = scenarios.len() * slots;
            if prior.len() != expected {
                return Err(BenchError::prior_run_mismatch(prior.len(), expected));
            }
            for (idx, scenario) in scenarios.iter().enumerate() {
                for (slot, segment) in scenario.text_segments.iter().enumerate() {
                    sequence.push(segment.clone());
                    if is_evaluative(tier, slot) {
                        // The baseline grid is slot-aligned: the response to
                        // this statement sits at the same coordinate.
                        sequence.push(proxy_prompt(&prior[idx * slots + slot]));
                    }
                }
            }
        }
    }

    Ok(sequence)
}

/// Total sequence length for a scenario batch under a given method.
pub fn expected_sequence_len(tier: Tier, method: EnhancementMethod, scenarios: usize) -> usize {
    PREAMBLE_LEN + method.scenario_stride(tier) * scenarios
}

/// Synthesized re-evaluation prompt quoting a baseline response.
pub fn proxy_prompt(prior_response: &str) -> String {
    format!("{PROXY_RE_EVALUATION_PREAMBLE}\n\n\"{prior_response}\"")
}

/// Statement slot 0 of tiers 2/3 sets the scene without an evaluation ask;
/// tier 1's single prompt always asks.
fn is_evaluative(tier: Tier, slot: usize) -> bool {
    match tier {
        Tier::One => true,
        Tier::Two | Tier::Three => slot != 0,
    }
}

fn chain_of_thought_segment(tier: Tier, slot: usize, segment: &str) -> String {
    if !is_evaluative(tier, slot) {
        return segment.to_string();
    }
    // Tier 1 glues the nudge onto the prompt line; tiers 2/3 set it off
    // with a blank line.
    match tier {
        Tier::One => format!("{segment} {CHAIN_OF_THOUGHT_SUFFIX}"),
        Tier::Two | Tier::Three => format!("{segment}\n\n{CHAIN_OF_THOUGHT_SUFFIX}"),
    }
}
