//! Core data model for the benchmark pipeline.

use serde::{Deserialize, Serialize};

/// Sentinel recorded when a backend interaction produced no usable reply.
pub const RESPONSE_FAILED: &str = "NONE";

/// Filler for scenario metadata cells on the user-context preamble rows.
pub const METADATA_FILLER: &str = "NONE";

/// The user-context preamble always occupies the first two sequence slots.
pub const PREAMBLE_LEN: usize = 2;

/// Benchmark tier: structure class of the scenario set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    One,
    Two,
    Three,
}

impl Tier {
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Tier::One),
            2 => Some(Tier::Two),
            3 => Some(Tier::Three),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Tier::One => 1,
            Tier::Two => 2,
            Tier::Three => 3,
        }
    }

    /// Fixed scenario count per tier; a parse yielding anything else is a
    /// data-integrity defect.
    pub fn scenario_count(self) -> usize {
        match self {
            Tier::One => 8,
            Tier::Two => 24,
            Tier::Three => 16,
        }
    }

    /// Statement slots per scenario: tier 1 folds scenario and evaluation
    /// task into a single prompt, tiers 2/3 run five statement slots.
    pub fn statement_slots(self) -> usize {
        match self {
            Tier::One => 1,
            Tier::Two | Tier::Three => 5,
        }
    }

    /// Evaluative prompts per scenario (the ones a score is read from).
    /// Statement slot 0 of tiers 2/3 carries no evaluation ask.
    pub fn evaluative_slots(self) -> usize {
        match self {
            Tier::One => 1,
            Tier::Two | Tier::Three => 4,
        }
    }
}

/// Phrasing variant of the scenario/evaluation-task set. Variant 3 asks on
/// an inverted rating scale, which flips the CIAS computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variant(u8);

impl Variant {
    pub fn new(n: u8) -> Option<Self> {
        (1..=3).contains(&n).then_some(Variant(n))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn inverted_scale(self) -> bool {
        self.0 == 3
    }
}

/// Prompting strategy layered on top of the base benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnhancementMethod {
    None,
    ChainOfThought,
    SelfDefense,
    SelfDefenseProxy,
}

impl EnhancementMethod {
    /// Whether the method inserts a re-evaluation prompt after every
    /// evaluative prompt (doubling the response stream for those slots).
    pub fn re_evaluates(self) -> bool {
        matches!(
            self,
            EnhancementMethod::SelfDefense | EnhancementMethod::SelfDefenseProxy
        )
    }

    /// Directory/file-name label of the method.
    pub fn label(self) -> &'static str {
        match self {
            EnhancementMethod::None => "none",
            EnhancementMethod::ChainOfThought => "cot",
            EnhancementMethod::SelfDefense => "self-defense",
            EnhancementMethod::SelfDefenseProxy => "self-defense-proxy",
        }
    }

    /// Number of sequence elements one scenario occupies after expansion.
    ///
    /// Responses come back as a flat stream aligned 1:1 with the prompt
    /// sequence; reassembly indexes scenario groups with exactly this
    /// stride. tier 1: 1, or 2 under re-evaluating methods; tiers 2/3:
    /// 5, or 9 (slot 0 plus four evaluative slots, each followed by its
    /// re-evaluation prompt).
    pub fn scenario_stride(self, tier: Tier) -> usize {
        let slots = tier.statement_slots();
        if self.re_evaluates() {
            slots + tier.evaluative_slots()
        } else {
            slots
        }
    }
}

/// One parsed benchmark scenario, immutable after parsing.
///
/// `extra_dims` depends on the tier: `[recipient, use]` for tier 2,
/// `[relationship-and-incentive]` for tier 3, empty for tier 1.
/// `text_segments` holds the per-scenario prompt texts; its length always
/// equals the tier's statement-slot count (segment 0 already contains the
/// scenario framing plus evaluation task).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub id: String,
    pub information_type: String,
    pub extra_dims: Vec<String>,
    pub text_segments: Vec<String>,
}

/// One prompt/response pair from the chatbot backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub prompt: String,
    pub response: String,
}

impl Exchange {
    pub fn failed(prompt: impl Into<String>) -> Self {
        Exchange {
            prompt: prompt.into(),
            response: RESPONSE_FAILED.to_string(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.response == RESPONSE_FAILED
    }
}

/// Result of reducing a free-text reply to a score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreOutcome {
    /// Exactly one numeric candidate survived extraction.
    Value(u32),
    /// Several candidates and no authoritative pick; the comma-joined
    /// quoted list is recorded for manual resolution.
    Ambiguous(String),
    /// No numeric content anywhere.
    Missing,
}

impl ScoreOutcome {
    /// Cell text for the EVALUATED_SCORE column.
    pub fn cell(&self) -> String {
        match self {
            ScoreOutcome::Value(v) => v.to_string(),
            ScoreOutcome::Ambiguous(list) => list.clone(),
            ScoreOutcome::Missing => RESPONSE_FAILED.to_string(),
        }
    }
}

/// Chatbot-side character identity a conversation runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Persona {
    Emilia,
    Matteo,
    MsSmith,
    SatoruGojo,
    /// Fixed third-party persona the proxy re-evaluation runs talk to.
    MsJudge,
}

impl Persona {
    pub fn slug(self) -> &'static str {
        match self {
            Persona::Emilia => "emilia",
            Persona::Matteo => "matteo",
            Persona::MsSmith => "ms_smith",
            Persona::SatoruGojo => "satoru_gojo",
            Persona::MsJudge => "ms_judge",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_table_matches_response_layout() {
        for tier in [Tier::Two, Tier::Three] {
            assert_eq!(EnhancementMethod::None.scenario_stride(tier), 5);
            assert_eq!(EnhancementMethod::ChainOfThought.scenario_stride(tier), 5);
            assert_eq!(EnhancementMethod::SelfDefense.scenario_stride(tier), 9);
            assert_eq!(EnhancementMethod::SelfDefenseProxy.scenario_stride(tier), 9);
        }
        assert_eq!(EnhancementMethod::None.scenario_stride(Tier::One), 1);
        assert_eq!(EnhancementMethod::SelfDefense.scenario_stride(Tier::One), 2);
    }

    #[test]
    fn variant_bounds() {
        assert!(Variant::new(0).is_none());
        assert!(Variant::new(4).is_none());
        assert!(Variant::new(2).is_some());
        assert!(Variant::new(3).map(Variant::inverted_scale).unwrap());
    }

    #[test]
    fn tier_fixed_counts() {
        assert_eq!(Tier::One.scenario_count(), 8);
        assert_eq!(Tier::Two.scenario_count(), 24);
        assert_eq!(Tier::Three.scenario_count(), 16);
    }
}
