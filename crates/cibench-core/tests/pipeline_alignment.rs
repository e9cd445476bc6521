//! End-to-end alignment of the prompt sequence, response stream and
//! persisted rows, driven through the real parser, expander, runner and
//! CSV storage with a scripted backend.

use async_trait::async_trait;
use cibench_core::engine::Runner;
use cibench_core::model::{EnhancementMethod, Tier, Variant};
use cibench_core::providers::chatbot::ChatbotBackend;
use cibench_core::scenario::{parse_scenarios, parse_user_context};
use cibench_core::storage::{
    conversation_file_name, ConversationTable, COL_CIAS, COL_EVALUATED_SCORE,
};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

/// Replies with a fixed text and records every prompt it was handed.
struct EchoBackend {
    reply: String,
    seen: Mutex<Vec<String>>,
}

impl EchoBackend {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChatbotBackend for EchoBackend {
    async fn send_message(&self, prompt: &str) -> anyhow::Result<String> {
        self.seen.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }

    fn backend_name(&self) -> &'static str {
        "echo"
    }
}

fn write_file(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path
}

fn user_context_text() -> &'static str {
    "<PROMPT-1>\nHi, I am a new user.\nHere is my background.\n</PROMPT-1>\n\
     <PROMPT-2>\nPlease remember this context.\nIt matters for what follows.\n</PROMPT-2>\n"
}

fn tier1_eval_text() -> String {
    let mut out = String::new();
    for v in 1..=3 {
        writeln!(out, "<VARIANT-{v}>").unwrap();
        writeln!(out, "Rate the acceptability from 0 to 100, variant {v}.").unwrap();
        writeln!(out, "</VARIANT-{v}>").unwrap();
    }
    out
}

fn tier1_scenario_text() -> String {
    let mut out = String::new();
    for i in 1..=8 {
        writeln!(out, "<SCENARIO ID=\"{i}\" INFORMATION-TYPE=\"type-{i}\">").unwrap();
        for v in 1..=3 {
            writeln!(out, "<VARIANT-{v}>").unwrap();
            writeln!(out, "Scenario {i} body, variant {v}.").unwrap();
            writeln!(out, "</VARIANT-{v}>").unwrap();
        }
        writeln!(out, "</SCENARIO>").unwrap();
    }
    out
}

fn tier2_eval_text() -> String {
    let mut out = String::new();
    for v in 1..=3 {
        writeln!(out, "<VARIANT-{v}>").unwrap();
        for slot in 0..5 {
            writeln!(out, "<PROMPT-{slot}>").unwrap();
            if slot == 1 {
                writeln!(out, "Rate each statement, variant {v}.").unwrap();
                writeln!(out, "Statement one, variant {v}.").unwrap();
            } else {
                writeln!(out, "Slot {slot} text, variant {v}.").unwrap();
            }
            writeln!(out, "</PROMPT-{slot}>").unwrap();
        }
        writeln!(out, "</VARIANT-{v}>").unwrap();
    }
    out
}

fn tier2_scenario_text() -> String {
    let mut out = String::new();
    for i in 1..=24 {
        writeln!(
            out,
            "<SCENARIO ID=\"{i}\" INFORMATION-TYPE=\"health\" RECIPIENT=\"spouse\" USE=\"support\">"
        )
        .unwrap();
        for v in 1..=3 {
            writeln!(out, "<VARIANT-{v}>").unwrap();
            writeln!(out, "Scenario {i} framing, variant {v}.").unwrap();
            writeln!(out, "</VARIANT-{v}>").unwrap();
        }
        writeln!(out, "</SCENARIO>").unwrap();
    }
    out
}

#[tokio::test]
async fn tier2_self_defense_produces_aligned_scored_rows() {
    let dir = TempDir::new().unwrap();
    let eval = write_file(&dir, "tier-2-eval.txt", &tier2_eval_text());
    let scen = write_file(&dir, "tier-2.txt", &tier2_scenario_text());
    let ctx = write_file(&dir, "user-context.txt", user_context_text());

    let tier = Tier::Two;
    let variant = Variant::new(1).unwrap();
    let scenarios = parse_scenarios(tier, variant, &eval, &scen).unwrap();
    let user_context = parse_user_context(&ctx).unwrap();

    let table_path = dir.path().join(conversation_file_name(
        "echo",
        "self-defense",
        tier,
        variant,
    ));
    let mut table = ConversationTable::create(&table_path, tier).unwrap();

    let backend = std::sync::Arc::new(EchoBackend::new("I stand by a 3."));
    let runner = Runner {
        backend: backend.clone(),
        judge: None,
        pause: Duration::ZERO,
    };
    runner
        .run(
            tier,
            variant,
            EnhancementMethod::SelfDefense,
            &scenarios,
            &user_context,
            None,
            &mut table,
        )
        .await
        .unwrap();

    // 2 preamble prompts + 9 per scenario went out...
    assert_eq!(backend.seen.lock().unwrap().len(), 2 + 9 * 24);
    // ...and 2 preamble rows + 9 rows per scenario came back out.
    assert_eq!(table.row_count(), 2 + 9 * 24);

    // Every statement scored 3, so every scenario closes with CIAS 60 on
    // its statement-4 re-evaluation row.
    let loaded = ConversationTable::load(&table_path, tier).unwrap();
    for idx in 0..24 {
        let last_row = 2 + 9 * idx + 8;
        assert_eq!(loaded.cell(last_row, COL_EVALUATED_SCORE).unwrap(), "3");
        assert_eq!(loaded.cell(last_row, COL_CIAS).unwrap(), "60");
        // The substantive row before it carries no score.
        assert_eq!(loaded.cell(last_row - 1, COL_EVALUATED_SCORE).unwrap(), "");
    }
}

#[tokio::test]
async fn tier1_proxy_run_quotes_the_recorded_baseline() {
    let dir = TempDir::new().unwrap();
    let eval = write_file(&dir, "tier-1-eval.txt", &tier1_eval_text());
    let scen = write_file(&dir, "tier-1.txt", &tier1_scenario_text());
    let ctx = write_file(&dir, "user-context.txt", user_context_text());

    let tier = Tier::One;
    let variant = Variant::new(2).unwrap();
    let scenarios = parse_scenarios(tier, variant, &eval, &scen).unwrap();
    let user_context = parse_user_context(&ctx).unwrap();

    // Baseline run under the original character identity.
    let baseline_path = dir
        .path()
        .join(conversation_file_name("echo", "emilia", tier, variant));
    let mut baseline = ConversationTable::create(&baseline_path, tier).unwrap();
    let runner = Runner {
        backend: std::sync::Arc::new(EchoBackend::new("30")),
        judge: None,
        pause: Duration::ZERO,
    };
    runner
        .run(
            tier,
            variant,
            EnhancementMethod::None,
            &scenarios,
            &user_context,
            None,
            &mut baseline,
        )
        .await
        .unwrap();
    assert_eq!(baseline.row_count(), 2 + 8);
    assert_eq!(baseline.cell(2, COL_CIAS).unwrap(), "70");

    // Proxy run re-evaluates each baseline response through the judge
    // persona; scores come from the inserted proxy prompts' replies.
    let prior = ConversationTable::load(&baseline_path, tier).unwrap();
    let proxy_path = dir.path().join(conversation_file_name(
        "echo",
        "self-defense-proxy",
        tier,
        variant,
    ));
    let mut proxy_table = ConversationTable::create(&proxy_path, tier).unwrap();

    let proxy_backend = std::sync::Arc::new(EchoBackend::new("40"));
    let proxy_runner = Runner {
        backend: proxy_backend.clone(),
        judge: None,
        pause: Duration::ZERO,
    };
    proxy_runner
        .run(
            tier,
            variant,
            EnhancementMethod::SelfDefenseProxy,
            &scenarios,
            &user_context,
            Some(&prior),
            &mut proxy_table,
        )
        .await
        .unwrap();

    assert_eq!(proxy_table.row_count(), 2 + 2 * 8);

    // The inserted prompt after each scenario prompt quotes the baseline
    // reply verbatim.
    let seen = proxy_backend.seen.lock().unwrap();
    assert_eq!(seen.len(), 2 + 2 * 8);
    assert!(seen[3].contains("\"30\""));
    assert!(seen[3].starts_with("I received this answer from a friend"));

    // Score 40 on the re-evaluation row; CIAS = 100 - 40.
    assert_eq!(proxy_table.cell(2, COL_EVALUATED_SCORE).unwrap(), "");
    assert_eq!(proxy_table.cell(3, COL_EVALUATED_SCORE).unwrap(), "40");
    assert_eq!(proxy_table.cell(3, COL_CIAS).unwrap(), "60");
}
