//! Parser for the tag-delimited scenario, evaluation-task and user-context
//! files.
//!
//! The source format is line-oriented: scenario blocks open with a
//! `<SCENARIO ...>` attribute line and close with `</SCENARIO>`; inside a
//! block, per-variant text sits between `<VARIANT-n>` tags, and the
//! evaluation-task files carry `<PROMPT-k>` slots. All parsing here is a
//! single forward scan over trimmed lines; any structural defect (missing
//! attribute, missing variant body, missing slot, unterminated block,
//! duplicate id, wrong scenario count) is fatal and returned as a
//! [`BenchError`] so the caller aborts before touching a backend.

use crate::errors::BenchError;
use crate::model::{ScenarioRecord, Tier, Variant};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

const SCENARIO_OPEN: &str = "<SCENARIO";
const SCENARIO_CLOSE: &str = "</SCENARIO>";

lazy_static! {
    static ref TIER1_ATTRS: Regex =
        Regex::new(r#"ID="(\d+)"\s+INFORMATION-TYPE="([^"]+)""#).expect("tier-1 attribute pattern");
    static ref TIER2_ATTRS: Regex = Regex::new(
        r#"<SCENARIO\s+ID="([^"]+)"\s+INFORMATION-TYPE="([^"]+)"\s+RECIPIENT="([^"]+)"\s+USE="([^"]+)""#
    )
    .expect("tier-2 attribute pattern");
    static ref TIER3_ATTRS: Regex = Regex::new(
        r#"<SCENARIO\s+ID="([^"]+)"\s+INFORMATION-TYPE="([^"]+)"\s+RELATIONSHIP-AND-INCENTIVE="([^"]+)""#
    )
    .expect("tier-3 attribute pattern");
}

/// Parse the fixed two-prompt user-context preamble. Each `<PROMPT-k>`
/// block spans two physical lines, joined with a blank-line separator.
pub fn parse_user_context(path: &Path) -> Result<Vec<String>, BenchError> {
    let lines = read_trimmed_lines(path)
        .map_err(|detail| BenchError::user_context(path.display(), detail))?;

    let mut prompts = Vec::with_capacity(2);
    for slot in 1..=2u8 {
        let open = format!("<PROMPT-{slot}>");
        let close = format!("</PROMPT-{slot}>");
        let body = tagged_lines(&lines, &open, &close).ok_or_else(|| {
            BenchError::user_context(path.display(), format!("missing {open} block"))
        })?;
        if body.len() != 2 {
            return Err(BenchError::user_context(
                path.display(),
                format!("{open} block must span two lines, found {}", body.len()),
            ));
        }
        prompts.push(format!("{}\n\n{}", body[0], body[1]));
    }
    Ok(prompts)
}

/// Parse a tier's scenario file together with its evaluation-task file for
/// one variant, producing the per-scenario prompt segments.
///
/// Segment 0 of every record is the scenario's variant body concatenated
/// with evaluation-task slot 0 (tier 1's single task); tiers 2/3 append
/// the shared slots 1..=4 unchanged, so the segment count always matches
/// the tier's statement-slot count.
pub fn parse_scenarios(
    tier: Tier,
    variant: Variant,
    eval_path: &Path,
    scenario_path: &Path,
) -> Result<Vec<ScenarioRecord>, BenchError> {
    let tasks = parse_eval_tasks(tier, variant, eval_path)?;

    let lines = read_trimmed_lines(scenario_path)
        .map_err(|detail| BenchError::scenario_parse(scenario_path.display(), detail))?;
    let blocks = scenario_blocks(&lines, scenario_path)?;

    let v_open = format!("<VARIANT-{}>", variant.number());
    let v_close = format!("</VARIANT-{}>", variant.number());

    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(blocks.len());
    for (index, block) in blocks.iter().enumerate() {
        let (id, information_type, extra_dims) =
            scenario_attrs(tier, &block[0]).ok_or_else(|| {
                BenchError::scenario_parse(
                    scenario_path.display(),
                    format!("scenario {} opening tag is missing required attributes", index + 1),
                )
            })?;
        if !seen.insert(id.clone()) {
            return Err(BenchError::scenario_parse(
                scenario_path.display(),
                format!("duplicate scenario id {id}"),
            ));
        }

        let body = tagged_lines(block, &v_open, &v_close)
            .filter(|body| body.len() == 1)
            .map(|body| body[0].clone())
            .ok_or_else(|| {
                BenchError::scenario_parse(
                    scenario_path.display(),
                    format!("scenario {id} has no single-line {v_open} body"),
                )
            })?;

        let mut text_segments = Vec::with_capacity(tasks.len());
        text_segments.push(format!("{}\n\n{}", body, tasks[0]));
        text_segments.extend(tasks[1..].iter().cloned());

        records.push(ScenarioRecord {
            id,
            information_type,
            extra_dims,
            text_segments,
        });
    }

    if records.len() != tier.scenario_count() {
        return Err(BenchError::scenario_count(
            scenario_path.display(),
            records.len(),
            tier.scenario_count(),
        ));
    }
    Ok(records)
}

/// Evaluation-task slots for one variant. Tier 1 has a single task line;
/// tiers 2/3 carry slots 0..=4, slot 1 spanning two lines.
fn parse_eval_tasks(
    tier: Tier,
    variant: Variant,
    path: &Path,
) -> Result<Vec<String>, BenchError> {
    let lines = read_trimmed_lines(path)
        .map_err(|detail| BenchError::eval_task_parse(path.display(), detail))?;

    let open = format!("<VARIANT-{}>", variant.number());
    let close = format!("</VARIANT-{}>", variant.number());
    let region = tagged_lines(&lines, &open, &close).ok_or_else(|| {
        BenchError::eval_task_parse(path.display(), format!("missing {open} block"))
    })?;

    match tier {
        Tier::One => {
            if region.len() != 1 {
                return Err(BenchError::eval_task_parse(
                    path.display(),
                    format!("{open} block must be a single line, found {}", region.len()),
                ));
            }
            Ok(vec![region[0].clone()])
        }
        Tier::Two | Tier::Three => {
            let mut tasks = Vec::with_capacity(5);
            for slot in 0..5u8 {
                let p_open = format!("<PROMPT-{slot}>");
                let p_close = format!("</PROMPT-{slot}>");
                let body = tagged_lines(region, &p_open, &p_close).ok_or_else(|| {
                    BenchError::eval_task_parse(
                        path.display(),
                        format!("missing {p_open} block in {open}"),
                    )
                })?;
                // Slot 1 is the statement-rating task; its two lines are the
                // task text and the first statement.
                let expected = if slot == 1 { 2 } else { 1 };
                if body.len() != expected {
                    return Err(BenchError::eval_task_parse(
                        path.display(),
                        format!(
                            "{p_open} block must span {expected} line(s), found {}",
                            body.len()
                        ),
                    ));
                }
                tasks.push(body.join("\n\n"));
            }
            Ok(tasks)
        }
    }
}

/// Split the scenario file into blocks, one per `<SCENARIO ...>` ..
/// `</SCENARIO>` pair, including the opening attribute line.
fn scenario_blocks(lines: &[String], path: &Path) -> Result<Vec<Vec<String>>, BenchError> {
    let mut blocks = Vec::new();
    let mut current: Option<Vec<String>> = None;

    for (lineno, line) in lines.iter().enumerate() {
        if line.starts_with(SCENARIO_OPEN) {
            if current.is_some() {
                return Err(BenchError::scenario_parse(
                    path.display(),
                    format!("unterminated scenario block before line {}", lineno + 1),
                ));
            }
            current = Some(vec![line.clone()]);
        } else if line == SCENARIO_CLOSE {
            match current.take() {
                Some(block) => blocks.push(block),
                None => {
                    return Err(BenchError::scenario_parse(
                        path.display(),
                        format!("stray {} at line {}", SCENARIO_CLOSE, lineno + 1),
                    ));
                }
            }
        } else if let Some(block) = current.as_mut() {
            block.push(line.clone());
        }
    }

    if current.is_some() {
        return Err(BenchError::scenario_parse(
            path.display(),
            "unterminated scenario block at end of file",
        ));
    }
    Ok(blocks)
}

fn scenario_attrs(tier: Tier, header: &str) -> Option<(String, String, Vec<String>)> {
    match tier {
        Tier::One => TIER1_ATTRS
            .captures(header)
            .map(|c| (c[1].to_string(), c[2].to_string(), Vec::new())),
        Tier::Two => TIER2_ATTRS.captures(header).map(|c| {
            (
                c[1].to_string(),
                c[2].to_string(),
                vec![c[3].to_string(), c[4].to_string()],
            )
        }),
        Tier::Three => TIER3_ATTRS
            .captures(header)
            .map(|c| (c[1].to_string(), c[2].to_string(), vec![c[3].to_string()])),
    }
}

/// Lines strictly between the first occurrence of `open` and the next
/// `close`, or None when either tag is absent.
fn tagged_lines<'a>(lines: &'a [String], open: &str, close: &str) -> Option<&'a [String]> {
    let start = lines.iter().position(|l| l == open)?;
    let rest = &lines[start + 1..];
    let end = rest.iter().position(|l| l == close)?;
    Some(&rest[..end])
}

fn read_trimmed_lines(path: &Path) -> Result<Vec<String>, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    Ok(text.lines().map(|l| l.trim().to_string()).collect())
}
