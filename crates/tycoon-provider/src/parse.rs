//! LLM reply parsing into validated tasks and verdicts.
//!
//! The generation reply is free-form text that should contain JSON. It is
//! located through several recovery strategies, then every entry is
//! checked against the task schema on its own: a bad entry is dropped with
//! a warning and the rest of the batch survives.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use tycoon_types::{Task, TaskId, TaskKind};

use crate::error::ProviderError;

/// One task as the LLM wrote it, before validation.
///
/// Any `id` the model invents is ignored; tasks get a local id.
#[derive(Debug, Deserialize)]
struct RawTask {
    title: String,
    description: String,
    reward: RawScalar,
    #[serde(rename = "energyCost", alias = "energy_cost")]
    energy_cost: RawScalar,
    difficulty: String,
    #[serde(rename = "type", alias = "kind")]
    kind: String,
    #[serde(default)]
    answer: Option<RawScalar>,
}

/// A value the model may emit either as a JSON number or as a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Number(serde_json::Number),
    Text(String),
}

impl RawScalar {
    fn into_text(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }

    fn to_decimal(&self, field: &str) -> Result<Decimal, ProviderError> {
        let text = match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().to_owned(),
        };
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|e| ProviderError::Parse(format!("{field} {text:?} is not a number: {e}")))
    }
}

/// Parse a generation reply into a batch of tasks.
///
/// Entries that fail validation are skipped. An `Ok` result may therefore
/// hold fewer tasks than requested, or none.
///
/// # Errors
///
/// Returns [`ProviderError::Parse`] when no JSON task list can be found in
/// the reply at all.
pub fn parse_task_batch(raw: &str) -> Result<Vec<Task>, ProviderError> {
    let value = extract_json_value(raw)?;
    let entries = task_entries(value)?;
    let total = entries.len();

    let tasks: Vec<Task> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match validate_entry(entry) {
            Ok(task) => Some(task),
            Err(e) => {
                warn!(index, error = %e, "dropping malformed task entry");
                None
            }
        })
        .collect();

    if tasks.len() < total {
        warn!(
            accepted = tasks.len(),
            received = total,
            "partial task batch after validation"
        );
    }
    Ok(tasks)
}

/// Interpret a verification reply: correct iff it mentions `true`,
/// case-insensitively.
pub fn parse_verdict(raw: &str) -> bool {
    raw.to_lowercase().contains("true")
}

/// Locate a JSON value in free-form text.
///
/// Strategies, in order:
/// 1. Direct `serde_json` parse
/// 2. Extract from a markdown code block
/// 3. Strip trailing commas and retry
/// 4. Code block plus trailing comma strip
fn extract_json_value(raw: &str) -> Result<Value, ProviderError> {
    let trimmed = raw.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    let block = extract_json_from_codeblock(trimmed);
    if let Some(inner) = block
        && let Ok(value) = serde_json::from_str::<Value>(inner)
    {
        return Ok(value);
    }

    if let Ok(value) = serde_json::from_str::<Value>(&strip_trailing_commas(trimmed)) {
        return Ok(value);
    }

    if let Some(inner) = block
        && let Ok(value) = serde_json::from_str::<Value>(&strip_trailing_commas(inner))
    {
        return Ok(value);
    }

    Err(ProviderError::Parse(format!(
        "no JSON found in reply: {trimmed}"
    )))
}

/// Pull the list of task entries out of the reply value.
///
/// Accepts a bare array, an object with a `tasks` array, or a single
/// task object.
fn task_entries(value: Value) -> Result<Vec<Value>, ProviderError> {
    match value {
        Value::Array(entries) => Ok(entries),
        Value::Object(mut map) => match map.remove("tasks") {
            Some(Value::Array(entries)) => Ok(entries),
            Some(other) => Err(ProviderError::Parse(format!(
                "`tasks` is not an array: {other}"
            ))),
            None if map.contains_key("title") => Ok(vec![Value::Object(map)]),
            None => Err(ProviderError::Parse(
                "reply object has no `tasks` array".to_owned(),
            )),
        },
        other => Err(ProviderError::Parse(format!(
            "expected a task list, got: {other}"
        ))),
    }
}

/// Check one entry against the schema and build a [`Task`].
fn validate_entry(entry: Value) -> Result<Task, ProviderError> {
    let raw: RawTask = serde_json::from_value(entry)
        .map_err(|e| ProviderError::Parse(format!("schema mismatch: {e}")))?;

    let title = raw.title.trim().to_owned();
    if title.is_empty() {
        return Err(ProviderError::Parse("blank title".to_owned()));
    }

    let reward = raw.reward.to_decimal("reward")?;
    if reward.is_sign_negative() {
        return Err(ProviderError::Parse(format!("negative reward {reward}")));
    }

    let energy_cost = raw.energy_cost.to_decimal("energyCost")?;
    if energy_cost.is_sign_negative() {
        return Err(ProviderError::Parse(format!(
            "negative energy cost {energy_cost}"
        )));
    }

    Ok(Task {
        id: TaskId::new(),
        title,
        description: raw.description,
        reward,
        energy_cost,
        difficulty: raw.difficulty,
        kind: TaskKind::from_label(&raw.kind),
        answer: raw.answer.map(RawScalar::into_text),
    })
}

/// Extract JSON from a markdown code block.
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let fence = text.find("```")?;
    let after_fence = text.get(fence.checked_add(3)?..)?;
    // Skip the info string (`json`, `JSON`, ...) up to the end of the line.
    let body_start = after_fence.find('\n').and_then(|nl| nl.checked_add(1))?;
    let body = after_fence.get(body_start..)?;
    let end = body.find("```")?;
    body.get(..end).map(str::trim)
}

/// Strip trailing commas before closing braces and brackets.
///
/// Commas inside string literals are left alone.
fn strip_trailing_commas(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if in_string {
            result.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                result.push(c);
            }
            ',' => {
                let rest = chars.clone().find(|n| !n.is_whitespace());
                if !matches!(rest, Some('}' | ']')) {
                    result.push(c);
                }
            }
            _ => result.push(c),
        }
    }

    result
}
