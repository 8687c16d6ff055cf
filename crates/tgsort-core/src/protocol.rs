// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification wire protocol shared by all provider adapters.
//!
//! Builds the prompt pair sent to a provider and parses the grouped JSON
//! it returns. Parsing is deliberately lenient: providers wrap output in
//! markdown fences, emit ids as strings, and repeat chats; anything that
//! survives normalization is validated again by the orchestrator, so this
//! layer only has to salvage what it can.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::error::TgsortError;
use crate::types::{ChatKind, ChatRecord, ClassificationEntry, FolderRecord};

/// Prompt payload truncation limits, matching what providers handle well.
const TITLE_LIMIT: usize = 120;
const USERNAME_LIMIT: usize = 80;
const CONTEXT_LIMIT: usize = 300;
const REASON_LIMIT: usize = 200;

/// The system/user prompt pair for one classification request.
#[derive(Debug, Clone)]
pub struct Prompts {
    pub system: String,
    pub user: String,
}

#[derive(Serialize)]
struct FolderPayload<'a> {
    id: i64,
    title: &'a str,
}

#[derive(Serialize)]
struct ChatPayload {
    chat_id: i64,
    title: String,
    #[serde(rename = "type")]
    kind: ChatKind,
    username: String,
    description: String,
    last_message: String,
}

/// Build the prompt pair for one batch of chats against the folder catalog.
pub fn build_prompts(chats: &[ChatRecord], folders: &[FolderRecord]) -> Prompts {
    let folder_payload: Vec<FolderPayload<'_>> = folders
        .iter()
        .map(|f| FolderPayload {
            id: f.folder_id,
            title: &f.title,
        })
        .collect();

    let chat_payload: Vec<ChatPayload> = chats
        .iter()
        .map(|c| ChatPayload {
            chat_id: c.chat_id,
            title: truncate(&c.title, TITLE_LIMIT),
            kind: c.kind,
            username: truncate(c.username.as_deref().unwrap_or(""), USERNAME_LIMIT),
            description: truncate(c.description.as_deref().unwrap_or(""), CONTEXT_LIMIT),
            last_message: truncate(c.last_message.as_deref().unwrap_or(""), CONTEXT_LIMIT),
        })
        .collect();

    let system = "You are an expert at organizing Telegram chats. \
                  Output strict JSON only: no markdown code fences, no commentary."
        .to_string();

    let user = format!(
        "Assign each chat to the most semantically relevant folder.\n\
         Rules:\n\
         1) A chat belongs to at most one folder.\n\
         2) Only include folders that gain at least one chat.\n\
         3) When unsure, leave the chat out entirely.\n\
         4) Respond with exactly this JSON structure:\n\
         {{\"categorized\":[{{\"folder_id\":123,\"folder_title\":\"Title\",\
         \"chats\":[{{\"chat_id\":1,\"type\":\"GROUP\",\"reason\":\"why\"}}]}}]}}\n\n\
         folders={}\n\
         chats={}",
        serde_json::to_string(&folder_payload).unwrap_or_else(|_| "[]".into()),
        serde_json::to_string(&chat_payload).unwrap_or_else(|_| "[]".into()),
    );

    Prompts { system, user }
}

/// Parse raw provider output into categorized entries.
///
/// Duplicate chat ids keep their first occurrence; entries without numeric
/// ids are dropped; reasons are truncated to a sane length. Returns a
/// permanent classifier error when no JSON object with a `categorized`
/// array can be recovered.
pub fn parse_response(text: &str) -> Result<Vec<ClassificationEntry>, TgsortError> {
    let cleaned = strip_markdown_fence(text);

    let value: Value = match serde_json::from_str(cleaned) {
        Ok(v) => v,
        Err(_) => {
            // Some providers pad JSON with prose; salvage the outermost object.
            let start = cleaned.find('{');
            let end = cleaned.rfind('}');
            match (start, end) {
                (Some(s), Some(e)) if e > s => serde_json::from_str(&cleaned[s..=e])
                    .map_err(|e| TgsortError::classifier(format!("response is not valid JSON: {e}")))?,
                _ => {
                    return Err(TgsortError::classifier("response is not a JSON object"));
                }
            }
        }
    };

    normalize_groups(&value)
}

fn normalize_groups(value: &Value) -> Result<Vec<ClassificationEntry>, TgsortError> {
    let categorized = value
        .get("categorized")
        .and_then(Value::as_array)
        .ok_or_else(|| TgsortError::classifier("response is missing the `categorized` array"))?;

    let mut entries = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for folder_item in categorized {
        let Some(folder_id) = lenient_i64(folder_item.get("folder_id")) else {
            continue;
        };
        let Some(chats) = folder_item.get("chats").and_then(Value::as_array) else {
            continue;
        };

        for chat_item in chats {
            let Some(chat_id) = lenient_i64(chat_item.get("chat_id")) else {
                continue;
            };
            if !seen.insert(chat_id) {
                continue;
            }
            let reason = chat_item
                .get("reason")
                .and_then(Value::as_str)
                .map(|r| truncate(r, REASON_LIMIT));
            entries.push(ClassificationEntry::categorized(chat_id, folder_id, reason));
        }
    }

    Ok(entries)
}

/// Accept ids as JSON numbers or numeric strings.
fn lenient_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn strip_markdown_fence(text: &str) -> &str {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let re = FENCE.get_or_init(|| {
        Regex::new(r"(?is)^```(?:json)?\s*(.*?)\s*```$").expect("fence regex is valid")
    });

    let trimmed = text.trim();
    match re.captures(trimmed) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(trimmed),
        None => trimmed,
    }
}

/// Char-boundary-safe truncation with an ellipsis marker.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}...")
}
