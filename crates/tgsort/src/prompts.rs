// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stdin prompts for the wizard.
//!
//! Reads run on the blocking pool so a prompt future can sit under
//! `tokio::time::timeout` without wedging the runtime. The confirmation
//! gate relies on this: its bounded wait must be able to give up on a
//! prompt the operator never answers.

use std::io::Write;

use colored::Colorize;
use tgsort_core::TgsortError;

/// Read one line from stdin, trimmed. Returns `None` on EOF.
async fn read_line() -> Result<Option<String>, TgsortError> {
    let line = tokio::task::spawn_blocking(|| {
        let mut buf = String::new();
        let read = std::io::stdin().read_line(&mut buf)?;
        Ok::<_, std::io::Error>(if read == 0 {
            None
        } else {
            Some(buf.trim().to_string())
        })
    })
    .await
    .map_err(|e| TgsortError::Internal(format!("stdin task failed: {e}")))?
    .map_err(|e| TgsortError::Internal(format!("reading stdin: {e}")))?;
    Ok(line)
}

/// Print a prompt and read the operator's answer. EOF reads as empty.
pub async fn prompt_text(prompt: &str) -> Result<String, TgsortError> {
    print!("{} ", prompt.bold());
    std::io::stdout()
        .flush()
        .map_err(|e| TgsortError::Internal(format!("flushing stdout: {e}")))?;
    Ok(read_line().await?.unwrap_or_default())
}

/// Yes/no question, re-asked until the answer is recognizable.
/// EOF counts as "no" so a closed stdin can never approve anything.
pub async fn prompt_yes_no(question: &str) -> Result<bool, TgsortError> {
    loop {
        print!("{} [y/n] ", question.bold());
        std::io::stdout()
            .flush()
            .map_err(|e| TgsortError::Internal(format!("flushing stdout: {e}")))?;
        let Some(answer) = read_line().await? else {
            return Ok(false);
        };
        match answer.to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("please answer y or n"),
        }
    }
}

/// Ask until the answer matches one of `options` (case-insensitive).
/// An empty answer picks the first option.
pub async fn prompt_choice(question: &str, options: &[&str]) -> Result<String, TgsortError> {
    let rendered = options.join("/");
    loop {
        let answer = prompt_text(&format!("{question} [{rendered}]")).await?;
        if answer.is_empty() {
            return Ok(options[0].to_string());
        }
        let lower = answer.to_lowercase();
        if options.contains(&lower.as_str()) {
            return Ok(lower);
        }
        println!("please answer one of: {rendered}");
    }
}

/// Block until the operator presses Enter.
pub async fn wait_for_enter(message: &str) -> Result<(), TgsortError> {
    print!("{} ", message.dimmed());
    std::io::stdout()
        .flush()
        .map_err(|e| TgsortError::Internal(format!("flushing stdout: {e}")))?;
    read_line().await?;
    Ok(())
}
