// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The interactive classification wizard.
//!
//! One run walks the full draft lifecycle: load the collector's caches,
//! classify in batches, export the draft for hand editing, re-import,
//! review the leftovers, then confirm and apply. Every step that mutates
//! Telegram sits behind the confirmation gate.

use std::time::Duration;

use colored::Colorize;
use tgsort_config::{ProviderKind, TgsortConfig, mask_secret};
use tgsort_core::{
    ApplyMode, BatchOutcome, ChatSource, Classifier, FolderSource, RetryPolicy, TgsortError,
};
use tgsort_engine::{
    ApplyExecutor, Catalog, ConfirmationGate, Draft, DraftFormat, DraftStore, GateDecision,
    GateDenial, Orchestrator, ReviewCommand, ReviewExit, ReviewSession, ReviewStep,
    suggest_folder,
};
use tgsort_gemini::GeminiClassifier;
use tgsort_openai::OpenAiClassifier;
use tgsort_telegram::{
    CHATS_CACHE, CachedChatSource, CachedFolderSource, FOLDERS_CACHE, JournalFolderWriter,
    OPS_JOURNAL,
};
use tracing::info;

use crate::prompts::{prompt_choice, prompt_text, prompt_yes_no, wait_for_enter};

pub async fn run_wizard(config: &TgsortConfig) -> Result<(), TgsortError> {
    println!("{}", "tgsort".bold().green());
    print_config_summary(config);

    let store = DraftStore::new(config.data_dir())?;
    let catalog = load_catalog(config).await?;
    println!(
        "loaded {} classifiable chats and {} folders\n",
        catalog.chat_count().to_string().bold(),
        catalog.folders().len().to_string().bold()
    );
    if catalog.is_empty() {
        println!("nothing to classify, exiting");
        return Ok(());
    }

    // Decided once per run, up front, so the operator is never asked
    // while a timeout is ticking.
    let mode = match prompt_choice("Apply mode", &["clear", "append"]).await?.as_str() {
        "append" => ApplyMode::Append,
        _ => ApplyMode::Clear,
    };

    let retry = RetryPolicy::new(
        config.ai.max_retries,
        Duration::from_secs_f64(config.ai.retry_backoff_seconds),
    );

    let mut draft = obtain_draft(config, &store, &catalog, retry).await?;

    // Export for hand editing, then let the operator pull edits back in.
    store.export(&draft, &catalog)?;
    println!("draft written:");
    println!("  {}", store.draft_json_path().display());
    println!("  {}", store.review_csv_path().display());
    wait_for_enter("Edit either file if you like, then press Enter to continue.").await?;
    import_edits(&store, &catalog, &mut draft).await?;

    review_unassigned(&catalog, &mut draft).await?;

    let categorized = draft.categorized_count();
    let unassigned = draft.unassigned_count();
    let question = format!(
        "Assign {categorized} chats to folders ({unassigned} left unassigned, mode: {mode}). Proceed?"
    );

    let gate = ConfirmationGate::new(Duration::from_secs(config.ai.confirm_timeout_seconds));
    let sealed = match gate
        .run(draft, &store, &catalog, || prompt_yes_no(&question))
        .await?
    {
        GateDecision::Approved(sealed) => sealed,
        GateDecision::Denied(GateDenial::Declined) => {
            println!(
                "apply declined; the classification stays committed at {}",
                store.final_json_path().display()
            );
            return Ok(());
        }
        GateDecision::Denied(GateDenial::TimedOut) => {
            println!(
                "\nno answer within {}s; nothing was applied. Re-run to try again.",
                config.ai.confirm_timeout_seconds
            );
            return Ok(());
        }
    };

    let writer = JournalFolderWriter::new(config.data_dir().join(OPS_JOURNAL))?;
    let report = ApplyExecutor::new(mode, retry).apply(&sealed, &writer).await;
    println!();
    for line in report.summary_lines(&catalog) {
        println!("{line}");
    }
    println!("operations journaled to {}", writer.path().display());
    Ok(())
}

fn print_config_summary(config: &TgsortConfig) {
    let key = match config.active_api_key() {
        Some(key) => mask_secret(key),
        None => "<from environment>".to_string(),
    };
    println!("  provider:  {} ({})", config.ai.provider, config.active_model());
    println!("  endpoint:  {}", config.active_base_url());
    println!("  api key:   {key}");
    println!("  batch:     {} chats", config.ai.batch_size);
    println!("  data dir:  {}", config.data_dir().display());
    println!();
}

/// Build the catalog from the collector's cache files, keeping only chat
/// kinds that belong in folders.
async fn load_catalog(config: &TgsortConfig) -> Result<Catalog, TgsortError> {
    let data_dir = config.data_dir();
    let chat_source = CachedChatSource::new(data_dir.join(CHATS_CACHE));
    let folder_source = CachedFolderSource::new(data_dir.join(FOLDERS_CACHE));

    if !chat_source.exists() || !folder_source.exists() {
        return Err(TgsortError::telegram(format!(
            "cache files not found under {}; run the collector first to produce {CHATS_CACHE} and {FOLDERS_CACHE}",
            data_dir.display()
        )));
    }

    let chats: Vec<_> = chat_source
        .list_chats()
        .await?
        .into_iter()
        .filter(|chat| chat.kind.is_classifiable())
        .collect();
    let folders = folder_source.list_folders().await?;
    Catalog::new(chats, folders)
}

/// Reuse the committed classification if the operator wants it, otherwise
/// run the classifier.
async fn obtain_draft(
    config: &TgsortConfig,
    store: &DraftStore,
    catalog: &Catalog,
    retry: RetryPolicy,
) -> Result<Draft, TgsortError> {
    if let Some(existing) = store.load_final(catalog)? {
        let reuse = prompt_yes_no(&format!(
            "Found a committed classification ({} assigned, {} unassigned). Reuse it instead of re-classifying?",
            existing.categorized_count(),
            existing.unassigned_count()
        ))
        .await?;
        if reuse {
            info!("reusing committed classification");
            return Ok(existing);
        }
    }

    let classifier = build_classifier(config)?;
    println!(
        "classifying {} chats with {}...",
        catalog.chat_count(),
        classifier.name()
    );

    let orchestrator = Orchestrator::new(retry, config.ai.batch_size);
    let (draft, results) = orchestrator.classify(catalog, classifier.as_ref()).await;

    for result in &results {
        if let BatchOutcome::Failed(reason) = &result.outcome {
            println!(
                "  {} batch {}: {reason}",
                "failed".red(),
                result.batch_index + 1
            );
        }
    }
    let provenance = draft.provenance();
    println!(
        "classification done: {} assigned, {} unassigned ({}/{} batches ok)",
        draft.categorized_count(),
        draft.unassigned_count(),
        provenance.total_batches - provenance.failed_batches,
        provenance.total_batches
    );
    if provenance.total_batches > 0 && provenance.failed_batches == provenance.total_batches {
        println!(
            "{}",
            "the classifier was unreachable; every chat is unassigned. You can still sort them by hand in the review step."
                .yellow()
        );
    }
    println!();
    Ok(draft)
}

fn build_classifier(config: &TgsortConfig) -> Result<Box<dyn Classifier>, TgsortError> {
    match config.ai.provider {
        ProviderKind::Openai => Ok(Box::new(OpenAiClassifier::new(&config.openai)?)),
        ProviderKind::Gemini => Ok(Box::new(GeminiClassifier::new(&config.gemini)?)),
    }
}

/// Re-import the operator's edits. A bad file never clobbers the current
/// draft; the operator can fix it and try again or skip.
async fn import_edits(
    store: &DraftStore,
    catalog: &Catalog,
    draft: &mut Draft,
) -> Result<(), TgsortError> {
    loop {
        let choice = prompt_choice("Import edits from which file?", &["json", "csv", "skip"]).await?;
        let format = match choice.as_str() {
            "json" => DraftFormat::Json,
            "csv" => DraftFormat::Csv,
            _ => return Ok(()),
        };
        match store.import(format, catalog) {
            Ok(imported) => {
                println!(
                    "imported: {} assigned, {} unassigned\n",
                    imported.categorized_count(),
                    imported.unassigned_count()
                );
                *draft = imported;
                return Ok(());
            }
            Err(err) => {
                println!("{}: {err}", "import failed".red());
                println!("the current draft is unchanged; fix the file and retry, or skip");
            }
        }
    }
}

/// Walk the unassigned chats one by one.
async fn review_unassigned(catalog: &Catalog, draft: &mut Draft) -> Result<(), TgsortError> {
    let mut session = ReviewSession::new(draft);
    if session.total() == 0 {
        return Ok(());
    }
    let review = prompt_yes_no(&format!(
        "{} chats are unassigned. Review them now?",
        session.total()
    ))
    .await?;
    if !review {
        return Ok(());
    }
    print_folders(catalog);

    while let Some(chat_id) = session.current() {
        let Some(chat) = catalog.chat(chat_id) else {
            break;
        };
        println!(
            "\n[{}/{}] {} ({}, id {})",
            session.position() + 1,
            session.total(),
            chat.title.bold(),
            chat.kind,
            chat.chat_id
        );
        if let Some(username) = &chat.username {
            println!("  @{username}");
        }
        if let Some(description) = &chat.description {
            println!("  {description}");
        }
        if let Some(folder) = suggest_folder(chat, catalog.folders()) {
            println!(
                "  hint: maybe {} (id {})",
                folder.title.cyan(),
                folder.folder_id
            );
        }

        let input =
            prompt_text("[i]gnore  [m]anual <folder_id>  [a]ll <folder_id>  [l]ist  [q]uit >")
                .await?;
        let Some(command) = ReviewCommand::parse(&input) else {
            println!("unrecognized command");
            continue;
        };
        match session.apply(catalog, command) {
            Ok(ReviewStep::Advanced) => {}
            Ok(ReviewStep::Listed) => print_folders(catalog),
            Ok(ReviewStep::Finished(exit)) => {
                match exit {
                    ReviewExit::Exhausted => println!("review complete"),
                    ReviewExit::BulkAssigned(count) => {
                        println!("assigned the remaining {count} chats");
                    }
                    ReviewExit::Quit => println!("review stopped"),
                }
                break;
            }
            Err(err) => println!("{}: {err}", "error".red()),
        }
    }
    println!();
    Ok(())
}

fn print_folders(catalog: &Catalog) {
    println!("folders:");
    for folder in catalog.folders() {
        println!("  {:>6}  {}", folder.folder_id, folder.title);
    }
}
