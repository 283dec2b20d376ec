use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::warn;

use cardpack_archive::{archive_name, deliver, single_card_name};
use cardpack_batch::{Batch, ExportPlan, Selection};
use cardpack_client::{CardKind, CardSource, EntityRef};

use crate::config::Config;
use crate::ui::tracker::{ProgressTracker, ProgressTrackerConfig, Tracker};

pub fn out_dir<'a>(flag: &'a Option<PathBuf>, config: &'a Config) -> &'a Path {
    flag.as_deref().unwrap_or(&config.output_dir)
}

/// Build the selection for an export invocation: `--all` snapshots the
/// filtered roster, `--id` picks in argument order.
pub fn build_selection(ids: &[String], all: bool, roster: &[EntityRef]) -> Result<Selection> {
    let mut selection = Selection::new();
    if all {
        selection.select_all(roster.iter().map(|e| e.id.clone()));
    } else {
        for id in ids {
            if selection.is_selected(id) {
                warn!(%id, "ignoring duplicate --id");
            } else {
                selection.toggle(id);
            }
        }
    }

    if selection.is_empty() {
        bail!("select at least one card to export (--id <ID> or --all)");
    }
    Ok(selection)
}

/// Run one batch over the selection and deliver the dated archive.
///
/// Stale ids are pruned against the live roster before planning. Ctrl-C
/// stops the batch between items; whatever was gathered is still delivered.
pub async fn run_export<C: CardSource>(
    source: &C,
    kind: CardKind,
    roster: &[EntityRef],
    mut selection: Selection,
    out_dir: &Path,
) -> Result<()> {
    let dropped = selection.retain_known(roster.iter().map(|e| e.id.as_str()));
    for id in &dropped {
        warn!(%id, "not in the current roster, dropped from the selection");
    }
    if selection.is_empty() {
        bail!("none of the selected ids are in the current roster");
    }

    let plan = ExportPlan::from_selection(kind, &selection, roster);
    let total = plan.len();
    let batch = Batch::new(plan);

    let stop = batch.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.raise();
        }
    });

    let mut rx = batch.subscribe();
    let ui = tokio::spawn(async move {
        let tracker = ProgressTracker::new(ProgressTrackerConfig {
            len: Some(total as u64),
            msg: Some(format!("Exporting {kind} ID cards")),
        });
        while rx.changed().await.is_ok() {
            let completed = rx.borrow_and_update().completed;
            tracker.update(completed as u64);
        }
        tracker.finish(None);
    });

    let outcome = batch.run(source).await?;
    let _ = ui.await;

    let dest = out_dir.join(archive_name(kind.file_prefix(), Utc::now().date_naive()));
    deliver(&dest, &outcome.archive)?;

    println!(
        "exported {}/{} {kind} cards -> {}",
        outcome.succeeded(),
        outcome.total,
        dest.display()
    );
    if outcome.stopped {
        eprintln!(
            "stopped early: {} of {} cards attempted",
            outcome.items.len(),
            outcome.total
        );
    }
    if outcome.succeeded() == 0 {
        eprintln!("warning: every card failed; the delivered archive is empty");
    }
    for item in outcome.failures() {
        match &item.error {
            Some(cause) => eprintln!("  failed {}: {cause}", item.id),
            None => eprintln!("  failed {}", item.id),
        }
    }

    Ok(())
}

/// Fetch one card and save it as a standalone PDF.
pub async fn run_fetch<C: CardSource>(
    source: &C,
    kind: CardKind,
    entity: EntityRef,
    out_dir: &Path,
) -> Result<()> {
    let payload = source
        .fetch_card(kind, &entity.id)
        .await
        .with_context(|| format!("failed to fetch the {kind} card for '{}'", entity.id))?;

    let dest = out_dir.join(single_card_name(kind.file_prefix(), &entity.name, &entity.id));
    deliver(&dest, &payload)?;
    println!("saved {}", dest.display());
    Ok(())
}
