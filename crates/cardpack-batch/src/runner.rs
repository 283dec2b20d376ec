use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{debug, warn};

use cardpack_archive::{Assembler, member_name};
use cardpack_client::{CardKind, CardSource, ClientError, EntityRef};

use crate::error::BatchError;
use crate::progress::Progress;
use crate::selection::Selection;

/// Cooperative stop signal, checked between items.
///
/// Raising the flag never aborts a request already in flight; the runner
/// finishes the current item, skips the rest, and finalizes the archive
/// with whatever was gathered.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Fixed-order snapshot of a selection, resolved against the roster.
///
/// Taken once at batch start; roster changes after this point do not affect
/// the run.
#[derive(Debug, Clone)]
pub struct ExportPlan {
    pub kind: CardKind,
    pub items: Vec<EntityRef>,
}

impl ExportPlan {
    pub fn new(kind: CardKind, items: Vec<EntityRef>) -> Self {
        Self { kind, items }
    }

    /// Snapshot the selection in selection order, attaching display names
    /// from the roster. An id the roster no longer knows keeps an empty
    /// name and falls back to the id in the archive member name; callers
    /// that want such ids dropped instead run
    /// [`Selection::retain_known`] first.
    pub fn from_selection(kind: CardKind, selection: &Selection, roster: &[EntityRef]) -> Self {
        let by_id: HashMap<&str, &EntityRef> = roster.iter().map(|e| (e.id.as_str(), e)).collect();
        let items = selection
            .iter()
            .map(|id| match by_id.get(id) {
                Some(entity) => (*entity).clone(),
                None => EntityRef::new(id, ""),
            })
            .collect();
        Self { kind, items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Outcome of one item in a batch run.
#[derive(Debug)]
pub struct ItemOutcome {
    pub id: String,
    pub name: String,
    /// Archive member name, present when the card was fetched and archived.
    pub archived_as: Option<String>,
    /// Retrieval failure, present when the item was skipped.
    pub error: Option<ClientError>,
}

impl ItemOutcome {
    pub fn succeeded(&self) -> bool {
        self.archived_as.is_some()
    }
}

/// Result of one batch run: the finalized archive plus the per-item tally.
#[derive(Debug)]
pub struct BatchOutcome {
    pub archive: Vec<u8>,
    /// Item count of the plan this run started from.
    pub total: usize,
    /// Outcomes for the items that were attempted, in plan order.
    pub items: Vec<ItemOutcome>,
    /// True when a raised [`StopFlag`] ended the run before all items were
    /// attempted.
    pub stopped: bool,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter().filter(|i| !i.succeeded())
    }
}

/// One batch invocation over a fixed plan.
///
/// Each batch owns its own assembler and progress counter; nothing is
/// shared across invocations. `run` consumes the batch: one plan, one
/// archive, one outcome.
pub struct Batch {
    plan: ExportPlan,
    progress: watch::Sender<Progress>,
    stop: StopFlag,
}

impl Batch {
    pub fn new(plan: ExportPlan) -> Self {
        let (progress, _) = watch::channel(Progress::start(plan.len()));
        Self {
            plan,
            progress,
            stop: StopFlag::new(),
        }
    }

    /// Read-only view of the published progress counter. The channel closes
    /// when the run finishes.
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    /// Handle for stopping the run between items.
    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    pub fn plan(&self) -> &ExportPlan {
        &self.plan
    }

    /// Fetch every planned card in order, one request at a time.
    ///
    /// A failed item is logged, recorded in the outcome, and skipped; it
    /// never aborts the batch. The progress counter advances once per item,
    /// success or failure alike. The archive is finalized even when nothing
    /// succeeded: a zero-entry archive is valid, degenerate output, and
    /// the caller decides how loudly to flag it.
    pub async fn run<C: CardSource>(self, source: &C) -> Result<BatchOutcome, BatchError> {
        let total = self.plan.len();
        let mut assembler = Assembler::new();
        let mut items = Vec::with_capacity(total);
        let mut stopped = false;

        for entity in &self.plan.items {
            if self.stop.is_raised() {
                warn!(
                    kind = %self.plan.kind,
                    attempted = items.len(),
                    total,
                    "stop requested, skipping remaining cards"
                );
                stopped = true;
                break;
            }

            match source.fetch_card(self.plan.kind, &entity.id).await {
                Ok(payload) => {
                    let member = member_name(&entity.name, &entity.id);
                    debug!(id = %entity.id, member = %member, bytes = payload.len(), "archived card");
                    assembler.add(member.clone(), payload);
                    items.push(ItemOutcome {
                        id: entity.id.clone(),
                        name: entity.name.clone(),
                        archived_as: Some(member),
                        error: None,
                    });
                }
                Err(cause) => {
                    warn!(id = %entity.id, error = %cause, "failed to fetch card, skipping");
                    items.push(ItemOutcome {
                        id: entity.id.clone(),
                        name: entity.name.clone(),
                        archived_as: None,
                        error: Some(cause),
                    });
                }
            }

            self.progress.send_modify(|p| p.completed += 1);
        }

        let archive = assembler.finalize()?;
        Ok(BatchOutcome {
            archive,
            total,
            items,
            stopped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Cursor;
    use std::sync::Mutex;

    use bytes::Bytes;

    /// Scripted card source: records call order and the progress value
    /// observed at each call, fails for configured ids, optionally raises a
    /// stop flag after a number of calls.
    struct ScriptedSource {
        fail: HashSet<String>,
        calls: Mutex<Vec<String>>,
        observed: Mutex<Vec<Progress>>,
        progress: watch::Receiver<Progress>,
        stop_after: Option<(usize, StopFlag)>,
    }

    impl ScriptedSource {
        fn new(batch: &Batch, fail: &[&str]) -> Self {
            Self {
                fail: fail.iter().map(|s| s.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
                observed: Mutex::new(Vec::new()),
                progress: batch.subscribe(),
                stop_after: None,
            }
        }

        fn stop_after(mut self, calls: usize, flag: StopFlag) -> Self {
            self.stop_after = Some((calls, flag));
            self
        }
    }

    impl CardSource for ScriptedSource {
        async fn fetch_card(&self, _kind: CardKind, id: &str) -> cardpack_client::Result<Bytes> {
            let call_count = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(id.to_string());
                calls.len()
            };
            self.observed.lock().unwrap().push(*self.progress.borrow());

            if let Some((after, flag)) = &self.stop_after
                && call_count >= *after
            {
                flag.raise();
            }

            if self.fail.contains(id) {
                Err(ClientError::Status {
                    path: format!("id-cards/staff/{id}"),
                    status: reqwest::StatusCode::BAD_GATEWAY,
                })
            } else {
                Ok(Bytes::from(format!("%PDF {id}")))
            }
        }
    }

    fn plan_of(ids: &[&str]) -> ExportPlan {
        let items = ids
            .iter()
            .map(|id| EntityRef::new(*id, format!("Name {id}")))
            .collect();
        ExportPlan::new(CardKind::Staff, items)
    }

    fn archive_entries(archive: &[u8]) -> Vec<String> {
        let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
        (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[tokio::test]
    async fn empty_plan_completes_immediately() {
        let batch = Batch::new(plan_of(&[]));
        let rx = batch.subscribe();
        let source = ScriptedSource::new(&batch, &[]);

        let outcome = batch.run(&source).await.unwrap();

        assert!(source.calls.lock().unwrap().is_empty());
        assert_eq!(outcome.total, 0);
        assert!(outcome.items.is_empty());
        assert!(archive_entries(&outcome.archive).is_empty());
        assert!(rx.borrow().is_done());
    }

    #[tokio::test]
    async fn progress_advances_once_per_item_and_reaches_total() {
        let batch = Batch::new(plan_of(&["a", "b", "c", "d"]));
        let rx = batch.subscribe();
        let source = ScriptedSource::new(&batch, &["b"]);

        let outcome = batch.run(&source).await.unwrap();

        // At the start of item i the counter reads (i, n): one increment per
        // item, failures included, never more.
        let observed = source.observed.lock().unwrap();
        let expected: Vec<Progress> = (0..4)
            .map(|completed| Progress {
                completed,
                total: 4,
            })
            .collect();
        assert_eq!(*observed, expected);
        assert_eq!(*rx.borrow(), Progress {
            completed: 4,
            total: 4,
        });
        assert_eq!(outcome.succeeded(), 3);
        assert_eq!(outcome.failed(), 1);
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_rest() {
        let batch = Batch::new(plan_of(&["a", "b", "c"]));
        let source = ScriptedSource::new(&batch, &["a"]);

        let outcome = batch.run(&source).await.unwrap();

        assert_eq!(*source.calls.lock().unwrap(), ["a", "b", "c"]);
        assert_eq!(
            archive_entries(&outcome.archive),
            ["ID_Name_b.pdf", "ID_Name_c.pdf"]
        );
        let failed: Vec<_> = outcome.failures().map(|i| i.id.as_str()).collect();
        assert_eq!(failed, ["a"]);
        assert!(outcome.items[0].error.is_some());
    }

    #[tokio::test]
    async fn all_failures_still_produce_an_archive() {
        let batch = Batch::new(plan_of(&["a", "b"]));
        let source = ScriptedSource::new(&batch, &["a", "b"]);

        let outcome = batch.run(&source).await.unwrap();

        assert_eq!(outcome.succeeded(), 0);
        assert!(archive_entries(&outcome.archive).is_empty());
        assert!(!outcome.stopped);
    }

    #[tokio::test]
    async fn raised_stop_flag_halts_between_items() {
        let batch = Batch::new(plan_of(&["a", "b", "c", "d"]));
        let rx = batch.subscribe();
        let flag = batch.stop_flag();
        let source = ScriptedSource::new(&batch, &[]).stop_after(2, flag);

        let outcome = batch.run(&source).await.unwrap();

        assert_eq!(*source.calls.lock().unwrap(), ["a", "b"]);
        assert!(outcome.stopped);
        assert_eq!(outcome.items.len(), 2);
        assert_eq!(
            archive_entries(&outcome.archive),
            ["ID_Name_a.pdf", "ID_Name_b.pdf"]
        );
        assert_eq!(*rx.borrow(), Progress {
            completed: 2,
            total: 4,
        });
    }

    #[tokio::test]
    async fn plan_resolves_names_in_selection_order() {
        let mut selection = Selection::new();
        for id in ["c", "a", "missing"] {
            selection.toggle(id);
        }
        let roster = vec![
            EntityRef::new("a", "Abdul Karim"),
            EntityRef::new("b", "Unpicked"),
            EntityRef::new("c", "Chowdhury"),
        ];

        let plan = ExportPlan::from_selection(CardKind::Student, &selection, &roster);

        assert_eq!(plan.len(), 3);
        assert_eq!(plan.items[0], EntityRef::new("c", "Chowdhury"));
        assert_eq!(plan.items[1], EntityRef::new("a", "Abdul Karim"));
        assert_eq!(plan.items[2], EntityRef::new("missing", ""));
    }
}
