//! Completion barrier for the per-chapter fan-out.
//!
//! Each task holds a [`CompletionSignal`] and reports exactly once by consuming
//! it. The main flow drains the [`CompletionBarrier`] until every task it was
//! told about has reported.

use tokio::sync::mpsc;

use crate::crawl::RetriesExhausted;
use crate::formats::{Chapter, ChapterSlot};

#[derive(Debug)]
pub struct Completion {
    pub slot: ChapterSlot,
    pub outcome: Result<Chapter, RetriesExhausted>,
}

#[derive(Debug, Clone)]
pub struct CompletionSignal {
    tx: mpsc::UnboundedSender<Completion>,
}

impl CompletionSignal {
    pub fn complete(self, slot: ChapterSlot, outcome: Result<Chapter, RetriesExhausted>) {
        // The barrier only goes away once the run is already failing.
        if self.tx.send(Completion { slot, outcome }).is_err() {
            tracing::debug!(?slot, "completion barrier closed; dropping result");
        }
    }
}

#[derive(Debug)]
pub struct CompletionBarrier {
    rx: mpsc::UnboundedReceiver<Completion>,
    total: usize,
    outstanding: usize,
}

pub fn channel(total: usize) -> (CompletionSignal, CompletionBarrier) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        CompletionSignal { tx },
        CompletionBarrier {
            rx,
            total,
            outstanding: total,
        },
    )
}

impl CompletionBarrier {
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Hands each completion to `on_completion` until none are outstanding.
    ///
    /// An error from `on_completion` ends the wait immediately. Callers must
    /// drop their own copy of the signal first, otherwise a task that dies
    /// without reporting leaves this waiting forever.
    pub async fn wait<F>(mut self, mut on_completion: F) -> anyhow::Result<()>
    where
        F: FnMut(Completion) -> anyhow::Result<()>,
    {
        tracing::info!(total = self.total, "waiting for chapters");

        while self.outstanding > 0 {
            let Some(completion) = self.rx.recv().await else {
                anyhow::bail!(
                    "all chapter tasks exited with {} of {} chapters unreported",
                    self.outstanding,
                    self.total
                );
            };
            self.outstanding -= 1;
            let slot = completion.slot;
            on_completion(completion)?;

            tracing::info!(
                done = self.total - self.outstanding,
                total = self.total,
                arc = slot.arc,
                chapter = slot.chapter,
                "chapter finished"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(arc: usize, chapter: usize) -> ChapterSlot {
        ChapterSlot { arc, chapter }
    }

    #[tokio::test]
    async fn wait_returns_once_every_task_reported() -> anyhow::Result<()> {
        let (signal, barrier) = channel(3);
        assert_eq!(barrier.outstanding(), 3);

        for (arc, chapter) in [(1, 0), (0, 1), (0, 0)] {
            let signal = signal.clone();
            tokio::spawn(async move {
                signal.complete(slot(arc, chapter), Ok(Chapter::default()));
            });
        }
        drop(signal);

        let mut seen = Vec::new();
        barrier
            .wait(|completion| {
                seen.push(completion.slot);
                Ok(())
            })
            .await?;

        seen.sort();
        assert_eq!(seen, vec![slot(0, 0), slot(0, 1), slot(1, 0)]);
        Ok(())
    }

    #[tokio::test]
    async fn every_completion_reports_progress() -> anyhow::Result<()> {
        let (logs, _guard) = crate::logging::capture();
        let (signal, barrier) = channel(3);
        for (arc, chapter) in [(0, 1), (1, 0), (0, 0)] {
            signal
                .clone()
                .complete(slot(arc, chapter), Ok(Chapter::default()));
        }
        drop(signal);
        barrier.wait(|_| Ok(())).await?;

        let logs = logs.contents();
        let progress: Vec<&str> = logs
            .lines()
            .filter(|line| line.contains("chapter finished"))
            .collect();
        assert_eq!(progress.len(), 3, "{logs}");
        for (line, done) in progress.iter().zip(1..) {
            assert!(line.contains(" INFO "), "{line}");
            assert!(line.contains(&format!("done={done} total=3")), "{line}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn wait_with_nothing_outstanding_returns_immediately() -> anyhow::Result<()> {
        let (_signal, barrier) = channel(0);
        barrier.wait(|_| anyhow::bail!("no completions expected")).await
    }

    #[tokio::test]
    async fn handler_error_stops_the_wait() {
        let (signal, barrier) = channel(2);
        signal.clone().complete(
            slot(0, 0),
            Err(RetriesExhausted {
                url: "https://example.com/1-1/".into(),
                retries: 4,
                last_error: "timeout".into(),
            }),
        );

        let mut calls = 0;
        let err = barrier
            .wait(|completion| {
                calls += 1;
                completion.outcome.map(|_| ()).map_err(anyhow::Error::from)
            })
            .await
            .expect_err("exhausted retries must fail the wait");
        assert_eq!(calls, 1);
        assert!(format!("{err:#}").contains("failed 4 times"));
        drop(signal);
    }

    #[tokio::test]
    async fn dropped_signals_with_outstanding_tasks_fail_the_wait() {
        let (signal, barrier) = channel(2);
        signal
            .clone()
            .complete(slot(0, 0), Ok(Chapter::default()));
        drop(signal);

        let err = barrier
            .wait(|_| Ok(()))
            .await
            .expect_err("one task never reported");
        assert!(err.to_string().contains("1 of 2"));
    }
}
