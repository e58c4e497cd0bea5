use super::update::UiUpdate;
use crate::state::{GenerationId, StreamCoordinator};
use crate::types::GenerationRequest;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum Job {
    Generate {
        generation: GenerationId,
        request: GenerationRequest,
        cancel: CancellationToken,
    },
    Analyze {
        code: String,
    },
}

/// Spawns the task that dispatches network jobs. Each job runs on its own
/// task, so an analysis never waits behind a stream; a generation ends early
/// when its token is cancelled.
pub fn spawn_worker(
    coordinator: StreamCoordinator,
    update_tx: mpsc::UnboundedSender<UiUpdate>,
) -> (mpsc::UnboundedSender<Job>, JoinHandle<()>) {
    let (job_tx, job_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run_worker(coordinator, job_rx, update_tx));
    (job_tx, handle)
}

async fn run_worker(
    coordinator: StreamCoordinator,
    mut job_rx: mpsc::UnboundedReceiver<Job>,
    update_tx: mpsc::UnboundedSender<UiUpdate>,
) {
    while let Some(job) = job_rx.recv().await {
        match job {
            Job::Generate {
                generation,
                request,
                cancel,
            } => {
                let coordinator = coordinator.clone();
                let tx = update_tx.clone();
                tokio::spawn(async move {
                    let update = run_generation(&coordinator, generation, &request, &cancel, &tx).await;
                    let _ = tx.send(update);
                });
            }
            Job::Analyze { code } => {
                let client = coordinator.client();
                let tx = update_tx.clone();
                tokio::spawn(async move {
                    let update = match client.analyze_code(&code).await {
                        Ok(summary) => UiUpdate::Analysis(summary),
                        Err(e) => {
                            log::warn!("analysis failed: {e:#}");
                            UiUpdate::AnalysisFailed(e.to_string())
                        }
                    };
                    let _ = tx.send(update);
                });
            }
        }
    }
    log::debug!("worker stopped");
}

async fn run_generation(
    coordinator: &StreamCoordinator,
    generation: GenerationId,
    request: &GenerationRequest,
    cancel: &CancellationToken,
    update_tx: &mpsc::UnboundedSender<UiUpdate>,
) -> UiUpdate {
    if cancel.is_cancelled() {
        return UiUpdate::Cancelled { generation };
    }

    let stream = coordinator.stream(request, |text| {
        let _ = update_tx.send(UiUpdate::Increment {
            generation,
            text: text.to_string(),
        });
    });

    tokio::select! {
        result = stream => match result {
            Ok(()) => UiUpdate::Complete { generation },
            Err(e) => {
                log::warn!("generation {generation} failed: {e}");
                UiUpdate::Failed { generation, message: e.message }
            }
        },
        _ = cancel.cancelled() => {
            log::debug!("generation {generation} cancelled");
            UiUpdate::Cancelled { generation }
        }
    }
}
