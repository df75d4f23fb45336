//! Progress display for batch runs.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::work_queue::BatchEvent;

use super::helpers::truncate;

/// Consume batch events into a progress bar until the sender side closes.
///
/// Returns the event channel and the consumer task; await the task after the
/// batch returns so the bar is cleared before the summary prints. A `total` of
/// zero shows a spinner instead of a bar.
pub fn spawn_batch_progress(
    total: usize,
    show_progress: bool,
) -> (mpsc::Sender<BatchEvent>, JoinHandle<()>) {
    let (event_tx, mut event_rx) = mpsc::channel::<BatchEvent>(100);

    let pb = show_progress.then(|| {
        if total > 0 {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        } else {
            // Batch size unknown up front (one batch per keyword)
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {pos} processed {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(Duration::from_millis(120));
            pb
        }
    });

    let handle = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                BatchEvent::Started { product_id, .. } => {
                    if let Some(ref pb) = pb {
                        pb.set_message(product_id);
                    }
                }
                BatchEvent::Completed { title, .. } => {
                    if let Some(ref pb) = pb {
                        pb.set_message(truncate(&title, 40));
                        pb.inc(1);
                    }
                }
                BatchEvent::Failed {
                    product_id, error, ..
                } => {
                    let line = format!("{} {}: {}", style("✗").red(), product_id, error);
                    match pb {
                        Some(ref pb) => {
                            pb.println(line);
                            pb.inc(1);
                        }
                        None => eprintln!("{}", line),
                    }
                }
                BatchEvent::Finished { succeeded, failed } => {
                    tracing::debug!("Batch finished: {} ok, {} failed", succeeded, failed);
                }
            }
        }
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
    });

    (event_tx, handle)
}
