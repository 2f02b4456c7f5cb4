use std::ops::Range;

use crate::PartyConfig;

/// Hook reporting `(completed gates, total gates)` after each batch.
pub type Progress = Box<dyn FnMut(usize, usize) + Send>;

/// Splits `0..total` into batches of at most `size` gates.
pub(crate) fn batches(total: usize, size: Option<usize>) -> impl Iterator<Item = Range<usize>> {
    let size = size.unwrap_or(total).max(1);
    (0..total)
        .step_by(size)
        .map(move |start| start..(start + size).min(total))
}

/// Processes the gates of a circuit batch by batch, yielding to the
/// scheduler between batches.
///
/// An empty circuit reports `(0, 0)` once.
pub(crate) async fn run_batched<E>(
    total: usize,
    config: &PartyConfig,
    progress: &mut Option<Progress>,
    mut process: impl FnMut(Range<usize>) -> Result<(), E>,
) -> Result<(), E> {
    let mut report = |completed: usize| {
        if let Some(progress) = progress.as_mut() {
            progress(completed, total);
        }
    };

    if total == 0 {
        report(0);
        return Ok(());
    }

    for range in batches(total, config.batch_size()) {
        let end = range.end;
        process(range)?;
        report(end);

        if end < total {
            pause(config).await;
        }
    }

    Ok(())
}

async fn pause(config: &PartyConfig) {
    let delay = config.yield_delay();
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(delay).await;
    }
}
