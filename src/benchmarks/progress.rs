use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::JoinHandle;

/// Progress bar over a run's duration, showing completed iterations.
pub(crate) struct RunProgress {
    bar: ProgressBar,
    ticker: JoinHandle<()>,
}

impl RunProgress {
    pub(crate) fn start(name: &str, duration: Duration, completed: Arc<AtomicU64>) -> Self {
        let bar = ProgressBar::new(duration.as_millis() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.green/blue}] {elapsed_precise} ({percent}%)")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        bar.set_message(name.to_string());

        let ticker = {
            let bar = bar.clone();
            let name = name.to_string();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_millis(100));
                loop {
                    interval.tick().await;
                    bar.set_position(bar.elapsed().as_millis() as u64);
                    bar.set_message(format!(
                        "{}: {} iterations",
                        name,
                        completed.load(Ordering::Relaxed)
                    ));
                }
            })
        };

        Self { bar, ticker }
    }

    pub(crate) fn finish(self) {
        self.bar.finish_with_message("Benchmark complete");
    }
}

impl Drop for RunProgress {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}
