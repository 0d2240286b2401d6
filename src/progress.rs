use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use indicatif::{HumanDuration, MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

pub struct Progress {
    enabled: bool,
    start: Instant,

    // UI
    mp: Option<MultiProgress>,
    stage: ProgressBar,
    pages: ProgressBar,

    // Counters
    pages_total: AtomicU64,
    pages_done: AtomicU64,
    blocks_rendered: AtomicU64,
    blocks_failed: AtomicU64,
}

impl Progress {
    pub fn new(enabled: bool) -> Arc<Self> {
        let start = Instant::now();

        if !enabled {
            return Arc::new(Self {
                enabled: false,
                start,
                mp: None,
                stage: ProgressBar::hidden(),
                pages: ProgressBar::hidden(),
                pages_total: AtomicU64::new(0),
                pages_done: AtomicU64::new(0),
                blocks_rendered: AtomicU64::new(0),
                blocks_failed: AtomicU64::new(0),
            });
        }

        let mp = MultiProgress::with_draw_target(ProgressDrawTarget::stderr());

        let stage = mp.add(ProgressBar::new_spinner());
        stage.set_style(
            ProgressStyle::with_template("{spinner} {msg}  [{elapsed_precise}]").unwrap(),
        );
        stage.enable_steady_tick(Duration::from_millis(80));
        stage.set_message("准备开始");

        let pages = mp.add(ProgressBar::new(0));
        pages.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("##-"),
        );
        pages.set_message("pages");

        Arc::new(Self {
            enabled: true,
            start,
            mp: Some(mp),
            stage,
            pages,
            pages_total: AtomicU64::new(0),
            pages_done: AtomicU64::new(0),
            blocks_rendered: AtomicU64::new(0),
            blocks_failed: AtomicU64::new(0),
        })
    }

    pub fn set_stage(&self, msg: impl Into<String>) {
        if !self.enabled {
            return;
        }
        self.stage.set_message(msg.into());
    }

    pub fn set_pages_total(&self, total: usize) {
        self.pages_total.store(total as u64, Ordering::Relaxed);
        if self.enabled {
            self.pages.set_length(total as u64);
        }
    }

    pub fn page_done(&self, name: &str) {
        self.pages_done.fetch_add(1, Ordering::Relaxed);
        if self.enabled {
            self.pages.inc(1);
            self.pages.set_message(name.to_string());
        }
    }

    pub fn add_blocks(&self, rendered: usize, failed: usize) {
        self.blocks_rendered
            .fetch_add(rendered as u64, Ordering::Relaxed);
        self.blocks_failed.fetch_add(failed as u64, Ordering::Relaxed);
    }

    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        self.stage.finish_with_message("完成");
        self.pages.finish_and_clear();
        if let Some(mp) = &self.mp {
            let pages = self.pages_done.load(Ordering::Relaxed);
            let rendered = self.blocks_rendered.load(Ordering::Relaxed);
            let failed = self.blocks_failed.load(Ordering::Relaxed);
            // Best effort: ensure the last render flushes.
            let _ = mp.println(format!(
                "Done in {}: pages {pages} | pseudocode rendered {rendered} failed {failed}",
                HumanDuration(self.start.elapsed())
            ));
        }
    }
}
