use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::thread;
use std::time::{Duration, Instant};

/// Shared counters for a long hashing run, reported through `tracing` by a
/// background thread while `start`ed.
#[derive(Clone)]
pub struct Progress {
    enabled: bool,
    interval: Duration,
    stage: Arc<Mutex<String>>,
    files_done: Arc<AtomicU64>,
    files_total: Arc<AtomicU64>,
    bytes_done: Arc<AtomicU64>,
    bytes_total: Arc<AtomicU64>,
    /// Bumped by every `start` and `stop`; a reporter exits once it no longer matches.
    generation: Arc<AtomicU64>,
    reporters: Arc<AtomicUsize>,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        Self::with_interval(enabled, Duration::from_secs(2))
    }

    pub fn with_interval(enabled: bool, interval: Duration) -> Self {
        Self {
            enabled,
            interval,
            stage: Arc::new(Mutex::new(String::new())),
            files_done: Arc::new(AtomicU64::new(0)),
            files_total: Arc::new(AtomicU64::new(0)),
            bytes_done: Arc::new(AtomicU64::new(0)),
            bytes_total: Arc::new(AtomicU64::new(0)),
            generation: Arc::new(AtomicU64::new(0)),
            reporters: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn set_stage(&self, s: &str) {
        if let Ok(mut stage) = self.stage.lock() {
            *stage = s.to_string();
        }
    }

    pub fn reset(&self, files: u64, bytes: u64) {
        self.files_total.store(files, Ordering::Relaxed);
        self.bytes_total.store(bytes, Ordering::Relaxed);
        self.files_done.store(0, Ordering::Relaxed);
        self.bytes_done.store(0, Ordering::Relaxed);
    }

    pub fn file_done(&self, bytes: u64) {
        self.files_done.fetch_add(1, Ordering::Relaxed);
        self.bytes_done.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn files_done(&self) -> u64 {
        self.files_done.load(Ordering::Relaxed)
    }

    pub fn bytes_done(&self) -> u64 {
        self.bytes_done.load(Ordering::Relaxed)
    }

    pub fn start(&self) {
        if !self.enabled {
            return;
        }
        let epoch = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.reporters.fetch_add(1, Ordering::SeqCst);
        let this = self.clone();
        thread::spawn(move || {
            let t0 = Instant::now();
            loop {
                thread::sleep(this.interval);
                if this.generation.load(Ordering::SeqCst) != epoch {
                    break;
                }
                this.report(t0);
            }
            this.reporters.fetch_sub(1, Ordering::SeqCst);
        });
    }

    pub fn stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Reporter threads still alive, including ones about to notice a `stop`.
    pub fn active_reporters(&self) -> usize {
        self.reporters.load(Ordering::SeqCst)
    }

    fn report(&self, t0: Instant) {
        let stage = self.stage.lock().map(|s| s.clone()).unwrap_or_default();
        let fd = self.files_done.load(Ordering::Relaxed);
        let ft = self.files_total.load(Ordering::Relaxed);
        let bd = self.bytes_done.load(Ordering::Relaxed);
        let bt = self.bytes_total.load(Ordering::Relaxed);
        let pct = if bt > 0 { (bd as f64 / bt as f64) * 100.0 } else { 0.0 };
        tracing::info!(
            elapsed_s = t0.elapsed().as_secs(),
            stage = %stage,
            files_done = fd,
            files_total = ft,
            bytes_pct = pct as i32,
            "progress"
        );
    }
}
