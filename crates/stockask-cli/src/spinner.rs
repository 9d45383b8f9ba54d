use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const FRAME_INTERVAL: Duration = Duration::from_millis(300);
const MAX_DOTS: usize = 3;

/// `Processing.` with one to three dots for the given frame number.
pub fn frame(tick: usize) -> String {
    format!("Processing{}", ".".repeat(tick % MAX_DOTS + 1))
}

/// Cosmetic progress indicator driven by a shared loading flag.
pub struct Spinner {
    loading: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Starts drawing on stderr when it is a terminal and `enabled` is set.
    pub fn start(loading: Arc<AtomicBool>, enabled: bool) -> Self {
        loading.store(true, Ordering::SeqCst);
        let handle = (enabled && io::stderr().is_terminal()).then(|| {
            let loading = Arc::clone(&loading);
            thread::spawn(move || draw(&loading))
        });
        Self { loading, handle }
    }

    pub fn stop(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        self.loading.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.finish();
    }
}

fn draw(loading: &AtomicBool) {
    let mut stderr = io::stderr();
    let mut tick = 0;
    while loading.load(Ordering::SeqCst) {
        let _ = write!(stderr, "\r{:<13}", frame(tick));
        let _ = stderr.flush();
        tick += 1;
        thread::sleep(FRAME_INTERVAL);
    }
    let _ = write!(stderr, "\r{:13}\r", "");
    let _ = stderr.flush();
}
