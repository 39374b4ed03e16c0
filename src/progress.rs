// src/progress.rs
/// Lightweight progress reporting for long-running acquisition passes.
/// Frontends implement this to surface status while districts crawl by.
pub trait Progress {
    /// Called when a signal's pass starts, with the number of districts.
    fn begin(&mut self, _signal: &str, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when a district resolves to a live value.
    fn district_done(&mut self, _district: &str) {}

    /// Called when a district falls through to its fallback.
    fn district_failed(&mut self, _district: &str, _why: &str) {}

    /// Called when the pass ends, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
