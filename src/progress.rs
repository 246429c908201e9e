// src/progress.rs
/// Progress reporting for the page fetch. The collector thread is the only caller.
pub trait Progress {
    /// Called at the start with the number of pages queued.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    fn item_done(&mut self, _url: &str) {}

    fn item_failed(&mut self, _url: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
