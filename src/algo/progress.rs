//! Progress reporting for the meshing run.
//!
//! The engine reports how much of the initial front has been retired. The
//! front can grow while rows advance, so `current` is clamped to `total`
//! and the numbers are indicative only.
//!
//! # Example
//!
//! ```
//! use qmorph::algo::progress::Progress;
//!
//! let progress = Progress::new(|current, total, message| {
//!     eprintln!("[{}/{}] {}", current, total, message);
//! });
//! progress.report(3, 10, "front edges consumed");
//! ```

/// A progress callback that receives updates during a run.
///
/// The callback receives:
/// - `current`: units of work done so far
/// - `total`: expected units of work
/// - `message`: what is being done
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current.min(total), total, message);
    }

    /// Report how far the front has shrunk from its initial size.
    pub fn report_front(&self, initial: usize, remaining: usize) {
        let done = initial.saturating_sub(remaining);
        self.report(done, initial, "advancing front");
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
