//! Progress-callback trait for per-stage conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to be told
//! when each pipeline stage starts and finishes. The CLI uses it to drive a
//! spinner; library users can forward the events anywhere they like.
//!
//! # Example
//!
//! ```rust
//! use md2pdf::{BackendKind, ConversionConfig, ConversionProgressCallback, Stage};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ConversionProgressCallback for Printer {
//!     fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
//!         eprintln!("{stage} done in {elapsed_ms}ms");
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .backend(BackendKind::Wkhtmltopdf)
//!     .progress_callback(Arc::new(Printer) as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// One step of the conversion pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Reading the Markdown source from disk.
    Read,
    /// Markdown → HTML fragment.
    Markdown,
    /// Fragment → styled HTML document.
    Assemble,
    /// HTML document → PDF bytes (the slow one).
    Render,
    /// PDF bytes → output file.
    Write,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Read => "Reading",
            Stage::Markdown => "Parsing Markdown",
            Stage::Assemble => "Assembling HTML",
            Stage::Render => "Rendering PDF",
            Stage::Write => "Writing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Called by the conversion pipeline as it moves through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync` so a config
/// holding one can be moved across tasks.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called just before a stage begins.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage finishes successfully.
    ///
    /// # Arguments
    /// * `stage`     : the stage that finished
    /// * `elapsed_ms`: wall-clock time spent in it
    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        let _ = (stage, elapsed_ms);
    }

    /// Called when a stage fails; no further stages run afterwards.
    fn on_stage_error(&self, stage: Stage, error: &str) {
        let _ = (stage, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ConversionProgressCallback for Recorder {
        fn on_stage_start(&self, stage: Stage) {
            self.events.lock().unwrap().push(format!("start {stage:?}"));
        }

        fn on_stage_complete(&self, stage: Stage, _elapsed_ms: u64) {
            self.events.lock().unwrap().push(format!("done {stage:?}"));
        }

        fn on_stage_error(&self, stage: Stage, error: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("fail {stage:?}: {error}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_stage_start(Stage::Read);
        cb.on_stage_complete(Stage::Read, 3);
        cb.on_stage_error(Stage::Render, "engine crashed");
    }

    #[test]
    fn recorder_sees_events_in_order() {
        let rec = Recorder::default();
        rec.on_stage_start(Stage::Render);
        rec.on_stage_error(Stage::Render, "boom");
        assert_eq!(
            *rec.events.lock().unwrap(),
            vec!["start Render".to_string(), "fail Render: boom".to_string()]
        );
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_stage_start(Stage::Markdown);
        cb.on_stage_complete(Stage::Markdown, 0);
    }

    #[test]
    fn stage_labels() {
        assert_eq!(Stage::Render.to_string(), "Rendering PDF");
        assert_eq!(serde_json::to_string(&Stage::Write).unwrap(), "\"write\"");
    }
}
