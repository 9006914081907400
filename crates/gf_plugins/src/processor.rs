use crate::descriptor::ValidatedPlugin;
use crate::error::{BoxError, PluginError, PluginErrorKind, Result};
use crate::options::PluginOptions;
use crate::plugin_trait::{Finalize, Transform};
use gf_domain::{ContentForm, Encoding, Item};
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessorState {
    Accepting,
    Finalizing,
    Closed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessorStats {
    pub offered: usize,
    pub forwarded: usize,
    pub passed_through: usize,
    pub failed: usize,
}

/// A transform or finalizer that panicked instead of returning an error.
#[derive(Debug, Error)]
#[error("panicked: {0}")]
pub struct Panicked(pub String);

/// Runs one plugin's transform over items, then its finalizer once.
///
/// Created by [`PluginDescriptor::build`](crate::PluginDescriptor::build).
/// Items are processed one at a time; a failing item does not stop the
/// processor, but nothing is accepted once [`finish`](Self::finish) ran.
pub struct ItemProcessor {
    name: String,
    transform: Box<dyn Transform>,
    finalizer: Option<Box<dyn Finalize>>,
    options: PluginOptions,
    state: ProcessorState,
    stats: ProcessorStats,
}

impl ItemProcessor {
    pub(crate) fn new(plugin: ValidatedPlugin) -> Self {
        Self {
            name: plugin.name,
            transform: plugin.transform,
            finalizer: plugin.finalizer,
            options: plugin.options,
            state: ProcessorState::Accepting,
            stats: ProcessorStats::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    pub fn stats(&self) -> ProcessorStats {
        self.stats
    }

    pub fn has_finalizer(&self) -> bool {
        self.finalizer.is_some()
    }

    /// Process one item, returning it for the next stage.
    ///
    /// Items without content are returned untouched and never reach the
    /// transform. On failure the item is dropped.
    pub fn offer(&mut self, mut item: Item, encoding: Encoding) -> Result<Item> {
        if self.state != ProcessorState::Accepting {
            return Err(self.fail(PluginErrorKind::ProcessorClosed, &item));
        }
        self.stats.offered += 1;

        let form = match item.content_form() {
            None => {
                debug!(plugin = %self.name, path = %item.path.display(), "Passing through item without content");
                self.stats.passed_through += 1;
                return Ok(item);
            }
            Some(form) => form,
        };

        let supported = match form {
            ContentForm::Stream => self.options.stream_support,
            ContentForm::Buffer => self.options.buffer_support,
        };
        if !supported {
            self.stats.failed += 1;
            return Err(self.fail(PluginErrorKind::UnsupportedContentForm(form), &item));
        }

        let transform = &mut self.transform;
        let outcome = catch_unwind(AssertUnwindSafe(|| transform.transform(&mut item, encoding)));
        match flatten(outcome) {
            Ok(()) => {
                debug!(plugin = %self.name, path = %item.path.display(), "Transformed item");
                self.stats.forwarded += 1;
                Ok(item)
            }
            Err(cause) => {
                self.stats.failed += 1;
                Err(self.fail(PluginErrorKind::TransformFailure(cause), &item))
            }
        }
    }

    /// Signal that no more items will come and run the finalizer.
    ///
    /// Calling this again on a closed processor is a no-op.
    pub fn finish(&mut self) -> Result<()> {
        if self.state == ProcessorState::Closed {
            debug!(plugin = %self.name, "Processor already closed");
            return Ok(());
        }
        self.state = ProcessorState::Finalizing;

        let outcome = match self.finalizer.as_mut() {
            None => Ok(()),
            Some(finalizer) => flatten(catch_unwind(AssertUnwindSafe(|| finalizer.finalize()))),
        };
        self.state = ProcessorState::Closed;

        match outcome {
            Ok(()) => {
                info!(plugin = %self.name, stats = ?self.stats, "Plugin finished");
                Ok(())
            }
            Err(cause) => {
                let err = PluginError::new(
                    self.name.clone(),
                    PluginErrorKind::FinalizationFailure(cause),
                    self.options.diagnostics(),
                );
                warn!(plugin = %self.name, "{}", err);
                Err(err)
            }
        }
    }

    fn fail(&self, kind: PluginErrorKind, item: &Item) -> PluginError {
        let err = PluginError::new(self.name.clone(), kind, self.options.diagnostics())
            .with_item_path(&item.path);
        warn!(plugin = %self.name, path = %item.path.display(), "{}", err);
        err
    }
}

impl fmt::Debug for ItemProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemProcessor")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .field("has_finalizer", &self.finalizer.is_some())
            .finish()
    }
}

fn flatten(
    outcome: std::result::Result<std::result::Result<(), BoxError>, Box<dyn Any + Send>>,
) -> std::result::Result<(), BoxError> {
    match outcome {
        Ok(result) => result,
        Err(payload) => Err(Box::new(Panicked(panic_message(payload.as_ref())))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
