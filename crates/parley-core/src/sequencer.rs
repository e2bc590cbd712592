//! Message run-sequencing.
//!
//! Turns a flat, (sent_at, arrival)-ordered message list into display-ready
//! [`RenderedMessage`]s: consecutive messages from the same author within
//! the run gap cluster into one visual run, and a timestamp divider is shown
//! whenever the gap to the previous message reaches the threshold.

use crate::constants::run_gap;
use crate::models::{Message, RenderedMessage};
use crate::types::UserId;

/// `true` when `later` follows `earlier` closely enough to share a run or
/// hide its timestamp.  Strictly-less-than the run gap.
fn within_gap(earlier: &Message, later: &Message) -> bool {
    later.sent_at - earlier.sent_at < run_gap()
}

/// Annotate `batch` for display.
///
/// `prev` is the message immediately before the batch in the full sequence
/// (`None` at the very start); run and timestamp decisions at the batch
/// boundary are computed against it, so a batch appended after an earlier
/// render joins runs seamlessly.
fn annotate(viewer: &UserId, prev: Option<&Message>, batch: &[Message]) -> Vec<RenderedMessage> {
    let mut rendered = Vec::with_capacity(batch.len());

    for (i, current) in batch.iter().enumerate() {
        let previous = if i == 0 { prev } else { Some(&batch[i - 1]) };
        let next = batch.get(i + 1);

        let mut starts_run = true;
        let mut ends_run = true;
        let mut show_timestamp = true;

        if let Some(previous) = previous {
            if within_gap(previous, current) {
                show_timestamp = false;
                if previous.author_id == current.author_id {
                    starts_run = false;
                }
            }
        }

        if let Some(next) = next {
            if next.author_id == current.author_id && within_gap(current, next) {
                ends_run = false;
            }
        }

        rendered.push(RenderedMessage {
            is_own: &current.author_id == viewer,
            starts_run,
            ends_run,
            show_timestamp,
            message: current.clone(),
        });
    }

    rendered
}

/// Stateful per-viewer sequencer.
///
/// Holds the currently rendered sequence so that newly arrived messages can
/// be appended without recomputing everything.  State is view-only and
/// disposable; [`MessageSequencer::refresh`] rebuilds it from scratch.
#[derive(Debug, Clone)]
pub struct MessageSequencer {
    viewer: UserId,
    rendered: Vec<RenderedMessage>,
}

impl MessageSequencer {
    pub fn new(viewer: UserId) -> Self {
        Self {
            viewer,
            rendered: Vec::new(),
        }
    }

    pub fn viewer(&self) -> &UserId {
        &self.viewer
    }

    /// The current display sequence.
    pub fn rendered(&self) -> &[RenderedMessage] {
        &self.rendered
    }

    /// Full recompute from a freshly fetched ordered list, discarding any
    /// prior rendered state.  Used whenever the active group changes.
    pub fn refresh(&mut self, messages: &[Message]) -> &[RenderedMessage] {
        self.rendered = annotate(&self.viewer, None, messages);
        &self.rendered
    }

    /// Append newly arrived messages.
    ///
    /// The first incoming message is annotated against the last rendered
    /// one, and that tail's `ends_run` is re-evaluated against the new
    /// head, so the stored sequence always equals a full recompute of the
    /// concatenated input.
    pub fn append(&mut self, incoming: &[Message]) -> &[RenderedMessage] {
        if incoming.is_empty() {
            return &self.rendered;
        }

        let seam = self.rendered.last().map(|r| r.message.clone());
        let annotated = annotate(&self.viewer, seam.as_ref(), incoming);

        if let (Some(tail), Some(head)) = (self.rendered.last_mut(), incoming.first()) {
            tail.ends_run =
                !(head.author_id == tail.message.author_id && within_gap(&tail.message, head));
        }

        self.rendered.extend(annotated);
        &self.rendered
    }

    pub fn clear(&mut self) {
        self.rendered.clear();
    }
}
