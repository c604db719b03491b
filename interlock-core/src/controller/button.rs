//! Debounced handling of the single "next" button.
//!
//! The button is the only operator input, so every acknowledgement in the
//! procedure goes through here. A press is recognised on the active level,
//! held for the settle delay, and only reported once the button reads
//! released again. The latch guarantees one physical press can never satisfy
//! two acknowledgements, even when a handler spots the press from a raw read.

use core::time::Duration;

use crate::sequence::timing::{DEBOUNCE_SETTLE, INPUT_POLL_INTERVAL};
use crate::signals::{InputId, input_by_id};

use super::{Clock, SignalInputs};

/// Edge-paired view of the advance button.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AdvanceButton {
    pending_release: bool,
    settle: Duration,
    poll: Duration,
}

impl AdvanceButton {
    /// Creates a button using the procedure's settle and poll timing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending_release: false,
            settle: DEBOUNCE_SETTLE,
            poll: INPUT_POLL_INTERVAL,
        }
    }

    /// Raw level check with the button's polarity applied.
    pub fn is_pressed<I>(inputs: &mut I) -> bool
    where
        I: SignalInputs + ?Sized,
    {
        input_by_id(InputId::AdvanceButton).is_active(inputs.level(InputId::AdvanceButton))
    }

    /// Returns `true` while a recognised press has not been seen released.
    #[must_use]
    pub const fn pending_release(&self) -> bool {
        self.pending_release
    }

    /// Records a press a handler recognised from a raw read.
    pub fn latch_press(&mut self) {
        self.pending_release = true;
    }

    /// Clears the latch if the button already reads released.
    pub fn observe_release<I>(&mut self, inputs: &mut I)
    where
        I: SignalInputs + ?Sized,
    {
        if self.pending_release && !Self::is_pressed(inputs) {
            self.pending_release = false;
        }
    }

    /// Reports a fresh press, at most once per physical press.
    ///
    /// Returns `false` immediately when the button is idle or still held from
    /// a press that was already reported.
    pub async fn poll_advance<I, C>(&mut self, inputs: &mut I, clock: &mut C) -> bool
    where
        I: SignalInputs + ?Sized,
        C: Clock + ?Sized,
    {
        if self.pending_release {
            if Self::is_pressed(inputs) {
                return false;
            }
            self.pending_release = false;
        }

        if !Self::is_pressed(inputs) {
            return false;
        }

        self.pending_release = true;
        clock.delay(self.settle).await;
        self.wait_for_release(inputs, clock).await;
        true
    }

    /// Blocks until the operator presses and releases the button.
    pub async fn await_confirmation<I, C>(&mut self, inputs: &mut I, clock: &mut C)
    where
        I: SignalInputs + ?Sized,
        C: Clock + ?Sized,
    {
        if self.pending_release {
            self.wait_for_release(inputs, clock).await;
        }

        while !Self::is_pressed(inputs) {
            clock.delay(self.poll).await;
        }

        self.pending_release = true;
        clock.delay(self.settle).await;
        self.wait_for_release(inputs, clock).await;
    }

    /// Blocks until the button reads released and clears the latch.
    pub async fn wait_for_release<I, C>(&mut self, inputs: &mut I, clock: &mut C)
    where
        I: SignalInputs + ?Sized,
        C: Clock + ?Sized,
    {
        while Self::is_pressed(inputs) {
            clock.delay(self.poll).await;
        }
        self.pending_release = false;
    }
}

impl Default for AdvanceButton {
    fn default() -> Self {
        Self::new()
    }
}
