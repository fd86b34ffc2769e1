//! Compass heading subscription.
//!
//! The heading only orients the map camera; nothing in the route or distance
//! math reads it.  The session owns exactly one [`HeadingSlot`], which is
//! either subscribed (holding the live handle) or unsubscribed.  Every path
//! that releases the handle, including `Drop`, goes through
//! [`HeadingSlot::unsubscribe`], so a handle is removed exactly once no
//! matter how often `toggle` is called.

use log::{debug, warn};

use crate::SensorError;

/// A live listener registration on the heading sensor.
pub trait HeadingSubscription: Send {
    /// Latest magnetic heading in degrees, if a reading has arrived.
    fn heading_deg(&self) -> Option<f64>;

    /// Deregister the listener.
    fn remove(self: Box<Self>);
}

/// The heading sensor itself.
pub trait HeadingSource: Send {
    fn subscribe(&self) -> Result<Box<dyn HeadingSubscription>, SensorError>;
}

enum SlotState {
    Subscribed(Box<dyn HeadingSubscription>),
    Unsubscribed,
}

/// Single owned slot for the session's heading subscription.
pub struct HeadingSlot {
    source: Option<Box<dyn HeadingSource>>,
    state:  SlotState,
}

impl HeadingSlot {
    pub fn new(source: Box<dyn HeadingSource>) -> Self {
        Self {
            source: Some(source),
            state:  SlotState::Unsubscribed,
        }
    }

    /// A slot with no sensor behind it; `subscribe` always fails softly.
    pub fn detached() -> Self {
        Self {
            source: None,
            state:  SlotState::Unsubscribed,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        matches!(self.state, SlotState::Subscribed(_))
    }

    /// Subscribe if not already subscribed.  Returns whether the slot is
    /// subscribed afterwards; sensor errors are logged, not propagated.
    pub fn subscribe(&mut self) -> bool {
        if self.is_subscribed() {
            return true;
        }
        let Some(source) = &self.source else {
            debug!("no heading sensor attached");
            return false;
        };
        match source.subscribe() {
            Ok(handle) => {
                self.state = SlotState::Subscribed(handle);
                true
            }
            Err(e) => {
                warn!("heading subscription failed: {e}");
                false
            }
        }
    }

    /// Release the handle if one is held.  Safe to call repeatedly.
    pub fn unsubscribe(&mut self) {
        if let SlotState::Subscribed(handle) = std::mem::replace(&mut self.state, SlotState::Unsubscribed) {
            handle.remove();
        }
    }

    /// Flip between subscribed and unsubscribed.  Returns the new state.
    pub fn toggle(&mut self) -> bool {
        if self.is_subscribed() {
            self.unsubscribe();
            false
        } else {
            self.subscribe()
        }
    }

    /// Current heading for the camera; `0.0` when unsubscribed or no reading
    /// has arrived yet.
    pub fn heading_deg(&self) -> f64 {
        match &self.state {
            SlotState::Subscribed(handle) => handle.heading_deg().unwrap_or(0.0),
            SlotState::Unsubscribed => 0.0,
        }
    }
}

impl Default for HeadingSlot {
    fn default() -> Self {
        Self::detached()
    }
}

impl Drop for HeadingSlot {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
