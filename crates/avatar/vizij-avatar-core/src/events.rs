//! Lifecycle notifications delivered to the embedding caller.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Serialized as `{ "type": "animation-start", "index": 0 }`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StageEvent {
    AnimationStart { index: usize },
    AnimationEnd { index: usize },
}

impl StageEvent {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AnimationStart { .. } => "animation-start",
            Self::AnimationEnd { .. } => "animation-end",
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Self::AnimationStart { index } | Self::AnimationEnd { index } => *index,
        }
    }
}

pub type Listener = Box<dyn FnMut(&StageEvent)>;

/// Synchronous fan-out to registered listeners, in registration order.
#[derive(Default)]
pub struct EventEmitter {
    listeners: Vec<Listener>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StageEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn emit(&mut self, event: StageEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    #[inline]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Shared log of emitted events. Cloning shares the same buffer, so one clone
/// can be handed to `subscribe` while another is inspected.
#[derive(Clone, Debug, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<StageEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener(&self) -> impl FnMut(&StageEvent) + 'static {
        let events = Rc::clone(&self.events);
        move |event| events.borrow_mut().push(*event)
    }

    pub fn events(&self) -> Vec<StageEvent> {
        self.events.borrow().clone()
    }

    pub fn take(&self) -> Vec<StageEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}
