use crate::core::{Coordinates, LotSource, ParkingLot};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    LocationFailed,
    ProviderFailed,
}

/// Something the surrounding UI should show the user (a toast, usually).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub detail: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: detail.into(),
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum CoreEvent {
    SelectionChanged { lot: Option<ParkingLot> },
    RecenterRequested { center: Coordinates },
    LotsUpdated { count: usize, source: LotSource },
    Notice(Notice),
}

/// Fan-out of core events to any number of UI observers.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<UnboundedSender<CoreEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> UnboundedReceiver<CoreEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx);
        rx
    }

    /// Dropped receivers are pruned on the way.
    pub fn emit(&self, event: CoreEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionState {
    Idle,
    Selected(ParkingLot),
}

/// Tracks the single selected lot. `select` always wins (last write wins);
/// `clear` from `Idle` does nothing.
#[derive(Debug)]
pub struct SelectionController {
    state: SelectionState,
    bus: EventBus,
}

impl SelectionController {
    pub fn new(bus: EventBus) -> Self {
        Self {
            state: SelectionState::Idle,
            bus,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn selected(&self) -> Option<&ParkingLot> {
        match &self.state {
            SelectionState::Idle => None,
            SelectionState::Selected(lot) => Some(lot),
        }
    }

    pub fn select(&mut self, lot: ParkingLot) {
        tracing::debug!("Selecting lot {} ({})", lot.id(), lot.name());
        let center = lot.coordinates();
        self.state = SelectionState::Selected(lot.clone());
        self.bus.emit(CoreEvent::SelectionChanged { lot: Some(lot) });
        self.bus.emit(CoreEvent::RecenterRequested { center });
    }

    pub fn clear(&mut self) {
        if let SelectionState::Selected(lot) = &self.state {
            tracing::debug!("Clearing selection of lot {}", lot.id());
            self.state = SelectionState::Idle;
            self.bus.emit(CoreEvent::SelectionChanged { lot: None });
        }
    }
}
