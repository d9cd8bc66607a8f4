//! Base event store.
//!
//! Base events are deduplicated by id across the whole forest: the first row
//! mentioning an id defines its probability and metadata, later rows only refer to it.

use std::collections::HashMap;

use log::debug;

use crate::error::{Error, Result};
use crate::types::BaseId;

/// A leaf failure mode.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseEvent {
    pub id: BaseId,
    pub probability: f64,
    pub label: String,
    pub description: String,
    pub guidance: String,
}

impl BaseEvent {
    pub fn new(id: BaseId, probability: f64) -> Self {
        Self {
            id,
            probability,
            label: String::new(),
            description: String::new(),
            guidance: String::new(),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }
}

pub(crate) fn check_probability(id: BaseId, value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(Error::InvalidProbability { id, value })
    }
}

/// Flat table of unique base events, in first-occurrence order.
#[derive(Debug, Default, Clone)]
pub struct BaseEvents {
    events: Vec<BaseEvent>,
    index: HashMap<BaseId, usize>,
}

impl BaseEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Insert an event unless one with the same id exists.
    ///
    /// Returns `true` if the event was inserted, `false` if an earlier one is kept.
    pub fn insert(&mut self, event: BaseEvent) -> Result<bool> {
        check_probability(event.id, event.probability)?;
        if self.index.contains_key(&event.id) {
            debug!("base event {} already known, keeping the first occurrence", event.id);
            return Ok(false);
        }
        self.index.insert(event.id, self.events.len());
        self.events.push(event);
        Ok(true)
    }

    pub fn get(&self, id: BaseId) -> Option<&BaseEvent> {
        self.index.get(&id).map(|&i| &self.events[i])
    }

    pub fn probability(&self, id: BaseId) -> Result<f64> {
        self.get(id)
            .map(|event| event.probability)
            .ok_or(Error::UnknownBaseEvent { id })
    }

    /// The first event carrying `label`, in first-occurrence order.
    pub fn find_label(&self, label: &str) -> Option<BaseId> {
        self.events
            .iter()
            .find(|event| event.label == label)
            .map(|event| event.id)
    }
}
