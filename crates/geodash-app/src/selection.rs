// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Record, RecordId};

/// The one shared selection cell. Views never keep their own copy: they read
/// through [`SelectionAuthority::current`] and learn about changes through a
/// [`SelectionSubscription`].
///
/// A selected record that later drops out of the visible subset stays
/// selected. Views simply find nothing to highlight until the user picks
/// something else.
#[derive(Debug, Clone, Default)]
pub struct SelectionAuthority {
    current: Option<Record>,
    revision: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionChange {
    pub previous: Option<RecordId>,
    pub current: Option<Record>,
}

impl SelectionAuthority {
    pub fn current(&self) -> Option<&Record> {
        self.current.as_ref()
    }

    pub fn is_selected(&self, id: &RecordId) -> bool {
        self.current.as_ref().is_some_and(|record| &record.id == id)
    }

    /// Selecting the record that is already selected clears the selection.
    /// Passing `None` while nothing is selected is a no-op.
    pub fn select(&mut self, record: Option<&Record>) -> Option<SelectionChange> {
        let current_id = self.current.as_ref().map(|record| &record.id);
        let requested_id = record.map(|record| &record.id);
        let next = if current_id == requested_id {
            None
        } else {
            record.cloned()
        };

        if next.is_none() && self.current.is_none() {
            return None;
        }

        let previous = self.current.take().map(|record| record.id);
        self.current = next;
        self.revision = self.revision.wrapping_add(1);
        tracing::debug!(
            previous = previous.as_ref().map(RecordId::as_str),
            current = self.current.as_ref().map(|record| record.id.as_str()),
            revision = self.revision,
            "selection changed"
        );
        Some(SelectionChange {
            previous,
            current: self.current.clone(),
        })
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe(&self) -> SelectionSubscription {
        SelectionSubscription {
            seen_revision: self.revision,
        }
    }
}

/// Observer handle. Each change of the authority is reported once per
/// subscription, no matter how often it is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSubscription {
    seen_revision: u64,
}

impl SelectionSubscription {
    pub fn poll<'a>(&mut self, authority: &'a SelectionAuthority) -> Option<Option<&'a Record>> {
        if authority.revision == self.seen_revision {
            return None;
        }
        self.seen_revision = authority.revision;
        Some(authority.current())
    }
}
