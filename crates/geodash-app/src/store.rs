// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::HashMap;
use std::sync::Arc;

use crate::{Record, RecordId};

/// Immutable record collection in load order. A reload builds a new store;
/// records are never edited in place.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Arc<[Record]>,
    positions: Arc<HashMap<RecordId, usize>>,
    generation: u64,
}

impl RecordStore {
    pub fn new(records: Vec<Record>, generation: u64) -> Self {
        let mut positions = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            // First occurrence wins so lookups agree with load order.
            positions.entry(record.id.clone()).or_insert(index);
        }
        Self {
            records: records.into(),
            positions: Arc::new(positions),
            generation,
        }
    }

    /// Replaces the whole collection and bumps the generation so derived
    /// views see a new input identity.
    pub fn replaced(&self, records: Vec<Record>) -> Self {
        Self::new(records, self.generation.wrapping_add(1))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn index_of(&self, id: &RecordId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
