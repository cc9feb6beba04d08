// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use geodash_app::Record;
use geodash_data::DataSource;
use geodash_tui::InternalEvent;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;

/// Loads from a [`DataSource`] off the UI thread. `load_delay` stands in for
/// network latency so the loading state is visible with local sources.
pub struct SourceRuntime {
    source: DataSource,
    load_delay: Duration,
}

impl SourceRuntime {
    pub fn new(source: DataSource, load_delay: Duration) -> Self {
        Self { source, load_delay }
    }
}

fn load(source: &DataSource) -> Result<Vec<Record>> {
    let today = OffsetDateTime::now_utc().date();
    let report = source.load(today)?;
    if report.dropped() > 0 {
        tracing::warn!(
            dropped = report.dropped(),
            source = %source.describe(),
            "records dropped during load"
        );
    }
    Ok(report.records)
}

impl geodash_tui::AppRuntime for SourceRuntime {
    fn load_records(&mut self) -> Result<Vec<Record>> {
        load(&self.source)
    }

    fn spawn_load(&mut self, request_id: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let source = self.source.clone();
        let delay = self.load_delay;
        thread::Builder::new()
            .name("geodash-load".to_owned())
            .spawn(move || {
                thread::sleep(delay);
                let outcome = load(&source).map_err(|error| format!("{error:#}"));
                let _ = tx.send(InternalEvent::Loaded {
                    request_id,
                    outcome,
                });
            })
            .map_err(|error| anyhow!("spawn load thread: {error}"))?;
        Ok(())
    }
}
