// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Periodic full resync, catching anything a dropped watch event left behind.

use crate::sync::dispatcher::{Dispatcher, Report, Trigger};
use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, instrument};

pub struct Resyncer {
    dispatcher: Arc<Dispatcher>,
}

impl Resyncer {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let Some(period) = self.dispatcher.config().resync_interval else {
            info!("Periodic resync disabled");
            return Ok(());
        };

        info!("Resyncer started, resyncing every {} seconds", period.as_secs());

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.resync().await;
        }
    }

    #[instrument(skip(self))]
    pub async fn resync(&self) -> Option<Report> {
        match self.dispatcher.dispatch(Trigger::Resync).await {
            Ok(report) => {
                info!(
                    "Resync complete: {} secrets created, {} bindings added, {} bindings removed, {} dropped",
                    report.secrets_created,
                    report.bindings_added,
                    report.bindings_removed,
                    report.dropped
                );
                Some(report)
            }
            Err(e) => {
                error!("Resync failed: {}", e);
                None
            }
        }
    }
}
