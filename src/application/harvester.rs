//! Harvester: pagination controller and composition root
//!
//! One run walks the configured page range in order. Every page gets a
//! fresh session that is closed before the next page starts, whatever
//! happened on the page. Records go to the sink as soon as they are built,
//! so an abort leaves every earlier row on disk.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::extractor::{ListingCounts, SelectorExtractor};
use super::scroll_driver::ScrollDriver;
use super::settle::SettlePolicy;
use crate::domain::pagination::PageTarget;
use crate::domain::record::Record;
use crate::infrastructure::config::HarvestConfig;
use crate::infrastructure::error::{ExtractionError, HarvestError, HarvestResult, SessionError};
use crate::infrastructure::record_sink::{CsvOutputTable, RecordSink};
use crate::infrastructure::session::{RenderSession, SessionLauncher};

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestSummary {
    pub output_path: PathBuf,
    pub run_date: NaiveDate,
    pub pages: u32,
    pub records: usize,
}

pub struct Harvester<L> {
    config: HarvestConfig,
    launcher: L,
    run_date: Option<NaiveDate>,
}

impl<L: SessionLauncher> Harvester<L> {
    pub fn new(config: HarvestConfig, launcher: L) -> Self {
        Self {
            config,
            launcher,
            run_date: None,
        }
    }

    /// Pin the run date instead of reading the local clock when a run starts.
    pub fn with_run_date(mut self, run_date: NaiveDate) -> Self {
        self.run_date = Some(run_date);
        self
    }

    fn resolve_run_date(&self) -> NaiveDate {
        self.run_date.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Validate, create the output table, and harvest every page into it.
    pub async fn run(&self) -> HarvestResult<HarvestSummary> {
        self.config.validate()?;
        let run_date = self.resolve_run_date();

        let mut table = CsvOutputTable::create(&self.config.output_path(run_date))?;
        info!("Run date {}, writing records to {:?}", run_date, table.path());

        self.harvest_into(run_date, &mut table).await?;
        table.finish()?;

        info!(
            "Harvest finished: {} records from {} pages saved to {:?}",
            table.rows(),
            self.config.page_count,
            table.path()
        );

        Ok(HarvestSummary {
            output_path: table.path().to_path_buf(),
            run_date,
            pages: self.config.page_count,
            records: table.rows(),
        })
    }

    /// Harvest every page into an already opened sink. Returns the record count.
    pub async fn run_into<K: RecordSink>(&self, sink: &mut K) -> HarvestResult<usize> {
        self.harvest_into(self.resolve_run_date(), sink).await
    }

    async fn harvest_into<K: RecordSink>(
        &self,
        run_date: NaiveDate,
        sink: &mut K,
    ) -> HarvestResult<usize> {
        let plan = self.config.page_plan();
        let mut total = 0;

        for target in plan.targets() {
            info!("Harvesting page {}/{}: {}", target.number, plan.page_count(), target.url);

            let mut session = self
                .launcher
                .launch()
                .await
                .map_err(|e| HarvestError::session(target.number, &target.url, e))?;

            let outcome = self.harvest_page(&mut session, &target, run_date, sink).await;

            if let Err(e) = session.close().await {
                warn!("Failed to close session for page {}: {}", target.number, e);
            }

            let written = outcome?;
            debug!("Page {} produced {} records", target.number, written);
            total += written;
        }

        Ok(total)
    }

    async fn harvest_page<S, K>(
        &self,
        session: &mut S,
        target: &PageTarget,
        run_date: NaiveDate,
        sink: &mut K,
    ) -> HarvestResult<usize>
    where
        S: RenderSession,
        K: RecordSink,
    {
        let page = target.number;
        let session_error = |e: SessionError| HarvestError::session(page, &target.url, e);
        let extraction_error = |e: ExtractionError| HarvestError::extraction(page, &target.url, e);

        session.navigate(&target.url).await.map_err(session_error)?;

        let timing = &self.config.timing;
        let driver = ScrollDriver::new(
            self.config.scroll_step,
            SettlePolicy::new(timing.scroll_settle(), timing.poll_interval()),
        );
        match timing.scroll_timeout() {
            Some(limit) => {
                timeout(limit, driver.exhaust(session))
                    .await
                    .map_err(|_| HarvestError::ScrollTimeout { page, timeout: limit })?
                    .map_err(session_error)?;
            }
            None => {
                driver.exhaust(session).await.map_err(session_error)?;
            }
        }

        let extractor = SelectorExtractor::new(&self.config.selectors, self.config.strictness);
        self.await_listings(&extractor, session)
            .await
            .map_err(extraction_error)?;

        let listings = extractor.extract(session).await.map_err(extraction_error)?;

        for listing in &listings {
            let record = Record::from_raw(
                &self.config.store,
                run_date,
                listing.href.clone(),
                &listing.description,
                &listing.price,
            );
            sink.append(&record)?;
        }

        Ok(listings.len())
    }

    /// Give late content a chance to render. Returns once the scoped field
    /// counts are non-zero and unchanged between two consecutive polls, or
    /// when the page settle window closes.
    async fn await_listings<S: RenderSession>(
        &self,
        extractor: &SelectorExtractor<'_>,
        session: &mut S,
    ) -> Result<(), ExtractionError> {
        let timing = &self.config.timing;
        let deadline = SettlePolicy::new(timing.page_settle(), timing.poll_interval()).start();
        let mut previous: Option<ListingCounts> = None;

        loop {
            let counts = extractor.count(session).await?;
            if counts.complete() > 0 && previous == Some(counts) {
                debug!("Listings settled at {:?}", counts);
                return Ok(());
            }
            previous = Some(counts);

            if !deadline.tick().await {
                debug!("Listings still changing when the settle window closed: {:?}", counts);
                return Ok(());
            }
        }
    }
}
