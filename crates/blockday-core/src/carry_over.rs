//! Carry-over of unfinished work into the next day.
//!
//! States:
//!
//! ```text
//! NONE ──detect──▶ OFFERED ──accept(ids)──▶ ACCEPTED(partial | full)
//!                     │
//!                     └──dismiss / accept([])──▶ DISMISSED
//! ```
//!
//! An offer always refers to yesterday. Once a date is resolved the
//! resolution is recorded and that date is never offered again; a cached
//! offer whose date is no longer yesterday is discarded unread.
//!
//! # Usage
//! ```rust,ignore
//! use blockday_core::carry_over::{CarryOverEngine, CarryOverPolicy};
//!
//! let engine = CarryOverEngine::with_policy(CarryOverPolicy::default());
//! let state = engine.detect(&mut store, today, yesterday.as_ref())?;
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::{is_yesterday, yesterday_of};
use crate::error::Result;
use crate::schedule::{Block, BlockId, CarriedFrom, DaySchedule};

/// Which of yesterday's blocks are eligible to be carried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarryOverPolicy {
    /// Offer carry-over at all
    pub enabled: bool,
    /// Count skipped work blocks as unfinished
    pub include_skipped_work: bool,
    /// Maximum blocks in a single offer, in plan order
    pub max_blocks: usize,
}

impl Default for CarryOverPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            include_skipped_work: true,
            max_blocks: 10,
        }
    }
}

impl CarryOverPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_include_skipped_work(mut self, include: bool) -> Self {
        self.include_skipped_work = include;
        self
    }

    pub fn with_max_blocks(mut self, max: usize) -> Self {
        self.max_blocks = max;
        self
    }
}

/// Yesterday's unfinished work, waiting for the user's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryOverOffer {
    /// The incomplete day
    pub date: NaiveDate,
    pub incomplete_blocks: Vec<Block>,
    pub total_incomplete_minutes: u32,
}

impl CarryOverOffer {
    /// Scan a finished day for carry-over candidates.
    ///
    /// Returns `None` when nothing qualifies.
    pub fn from_schedule(schedule: &DaySchedule, policy: &CarryOverPolicy) -> Option<Self> {
        let incomplete_blocks: Vec<Block> = schedule
            .incomplete_work_blocks(policy.include_skipped_work)
            .into_iter()
            .take(policy.max_blocks)
            .cloned()
            .collect();
        if incomplete_blocks.is_empty() {
            return None;
        }
        let total_incomplete_minutes = incomplete_blocks.iter().map(|b| b.duration_minutes).sum();
        Some(Self {
            date: schedule.date,
            incomplete_blocks,
            total_incomplete_minutes,
        })
    }

    pub fn block_ids(&self) -> Vec<BlockId> {
        self.incomplete_blocks.iter().map(|b| b.id).collect()
    }

    /// Whether the offer can still be shown on `today`.
    pub fn is_valid_for(&self, today: NaiveDate) -> bool {
        is_yesterday(self.date, today)
    }

    /// Offered blocks whose ids are in `ids`, in offer order, without duplicates.
    pub fn select(&self, ids: &[BlockId]) -> Vec<&Block> {
        self.incomplete_blocks.iter().filter(|b| ids.contains(&b.id)).collect()
    }
}

/// How an offer was consumed. Recorded per source date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CarryOverResolution {
    Accepted {
        block_ids: Vec<BlockId>,
        minutes: u32,
        /// A strict subset of the offer was taken
        partial: bool,
    },
    Dismissed,
}

impl CarryOverResolution {
    /// Attribution for the block injected into today.
    pub fn carried_from(&self, source_date: NaiveDate) -> Option<CarriedFrom> {
        match self {
            CarryOverResolution::Accepted { block_ids, .. } => Some(CarriedFrom {
                source_date,
                source_block_ids: block_ids.clone(),
            }),
            CarryOverResolution::Dismissed => None,
        }
    }
}

/// Where today's carry-over stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CarryOverState {
    None,
    Offered { offer: CarryOverOffer },
    Resolved { date: NaiveDate, resolution: CarryOverResolution },
}

/// The offer cache slot plus the ledger of resolved dates.
pub trait OfferStore {
    fn load_offer(&self) -> Result<Option<CarryOverOffer>>;
    fn save_offer(&mut self, offer: &CarryOverOffer) -> Result<()>;
    fn clear_offer(&mut self) -> Result<()>;
    fn resolution(&self, date: NaiveDate) -> Result<Option<CarryOverResolution>>;
    fn record_resolution(&mut self, date: NaiveDate, resolution: &CarryOverResolution) -> Result<()>;
}

/// Drives offer detection and consumption.
#[derive(Debug, Clone, Default)]
pub struct CarryOverEngine {
    policy: CarryOverPolicy,
}

impl CarryOverEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: CarryOverPolicy) -> Self {
        Self { policy }
    }

    /// Work out today's carry-over state, caching a fresh offer.
    ///
    /// `yesterday` is whatever schedule the caller has for the previous
    /// day; a schedule for any other date is ignored.
    pub fn detect<S: OfferStore + ?Sized>(
        &self,
        store: &mut S,
        today: NaiveDate,
        yesterday: Option<&DaySchedule>,
    ) -> Result<CarryOverState> {
        let mut cached = store.load_offer()?;
        if cached.as_ref().is_some_and(|o| !o.is_valid_for(today)) {
            if let Some(stale) = cached.take() {
                tracing::debug!(offer_date = %stale.date, %today, "discarding stale carry-over offer");
            }
            store.clear_offer()?;
        }

        let Some(source_date) = yesterday_of(today) else {
            return Ok(CarryOverState::None);
        };

        if let Some(resolution) = store.resolution(source_date)? {
            return Ok(CarryOverState::Resolved { date: source_date, resolution });
        }

        if !self.policy.enabled {
            return Ok(CarryOverState::None);
        }

        if let Some(offer) = cached {
            return Ok(CarryOverState::Offered { offer });
        }

        let Some(source) = yesterday.filter(|s| s.date == source_date) else {
            return Ok(CarryOverState::None);
        };

        match CarryOverOffer::from_schedule(source, &self.policy) {
            Some(offer) => {
                store.save_offer(&offer)?;
                tracing::info!(
                    date = %offer.date,
                    blocks = offer.incomplete_blocks.len(),
                    minutes = offer.total_incomplete_minutes,
                    "carry-over offered"
                );
                Ok(CarryOverState::Offered { offer })
            }
            None => Ok(CarryOverState::None),
        }
    }

    /// Turn the user's selection into a resolution. Pure.
    ///
    /// Ids not in the offer are ignored; an empty selection dismisses.
    pub fn resolve(offer: &CarryOverOffer, selected: &[BlockId]) -> CarryOverResolution {
        let chosen = offer.select(selected);
        if chosen.is_empty() {
            return CarryOverResolution::Dismissed;
        }
        CarryOverResolution::Accepted {
            block_ids: chosen.iter().map(|b| b.id).collect(),
            minutes: chosen.iter().map(|b| b.duration_minutes).sum(),
            partial: chosen.len() < offer.incomplete_blocks.len(),
        }
    }

    /// Persist a resolution and drop the cached offer.
    pub fn commit<S: OfferStore + ?Sized>(
        store: &mut S,
        date: NaiveDate,
        resolution: &CarryOverResolution,
    ) -> Result<()> {
        store.record_resolution(date, resolution)?;
        store.clear_offer()?;
        tracing::info!(%date, ?resolution, "carry-over resolved");
        Ok(())
    }
}
