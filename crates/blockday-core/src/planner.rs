//! Day planner: the session object that owns today's schedule.
//!
//! The planner wires the pure schedule, carry-over and progression code to
//! an injected store. Every mutation is applied in memory first and then
//! flushed; when a write fails the error is returned (it is retryable) and
//! the change stays pending until the next successful [`DayPlanner::flush`].
//!
//! The planner never reads the clock. Callers pass `now` into every
//! operation and call [`DayPlanner::tick`] at their own cadence.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::carry_over::{CarryOverEngine, CarryOverOffer, CarryOverPolicy, CarryOverResolution, CarryOverState, OfferStore};
use crate::clock::yesterday_of;
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::progression::{
    evaluate_achievements, level_for, DayMilestone, GamificationState, ProgressCounters, ProgressStore, XpAction,
    XpSink,
};
use crate::schedule::builder::carried_label;
use crate::schedule::{
    append_block, on_block_completed, on_block_resized, on_block_skipped, on_block_started, recompute_now,
    template_by_id, BlockId, BlockStatus, BlockType, CarriedFrom, DaySchedule, ScheduleBuilder, ScheduleStats,
    ScheduleStore, Transition,
};
use crate::storage::Config;
use crate::streak::{compute_streak, StreakSummary};

/// Everything the planner needs from configuration.
#[derive(Debug, Clone)]
pub struct PlannerSettings {
    pub start_time: NaiveTime,
    pub template_id: String,
    pub target_work_minutes: u32,
    /// XP per completed work block
    pub block_xp: u32,
    /// Award day milestones
    pub milestones: bool,
    pub carry_over: CarryOverPolicy,
}

impl PlannerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            start_time: config.start_time(),
            template_id: config.template().id.to_string(),
            target_work_minutes: config.target_work_minutes(),
            block_xp: config.xp.block_completed,
            milestones: config.xp.milestones,
            carry_over: config.carry_over_policy(),
        }
    }
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// A store that can back a [`DayPlanner`].
pub trait PlannerStore: ScheduleStore + OfferStore + ProgressStore + XpSink {}

impl<T: ScheduleStore + OfferStore + ProgressStore + XpSink> PlannerStore for T {}

#[derive(Debug, Default)]
struct PendingWrites {
    schedule: bool,
    counters: bool,
    resolution: Option<(NaiveDate, CarryOverResolution)>,
}

impl PendingWrites {
    fn is_empty(&self) -> bool {
        !self.schedule && !self.counters && self.resolution.is_none()
    }
}

pub struct DayPlanner<S: PlannerStore> {
    store: S,
    settings: PlannerSettings,
    engine: CarryOverEngine,
    today: DaySchedule,
    counters: ProgressCounters,
    carry_over: CarryOverState,
    events: Vec<Event>,
    pending: PendingWrites,
}

impl<S: PlannerStore> DayPlanner<S> {
    /// Load (or build) the schedule for `now`'s date and detect carry-over.
    ///
    /// Load failures are errors. A failed initial write is only logged: the
    /// new schedule stays pending and the next mutation retries it.
    pub fn open(store: S, settings: PlannerSettings, now: NaiveDateTime) -> Result<Self> {
        let counters = store.load_counters()?;
        let engine = CarryOverEngine::with_policy(settings.carry_over.clone());
        let today = fresh_schedule(&settings, now.date(), 0, None);
        let mut planner = Self {
            store,
            settings,
            engine,
            today,
            counters,
            carry_over: CarryOverState::None,
            events: Vec::new(),
            pending: PendingWrites::default(),
        };
        planner.load_day(now)?;
        if let Err(e) = planner.flush() {
            tracing::warn!(error = %e, "initial save failed; changes kept in memory");
        }
        Ok(planner)
    }

    pub fn schedule(&self) -> &DaySchedule {
        &self.today
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    pub fn counters(&self) -> &ProgressCounters {
        &self.counters
    }

    pub fn carry_over_state(&self) -> &CarryOverState {
        &self.carry_over
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Derived progression view, with the streak as of today.
    pub fn gamification(&self) -> GamificationState {
        let mut state = GamificationState::from_counters(&self.counters);
        state.current_streak = self.counters.streak().current_as_of(self.today.date);
        state
    }

    pub fn stats(&self, now: NaiveTime) -> ScheduleStats {
        ScheduleStats::compute(&self.today, now)
    }

    /// Weekly activity and streak for today, given this week's hours.
    pub fn streak_summary(&self, weekly_hours: &[f64; 7]) -> StreakSummary {
        let has_entries = self.today.completed_work_blocks() > 0;
        compute_streak(weekly_hours, self.today.date.weekday(), has_entries)
    }

    /// Take every event produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn has_pending_writes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Write every pending change to the store.
    ///
    /// The carry-over resolution goes first so an offer can never be
    /// consumed twice, even if a later write fails.
    pub fn flush(&mut self) -> Result<()> {
        if let Some((date, resolution)) = self.pending.resolution.clone() {
            CarryOverEngine::commit(&mut self.store, date, &resolution)?;
            self.pending.resolution = None;
        }
        if self.pending.schedule {
            self.store.save_schedule(&self.today)?;
            self.pending.schedule = false;
        }
        if self.pending.counters {
            self.store.save_counters(&self.counters)?;
            self.pending.counters = false;
        }
        Ok(())
    }

    /// Recompute the active block for `now`, rolling over to a new day
    /// when the date has changed.
    pub fn tick(&mut self, now: NaiveDateTime) -> Result<Option<BlockId>> {
        self.ensure_day(now)?;
        let before = self.today.active_block().map(|b| b.id);
        let active = recompute_now(&mut self.today, now.time());
        if active != before {
            self.emit(Event::BlockActivated { block_id: active, at: now });
            self.pending.schedule = true;
        }
        self.flush()?;
        Ok(active)
    }

    /// Re-run carry-over detection and return the current state.
    pub fn check_carry_over(&mut self, now: NaiveDateTime) -> Result<&CarryOverState> {
        self.ensure_day(now)?;
        self.detect_carry_over(now)?;
        self.flush()?;
        Ok(&self.carry_over)
    }

    /// Accept the offered blocks whose ids are in `selected`.
    ///
    /// Unknown ids are ignored and an empty selection dismisses the offer.
    /// Fails with [`ValidationError::NoPendingOffer`] when nothing is offered.
    pub fn accept_carry_over(&mut self, selected: &[BlockId], now: NaiveDateTime) -> Result<CarryOverResolution> {
        self.ensure_day(now)?;
        let offer = match &self.carry_over {
            CarryOverState::Offered { offer } => offer.clone(),
            _ => {
                let date = yesterday_of(self.today.date).unwrap_or(self.today.date);
                return Err(ValidationError::NoPendingOffer(date).into());
            }
        };
        let resolution = CarryOverEngine::resolve(&offer, selected);
        self.apply_resolution(&offer, &resolution, now);
        self.flush()?;
        Ok(resolution)
    }

    pub fn dismiss_carry_over(&mut self, now: NaiveDateTime) -> Result<()> {
        self.accept_carry_over(&[], now).map(|_| ())
    }

    pub fn start_block(&mut self, id: BlockId, now: NaiveDateTime) -> Result<Transition> {
        self.ensure_day(now)?;
        let transition = on_block_started(&mut self.today, id, now.time())?;
        if transition.is_applied() {
            self.emit(Event::BlockStarted { block_id: id, at: now });
            self.pending.schedule = true;
            self.flush()?;
        }
        Ok(transition)
    }

    /// Complete a block; work blocks earn XP, milestones and achievements.
    pub fn complete_block(&mut self, id: BlockId, now: NaiveDateTime) -> Result<Transition> {
        self.ensure_day(now)?;
        let transition = on_block_completed(&mut self.today, id, now.time())?;
        if !transition.is_applied() {
            return Ok(transition);
        }
        self.pending.schedule = true;

        if let Some(block) = self.today.block(id) {
            let (block_type, minutes) = (block.block_type.clone(), block.duration_minutes);
            self.emit(Event::BlockCompleted {
                block_id: id,
                block_type: block_type.clone(),
                duration_minutes: minutes,
                at: now,
            });
            if block_type.is_work() {
                self.reward_work_block(minutes, now);
            }
        }
        self.flush()?;
        Ok(transition)
    }

    pub fn skip_block(&mut self, id: BlockId, now: NaiveDateTime) -> Result<Transition> {
        self.ensure_day(now)?;
        let transition = on_block_skipped(&mut self.today, id)?;
        if transition.is_applied() {
            if let Some(block) = self.today.block(id) {
                let block_type = block.block_type.clone();
                self.emit(Event::BlockSkipped { block_id: id, block_type, at: now });
            }
            self.pending.schedule = true;
            self.flush()?;
        }
        Ok(transition)
    }

    pub fn resize_block(&mut self, id: BlockId, minutes: u32, now: NaiveDateTime) -> Result<Transition> {
        self.ensure_day(now)?;
        let transition = on_block_resized(&mut self.today, id, minutes)?;
        if transition.is_applied() {
            self.emit(Event::BlockResized { block_id: id, duration_minutes: minutes, at: now });
            self.pending.schedule = true;
            self.flush()?;
        }
        Ok(transition)
    }

    /// Rebuild today's schedule from settings, dropping block progress.
    ///
    /// Carried minutes and already-awarded milestones survive.
    pub fn reset_day(&mut self, now: NaiveDateTime) -> Result<()> {
        self.ensure_day(now)?;
        let carried_from = merged_carried_from(&self.today);
        let milestones = std::mem::take(&mut self.today.milestones);
        self.today = fresh_schedule(&self.settings, self.today.date, self.today.carried_minutes, carried_from);
        self.today.milestones = milestones;
        self.emit_built(now);
        self.pending.schedule = true;
        self.flush()
    }

    fn ensure_day(&mut self, now: NaiveDateTime) -> Result<()> {
        if now.date() == self.today.date {
            return Ok(());
        }
        tracing::info!(from = %self.today.date, to = %now.date(), "day rollover");
        self.flush()?;
        self.load_day(now)
    }

    fn load_day(&mut self, now: NaiveDateTime) -> Result<()> {
        let date = now.date();
        match self.store.load_schedule(date)? {
            Some(existing) => self.today = existing,
            None => {
                self.today = fresh_schedule(&self.settings, date, 0, None);
                self.emit_built(now);
                self.pending.schedule = true;
            }
        }
        self.carry_over = CarryOverState::None;
        self.detect_carry_over(now)
    }

    fn detect_carry_over(&mut self, now: NaiveDateTime) -> Result<()> {
        if let Some((date, resolution)) = &self.pending.resolution {
            self.carry_over = CarryOverState::Resolved { date: *date, resolution: resolution.clone() };
            return Ok(());
        }
        let yesterday = match yesterday_of(self.today.date) {
            Some(date) => self.store.load_schedule(date)?,
            None => None,
        };
        let state = self.engine.detect(&mut self.store, self.today.date, yesterday.as_ref())?;
        if let CarryOverState::Offered { offer } = &state {
            if !matches!(self.carry_over, CarryOverState::Offered { .. }) {
                self.emit(Event::CarryOverOffered {
                    source_date: offer.date,
                    block_ids: offer.block_ids(),
                    total_minutes: offer.total_incomplete_minutes,
                    at: now,
                });
            }
        }
        self.carry_over = state;
        Ok(())
    }

    fn apply_resolution(&mut self, offer: &CarryOverOffer, resolution: &CarryOverResolution, now: NaiveDateTime) {
        match resolution {
            CarryOverResolution::Accepted { minutes, .. } => {
                let carried_from = resolution.carried_from(offer.date);
                if self.today.is_untouched() {
                    let milestones = std::mem::take(&mut self.today.milestones);
                    self.today = fresh_schedule(&self.settings, self.today.date, *minutes, carried_from);
                    self.today.milestones = milestones;
                    self.emit_built(now);
                } else {
                    append_block(&mut self.today, BlockType::Work, carried_label(*minutes), *minutes, carried_from);
                    self.today.carried_minutes += minutes;
                }
                self.emit(Event::CarryOverAccepted {
                    source_date: offer.date,
                    resolution: resolution.clone(),
                    at: now,
                });
            }
            CarryOverResolution::Dismissed => {
                self.emit(Event::CarryOverDismissed { source_date: offer.date, at: now });
            }
        }
        self.carry_over = CarryOverState::Resolved {
            date: offer.date,
            resolution: resolution.clone(),
        };
        self.pending.resolution = Some((offer.date, resolution.clone()));
        self.pending.schedule = true;
    }

    fn reward_work_block(&mut self, minutes: u32, now: NaiveDateTime) {
        self.counters.record_work_block(minutes);
        let mut streak = self.counters.streak();
        streak.record_activity(now.date());
        self.counters.set_streak(streak);
        self.pending.counters = true;

        self.award(self.settings.block_xp, XpAction::BlockCompleted.reason(), now);

        if self.settings.milestones {
            let total = self
                .today
                .work_blocks()
                .filter(|b| b.status != BlockStatus::Skipped)
                .count();
            let completed = self.today.completed_work_blocks();
            if let Some(milestone) = DayMilestone::reached(completed, total) {
                self.award_milestone(milestone, now);
            }
        }

        let at = Utc.from_utc_datetime(&now);
        for def in evaluate_achievements(&mut self.counters, at) {
            self.emit(Event::AchievementUnlocked {
                achievement_id: def.id.to_string(),
                xp_reward: def.xp_reward,
                at: now,
            });
            self.award(def.xp_reward, def.name, now);
        }
    }

    /// Milestones pay out at most once per day.
    fn award_milestone(&mut self, milestone: DayMilestone, now: NaiveDateTime) {
        if self.today.milestones.contains(&milestone) {
            tracing::debug!(?milestone, "milestone already awarded today");
            return;
        }
        self.today.milestones.push(milestone);
        self.emit(Event::MilestoneReached {
            milestone,
            bonus_xp: milestone.bonus_xp(),
            at: now,
        });
        self.award(milestone.bonus_xp(), milestone.label(), now);
    }

    /// Add XP locally and notify the sink; sink failures are only logged.
    fn award(&mut self, amount: u32, reason: &str, now: NaiveDateTime) {
        if amount == 0 {
            return;
        }
        let before = level_for(self.counters.total_xp).level;
        self.counters.add_xp(amount);
        self.pending.counters = true;
        if let Err(e) = self.store.award_xp(amount, reason) {
            tracing::warn!(error = %e, amount, reason, "XP award not recorded");
        }
        tracing::info!(amount, reason, total = self.counters.total_xp, "XP awarded");
        self.emit(Event::XpAwarded {
            amount,
            reason: reason.to_string(),
            total_xp: self.counters.total_xp,
            at: now,
        });

        let level = level_for(self.counters.total_xp);
        if level.level > before {
            self.emit(Event::LevelUp {
                level: level.level,
                title: level.title.to_string(),
                at: now,
            });
        }
    }

    fn emit_built(&mut self, now: NaiveDateTime) {
        self.emit(Event::ScheduleBuilt {
            date: self.today.date,
            template_id: self.today.template_id.clone(),
            blocks: self.today.blocks.len(),
            carried_minutes: self.today.carried_minutes,
            at: now,
        });
    }

    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}

/// Attribution for every carried block of `schedule`, folded into one.
///
/// Blocks carried from a different source date than the first are ignored.
fn merged_carried_from(schedule: &DaySchedule) -> Option<CarriedFrom> {
    let mut carried = schedule.blocks.iter().filter_map(|b| b.carried_from.as_ref());
    let mut merged = carried.next()?.clone();
    for source in carried.filter(|c| c.source_date == merged.source_date) {
        for id in &source.source_block_ids {
            if !merged.source_block_ids.contains(id) {
                merged.source_block_ids.push(*id);
            }
        }
    }
    Some(merged)
}

fn fresh_schedule(
    settings: &PlannerSettings,
    date: NaiveDate,
    carried_minutes: u32,
    carried_from: Option<CarriedFrom>,
) -> DaySchedule {
    let mut builder = ScheduleBuilder::new(template_by_id(&settings.template_id), date)
        .start_time(settings.start_time)
        .target_work_minutes(settings.target_work_minutes)
        .carried_minutes(carried_minutes);
    if let Some(source) = carried_from {
        builder = builder.carried_from(source);
    }
    builder.build()
}
