//! # Blockday Core Library
//!
//! This library provides the core business logic for Blockday, a daily
//! block schedule with progress tracking. It follows a CLI-first philosophy:
//! every operation is available through the standalone `blockday` binary,
//! and any richer front end is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Schedule**: templates expanded into a day of typed blocks, and a reflow
//!   engine that keeps the rest of the day contiguous as blocks complete or
//!   are skipped
//! - **Carry-over**: yesterday's unfinished work offered once at day start
//! - **Progression**: XP, the level curve, day milestones and achievements
//! - **Streak**: consecutive worked days and weekly activity
//! - **Storage**: SQLite persistence and TOML-based configuration
//!
//! The engine never samples the clock. Callers pass "now" in and invoke
//! [`DayPlanner::tick`] at their own cadence.
//!
//! ## Key Components
//!
//! - [`DayPlanner`]: Session object owning today's schedule
//! - [`Database`]: Schedule, offer and progression persistence
//! - [`Config`]: Application configuration management
//! - [`CarryOverEngine`]: Offer detection and consumption

pub mod carry_over;
pub mod clock;
pub mod error;
pub mod events;
pub mod planner;
pub mod progression;
pub mod schedule;
pub mod storage;
pub mod streak;

pub use carry_over::{CarryOverEngine, CarryOverOffer, CarryOverPolicy, CarryOverResolution, CarryOverState, OfferStore};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use planner::{DayPlanner, PlannerSettings, PlannerStore};
pub use progression::{GamificationState, LevelProgress, ProgressCounters, ProgressStore, XpSink};
pub use schedule::{Block, BlockId, BlockStatus, BlockTemplate, BlockType, DaySchedule, ScheduleStats, ScheduleStore};
pub use storage::{Config, Database};
pub use streak::{compute_streak, StreakRecord, StreakSummary};
