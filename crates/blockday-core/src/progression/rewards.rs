//! XP reward table and day milestones.
//!
//! Amounts are fixed per action type; callers request an action, never an
//! arbitrary amount.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum XpAction {
    NoteAdded,
    SessionCompleted,
    ChecklistComplete,
    ClockIn,
    ClockOut,
    FocusSessionComplete,
    TaskCompleted,
    GoalCreated,
    QuickNote,
    JournalEntrySaved,
    BodyDoublingSession,
    BlockCompleted,
    WeeklyMilestone,
}

impl XpAction {
    pub fn xp(self) -> u32 {
        match self {
            XpAction::NoteAdded => 5,
            XpAction::SessionCompleted => 10,
            XpAction::ChecklistComplete => 20,
            XpAction::ClockIn => 10,
            XpAction::ClockOut => 20,
            XpAction::FocusSessionComplete => 30,
            XpAction::TaskCompleted => 15,
            XpAction::GoalCreated => 10,
            XpAction::QuickNote => 5,
            XpAction::JournalEntrySaved => 20,
            XpAction::BodyDoublingSession => 30,
            XpAction::BlockCompleted => 10,
            XpAction::WeeklyMilestone => 1000,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            XpAction::NoteAdded => "Note added",
            XpAction::SessionCompleted => "Session completed",
            XpAction::ChecklistComplete => "Checklist complete",
            XpAction::ClockIn => "Clocked in",
            XpAction::ClockOut => "Clocked out",
            XpAction::FocusSessionComplete => "Focus session complete",
            XpAction::TaskCompleted => "Task completed",
            XpAction::GoalCreated => "Goal created",
            XpAction::QuickNote => "Quick note",
            XpAction::JournalEntrySaved => "Journal entry saved",
            XpAction::BodyDoublingSession => "Body doubling session",
            XpAction::BlockCompleted => "Block completed",
            XpAction::WeeklyMilestone => "Weekly milestone",
        }
    }
}

/// Progress markers hit while completing a day's work blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayMilestone {
    FirstBlock,
    HalfDay,
    AlmostThere,
    /// Every work block of the day is done.
    PerfectDay,
}

impl DayMilestone {
    pub fn bonus_xp(self) -> u32 {
        match self {
            DayMilestone::FirstBlock => 50,
            DayMilestone::HalfDay => 100,
            DayMilestone::AlmostThere => 150,
            DayMilestone::PerfectDay => 300,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayMilestone::FirstBlock => "First Block",
            DayMilestone::HalfDay => "Half Day",
            DayMilestone::AlmostThere => "Almost There",
            DayMilestone::PerfectDay => "Perfect Day",
        }
    }

    /// Milestone reached when `completed` of `total` work blocks are done.
    ///
    /// `PerfectDay` wins over the others when they coincide (e.g. a day with a
    /// single work block), so "all blocks done" is never shadowed.
    pub fn reached(completed: usize, total: usize) -> Option<Self> {
        if total == 0 || completed == 0 {
            return None;
        }
        if completed == total {
            Some(DayMilestone::PerfectDay)
        } else if completed == 1 {
            Some(DayMilestone::FirstBlock)
        } else if completed == total.div_ceil(2) {
            Some(DayMilestone::HalfDay)
        } else if completed + 1 == total {
            Some(DayMilestone::AlmostThere)
        } else {
            None
        }
    }
}
