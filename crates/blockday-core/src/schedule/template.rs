//! Block template catalog.
//!
//! Read-only presets used to seed a day. Unknown ids fall back to the
//! standard workday rather than failing.

use serde::Serialize;

use super::BlockType;

pub const DEFAULT_TEMPLATE_ID: &str = "standard";

/// One block of a template's composition.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateBlock {
    pub block_type: BlockType,
    pub duration_minutes: u32,
    pub label: &'static str,
}

/// An immutable preset describing a day's block composition.
#[derive(Debug, Clone, Serialize)]
pub struct BlockTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub total_work_minutes: u32,
    pub total_break_minutes: u32,
    pub blocks: &'static [TemplateBlock],
}

impl BlockTemplate {
    /// Sum of the work-type blocks in the composition.
    pub fn composed_work_minutes(&self) -> u32 {
        self.blocks
            .iter()
            .filter(|b| b.block_type.is_work())
            .map(|b| b.duration_minutes)
            .sum()
    }

    pub fn composed_break_minutes(&self) -> u32 {
        self.blocks
            .iter()
            .filter(|b| b.block_type.is_break())
            .map(|b| b.duration_minutes)
            .sum()
    }
}

const fn tb(block_type: BlockType, duration_minutes: u32, label: &'static str) -> TemplateBlock {
    TemplateBlock { block_type, duration_minutes, label }
}

static STANDARD_BLOCKS: [TemplateBlock; 7] = [
    tb(BlockType::Work, 120, "Morning Focus Block 1"),
    tb(BlockType::Break, 15, "Short Break"),
    tb(BlockType::Work, 120, "Morning Focus Block 2"),
    tb(BlockType::Lunch, 30, "Lunch Break"),
    tb(BlockType::Work, 120, "Afternoon Focus Block 1"),
    tb(BlockType::Break, 15, "Short Break"),
    tb(BlockType::Work, 120, "Afternoon Focus Block 2"),
];

static POMODORO_BLOCKS: [TemplateBlock; 16] = [
    tb(BlockType::Work, 25, "Pomodoro 1"),
    tb(BlockType::Break, 5, "Short Break"),
    tb(BlockType::Work, 25, "Pomodoro 2"),
    tb(BlockType::Break, 5, "Short Break"),
    tb(BlockType::Work, 25, "Pomodoro 3"),
    tb(BlockType::Break, 5, "Short Break"),
    tb(BlockType::Work, 25, "Pomodoro 4"),
    tb(BlockType::Break, 30, "Long Break"),
    tb(BlockType::Work, 25, "Pomodoro 5"),
    tb(BlockType::Break, 5, "Short Break"),
    tb(BlockType::Work, 25, "Pomodoro 6"),
    tb(BlockType::Break, 5, "Short Break"),
    tb(BlockType::Work, 25, "Pomodoro 7"),
    tb(BlockType::Break, 5, "Short Break"),
    tb(BlockType::Work, 25, "Pomodoro 8"),
    tb(BlockType::Break, 5, "Short Break"),
];

static DEEP_WORK_BLOCKS: [TemplateBlock; 5] = [
    tb(BlockType::Work, 160, "Deep Work Session 1"),
    tb(BlockType::Lunch, 45, "Lunch Break"),
    tb(BlockType::Work, 160, "Deep Work Session 2"),
    tb(BlockType::Break, 45, "Recovery Break"),
    tb(BlockType::Work, 160, "Deep Work Session 3"),
];

static HALF_DAY_BLOCKS: [TemplateBlock; 3] = [
    tb(BlockType::Flex, 120, "Flex Block 1"),
    tb(BlockType::Break, 30, "Break"),
    tb(BlockType::Flex, 120, "Flex Block 2"),
];

static CATALOG: [BlockTemplate; 4] = [
    BlockTemplate {
        id: DEFAULT_TEMPLATE_ID,
        name: "Standard Workday",
        description: "4 focus blocks with short breaks - classic 8-hour structure",
        total_work_minutes: 480,
        total_break_minutes: 60,
        blocks: &STANDARD_BLOCKS,
    },
    BlockTemplate {
        id: "pomodoro",
        name: "Pomodoro Extended",
        description: "8 pomodoro sessions (25min work, 5min break)",
        total_work_minutes: 200,
        total_break_minutes: 65,
        blocks: &POMODORO_BLOCKS,
    },
    BlockTemplate {
        id: "deep-work",
        name: "Deep Work Day",
        description: "3 long focus sessions for complex work",
        total_work_minutes: 480,
        total_break_minutes: 90,
        blocks: &DEEP_WORK_BLOCKS,
    },
    BlockTemplate {
        id: "half-day",
        name: "Flexible Half-Day",
        description: "4-hour flexible schedule",
        total_work_minutes: 240,
        total_break_minutes: 30,
        blocks: &HALF_DAY_BLOCKS,
    },
];

pub fn catalog() -> &'static [BlockTemplate] {
    &CATALOG
}

/// Look up a template; unknown ids get the standard workday.
pub fn template_by_id(id: &str) -> &'static BlockTemplate {
    CATALOG.iter().find(|t| t.id == id).unwrap_or_else(|| {
        tracing::debug!(template = id, "unknown template id, using {DEFAULT_TEMPLATE_ID}");
        &CATALOG[0]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nominal_totals_match_composition() {
        for template in catalog() {
            assert_eq!(template.composed_work_minutes(), template.total_work_minutes, "{}", template.id);
            assert_eq!(template.composed_break_minutes(), template.total_break_minutes, "{}", template.id);
        }
    }

    #[test]
    fn lookup_and_fallback() {
        assert_eq!(template_by_id("deep-work").name, "Deep Work Day");
        assert_eq!(template_by_id("no-such-template").id, DEFAULT_TEMPLATE_ID);
    }

    #[test]
    fn standard_workday_shape() {
        let standard = template_by_id("standard");
        assert_eq!(standard.name, "Standard Workday");
        assert_eq!(standard.total_work_minutes, 480);
        assert_eq!(standard.total_break_minutes, 60);
        assert_eq!(standard.blocks.len(), 7);
    }
}
