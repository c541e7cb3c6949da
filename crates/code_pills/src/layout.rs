//! Pure layout pass: positions the code tokens, the answer slot and the
//! option pills for one level at one viewport size. No ECS access, so the
//! whole pass is deterministic and unit testable.

use bevy::prelude::*;

use crate::level::{CodeToken, Level};

pub const FONT_SIZE: f32 = 24.0;
pub const LINE_HEIGHT: f32 = 54.0;
pub const PILL_HEIGHT: f32 = 46.0;
pub const PILL_RADIUS: f32 = 23.0;

const SIDE_MARGIN: f32 = 40.0;
const MAX_CODE_WIDTH: f32 = 380.0;
const SLOT_TRAILING_GAP: f32 = 8.0;
const PILL_GAP: f32 = 14.0;
const CODE_BASELINE_FRACTION: f32 = 0.35;
const OPTIONS_CENTER_FRACTION: f32 = 0.75;

/// A code fragment with its resolved anchor (left edge, vertical center).
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedToken {
    pub text: String,
    pub pos: Vec2,
    pub keyword: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SlotSpec {
    pub center: Vec2,
    pub size: Vec2,
    pub answer: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PillSeed {
    pub text: String,
    pub center: Vec2,
    pub width: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneLayout {
    pub tokens: Vec<PlacedToken>,
    pub slot: Option<SlotSpec>,
    pub pills: Vec<PillSeed>,
}

/// Lays out one level. Coordinates are window logical pixels, origin at the
/// top-left, y down, matching pointer input.
pub fn build(level: &Level, viewport: Vec2, measure: impl Fn(&str) -> f32) -> SceneLayout {
    let mut layout = SceneLayout::default();

    // Code block, walked left to right from a centered origin.
    let code_width = (viewport.x - SIDE_MARGIN).min(MAX_CODE_WIDTH);
    let start_x = (viewport.x - code_width) / 2.0;
    let mut x = start_x;
    let mut y = viewport.y * CODE_BASELINE_FRACTION;

    for token in &level.code {
        match token {
            CodeToken::Newline => {
                x = start_x;
                y += LINE_HEIGHT;
            }
            CodeToken::Slot { size, answer } => {
                let width = size.width();
                layout.slot = Some(SlotSpec {
                    center: Vec2::new(x + width / 2.0, y),
                    size: Vec2::new(width, PILL_HEIGHT),
                    answer: answer.clone(),
                });
                x += width + SLOT_TRAILING_GAP;
            }
            CodeToken::Text { text, keyword } => {
                layout.tokens.push(PlacedToken {
                    text: text.clone(),
                    pos: Vec2::new(x, y),
                    keyword: *keyword,
                });
                x += measure(text);
            }
        }
    }

    // Options, packed greedily into rows and centered row by row.
    let available = viewport.x - SIDE_MARGIN;
    let mut rows: Vec<(Vec<(&str, f32)>, f32)> = Vec::new();
    let mut row: Vec<(&str, f32)> = Vec::new();
    let mut row_width = -PILL_GAP;

    for option in &level.options {
        let width = option.size.width();
        if row_width + PILL_GAP + width > available && !row.is_empty() {
            rows.push((core::mem::take(&mut row), row_width));
            row_width = -PILL_GAP;
        }
        row.push((option.text.as_str(), width));
        row_width += PILL_GAP + width;
    }
    if !row.is_empty() {
        rows.push((row, row_width));
    }

    let block_step = PILL_HEIGHT + PILL_GAP;
    let mut py =
        viewport.y * OPTIONS_CENTER_FRACTION - (rows.len().saturating_sub(1) as f32 * block_step) / 2.0;

    for (items, width) in rows {
        let mut px = (viewport.x - width) / 2.0;
        for (text, item_width) in items {
            layout.pills.push(PillSeed {
                text: text.to_owned(),
                center: Vec2::new(px + item_width / 2.0, py),
                width: item_width,
            });
            px += item_width + PILL_GAP;
        }
        py += block_step;
    }

    layout
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::level::{LevelCatalog, LevelKind};

    fn measure(text: &str) -> f32 {
        text.chars().count() as f32 * 14.0
    }

    fn viewport() -> Vec2 {
        Vec2::new(360.0, 640.0)
    }

    #[test]
    fn slot_exists_iff_level_is_drag_mode() {
        for level in LevelCatalog::built_in().iter() {
            let layout = build(level, viewport(), measure);
            assert_eq!(
                layout.slot.is_some(),
                level.kind == LevelKind::DragDrop,
                "level `{}`",
                level.prompt
            );
        }
    }

    #[test]
    fn every_option_gets_one_pill() {
        for level in LevelCatalog::built_in().iter() {
            let layout = build(level, viewport(), measure);
            assert_eq!(layout.pills.len(), level.options.len());
            for (seed, option) in layout.pills.iter().zip(&level.options) {
                assert_eq!(seed.text, option.text);
                assert!((seed.width - option.size.width()).abs() < f32::EPSILON);
            }
        }
    }

    #[test]
    fn pills_never_overlap() {
        for level in LevelCatalog::built_in().iter() {
            let layout = build(level, viewport(), measure);
            for (i, a) in layout.pills.iter().enumerate() {
                for b in layout.pills.iter().skip(i + 1) {
                    let clear_x = (a.center.x - b.center.x).abs() >= (a.width + b.width) / 2.0;
                    let clear_y = (a.center.y - b.center.y).abs() >= PILL_HEIGHT;
                    assert!(
                        clear_x || clear_y,
                        "`{}` and `{}` overlap in level `{}`",
                        a.text,
                        b.text,
                        level.prompt
                    );
                }
            }
        }
    }

    #[test]
    fn rows_wrap_once_width_runs_out() {
        // 4 pills of 120 plus gaps cannot fit a 360 wide viewport in one row
        let catalog = LevelCatalog::built_in();
        let level = catalog.get(0).expect("catalog has a first level");
        let layout = build(level, viewport(), measure);
        let distinct_rows: Vec<f32> = layout.pills.iter().fold(Vec::new(), |mut acc, seed| {
            if !acc.iter().any(|y| (y - seed.center.y).abs() < 0.5) {
                acc.push(seed.center.y);
            }
            acc
        });
        assert!(distinct_rows.len() > 1, "expected the options to wrap");
    }

    #[test]
    fn rows_are_centered() {
        for level in LevelCatalog::built_in().iter() {
            let layout = build(level, viewport(), measure);
            for seed in &layout.pills {
                let row: Vec<&PillSeed> = layout
                    .pills
                    .iter()
                    .filter(|other| (other.center.y - seed.center.y).abs() < 0.5)
                    .collect();
                let left = row
                    .iter()
                    .map(|p| p.center.x - p.width / 2.0)
                    .fold(f32::INFINITY, f32::min);
                let right = row
                    .iter()
                    .map(|p| p.center.x + p.width / 2.0)
                    .fold(f32::NEG_INFINITY, f32::max);
                let imbalance = (left - (viewport().x - right)).abs();
                assert!(imbalance < 0.5, "row not centered in `{}`", level.prompt);
            }
        }
    }

    proptest! {
        #[test]
        fn layout_is_idempotent(width in 320.0f32..1280.0, height in 480.0f32..1280.0) {
            let viewport = Vec2::new(width, height);
            for level in LevelCatalog::built_in().iter() {
                let first = build(level, viewport, measure);
                let second = build(level, viewport, measure);
                prop_assert_eq!(first, second);
            }
        }

        #[test]
        fn rows_respect_the_margins(width in 320.0f32..1280.0) {
            let viewport = Vec2::new(width, 640.0);
            for level in LevelCatalog::built_in().iter() {
                let layout = build(level, viewport, measure);
                for seed in &layout.pills {
                    let row_width: f32 = {
                        let row: Vec<&PillSeed> = layout
                            .pills
                            .iter()
                            .filter(|other| (other.center.y - seed.center.y).abs() < 0.5)
                            .collect();
                        row.iter().map(|p| p.width).sum::<f32>()
                            + (row.len().saturating_sub(1)) as f32 * 14.0
                    };
                    prop_assert!(row_width <= width - 40.0 + f32::EPSILON);
                }
            }
        }
    }
}
