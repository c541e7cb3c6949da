//! A pointer driven code quiz: each level shows a snippet with either a
//! blank to fill by dragging a pill into it, or a multiple choice question
//! answered by tapping a pill. Answers are validated on an explicit check,
//! with a particle burst for a hit, a screen shake for a miss, and a starred
//! completion screen after the last level.

use bevy::log::warn;
use bevy::prelude::*;

pub mod board;
pub mod effects;
pub mod gameplay;
pub mod layout;
pub mod level;
pub mod scene;
pub mod screen;
pub mod ui;

use gameplay::{AdvanceTimer, QuizProgress};
use level::LevelCatalog;
use scene::Scene;
use ui::CheckEnabled;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Default, States)]
pub enum GameState {
    #[default]
    Playing,
    Complete,
}

/// The check control was pressed (button, tap or key).
#[derive(Event)]
pub struct CheckPressed;

/// A different level must be laid out.
#[derive(Event)]
pub struct LevelChanged;

/// Whether the check control should accept input right now.
#[derive(Event, Clone, Copy)]
pub struct CheckActive(pub bool);

/// A correct answer was validated at this board position.
#[derive(Event)]
pub struct AnswerCorrect {
    pub at: Vec2,
}

/// A wrong answer was validated.
#[derive(Event)]
pub struct AnswerIncorrect;

pub fn run() {
    quiz_helpers::get_default_app(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        .init_state::<GameState>()
        .init_resource::<Scene>()
        .init_resource::<QuizProgress>()
        .init_resource::<AdvanceTimer>()
        .init_resource::<CheckEnabled>()
        .insert_resource(LevelCatalog::built_in())
        .add_event::<CheckPressed>()
        .add_event::<LevelChanged>()
        .add_event::<CheckActive>()
        .add_event::<AnswerCorrect>()
        .add_event::<AnswerIncorrect>()
        .add_systems(Startup, (setup, ui::setup_ui))
        .add_systems(
            OnEnter(GameState::Playing),
            (board::enter_playing, ui::on_enter_playing),
        )
        .add_systems(
            OnEnter(GameState::Complete),
            (board::cleanup_board, screen::spawn_completion, ui::on_enter_complete),
        )
        .add_systems(OnExit(GameState::Complete), screen::despawn_completion)
        .add_systems(
            Update,
            (
                board::rebuild_board,
                gameplay::handle_pointer,
                gameplay::handle_check,
                gameplay::track_mistakes,
                gameplay::schedule_advance,
                gameplay::advance_levels,
                board::tick_scene,
                board::sync_board,
                board::draw_slot,
                board::apply_shake,
            )
                .chain()
                .run_if(in_state(GameState::Playing)),
        )
        .add_systems(
            Update,
            (gameplay::handle_reset, screen::animate_completion)
                .run_if(in_state(GameState::Complete)),
        )
        .add_systems(
            Update,
            (
                (effects::spawn_bursts, effects::update_sparks).chain(),
                ui::update_prompt.run_if(resource_changed::<QuizProgress>),
                ui::update_check_button,
                ui::forward_button_press,
                ui::keyboard_check,
            ),
        )
        .run();
}

fn setup(mut commands: Commands, catalog: Res<LevelCatalog>) {
    commands.spawn(Camera2d);

    for level in catalog.iter() {
        if let Err(error) = level.validate() {
            warn!("level catalog entry is malformed: {error}");
        }
    }
}
