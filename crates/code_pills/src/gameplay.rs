//! Session flow: pointer events feed the scene, the check action is
//! evaluated, mistakes are tallied and levels advance after a short
//! feedback delay.

use bevy::log::info;
use bevy::prelude::*;
use quiz_helpers::input::{pointer_position, pointer_released, PointerPhase};

use crate::level::LevelCatalog;
use crate::scene::{CheckOutcome, Scene};
use crate::{AnswerCorrect, AnswerIncorrect, CheckActive, CheckPressed, GameState, LevelChanged};

/// Delay between a correct answer and the next level, long enough for the
/// burst to play out.
const ADVANCE_DELAY_SECS: f32 = 0.9;

#[derive(Resource, Default)]
pub struct QuizProgress {
    pub level: usize,
    pub mistakes: u32,
}

impl QuizProgress {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Pending transition to the next level after a correct answer.
#[derive(Resource, Default)]
pub struct AdvanceTimer(Option<Timer>);

impl AdvanceTimer {
    pub const fn is_pending(&self) -> bool {
        self.0.is_some()
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

/// Routes pointer down/move/up into the scene and mirrors any change of the
/// check arming outward.
pub fn handle_pointer(
    mouse: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window>,
    mut scene: ResMut<Scene>,
    mut check_active: EventWriter<CheckActive>,
) {
    let window = windows.single();
    let was_armed = scene.armed();

    if let Some(point) = pointer_position(PointerPhase::JustPressed, &mouse, &touches, window) {
        scene.pointer_down(point);
    }
    if let Some(point) = pointer_position(PointerPhase::Pressed, &mouse, &touches, window) {
        scene.pointer_move(point);
    }
    // the release carries no position of its own: it can land after the
    // cursor has left the window, and the drag must end regardless
    if pointer_released(&mouse, &touches) {
        scene.pointer_up();
    }

    if scene.armed() != was_armed {
        check_active.send(CheckActive(scene.armed()));
    }
}

/// Evaluates a check press against the scene. Correct answers raise
/// [`AnswerCorrect`]; wrong ones raise [`AnswerIncorrect`] and disable the
/// control. Presses during the feedback delay or while disarmed are no-ops.
pub fn handle_check(
    mut presses: EventReader<CheckPressed>,
    mut scene: ResMut<Scene>,
    advance: Res<AdvanceTimer>,
    mut correct: EventWriter<AnswerCorrect>,
    mut incorrect: EventWriter<AnswerIncorrect>,
    mut check_active: EventWriter<CheckActive>,
) {
    if presses.is_empty() {
        return;
    }
    presses.clear();
    if advance.is_pending() {
        return;
    }

    match scene.check() {
        CheckOutcome::Correct { at } => {
            correct.send(AnswerCorrect { at });
        }
        CheckOutcome::Incorrect => {
            incorrect.send(AnswerIncorrect);
            check_active.send(CheckActive(false));
        }
        CheckOutcome::NotArmed => {}
    }
}

/// The mistake counting collaborator.
pub fn track_mistakes(
    mut events: EventReader<AnswerIncorrect>,
    mut progress: ResMut<QuizProgress>,
) {
    for _ in events.read() {
        progress.mistakes += 1;
        info!(
            "wrong answer on level {}, {} mistakes so far",
            progress.level, progress.mistakes
        );
    }
}

/// The progression collaborator: arms the advance delay on a correct answer.
pub fn schedule_advance(mut events: EventReader<AnswerCorrect>, mut advance: ResMut<AdvanceTimer>) {
    for _ in events.read() {
        advance.0 = Some(Timer::from_seconds(ADVANCE_DELAY_SECS, TimerMode::Once));
    }
}

/// Moves to the next level once the feedback delay elapses, or to the
/// completion screen past the last level.
pub fn advance_levels(
    time: Res<Time>,
    mut advance: ResMut<AdvanceTimer>,
    mut progress: ResMut<QuizProgress>,
    catalog: Res<LevelCatalog>,
    mut next_state: ResMut<NextState<GameState>>,
    mut level_changed: EventWriter<LevelChanged>,
) {
    let Some(timer) = &mut advance.0 else { return };
    if !timer.tick(time.delta()).finished() {
        return;
    }
    advance.clear();

    progress.level += 1;
    if progress.level >= catalog.len() {
        info!("lesson complete with {} mistakes", progress.mistakes);
        next_state.set(GameState::Complete);
    } else {
        info!("advancing to level {}", progress.level);
        level_changed.send(LevelChanged);
    }
}

/// On the completion screen the check control doubles as "play again": any
/// press resets the whole session back to the first level.
pub fn handle_reset(
    mut presses: EventReader<CheckPressed>,
    mut progress: ResMut<QuizProgress>,
    mut advance: ResMut<AdvanceTimer>,
    mut next_state: ResMut<NextState<GameState>>,
    mut check_active: EventWriter<CheckActive>,
) {
    if presses.is_empty() {
        return;
    }
    presses.clear();

    info!("resetting the quiz");
    progress.reset();
    advance.clear();
    check_active.send(CheckActive(false));
    next_state.set(GameState::Playing);
}
