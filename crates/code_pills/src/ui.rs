//! The two UI fixtures outside the canvas-style board: the prompt line at
//! the top and the check button at the bottom. The button doubles as
//! "play again" on the completion screen.

use bevy::prelude::*;
use quiz_helpers::FONT;

use crate::gameplay::QuizProgress;
use crate::level::LevelCatalog;
use crate::{CheckActive, CheckPressed, GameState};

const PROMPT_SIZE: f32 = 20.0;
const BUTTON_LABEL_SIZE: f32 = 26.0;

const PROMPT_INK: Color = Color::srgb(0.067, 0.094, 0.153);
const BUTTON_READY: Color = Color::srgb(0.0, 0.78, 0.33);
const BUTTON_IDLE: Color = Color::srgb(0.898, 0.906, 0.922);
const LABEL_READY: Color = Color::WHITE;
const LABEL_IDLE: Color = Color::srgb(0.42, 0.447, 0.502);

/// Whether the check control currently accepts a press. Mirrors the scene's
/// arming plus the always-on completion screen case.
#[derive(Resource, Default)]
pub struct CheckEnabled(pub bool);

#[derive(Component)]
pub struct PromptText;

#[derive(Component)]
pub struct CheckButton;

#[derive(Component)]
pub struct CheckLabel;

pub fn setup_ui(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.spawn((
        Text::new(""),
        TextFont {
            font: asset_server.load(FONT),
            font_size: PROMPT_SIZE,
            ..default()
        },
        TextColor(PROMPT_INK),
        TextLayout::new_with_justify(JustifyText::Center),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Percent(8.0),
            width: Val::Percent(100.0),
            ..default()
        },
        PromptText,
    ));

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Percent(5.0),
                width: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                ..default()
            },
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        width: Val::Px(200.0),
                        height: Val::Px(56.0),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        ..default()
                    },
                    BackgroundColor(BUTTON_IDLE),
                    BorderRadius::all(Val::Px(28.0)),
                    Button,
                    CheckButton,
                ))
                .with_children(|parent| {
                    parent.spawn((
                        Text::new("check"),
                        TextFont {
                            font: asset_server.load(FONT),
                            font_size: BUTTON_LABEL_SIZE,
                            ..default()
                        },
                        TextColor(LABEL_IDLE),
                        CheckLabel,
                    ));
                });
        });
}

/// Keeps the prompt in step with the current level.
pub fn update_prompt(
    progress: Res<QuizProgress>,
    catalog: Res<LevelCatalog>,
    mut prompts: Query<&mut Text, With<PromptText>>,
) {
    let Ok(mut prompt) = prompts.get_single_mut() else {
        return;
    };
    prompt.0 = catalog
        .get(progress.level)
        .map(|level| level.prompt.clone())
        .unwrap_or_default();
}

/// Applies [`CheckActive`] notifications to the button look and the
/// [`CheckEnabled`] latch.
pub fn update_check_button(
    mut events: EventReader<CheckActive>,
    mut enabled: ResMut<CheckEnabled>,
    mut buttons: Query<&mut BackgroundColor, With<CheckButton>>,
    mut labels: Query<&mut TextColor, With<CheckLabel>>,
) {
    let Some(CheckActive(active)) = events.read().last().copied() else {
        return;
    };
    enabled.0 = active;
    if let Ok(mut background) = buttons.get_single_mut() {
        background.0 = if active { BUTTON_READY } else { BUTTON_IDLE };
    }
    if let Ok(mut label) = labels.get_single_mut() {
        label.0 = if active { LABEL_READY } else { LABEL_IDLE };
    }
}

/// Turns button presses into [`CheckPressed`] signals. The scene treats a
/// press while disarmed as a no-op, and the completion screen treats any
/// press as a reset, so every press is forwarded as-is.
pub fn forward_button_press(
    mut interactions: Query<&Interaction, (Changed<Interaction>, With<CheckButton>)>,
    mut presses: EventWriter<CheckPressed>,
) {
    for interaction in &mut interactions {
        if *interaction == Interaction::Pressed {
            presses.send(CheckPressed);
        }
    }
}

/// Button becomes "play again" while the completion screen shows.
pub fn on_enter_complete(
    mut prompts: Query<&mut Text, (With<PromptText>, Without<CheckLabel>)>,
    mut labels: Query<&mut Text, (With<CheckLabel>, Without<PromptText>)>,
    mut buttons: Query<&mut BackgroundColor, With<CheckButton>>,
    mut label_colors: Query<&mut TextColor, With<CheckLabel>>,
) {
    if let Ok(mut prompt) = prompts.get_single_mut() {
        prompt.0 = String::new();
    }
    if let Ok(mut label) = labels.get_single_mut() {
        label.0 = "play again".into();
    }
    if let Ok(mut background) = buttons.get_single_mut() {
        background.0 = BUTTON_READY;
    }
    if let Ok(mut color) = label_colors.get_single_mut() {
        color.0 = LABEL_READY;
    }
}

pub fn on_enter_playing(mut labels: Query<&mut Text, With<CheckLabel>>) {
    if let Ok(mut label) = labels.get_single_mut() {
        label.0 = "check".into();
    }
}

/// Keyboard fallback for desktop: space or enter acts as the check control.
pub fn keyboard_check(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    enabled: Res<CheckEnabled>,
    mut presses: EventWriter<CheckPressed>,
) {
    if !keys.just_pressed(KeyCode::Space) && !keys.just_pressed(KeyCode::Enter) {
        return;
    }
    if *state.get() == GameState::Complete || enabled.0 {
        presses.send(CheckPressed);
    }
}
