//! Bevy side of the play field: rebuilds the scene when the level or the
//! window changes, keeps pill/token entities in sync with the scene state,
//! and draws the dashed slot outline and the shake jitter.

use bevy::log::debug;
use bevy::prelude::*;
use bevy::sprite::Anchor;
use bevy::window::WindowResized;
use quiz_helpers::shapes::{capsule_perimeter, capsule_perimeter_point};
use quiz_helpers::FONT;

use crate::gameplay::QuizProgress;
use crate::layout::{self, FONT_SIZE, PILL_HEIGHT};
use crate::level::{LevelCatalog, CODE_INK};
use crate::scene::{PillBody, Scene};
use crate::{CheckActive, LevelChanged};

// approximate advance of the bold code face; good enough for a short snippet
const CODE_CHAR_ADVANCE: f32 = 14.0;

const PILL_BORDER: f32 = 2.5;
const SHADOW_ALPHA: f32 = 0.06;
const SHADOW_DROP: f32 = 4.0;
const SLOT_FILL: Color = Color::srgb(0.976, 0.98, 0.984);
const SLOT_OUTLINE_ALPHA: f32 = 0.4;
const DASH_ON: f32 = 8.0;
const DASH_OFF: f32 = 6.0;

const TOKEN_Z: f32 = 1.0;
const SLOT_Z: f32 = 0.5;
const PILL_BASE_Z: f32 = 2.0;
const PILL_STACK_STEP: f32 = 0.1;

/// Everything rebuilt on a level change or resize.
#[derive(Component)]
pub struct BoardElement;

/// Link from a pill entity back to its scene body and themed parts.
#[derive(Component)]
pub struct PillSprite {
    pub id: usize,
    theme: Color,
    fill: Handle<ColorMaterial>,
    label: Entity,
    shadow: Entity,
}

pub fn measure_code(text: &str) -> f32 {
    text.chars().count() as f32 * CODE_CHAR_ADVANCE
}

/// Window logical coordinates (top-left, y down) to world coordinates.
pub fn to_world(p: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(p.x - viewport.x / 2.0, viewport.y / 2.0 - p.y)
}

/// Kicks the first layout pass of a play session.
pub fn enter_playing(mut level_changed: EventWriter<LevelChanged>) {
    level_changed.send(LevelChanged);
}

/// Discards the board and rebuilds scene + entities from the current level
/// and window. Runs for level changes and window resizes; both invalidate
/// every pill, token and the slot, and disarm the check control.
pub fn rebuild_board(
    mut commands: Commands,
    mut level_events: EventReader<LevelChanged>,
    mut resize_events: EventReader<WindowResized>,
    windows: Query<&Window>,
    catalog: Res<LevelCatalog>,
    progress: Res<QuizProgress>,
    mut scene: ResMut<Scene>,
    previous: Query<Entity, With<BoardElement>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    asset_server: Res<AssetServer>,
    mut check_active: EventWriter<CheckActive>,
) {
    if level_events.is_empty() && resize_events.is_empty() {
        return;
    }
    level_events.clear();
    resize_events.clear();

    let Some(level) = catalog.get(progress.level) else {
        return;
    };

    for entity in &previous {
        commands.entity(entity).despawn_recursive();
    }

    let window = windows.single();
    let viewport = Vec2::new(window.width(), window.height());
    debug!(
        "laying out {} level `{}` at {viewport}",
        level.kind, level.prompt
    );
    *scene = Scene::new(layout::build(level, viewport, measure_code), level);

    for token in &scene.tokens {
        let color = if token.keyword { level.theme } else { CODE_INK };
        commands.spawn((
            Text2d::new(token.text.clone()),
            TextFont {
                font: asset_server.load(FONT),
                font_size: FONT_SIZE,
                ..default()
            },
            TextColor(color),
            Anchor::CenterLeft,
            Transform::from_translation(to_world(token.pos, viewport).extend(TOKEN_Z)),
            BoardElement,
        ));
    }

    if let Some(slot) = &scene.slot {
        let straight = slot.size.x - slot.size.y;
        commands.spawn((
            Mesh2d(meshes.add(Capsule2d::new(slot.size.y / 2.0, straight))),
            MeshMaterial2d(materials.add(ColorMaterial::from(SLOT_FILL))),
            Transform::from_translation(to_world(slot.center, viewport).extend(SLOT_Z))
                .with_rotation(Quat::from_rotation_z(core::f32::consts::FRAC_PI_2)),
            BoardElement,
        ));
    }

    for pill in scene.pills() {
        spawn_pill(
            &mut commands,
            &mut meshes,
            &mut materials,
            &asset_server,
            pill,
            level.theme,
            viewport,
        );
    }

    check_active.send(CheckActive(false));
}

fn spawn_pill(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
    asset_server: &AssetServer,
    pill: &PillBody,
    theme: Color,
    viewport: Vec2,
) {
    let rotate = Quat::from_rotation_z(core::f32::consts::FRAC_PI_2);
    let radius = PILL_HEIGHT / 2.0;
    let straight = pill.size.x - PILL_HEIGHT;
    let body_mesh = meshes.add(Capsule2d::new(radius, straight));
    let fill_mesh = meshes.add(Capsule2d::new(radius - PILL_BORDER, straight));
    let fill = materials.add(ColorMaterial::from(Color::WHITE));

    let shadow = commands
        .spawn((
            Mesh2d(body_mesh.clone()),
            MeshMaterial2d(materials.add(ColorMaterial::from(Color::srgba(
                0.0,
                0.0,
                0.0,
                SHADOW_ALPHA,
            )))),
            Transform::from_xyz(0.0, -SHADOW_DROP, -0.2).with_rotation(rotate),
        ))
        .id();
    let border = commands
        .spawn((
            Mesh2d(body_mesh),
            MeshMaterial2d(materials.add(ColorMaterial::from(theme))),
            Transform::from_xyz(0.0, 0.0, 0.0).with_rotation(rotate),
        ))
        .id();
    let fill_body = commands
        .spawn((
            Mesh2d(fill_mesh),
            MeshMaterial2d(fill.clone()),
            Transform::from_xyz(0.0, 0.0, 0.1).with_rotation(rotate),
        ))
        .id();
    let label = commands
        .spawn((
            Text2d::new(pill.text.clone()),
            TextFont {
                font: asset_server.load(FONT),
                font_size: FONT_SIZE,
                ..default()
            },
            TextColor(theme),
            Transform::from_xyz(0.0, 0.0, 0.2),
        ))
        .id();

    let root = commands
        .spawn((
            Transform::from_translation(to_world(pill.pos, viewport).extend(PILL_BASE_Z)),
            Visibility::default(),
            BoardElement,
            PillSprite {
                id: pill.id,
                theme,
                fill,
                label,
                shadow,
            },
        ))
        .id();
    commands
        .entity(root)
        .add_children(&[shadow, border, fill_body, label]);
}

/// Advances pill springs and the shake decay once per frame.
pub fn tick_scene(mut scene: ResMut<Scene>) {
    scene.tick();
}

/// Pushes scene state into the pill entities: position, stack order, scale,
/// selection colors and the shadow toggle while dragging.
pub fn sync_board(
    scene: Res<Scene>,
    windows: Query<&Window>,
    mut pills: Query<(&PillSprite, &mut Transform)>,
    mut labels: Query<&mut TextColor>,
    mut visibilities: Query<&mut Visibility>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let window = windows.single();
    let viewport = Vec2::new(window.width(), window.height());

    for (sprite, mut transform) in &mut pills {
        let Some((stack, body)) = scene.stacked(sprite.id) else {
            continue;
        };
        let z = PILL_BASE_Z + stack as f32 * PILL_STACK_STEP;
        transform.translation = to_world(body.pos, viewport).extend(z);
        transform.scale = Vec3::splat(body.scale);

        let selected = body.selected();
        if let Some(material) = materials.get_mut(&sprite.fill) {
            material.color = if selected { sprite.theme } else { Color::WHITE };
        }
        if let Ok(mut label) = labels.get_mut(sprite.label) {
            label.0 = if selected { Color::WHITE } else { sprite.theme };
        }
        if let Ok(mut shadow) = visibilities.get_mut(sprite.shadow) {
            *shadow = if body.dragging() {
                Visibility::Hidden
            } else {
                Visibility::Inherited
            };
        }
    }
}

/// Dashed, themed outline around the answer slot.
pub fn draw_slot(
    scene: Res<Scene>,
    windows: Query<&Window>,
    catalog: Res<LevelCatalog>,
    progress: Res<QuizProgress>,
    mut gizmos: Gizmos,
) {
    let Some(slot) = &scene.slot else { return };
    let Some(level) = catalog.get(progress.level) else {
        return;
    };
    let window = windows.single();
    let viewport = Vec2::new(window.width(), window.height());
    let center = to_world(slot.center, viewport);
    let color = level.theme.with_alpha(SLOT_OUTLINE_ALPHA);

    let half = slot.size / 2.0;
    let total = capsule_perimeter(half);
    let mut s = 0.0;
    while s < total {
        let end = (s + DASH_ON).min(total);
        // a few straight segments per dash keep the caps round
        let mut previous = capsule_perimeter_point(half, s);
        for i in 1..=3 {
            let at = s + (end - s) * i as f32 / 3.0;
            let point = capsule_perimeter_point(half, at);
            gizmos.line_2d(center + previous, center + point, color);
            previous = point;
        }
        s += DASH_ON + DASH_OFF;
    }
}

/// Random jitter on the camera proportional to the scene shake.
pub fn apply_shake(scene: Res<Scene>, mut cameras: Query<&mut Transform, With<Camera2d>>) {
    for mut transform in &mut cameras {
        let shake = scene.shake();
        transform.translation.x = (fastrand::f32() - 0.5) * shake;
        transform.translation.y = (fastrand::f32() - 0.5) * shake;
    }
}

/// Tears the board down when the completion screen takes over.
pub fn cleanup_board(
    mut commands: Commands,
    mut scene: ResMut<Scene>,
    previous: Query<Entity, With<BoardElement>>,
) {
    for entity in &previous {
        commands.entity(entity).despawn_recursive();
    }
    *scene = Scene::empty();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_world_maps_corners() {
        let viewport = Vec2::new(360.0, 640.0);
        assert_eq!(to_world(Vec2::ZERO, viewport), Vec2::new(-180.0, 320.0));
        assert_eq!(to_world(viewport, viewport), Vec2::new(180.0, -320.0));
        assert_eq!(to_world(viewport / 2.0, viewport), Vec2::ZERO);
    }

    #[test]
    fn code_measure_scales_with_length() {
        assert!(measure_code("for") < measure_code("length"));
        assert_eq!(measure_code(""), 0.0);
    }
}
