//! Completion screen: title, three stars revealed one after another with an
//! eased pop, and a fading mistake tally.

use bevy::prelude::*;
use quiz_helpers::shapes::{ease_out_quart, star_mesh};
use quiz_helpers::FONT;

use crate::gameplay::QuizProgress;

const TITLE: &str = "lesson complete!";
const TITLE_SIZE: f32 = 36.0;
const CAPTION_SIZE: f32 = 18.0;
const TITLE_Y: f32 = 80.0;
const STARS_Y: f32 = -20.0;
const CAPTION_Y: f32 = -90.0;
const STAR_RADIUS: f32 = 22.0;
const STAR_SPACING: f32 = 70.0;

/// Frames between one star's reveal and the next.
const STAR_STAGGER_FRAMES: u32 = 15;
/// Frames one star takes to pop in.
const STAR_POP_FRAMES: u32 = 40;
/// Frames the caption takes to fade in.
const CAPTION_FADE_FRAMES: u32 = 60;
/// Revealed stars slide in from this far left.
const STAR_SLIDE: f32 = -30.0;
/// Scale a star starts its pop at.
const STAR_POP_SCALE: f32 = 1.5;

const TITLE_INK: Color = Color::srgb(0.067, 0.094, 0.153);
const CAPTION_INK: Color = Color::srgb(0.42, 0.447, 0.502);
const STAR_SOCKET: Color = Color::srgb(0.898, 0.906, 0.922);
const STAR_GOLD: Color = Color::srgb(1.0, 0.757, 0.027);

pub const fn stars_earned(mistakes: u32) -> u32 {
    if mistakes >= 3 {
        1
    } else if mistakes >= 1 {
        2
    } else {
        3
    }
}

#[derive(Component)]
pub struct CompletionElement;

/// A gold star waiting for its staggered reveal.
#[derive(Component)]
pub struct StarReveal {
    index: u32,
    base_x: f32,
    material: Handle<ColorMaterial>,
}

#[derive(Component)]
pub struct MistakeCaption;

/// Frame counter driving the staggered reveal.
#[derive(Resource, Default)]
pub struct CompletionAnim {
    frames: u32,
}

pub fn spawn_completion(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    progress: Res<QuizProgress>,
) {
    commands.init_resource::<CompletionAnim>();

    commands.spawn((
        Text2d::new(TITLE),
        TextFont {
            font: asset_server.load(FONT),
            font_size: TITLE_SIZE,
            ..default()
        },
        TextColor(TITLE_INK),
        Transform::from_xyz(0.0, TITLE_Y, 1.0),
        CompletionElement,
    ));

    let socket_mesh = meshes.add(star_mesh(STAR_RADIUS));
    let socket_material = materials.add(ColorMaterial::from(STAR_SOCKET));
    for index in 0..3u32 {
        let x = (index as f32 - 1.0) * STAR_SPACING;
        commands.spawn((
            Mesh2d(socket_mesh.clone()),
            MeshMaterial2d(socket_material.clone()),
            Transform::from_xyz(x, STARS_Y, 1.0),
            CompletionElement,
        ));

        // gold overlay, invisible until its reveal frame
        let material = materials.add(ColorMaterial::from(STAR_GOLD.with_alpha(0.0)));
        commands.spawn((
            Mesh2d(socket_mesh.clone()),
            MeshMaterial2d(material.clone()),
            Transform::from_xyz(x + STAR_SLIDE, STARS_Y, 2.0)
                .with_scale(Vec3::splat(1.0 + STAR_POP_SCALE)),
            StarReveal {
                index,
                base_x: x,
                material,
            },
            CompletionElement,
        ));
    }

    commands.spawn((
        Text2d::new(format!("mistakes made: {}", progress.mistakes)),
        TextFont {
            font: asset_server.load(FONT),
            font_size: CAPTION_SIZE,
            ..default()
        },
        TextColor(CAPTION_INK.with_alpha(0.0)),
        Transform::from_xyz(0.0, CAPTION_Y, 1.0),
        MistakeCaption,
        CompletionElement,
    ));
}

pub fn animate_completion(
    mut anim: ResMut<CompletionAnim>,
    progress: Res<QuizProgress>,
    mut stars: Query<(&StarReveal, &mut Transform)>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut captions: Query<&mut TextColor, With<MistakeCaption>>,
) {
    anim.frames += 1;
    let earned = stars_earned(progress.mistakes);

    for (star, mut transform) in &mut stars {
        if star.index >= earned {
            continue;
        }
        let local = anim.frames.saturating_sub(star.index * STAR_STAGGER_FRAMES);
        let progress01 = (local as f32 / STAR_POP_FRAMES as f32).min(1.0);
        let eased = ease_out_quart(progress01);

        transform.translation.x = (1.0 - eased).mul_add(STAR_SLIDE, star.base_x);
        transform.scale = Vec3::splat((1.0 - eased).mul_add(STAR_POP_SCALE, 1.0));
        if let Some(material) = materials.get_mut(&star.material) {
            material.color.set_alpha(eased);
        }
    }

    if let Ok(mut caption) = captions.get_single_mut() {
        caption
            .0
            .set_alpha((anim.frames as f32 / CAPTION_FADE_FRAMES as f32).min(1.0));
    }
}

pub fn despawn_completion(
    mut commands: Commands,
    elements: Query<Entity, With<CompletionElement>>,
) {
    for entity in &elements {
        commands.entity(entity).despawn_recursive();
    }
    commands.remove_resource::<CompletionAnim>();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_thresholds_follow_the_mistake_count() {
        assert_eq!(stars_earned(0), 3);
        assert_eq!(stars_earned(1), 2);
        assert_eq!(stars_earned(2), 2);
        assert_eq!(stars_earned(3), 1);
        assert_eq!(stars_earned(10), 1);
    }
}
