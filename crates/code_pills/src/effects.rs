//! Celebration burst for a correct answer: a handful of short lived sparks
//! thrown out of the validated answer's position in the level theme color.

use bevy::prelude::*;

use crate::board::to_world;
use crate::gameplay::QuizProgress;
use crate::level::LevelCatalog;
use crate::AnswerCorrect;

/// Sparks spawned per correct answer.
pub const BURST_SIZE: usize = 30;

const SPREAD: f32 = 16.0;
const GRAVITY: f32 = -0.4;
const LIFE_DECAY: f32 = 0.02;
const SHRINK: f32 = 0.95;
const MIN_RADIUS: f32 = 4.0;
const RADIUS_RANGE: f32 = 6.0;
const SPARK_Z: f32 = 9.0;

/// One spark of the celebration burst.
#[derive(Component, Debug)]
pub struct Spark {
    velocity: Vec2,
    life: f32,
    radius: f32,
}

impl Spark {
    pub fn scattered() -> Self {
        Self {
            velocity: Vec2::new(
                (fastrand::f32() - 0.5) * SPREAD,
                (fastrand::f32() - 0.5) * SPREAD,
            ),
            life: 1.0,
            radius: fastrand::f32().mul_add(RADIUS_RANGE, MIN_RADIUS),
        }
    }

    /// Advances the spark one frame: drift, fall, fade, shrink. Returns
    /// whether the spark is still alive.
    pub fn step(&mut self, pos: &mut Vec2) -> bool {
        *pos += self.velocity;
        self.velocity.y += GRAVITY;
        self.life -= LIFE_DECAY;
        self.radius *= SHRINK;
        self.life > 0.0
    }

    pub fn alpha(&self) -> f32 {
        self.life.clamp(0.0, 1.0)
    }

    pub const fn radius(&self) -> f32 {
        self.radius
    }

    pub const fn life(&self) -> f32 {
        self.life
    }
}

/// Spawns a burst wherever an answer was validated.
pub fn spawn_bursts(
    mut commands: Commands,
    mut events: EventReader<AnswerCorrect>,
    windows: Query<&Window>,
    catalog: Res<LevelCatalog>,
    progress: Res<QuizProgress>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    for event in events.read() {
        let window = windows.single();
        let viewport = Vec2::new(window.width(), window.height());
        let theme = catalog
            .get(progress.level)
            .map_or(Color::WHITE, |level| level.theme);
        let origin = to_world(event.at, viewport);
        // unit circle, scaled per frame to the spark radius
        let mesh = meshes.add(Circle::new(1.0));

        for _ in 0..BURST_SIZE {
            let spark = Spark::scattered();
            let scale = spark.radius();
            commands.spawn((
                Mesh2d(mesh.clone()),
                MeshMaterial2d(materials.add(ColorMaterial::from(theme))),
                Transform::from_translation(origin.extend(SPARK_Z))
                    .with_scale(Vec3::splat(scale)),
                spark,
            ));
        }
    }
}

/// Advances every spark and despawns the expired ones.
pub fn update_sparks(
    mut commands: Commands,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut sparks: Query<(
        Entity,
        &mut Spark,
        &mut Transform,
        &MeshMaterial2d<ColorMaterial>,
    )>,
) {
    for (entity, mut spark, mut transform, material) in &mut sparks {
        let mut pos = transform.translation.truncate();
        let alive = spark.step(&mut pos);
        transform.translation = pos.extend(transform.translation.z);
        transform.scale = Vec3::splat(spark.radius());
        if let Some(material) = materials.get_mut(&material.0) {
            material.color.set_alpha(spark.alpha());
        }
        if !alive {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn life_strictly_decreases_until_death() {
        let mut spark = Spark::scattered();
        let mut pos = Vec2::ZERO;
        let mut previous = spark.life();
        let mut steps = 0;
        while spark.step(&mut pos) {
            assert!(spark.life() < previous, "life must strictly decrease");
            previous = spark.life();
            steps += 1;
            assert!(steps < 100, "spark should expire well within 100 frames");
        }
        assert!(spark.life() <= 0.0);
    }

    #[test]
    fn sparks_shrink_and_fall() {
        let mut spark = Spark::scattered();
        let initial_radius = spark.radius();
        let mut pos = Vec2::ZERO;
        let mut lowest_velocity = f32::INFINITY;
        for _ in 0..10 {
            spark.step(&mut pos);
            assert!(spark.radius() < initial_radius);
            assert!(spark.velocity.y < lowest_velocity, "gravity pulls down");
            lowest_velocity = spark.velocity.y;
        }
    }

    #[test]
    fn alpha_never_goes_negative() {
        let mut spark = Spark::scattered();
        let mut pos = Vec2::ZERO;
        for _ in 0..80 {
            spark.step(&mut pos);
            assert!(spark.alpha() >= 0.0);
            assert!(spark.alpha() <= 1.0);
        }
    }
}
