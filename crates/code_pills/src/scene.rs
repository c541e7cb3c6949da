//! Owned per-level scene state. Pointer events, the check action and the
//! per-frame tick are all explicit methods on [`Scene`], so every mutation
//! happens on one logical thread of control and the whole interaction cycle
//! can be driven headless in tests.

use bevy::prelude::*;

use crate::layout::{PlacedToken, SceneLayout};
use crate::level::{Level, LevelKind};

/// A dragged pill docks when released closer than this to the slot center.
pub const CAPTURE_RADIUS: f32 = 50.0;

const STIFFNESS: f32 = 0.18;
const SNAP_STIFFNESS: f32 = 0.45;
const DAMPING: f32 = 0.65;
const SCALE_EASE: f32 = 0.25;
const DRAG_SCALE: f32 = 1.1;
const SELECT_SCALE: f32 = 1.05;
const SHAKE_KICK: f32 = 25.0;
const SHAKE_DECAY: f32 = 0.85;
const SHAKE_REST: f32 = 0.05;

/// Interaction state, split per mode so drag flags cannot leak into
/// multiple choice levels and vice versa.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PillRole {
    Draggable { dragging: bool, in_slot: bool },
    Choice { selected: bool },
}

#[derive(Clone, Debug)]
pub struct PillBody {
    pub id: usize,
    pub text: String,
    pub pos: Vec2,
    pub target: Vec2,
    pub vel: Vec2,
    pub home: Vec2,
    pub size: Vec2,
    pub scale: f32,
    pub role: PillRole,
}

impl PillBody {
    pub const fn dragging(&self) -> bool {
        matches!(self.role, PillRole::Draggable { dragging: true, .. })
    }

    pub const fn in_slot(&self) -> bool {
        matches!(self.role, PillRole::Draggable { in_slot: true, .. })
    }

    pub const fn selected(&self) -> bool {
        matches!(self.role, PillRole::Choice { selected: true })
    }

    /// Axis aligned half-extent hit test around the pill center.
    pub fn contains(&self, point: Vec2) -> bool {
        (point.x - self.pos.x).abs() < self.size.x / 2.0
            && (point.y - self.pos.y).abs() < self.size.y / 2.0
    }

    /// One spring step toward the target. Dragged pills are pinned to the
    /// pointer, so only the scale eases while a drag is live. Draggable
    /// pills stiffen near their target to snap into the slot.
    pub fn step(&mut self) {
        if !self.dragging() {
            let to_target = self.target - self.pos;
            let snapping = matches!(self.role, PillRole::Draggable { .. })
                && to_target.length() < CAPTURE_RADIUS;
            let stiffness = if snapping { SNAP_STIFFNESS } else { STIFFNESS };
            self.vel += to_target * stiffness;
            self.vel *= DAMPING;
            self.pos += self.vel;
        }

        let goal = if self.dragging() {
            DRAG_SCALE
        } else if self.selected() {
            SELECT_SCALE
        } else {
            1.0
        };
        self.scale += (goal - self.scale) * SCALE_EASE;
    }
}

#[derive(Clone, Debug)]
pub struct SlotBody {
    pub center: Vec2,
    pub size: Vec2,
    pub answer: String,
    /// Pill id currently docked, if any.
    pub occupant: Option<usize>,
}

#[derive(Debug, PartialEq)]
pub enum CheckOutcome {
    Correct { at: Vec2 },
    Incorrect,
    /// No candidate to evaluate; the trigger is ignored.
    NotArmed,
}

#[derive(Resource, Debug)]
pub struct Scene {
    pub tokens: Vec<PlacedToken>,
    pub slot: Option<SlotBody>,
    /// Draw order, last entry on top.
    pills: Vec<PillBody>,
    /// Expected answer for choice levels.
    expected: Option<String>,
    drag: Option<usize>,
    selected: Option<usize>,
    shake: f32,
    armed: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::empty()
    }
}

impl Scene {
    /// Placeholder scene used before the first layout pass lands.
    pub const fn empty() -> Self {
        Self {
            tokens: Vec::new(),
            slot: None,
            pills: Vec::new(),
            expected: None,
            drag: None,
            selected: None,
            shake: 0.0,
            armed: false,
        }
    }

    pub fn new(layout: SceneLayout, level: &Level) -> Self {
        let role = match level.kind {
            LevelKind::DragDrop => PillRole::Draggable {
                dragging: false,
                in_slot: false,
            },
            LevelKind::MultipleChoice => PillRole::Choice { selected: false },
        };
        let pills = layout
            .pills
            .into_iter()
            .enumerate()
            .map(|(id, seed)| PillBody {
                id,
                text: seed.text,
                pos: seed.center,
                target: seed.center,
                vel: Vec2::ZERO,
                home: seed.center,
                size: Vec2::new(seed.width, crate::layout::PILL_HEIGHT),
                scale: 1.0,
                role,
            })
            .collect();
        Self {
            tokens: layout.tokens,
            slot: layout.slot.map(|spec| SlotBody {
                center: spec.center,
                size: spec.size,
                answer: spec.answer,
                occupant: None,
            }),
            pills,
            expected: level.answer.clone(),
            drag: None,
            selected: None,
            shake: 0.0,
            armed: false,
        }
    }

    pub fn pills(&self) -> &[PillBody] {
        &self.pills
    }

    pub fn pill(&self, id: usize) -> Option<&PillBody> {
        self.pills.iter().find(|p| p.id == id)
    }

    fn pill_mut(&mut self, id: usize) -> Option<&mut PillBody> {
        self.pills.iter_mut().find(|p| p.id == id)
    }

    /// Position in the draw stack plus the body, for z ordering.
    pub fn stacked(&self, id: usize) -> Option<(usize, &PillBody)> {
        self.pills
            .iter()
            .enumerate()
            .find(|(_, p)| p.id == id)
    }

    pub const fn armed(&self) -> bool {
        self.armed
    }

    pub const fn shake(&self) -> f32 {
        self.shake
    }

    pub fn drag_target(&self) -> Option<usize> {
        self.drag
    }

    pub fn selected_pill(&self) -> Option<usize> {
        self.selected
    }

    /// Hit-tests pills topmost first. Drag mode picks the pill up (undocking
    /// it if needed) and raises it to the top of the stack; choice mode
    /// moves the selection. A miss is a no-op.
    pub fn pointer_down(&mut self, point: Vec2) {
        let Some(index) = self.pills.iter().rposition(|p| p.contains(point)) else {
            return;
        };
        let Some(hit) = self.pills.get(index) else {
            return;
        };
        let id = hit.id;

        match hit.role {
            PillRole::Draggable { in_slot, .. } => {
                if in_slot {
                    if let Some(slot) = &mut self.slot {
                        if slot.occupant == Some(id) {
                            slot.occupant = None;
                        }
                    }
                    self.armed = false;
                }
                if let Some(pill) = self.pill_mut(id) {
                    pill.role = PillRole::Draggable {
                        dragging: true,
                        in_slot: false,
                    };
                }
                self.drag = Some(id);
                let body = self.pills.remove(index);
                self.pills.push(body);
            }
            PillRole::Choice { .. } => {
                for pill in &mut self.pills {
                    pill.role = PillRole::Choice { selected: false };
                }
                if let Some(pill) = self.pill_mut(id) {
                    pill.role = PillRole::Choice { selected: true };
                }
                self.selected = Some(id);
                self.armed = true;
            }
        }
    }

    /// The drag target tracks the pointer directly; the spring resumes on
    /// release.
    pub fn pointer_move(&mut self, point: Vec2) {
        let Some(id) = self.drag else { return };
        if let Some(pill) = self.pill_mut(id) {
            pill.pos = point;
            pill.target = point;
        }
    }

    /// Docks the drag target when it lands close enough to a free slot,
    /// otherwise sends it home.
    pub fn pointer_up(&mut self) {
        let Some(id) = self.drag.take() else { return };
        let Some(pos) = self.pill(id).map(|p| p.pos) else {
            return;
        };

        let dock_center = self.slot.as_ref().and_then(|slot| {
            (slot.occupant.is_none() && pos.distance(slot.center) < CAPTURE_RADIUS)
                .then_some(slot.center)
        });

        if let Some(center) = dock_center {
            if let Some(slot) = &mut self.slot {
                slot.occupant = Some(id);
            }
            if let Some(pill) = self.pill_mut(id) {
                pill.target = center;
                pill.role = PillRole::Draggable {
                    dragging: false,
                    in_slot: true,
                };
            }
            self.armed = true;
        } else {
            if let Some(pill) = self.pill_mut(id) {
                pill.target = pill.home;
                pill.role = PillRole::Draggable {
                    dragging: false,
                    in_slot: false,
                };
            }
            self.armed = false;
        }
    }

    /// Evaluates the current candidate. A wrong answer kicks the shake,
    /// reverts the candidate and disarms; the caller owns the burst and the
    /// mistake count.
    pub fn check(&mut self) -> CheckOutcome {
        if !self.armed {
            return CheckOutcome::NotArmed;
        }

        let verdict = if let Some(slot) = &self.slot {
            slot.occupant
                .and_then(|id| self.pill(id))
                .map(|pill| (pill.text == slot.answer, slot.center))
        } else {
            self.selected.and_then(|id| self.pill(id)).map(|pill| {
                (
                    self.expected.as_deref() == Some(pill.text.as_str()),
                    pill.pos,
                )
            })
        };
        let Some((correct, at)) = verdict else {
            return CheckOutcome::NotArmed;
        };

        if correct {
            CheckOutcome::Correct { at }
        } else {
            self.shake = SHAKE_KICK;
            self.revert_candidate();
            self.armed = false;
            CheckOutcome::Incorrect
        }
    }

    fn revert_candidate(&mut self) {
        let undocked = self.slot.as_mut().and_then(|slot| slot.occupant.take());
        if let Some(id) = undocked {
            if let Some(pill) = self.pill_mut(id) {
                pill.target = pill.home;
                pill.role = PillRole::Draggable {
                    dragging: false,
                    in_slot: false,
                };
            }
        }
        if let Some(id) = self.selected.take() {
            if let Some(pill) = self.pill_mut(id) {
                pill.role = PillRole::Choice { selected: false };
            }
        }
    }

    /// Advances every pill spring and decays the shake.
    pub fn tick(&mut self) {
        for pill in &mut self.pills {
            pill.step();
        }
        self.shake *= SHAKE_DECAY;
        if self.shake < SHAKE_REST {
            self.shake = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout;
    use crate::level::LevelCatalog;

    const VIEWPORT: Vec2 = Vec2::new(360.0, 640.0);

    fn measure(text: &str) -> f32 {
        text.chars().count() as f32 * 14.0
    }

    fn scene_for(index: usize) -> Scene {
        let catalog = LevelCatalog::built_in();
        let level = catalog.get(index).expect("level exists");
        Scene::new(layout::build(level, VIEWPORT, measure), level)
    }

    fn pill_pos(scene: &Scene, text: &str) -> Vec2 {
        scene
            .pills()
            .iter()
            .find(|p| p.text == text)
            .map(|p| p.pos)
            .expect("pill exists")
    }

    fn drag_to(scene: &mut Scene, text: &str, destination: Vec2) {
        let from = pill_pos(scene, text);
        scene.pointer_down(from);
        scene.pointer_move(destination);
        scene.pointer_up();
    }

    fn slot_center(scene: &Scene) -> Vec2 {
        scene.slot.as_ref().map(|s| s.center).expect("slot exists")
    }

    #[test]
    fn fresh_scene_is_disarmed_with_empty_slot() {
        let scene = scene_for(0);
        assert!(!scene.armed());
        assert_eq!(scene.slot.as_ref().and_then(|s| s.occupant), None);
        assert_eq!(scene.drag_target(), None);
        assert_eq!(scene.selected_pill(), None);
    }

    #[test]
    fn miss_click_changes_nothing() {
        let mut scene = scene_for(0);
        scene.pointer_down(Vec2::new(1.0, 1.0));
        assert_eq!(scene.drag_target(), None);
        assert!(!scene.armed());
    }

    #[test]
    fn docking_requires_release_inside_capture_radius() {
        let mut scene = scene_for(2); // "length" level
        let slot = slot_center(&scene);

        drag_to(&mut scene, "length", slot + Vec2::new(CAPTURE_RADIUS + 1.0, 0.0));
        assert_eq!(scene.slot.as_ref().and_then(|s| s.occupant), None);
        assert!(!scene.armed());

        drag_to(&mut scene, "length", slot + Vec2::new(CAPTURE_RADIUS - 1.0, 0.0));
        assert!(scene.slot.as_ref().and_then(|s| s.occupant).is_some());
        assert!(scene.armed());
    }

    #[test]
    fn occupied_slot_rejects_a_second_pill() {
        let mut scene = scene_for(2);
        let slot = slot_center(&scene);

        drag_to(&mut scene, "size", slot);
        let first = scene.slot.as_ref().and_then(|s| s.occupant);
        assert!(first.is_some());

        drag_to(&mut scene, "count", slot);
        assert_eq!(
            scene.slot.as_ref().and_then(|s| s.occupant),
            first,
            "occupant must not change"
        );
        // the rejected drop sends the pill home and disarms the control
        let count = scene
            .pills()
            .iter()
            .find(|p| p.text == "count")
            .expect("pill exists");
        assert_eq!(count.target, count.home);
        assert!(!scene.armed());
    }

    #[test]
    fn at_most_one_pill_is_docked() {
        let mut scene = scene_for(2);
        let slot = slot_center(&scene);
        drag_to(&mut scene, "size", slot);
        drag_to(&mut scene, "count", slot);
        let docked: Vec<usize> = scene
            .pills()
            .iter()
            .filter(|p| p.in_slot())
            .map(|p| p.id)
            .collect();
        assert_eq!(docked.len(), 1, "exactly one docked pill");
        assert_eq!(scene.slot.as_ref().and_then(|s| s.occupant), docked.first().copied());
    }

    #[test]
    fn picking_a_docked_pill_undocks_and_disarms() {
        let mut scene = scene_for(2);
        let slot = slot_center(&scene);
        drag_to(&mut scene, "length", slot);
        assert!(scene.armed());

        scene.pointer_down(slot);
        assert_eq!(scene.slot.as_ref().and_then(|s| s.occupant), None);
        assert!(!scene.armed());
        assert!(scene.drag_target().is_some());
        scene.pointer_up();
    }

    #[test]
    fn release_outside_the_window_still_ends_the_drag() {
        let mut scene = scene_for(0);
        scene.pointer_down(pill_pos(&scene, "'Alice'"));
        // the pointer leaves the window mid-drag; the release that follows
        // carries no position, only the fact that the gesture ended
        scene.pointer_move(Vec2::new(-200.0, -200.0));
        scene.pointer_up();

        assert_eq!(scene.drag_target(), None, "drag target must clear");
        let pill = scene
            .pills()
            .iter()
            .find(|p| p.text == "'Alice'")
            .expect("pill exists");
        assert!(!pill.dragging());
        assert_eq!(pill.target, pill.home);

        for _ in 0..120 {
            scene.tick();
        }
        let pill = scene
            .pills()
            .iter()
            .find(|p| p.text == "'Alice'")
            .expect("pill exists");
        assert!(pill.pos.distance(pill.home) < 0.5, "spring resumed");
        assert!((pill.scale - 1.0).abs() < 0.01, "scale eased back");
    }

    #[test]
    fn dragged_pill_raises_to_the_top_of_the_stack() {
        let mut scene = scene_for(0);
        let first_id = scene.pills().first().map(|p| p.id).expect("has pills");
        let pos = scene.pill(first_id).map(|p| p.pos).expect("pill exists");
        scene.pointer_down(pos);
        assert_eq!(
            scene.pills().last().map(|p| p.id),
            Some(first_id),
            "picked pill draws last"
        );
        scene.pointer_up();
    }

    #[test]
    fn selection_is_exclusive_and_arms_the_control() {
        let mut scene = scene_for(1); // "Hello" level
        scene.pointer_down(pill_pos(&scene, "Error"));
        scene.pointer_down(pill_pos(&scene, "Hello"));

        let selected: Vec<&str> = scene
            .pills()
            .iter()
            .filter(|p| p.selected())
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(selected, vec!["Hello"]);
        assert!(scene.armed());
    }

    #[test]
    fn correct_drag_answer_reports_the_slot_position() {
        let mut scene = scene_for(2);
        let slot = slot_center(&scene);
        drag_to(&mut scene, "length", slot);
        assert_eq!(scene.check(), CheckOutcome::Correct { at: slot });
        // the pill stays docked, ready for the level transition
        assert!(scene.slot.as_ref().and_then(|s| s.occupant).is_some());
    }

    #[test]
    fn wrong_drag_answer_shakes_reverts_and_disarms() {
        let mut scene = scene_for(2);
        let slot = slot_center(&scene);
        drag_to(&mut scene, "size", slot);

        assert_eq!(scene.check(), CheckOutcome::Incorrect);
        assert!(scene.shake() > 0.0, "shake kicks in");
        assert_eq!(scene.slot.as_ref().and_then(|s| s.occupant), None);
        assert!(!scene.armed());
        let size = scene
            .pills()
            .iter()
            .find(|p| p.text == "size")
            .expect("pill exists");
        assert_eq!(size.target, size.home);
    }

    #[test]
    fn choice_answers_compare_against_the_expected_text() {
        let mut scene = scene_for(1);
        scene.pointer_down(pill_pos(&scene, "Hello"));
        let at = pill_pos(&scene, "Hello");
        assert_eq!(scene.check(), CheckOutcome::Correct { at });

        let mut scene = scene_for(1);
        scene.pointer_down(pill_pos(&scene, "Error"));
        assert_eq!(scene.check(), CheckOutcome::Incorrect);
        assert_eq!(scene.selected_pill(), None, "selection cleared");
        assert!(scene.pills().iter().all(|p| !p.selected()));
        assert!(!scene.armed());
    }

    #[test]
    fn check_without_a_candidate_is_ignored() {
        let mut scene = scene_for(2);
        assert_eq!(scene.check(), CheckOutcome::NotArmed);
        let mut scene = scene_for(1);
        assert_eq!(scene.check(), CheckOutcome::NotArmed);
    }

    #[test]
    fn springs_settle_pills_onto_their_targets() {
        let mut scene = scene_for(2);
        let slot = slot_center(&scene);
        drag_to(&mut scene, "length", slot + Vec2::new(30.0, 0.0));
        for _ in 0..120 {
            scene.tick();
        }
        let pill = scene
            .pills()
            .iter()
            .find(|p| p.text == "length")
            .expect("pill exists");
        assert!(pill.pos.distance(slot) < 0.5, "pill settled into the slot");
        assert!((pill.scale - 1.0).abs() < 0.01);
    }

    #[test]
    fn shake_decays_to_zero() {
        let mut scene = scene_for(2);
        let slot = slot_center(&scene);
        drag_to(&mut scene, "size", slot);
        assert_eq!(scene.check(), CheckOutcome::Incorrect);

        let mut previous = scene.shake();
        for _ in 0..60 {
            scene.tick();
            assert!(scene.shake() <= previous, "shake never grows");
            previous = scene.shake();
        }
        assert_eq!(scene.shake(), 0.0);
    }
}
