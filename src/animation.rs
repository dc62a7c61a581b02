use std::time::Duration;

use nalgebra::{Matrix2, Vector2};
use serde::Deserialize;

use crate::math::{basis_columns, identity, lerp_matrix, lerp_vector};
use crate::render::{render_scene, SceneStyle, Surface};


pub const DEFAULT_DURATION: Duration = Duration::from_millis(500);


/// One drawable state: the matrix warping the grid plus the two arrows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub matrix: Matrix2<f64>,
    pub basis_i: Vector2<f64>,
    pub basis_j: Vector2<f64>,
}

impl Keyframe {
    /// Keyframe whose arrows sit on the columns of `matrix`.
    pub fn from_matrix(matrix: Matrix2<f64>) -> Self {
        let (basis_i, basis_j) = basis_columns(&matrix);
        Self { matrix, basis_i, basis_j }
    }

    pub fn identity() -> Self {
        Self::from_matrix(identity())
    }

    /// Every matrix cell and vector component is blended on its own, so the
    /// arrows only line up with the grid columns at the endpoints.
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            matrix: lerp_matrix(&self.matrix, &other.matrix, t),
            basis_i: lerp_vector(&self.basis_i, &other.basis_i, t),
            basis_j: lerp_vector(&self.basis_j, &other.basis_j, t),
        }
    }
}


#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    Smoothstep,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::Smoothstep => t * t * (3.0 - 2.0 * t),
        }
    }
}


/// What happens when a transition starts while another one is still running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum OverlapPolicy {
    /// The new transition invalidates every in-flight one.
    #[default]
    Supersede,
    /// All transitions keep running and drawing; whichever completes last
    /// leaves its state behind.
    Race,
}


#[derive(Clone, Debug)]
pub struct TransitionConfig {
    pub from: Keyframe,
    pub to: Keyframe,
    pub duration: Duration,
    pub show_unit_square: bool,
    pub easing: Easing,
}

impl TransitionConfig {
    pub fn new(from: Keyframe, to: Keyframe) -> Self {
        Self {
            from,
            to,
            duration: DEFAULT_DURATION,
            show_unit_square: true,
            easing: Easing::Linear,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_unit_square(mut self, show: bool) -> Self {
        self.show_unit_square = show;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}


/// The user-tunable part of a transition, shared by every panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionOptions {
    pub duration: Duration,
    pub show_unit_square: bool,
    pub easing: Easing,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            show_unit_square: true,
            easing: Easing::Linear,
        }
    }
}

impl TransitionOptions {
    pub fn between(&self, from: Keyframe, to: Keyframe) -> TransitionConfig {
        TransitionConfig::new(from, to)
            .with_duration(self.duration)
            .with_unit_square(self.show_unit_square)
            .with_easing(self.easing)
    }
}


#[derive(Clone, Debug)]
pub struct Transition<A> {
    config: TransitionConfig,
    action: A,
    start: f64,
    generation: u64,
}

impl<A> Transition<A> {
    /// Fraction of the duration elapsed at `now` (seconds), clamped to [0, 1].
    pub fn progress(&self, now: f64) -> f64 {
        let secs = self.config.duration.as_secs_f64();
        if secs <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / secs).clamp(0.0, 1.0)
    }

    /// State at progress `t`. At `t = 1` this is the target itself, never a
    /// blended approximation of it.
    pub fn sample(&self, t: f64) -> Keyframe {
        if t >= 1.0 {
            self.config.to
        } else {
            self.config.from.lerp(&self.config.to, self.config.easing.apply(t))
        }
    }
}


/// Receives the per-frame progress and the completion of transitions.
pub trait TransitionListener<A> {
    fn on_update(&mut self, _frame: &Keyframe, _t: f64) {}

    /// Called once per transition with the exact target keyframe.
    fn on_complete(&mut self, action: A, frame: &Keyframe);
}


/// Runs transitions for a single surface, one step per display frame.
#[derive(Debug)]
pub struct Animator<A> {
    policy: OverlapPolicy,
    generation: u64,
    active: Vec<Transition<A>>,
}

impl<A> Default for Animator<A> {
    fn default() -> Self {
        Self::new(OverlapPolicy::default())
    }
}

impl<A> Animator<A> {
    pub fn new(policy: OverlapPolicy) -> Self {
        Self {
            policy,
            generation: 0,
            active: Vec::new(),
        }
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: OverlapPolicy) {
        self.policy = policy;
    }

    pub fn is_animating(&self) -> bool {
        !self.active.is_empty()
    }

    /// Starts a transition at time `now` (seconds) and returns its generation.
    pub fn animate(&mut self, config: TransitionConfig, action: A, now: f64) -> u64 {
        self.generation += 1;
        if self.policy == OverlapPolicy::Supersede && !self.active.is_empty() {
            log::debug!(
                "Transition {} supersedes {} in-flight transition(s)",
                self.generation,
                self.active.len()
            );
            self.active.clear();
        }
        self.active.push(Transition {
            config,
            action,
            start: now,
            generation: self.generation,
        });
        self.generation
    }

    pub fn cancel(&mut self) {
        self.active.clear();
    }

    /// Advances every in-flight transition to `now`, painting each frame and
    /// reporting progress and completions to `listener`.
    pub fn tick(
        &mut self,
        surface: &mut impl Surface,
        style: &SceneStyle,
        now: f64,
        listener: &mut impl TransitionListener<A>,
    ) {
        let mut still_running = Vec::with_capacity(self.active.len());

        for transition in self.active.drain(..) {
            let t = transition.progress(now);
            let frame = transition.sample(t);
            render_scene(
                surface,
                style,
                &frame.basis_i,
                &frame.basis_j,
                &frame.matrix,
                transition.config.show_unit_square,
            );
            listener.on_update(&frame, t);

            if t < 1.0 {
                still_running.push(transition);
            } else {
                log::debug!("Transition {} completed", transition.generation);
                let Transition { config, action, .. } = transition;
                listener.on_complete(action, &config.to);
            }
        }

        self.active = still_running;
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::{DrawOp, RecordingSurface};

    #[derive(Default)]
    struct Log {
        updates: Vec<(Keyframe, f64)>,
        completed: Vec<(&'static str, Keyframe)>,
    }

    impl TransitionListener<&'static str> for Log {
        fn on_update(&mut self, frame: &Keyframe, t: f64) {
            self.updates.push((*frame, t));
        }

        fn on_complete(&mut self, action: &'static str, frame: &Keyframe) {
            self.completed.push((action, *frame));
        }
    }

    fn awkward_target() -> Keyframe {
        Keyframe {
            matrix: Matrix2::new(0.1, 0.7, -0.3, 1.0 / 3.0),
            basis_i: Vector2::new(0.7, 0.2),
            basis_j: Vector2::new(-0.1, 0.9),
        }
    }

    fn bits(k: &Keyframe) -> Vec<u64> {
        k.matrix
            .iter()
            .chain(k.basis_i.iter())
            .chain(k.basis_j.iter())
            .map(|x| x.to_bits())
            .collect()
    }

    #[test]
    fn midpoint_is_mean_of_endpoints() {
        let from = Keyframe::from_matrix(Matrix2::new(1.0, 2.0, 3.0, 4.0));
        let to = Keyframe::from_matrix(Matrix2::new(-1.0, 0.0, 5.0, 2.0));
        let mut animator = Animator::new(OverlapPolicy::Supersede);
        animator.animate(TransitionConfig::new(from, to), "mid", 10.0);

        let mut surface = RecordingSurface::new(200.0, 200.0);
        let mut log = Log::default();
        animator.tick(&mut surface, &SceneStyle::default(), 10.25, &mut log);

        let (frame, t) = log.updates[0];
        assert_eq!(t, 0.5);
        assert_eq!(frame.matrix, Matrix2::new(0.0, 1.0, 4.0, 3.0));
        assert_eq!(frame.basis_i, Vector2::new(0.0, 4.0));
        assert_eq!(frame.basis_j, Vector2::new(1.0, 3.0));
        assert!(log.completed.is_empty());
        assert!(animator.is_animating());
    }

    #[test]
    fn completion_reports_exact_target() {
        let to = awkward_target();
        let mut animator = Animator::new(OverlapPolicy::Supersede);
        animator.animate(TransitionConfig::new(Keyframe::identity(), to), "end", 0.0);

        let mut surface = RecordingSurface::new(200.0, 200.0);
        let mut log = Log::default();
        animator.tick(&mut surface, &SceneStyle::default(), 0.2, &mut log);
        animator.tick(&mut surface, &SceneStyle::default(), 0.7, &mut log);

        assert_eq!(log.completed.len(), 1);
        let (action, frame) = log.completed[0];
        assert_eq!(action, "end");
        assert_eq!(bits(&frame), bits(&to));
        assert_eq!(log.updates.last().map(|(_, t)| *t), Some(1.0));
        assert!(!animator.is_animating());
    }

    #[test]
    fn zero_duration_completes_on_first_frame() {
        let mut animator = Animator::new(OverlapPolicy::Supersede);
        let config = TransitionConfig::new(Keyframe::identity(), awkward_target())
            .with_duration(Duration::ZERO);
        animator.animate(config, "instant", 3.0);

        let mut surface = RecordingSurface::new(200.0, 200.0);
        let mut log = Log::default();
        animator.tick(&mut surface, &SceneStyle::default(), 3.0, &mut log);
        assert_eq!(log.completed.len(), 1);
    }

    #[test]
    fn each_frame_is_rendered() {
        let mut animator = Animator::new(OverlapPolicy::Supersede);
        let config = TransitionConfig::new(Keyframe::identity(), awkward_target())
            .with_unit_square(false);
        animator.animate(config, "frames", 0.0);

        let mut surface = RecordingSurface::new(200.0, 200.0);
        let mut log = Log::default();
        for now in [0.0, 0.1, 0.2, 0.3, 0.4, 0.5] {
            animator.tick(&mut surface, &SceneStyle::default(), now, &mut log);
        }

        let clears = surface.ops.iter().filter(|op| **op == DrawOp::Clear).count();
        assert_eq!(clears, 6);
        assert!(surface.polygons().is_empty());
        assert_eq!(log.updates.len(), 6);
        assert!(log.updates.windows(2).all(|w| w[0].1 < w[1].1));
    }

    #[test]
    fn new_transition_supersedes_running_one() {
        let mut animator = Animator::new(OverlapPolicy::Supersede);
        let first = animator.animate(
            TransitionConfig::new(Keyframe::identity(), awkward_target()),
            "first",
            0.0,
        );
        let second = animator.animate(
            TransitionConfig::new(Keyframe::identity(), Keyframe::identity()),
            "second",
            0.1,
        );
        assert!(second > first);

        let mut surface = RecordingSurface::new(200.0, 200.0);
        let mut log = Log::default();
        animator.tick(&mut surface, &SceneStyle::default(), 5.0, &mut log);

        let actions: Vec<_> = log.completed.iter().map(|(a, _)| *a).collect();
        assert_eq!(actions, vec!["second"]);
    }

    #[test]
    fn racing_transitions_last_completion_wins() {
        let slow = Keyframe::from_matrix(Matrix2::new(2.0, 0.0, 0.0, 2.0));
        let fast = Keyframe::from_matrix(Matrix2::new(0.0, -1.0, 1.0, 0.0));

        let mut animator = Animator::new(OverlapPolicy::Race);
        animator.animate(
            TransitionConfig::new(Keyframe::identity(), slow)
                .with_duration(Duration::from_millis(1000)),
            "slow",
            0.0,
        );
        animator.animate(
            TransitionConfig::new(Keyframe::identity(), fast)
                .with_duration(Duration::from_millis(200)),
            "fast",
            0.1,
        );

        let mut surface = RecordingSurface::new(200.0, 200.0);
        let mut log = Log::default();
        animator.tick(&mut surface, &SceneStyle::default(), 0.5, &mut log);
        assert_eq!(surface.ops.iter().filter(|op| **op == DrawOp::Clear).count(), 2);
        animator.tick(&mut surface, &SceneStyle::default(), 1.5, &mut log);

        let actions: Vec<_> = log.completed.iter().map(|(a, _)| *a).collect();
        assert_eq!(actions, vec!["fast", "slow"]);
        assert_eq!(log.completed.last().map(|(_, k)| *k), Some(slow));
    }

    #[test]
    fn cancel_drops_in_flight_transitions() {
        let mut animator = Animator::new(OverlapPolicy::Race);
        animator.animate(
            TransitionConfig::new(Keyframe::identity(), awkward_target()),
            "dropped",
            0.0,
        );
        animator.cancel();

        let mut surface = RecordingSurface::new(200.0, 200.0);
        let mut log = Log::default();
        animator.tick(&mut surface, &SceneStyle::default(), 1.0, &mut log);
        assert!(log.completed.is_empty());
        assert!(surface.ops.is_empty());
    }

    #[test]
    fn smoothstep_keeps_endpoints_and_midpoint() {
        assert_eq!(Easing::Smoothstep.apply(0.0), 0.0);
        assert_eq!(Easing::Smoothstep.apply(0.5), 0.5);
        assert_eq!(Easing::Smoothstep.apply(1.0), 1.0);
        assert!(Easing::Smoothstep.apply(0.25) < 0.25);
    }
}
