use std::collections::BTreeMap;

use nalgebra::Matrix2;
use rand::Rng;

use crate::animation::{Animator, Keyframe, OverlapPolicy, TransitionListener, TransitionOptions};
use crate::format;
use crate::math::{apply, compose, determinant, random_matrix};
use crate::render::{render_scene, SceneStyle, Surface};


/// 90° counter-clockwise rotation.
pub fn quarter_turn() -> Matrix2<f64> {
    Matrix2::new(0.0, -1.0, 1.0, 0.0)
}

/// Horizontal shear.
pub fn shear() -> Matrix2<f64> {
    Matrix2::new(1.0, 1.0, 0.0, 1.0)
}


#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadoutId {
    FirstI,
    FirstJ,
    ComposedI,
    ComposedJ,
    Determinant,
    Composition,
}

impl ReadoutId {
    pub const ALL: [ReadoutId; 6] = [
        Self::FirstI,
        Self::FirstJ,
        Self::ComposedI,
        Self::ComposedJ,
        Self::Determinant,
        Self::Composition,
    ];
}


/// Named text sinks a panel shows next to its canvas.
#[derive(Clone, Debug, Default)]
pub struct Readouts {
    sinks: BTreeMap<ReadoutId, String>,
}

impl Readouts {
    pub fn with_sinks(ids: impl IntoIterator<Item = ReadoutId>) -> Self {
        Self {
            sinks: ids.into_iter().map(|id| (id, String::new())).collect(),
        }
    }

    /// Writes `text` to the sink. A panel that does not show `id` logs a
    /// warning and keeps going.
    pub fn set(&mut self, id: ReadoutId, text: impl Into<String>) {
        match self.sinks.get_mut(&id) {
            Some(sink) => *sink = text.into(),
            None => log::warn!("Readout {id:?} is not shown on this panel"),
        }
    }

    pub fn clear(&mut self, id: ReadoutId) {
        self.set(id, String::new());
    }

    pub fn get(&self, id: ReadoutId) -> Option<&str> {
        self.sinks.get(&id).map(String::as_str)
    }
}


/// A pair of transformations applied one after the other.
#[derive(Clone, Debug)]
pub struct Composition {
    pub first: Matrix2<f64>,
    pub first_name: &'static str,
    pub second: Matrix2<f64>,
    pub second_name: &'static str,
}

impl Composition {
    /// Matrix of "first, then second".
    pub fn composed(&self) -> Matrix2<f64> {
        compose(&self.second, &self.first)
    }

    pub fn composed_name(&self) -> String {
        format!("{}{}", self.second_name, self.first_name)
    }

    /// State after only the first transformation.
    pub fn intermediate(&self) -> Keyframe {
        Keyframe::from_matrix(self.first)
    }
}


/// Which step of the composition the panel is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Identity,
    AfterFirst,
    AfterComposition,
}


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Reset,
    ApplyFirst,
    ApplySecond,
    ShowComposition,
}


#[derive(Clone, Debug)]
pub struct ScenarioState {
    pub composition: Composition,
    pub keyframe: Keyframe,
    pub stage: Stage,
    pub readouts: Readouts,
}

impl ScenarioState {
    fn new(composition: Composition) -> Self {
        let mut state = Self {
            composition,
            keyframe: Keyframe::identity(),
            stage: Stage::Identity,
            readouts: Readouts::with_sinks(ReadoutId::ALL),
        };
        state.reset();
        state
    }

    fn reset(&mut self) {
        self.keyframe = Keyframe::identity();
        self.stage = Stage::Identity;
        for id in ReadoutId::ALL {
            self.readouts.clear(id);
        }
        self.show_determinant();
    }

    fn show_first(&mut self, frame: &Keyframe) {
        self.readouts.set(ReadoutId::FirstI, format::vector(&frame.basis_i));
        self.readouts.set(ReadoutId::FirstJ, format::vector(&frame.basis_j));
    }

    fn show_composed(&mut self, frame: &Keyframe) {
        self.readouts.set(ReadoutId::ComposedI, format::vector(&frame.basis_i));
        self.readouts.set(ReadoutId::ComposedJ, format::vector(&frame.basis_j));
    }

    fn show_determinant(&mut self) {
        let det = determinant(&self.keyframe.matrix);
        self.readouts.set(ReadoutId::Determinant, format::determinant(det));
    }
}

impl TransitionListener<Action> for ScenarioState {
    fn on_complete(&mut self, action: Action, frame: &Keyframe) {
        self.keyframe = *frame;
        match action {
            Action::Reset => self.reset(),
            Action::ApplyFirst => {
                self.stage = Stage::AfterFirst;
                self.show_first(frame);
                self.readouts.clear(ReadoutId::ComposedI);
                self.readouts.clear(ReadoutId::ComposedJ);
            }
            Action::ApplySecond => {
                self.stage = Stage::AfterComposition;
                self.show_composed(frame);
            }
            Action::ShowComposition => {
                self.stage = Stage::AfterComposition;
                let intermediate = self.composition.intermediate();
                self.show_first(&intermediate);
                self.show_composed(frame);
                let m = self.composition.composed();
                self.readouts.set(
                    ReadoutId::Composition,
                    format!(
                        "[[{}, {}], [{}, {}]]",
                        format::matrix_cell(m[(0, 0)]),
                        format::matrix_cell(m[(0, 1)]),
                        format::matrix_cell(m[(1, 0)]),
                        format::matrix_cell(m[(1, 1)]),
                    ),
                );
            }
        }
        self.show_determinant();
    }
}


/// Demo panel that walks through a two-step composition.
#[derive(Debug)]
pub struct CompositionScenario {
    pub title: &'static str,
    state: ScenarioState,
    animator: Animator<Action>,
}

impl CompositionScenario {
    pub fn new(title: &'static str, composition: Composition, policy: OverlapPolicy) -> Self {
        Self {
            title,
            state: ScenarioState::new(composition),
            animator: Animator::new(policy),
        }
    }

    /// Rotate first, shear second.
    pub fn shear_after_rotation(policy: OverlapPolicy) -> Self {
        Self::new(
            "Composition: shear after rotation",
            Composition {
                first: quarter_turn(),
                first_name: "R",
                second: shear(),
                second_name: "S",
            },
            policy,
        )
    }

    /// Same two steps in the opposite order.
    pub fn rotation_after_shear(policy: OverlapPolicy) -> Self {
        Self::new(
            "Order matters: rotation after shear",
            Composition {
                first: shear(),
                first_name: "S",
                second: quarter_turn(),
                second_name: "R",
            },
            policy,
        )
    }

    pub fn state(&self) -> &ScenarioState {
        &self.state
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    pub fn set_policy(&mut self, policy: OverlapPolicy) {
        self.animator.set_policy(policy);
    }

    pub fn handle(&mut self, action: Action, options: &TransitionOptions, now: f64) {
        log::debug!("{}: {action:?} from {:?}", self.title, self.state.stage);

        let composition = &self.state.composition;
        let (from, to) = match action {
            Action::Reset => {
                if self.animator.policy() == OverlapPolicy::Supersede {
                    self.animator.cancel();
                }
                self.state.reset();
                return;
            }
            Action::ApplyFirst => (self.state.keyframe, composition.intermediate()),
            Action::ApplySecond => {
                let from = if self.state.stage == Stage::AfterFirst {
                    self.state.keyframe
                } else {
                    // Jump to the first step and show it, then animate the second
                    let intermediate = composition.intermediate();
                    self.state.show_first(&intermediate);
                    intermediate
                };
                let second = self.state.composition.second;
                let to = Keyframe {
                    matrix: self.state.composition.composed(),
                    basis_i: apply(&second, &from.basis_i),
                    basis_j: apply(&second, &from.basis_j),
                };
                (from, to)
            }
            Action::ShowComposition => (
                self.state.keyframe,
                Keyframe::from_matrix(composition.composed()),
            ),
        };

        self.animator.animate(options.between(from, to), action, now);
    }

    /// Paints the panel for this frame, advancing any running transition.
    pub fn tick(&mut self, surface: &mut impl Surface, style: &SceneStyle, now: f64, show_unit_square: bool) {
        if self.animator.is_animating() {
            self.animator.tick(surface, style, now, &mut self.state);
        } else {
            let k = &self.state.keyframe;
            render_scene(surface, style, &k.basis_i, &k.basis_j, &k.matrix, show_unit_square);
        }
    }
}


/// A fixed transformation shown with its determinant.
#[derive(Clone, Debug)]
pub struct StaticPanel {
    pub title: &'static str,
    pub matrix: Matrix2<f64>,
    pub readouts: Readouts,
}

impl StaticPanel {
    pub fn new(title: &'static str, matrix: Matrix2<f64>) -> Self {
        let mut readouts = Readouts::with_sinks([ReadoutId::Determinant]);
        readouts.set(ReadoutId::Determinant, format::determinant(determinant(&matrix)));
        Self { title, matrix, readouts }
    }

    pub fn recap() -> Self {
        Self::new("Recap", Matrix2::new(1.5, 0.5, 0.5, 1.0))
    }

    pub fn associativity() -> Self {
        Self::new("Associativity", Matrix2::new(1.2, -0.5, 0.3, 0.8))
    }

    pub fn tick(&self, surface: &mut impl Surface, style: &SceneStyle, show_unit_square: bool) {
        let k = Keyframe::from_matrix(self.matrix);
        render_scene(surface, style, &k.basis_i, &k.basis_j, &k.matrix, show_unit_square);
    }
}


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExplorerAction {
    Reset,
    Random,
    Transpose,
}


#[derive(Clone, Debug)]
struct ExplorerState {
    keyframe: Keyframe,
    readouts: Readouts,
}

impl TransitionListener<()> for ExplorerState {
    fn on_complete(&mut self, _: (), frame: &Keyframe) {
        self.keyframe = *frame;
        let det = determinant(&frame.matrix);
        self.readouts.set(ReadoutId::Determinant, format::determinant(det));
    }
}


/// Determinant demo: the starting matrix plus free exploration of random and
/// transposed matrices.
#[derive(Debug)]
pub struct DeterminantExplorer {
    pub title: &'static str,
    initial: Matrix2<f64>,
    state: ExplorerState,
    animator: Animator<()>,
}

impl DeterminantExplorer {
    pub fn new(policy: OverlapPolicy) -> Self {
        let initial = Matrix2::new(2.0, 1.0, 0.5, 1.5);
        let mut state = ExplorerState {
            keyframe: Keyframe::from_matrix(initial),
            readouts: Readouts::with_sinks([ReadoutId::Determinant]),
        };
        state.on_complete((), &Keyframe::from_matrix(initial));
        Self {
            title: "Determinant",
            initial,
            state,
            animator: Animator::new(policy),
        }
    }

    pub fn matrix(&self) -> &Matrix2<f64> {
        &self.state.keyframe.matrix
    }

    pub fn readouts(&self) -> &Readouts {
        &self.state.readouts
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    pub fn set_policy(&mut self, policy: OverlapPolicy) {
        self.animator.set_policy(policy);
    }

    pub fn handle(
        &mut self,
        action: ExplorerAction,
        options: &TransitionOptions,
        rng: &mut impl Rng,
        now: f64,
    ) {
        let current = self.state.keyframe;
        let target = match action {
            ExplorerAction::Reset => self.initial,
            ExplorerAction::Random => random_matrix(rng, 3.0, 0.5),
            ExplorerAction::Transpose => current.matrix.transpose(),
        };
        log::debug!("{}: {action:?} towards {target:?}", self.title);
        let config = options.between(current, Keyframe::from_matrix(target));
        self.animator.animate(config, (), now);
    }

    pub fn tick(&mut self, surface: &mut impl Surface, style: &SceneStyle, now: f64, show_unit_square: bool) {
        if self.animator.is_animating() {
            self.animator.tick(surface, style, now, &mut self.state);
        } else {
            let k = &self.state.keyframe;
            render_scene(surface, style, &k.basis_i, &k.basis_j, &k.matrix, show_unit_square);
        }
    }
}
