use nalgebra::{Matrix2, Vector2};
use rand::Rng;


/// Determinants with a magnitude below this are treated as a collapsed plane.
pub const DEGENERATE_EPS: f64 = 0.001;


pub fn identity() -> Matrix2<f64> {
    Matrix2::identity()
}


/// Matrix-vector product `m * v`.
pub fn apply(m: &Matrix2<f64>, v: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(
        m[(0, 0)] * v.x + m[(0, 1)] * v.y,
        m[(1, 0)] * v.x + m[(1, 1)] * v.y,
    )
}


/// The transformation "apply `b` first, then `a`".
///
/// Built column by column: each column of `b` is where a basis vector lands
/// after `b`, so sending it through `a` gives the matching column of `a∘b`.
pub fn compose(a: &Matrix2<f64>, b: &Matrix2<f64>) -> Matrix2<f64> {
    let (b_i, b_j) = basis_columns(b);
    Matrix2::from_columns(&[apply(a, &b_i), apply(a, &b_j)])
}


pub fn determinant(m: &Matrix2<f64>) -> f64 {
    m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)]
}


/// Images of the standard basis vectors, i.e. the two columns of `m`.
pub fn basis_columns(m: &Matrix2<f64>) -> (Vector2<f64>, Vector2<f64>) {
    (m.column(0).into_owned(), m.column(1).into_owned())
}


pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}


pub fn lerp_vector(a: &Vector2<f64>, b: &Vector2<f64>, t: f64) -> Vector2<f64> {
    Vector2::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}


/// Cell-wise interpolation. The result is not a rotation "in between" two
/// rotations, just the straight-line blend of every entry.
pub fn lerp_matrix(a: &Matrix2<f64>, b: &Matrix2<f64>, t: f64) -> Matrix2<f64> {
    a.zip_map(b, |x, y| lerp(x, y, t))
}


/// How a transformation treats the area and handedness of the unit square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AreaOrientation {
    /// The plane is squashed onto a line or a point.
    Collapsed,
    /// Orientation is flipped (negative determinant).
    Flipped,
    Preserved,
}

impl AreaOrientation {
    pub fn classify(m: &Matrix2<f64>) -> Self {
        let det = determinant(m);
        if det.abs() < DEGENERATE_EPS {
            Self::Collapsed
        } else if det < 0.0 {
            Self::Flipped
        } else {
            Self::Preserved
        }
    }
}


/// Random matrix whose entries are multiples of `step` within `[-range, range]`.
pub fn random_matrix(rng: &mut impl Rng, range: f64, step: f64) -> Matrix2<f64> {
    let max = (range / step) as i32;
    Matrix2::from_fn(|_, _| rng.gen_range(-max..=max) as f64 * step)
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn rotation() -> Matrix2<f64> {
        Matrix2::new(0.0, -1.0, 1.0, 0.0)
    }

    fn shear() -> Matrix2<f64> {
        Matrix2::new(1.0, 1.0, 0.0, 1.0)
    }

    #[test]
    fn apply_is_row_major_product() {
        let m = Matrix2::new(1.0, 2.0, 3.0, 4.0);
        let v = apply(&m, &Vector2::new(5.0, 6.0));
        assert_eq!(v, Vector2::new(17.0, 39.0));
    }

    #[test]
    fn composing_matches_applying_in_sequence() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let a = Matrix2::from_fn(|_, _| rng.gen_range(-10.0..10.0));
            let b = Matrix2::from_fn(|_, _| rng.gen_range(-10.0..10.0));
            let v = Vector2::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0));

            let composed = apply(&compose(&a, &b), &v);
            let sequential = apply(&a, &apply(&b, &v));
            assert_abs_diff_eq!(composed, sequential, epsilon = 1e-9);
        }
    }

    #[test]
    fn compose_agrees_with_matrix_product() {
        let a = Matrix2::new(1.2, -0.5, 0.3, 0.8);
        let b = Matrix2::new(2.0, 1.0, 0.5, 1.5);
        assert_abs_diff_eq!(compose(&a, &b), a * b, epsilon = 1e-12);
    }

    #[test]
    fn determinants_of_known_matrices() {
        assert_eq!(determinant(&identity()), 1.0);
        assert_eq!(determinant(&rotation()), 1.0);
        assert_eq!(determinant(&shear()), 1.0);
        assert_abs_diff_eq!(
            determinant(&Matrix2::new(2.0, 1.0, 0.5, 1.5)),
            2.5,
            epsilon = 1e-12
        );
    }

    #[test]
    fn composition_order_matters() {
        let shear_after_rotation = compose(&shear(), &rotation());
        let rotation_after_shear = compose(&rotation(), &shear());

        assert_eq!(shear_after_rotation, Matrix2::new(1.0, -1.0, 1.0, 0.0));
        assert_eq!(rotation_after_shear, Matrix2::new(0.0, -1.0, 1.0, 1.0));
        assert_ne!(shear_after_rotation, rotation_after_shear);
    }

    #[test]
    fn basis_columns_are_images_of_unit_vectors() {
        let m = Matrix2::new(1.5, 0.5, 0.5, 1.0);
        let (i_hat, j_hat) = basis_columns(&m);
        assert_eq!(i_hat, apply(&m, &Vector2::x()));
        assert_eq!(j_hat, apply(&m, &Vector2::y()));
    }

    #[test]
    fn lerp_midpoint_is_mean() {
        let a = Matrix2::new(1.0, -3.0, 0.25, 8.0);
        let b = Matrix2::new(0.0, 5.0, 1.75, -2.0);
        let mid = lerp_matrix(&a, &b, 0.5);
        for r in 0..2 {
            for c in 0..2 {
                assert_eq!(mid[(r, c)], (a[(r, c)] + b[(r, c)]) / 2.0);
            }
        }

        let v = lerp_vector(&Vector2::new(1.0, 0.0), &Vector2::new(0.0, 1.0), 0.5);
        assert_eq!(v, Vector2::new(0.5, 0.5));
    }

    #[test]
    fn classify_orientation() {
        assert_eq!(
            AreaOrientation::classify(&Matrix2::new(1.0, 1.0, 1.0, 1.0)),
            AreaOrientation::Collapsed
        );
        assert_eq!(
            AreaOrientation::classify(&Matrix2::new(0.0, 1.0, 1.0, 0.0)),
            AreaOrientation::Flipped
        );
        assert_eq!(
            AreaOrientation::classify(&Matrix2::new(2.0, 0.0, 0.0, 2.0)),
            AreaOrientation::Preserved
        );
        assert_eq!(
            AreaOrientation::classify(&Matrix2::new(0.0005, 0.0, 0.0, 1.0)),
            AreaOrientation::Collapsed
        );
    }

    #[test]
    fn random_matrix_stays_on_step_grid() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let m = random_matrix(&mut rng, 3.0, 0.5);
            for x in m.iter() {
                assert!(x.abs() <= 3.0);
                assert_eq!((x / 0.5).fract(), 0.0);
            }
        }
    }
}
