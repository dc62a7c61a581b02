//! Text for the numeric readouts next to each canvas.

use nalgebra::Vector2;


fn fixed2(x: f64) -> String {
    let s = format!("{:.2}", x);
    // "-0.00" and friends read as noise in a readout
    if s.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        s.trim_start_matches('-').to_owned()
    } else {
        s
    }
}


/// Integers are shown bare; anything else is rounded to at most two decimals
/// with trailing zeros dropped (`0.5`, `1.25`, `-0.33`).
pub fn matrix_cell(x: f64) -> String {
    if x.fract() == 0.0 && x.is_finite() {
        return format!("{}", x + 0.0);
    }
    let s = fixed2(x);
    s.trim_end_matches('0').trim_end_matches('.').to_owned()
}


pub fn vector(v: &Vector2<f64>) -> String {
    format!("[{}, {}]ᵗ", fixed2(v.x), fixed2(v.y))
}


pub fn determinant(det: f64) -> String {
    fixed2(det)
}
