/// Linear RGB with components in `[0, 1]`.
pub type Rgb = [f64; 3];

/// Color of the smallest value in a range.
pub const LOW_COLOR: Rgb = [0.0, 0.0, 1.0];
/// Color of the largest value in a range.
pub const HIGH_COLOR: Rgb = [1.0, 0.0, 0.0];

/// Maps `value` within `[min, max]` onto the blue-to-red ramp.
///
/// Values outside the range are clamped. An empty range (`min == max`) maps
/// everything to `LOW_COLOR`.
pub fn color_for(value: f64, min: f64, max: f64) -> Rgb {
    let span = max - min;
    let ratio = if span.abs() > 0.0 && value.is_finite() {
        ((value - min) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    [
        LOW_COLOR[0] + (HIGH_COLOR[0] - LOW_COLOR[0]) * ratio,
        LOW_COLOR[1] + (HIGH_COLOR[1] - LOW_COLOR[1]) * ratio,
        LOW_COLOR[2] + (HIGH_COLOR[2] - LOW_COLOR[2]) * ratio,
    ]
}

/// Per-vertex colors for a non-indexed color buffer: three equal entries per face,
/// scaled between the smallest and largest of `values`.
pub fn face_vertex_colors(values: &[f64]) -> Vec<Rgb> {
    let (min, max) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let (min, max) = if min <= max { (min, max) } else { (0.0, 0.0) };

    values
        .iter()
        .flat_map(|&v| {
            let c = color_for(v, min, max);
            [c, c, c]
        })
        .collect()
}

/// Converts to 8-bit RGBA.
pub fn to_rgba8(c: Rgb) -> [u8; 4] {
    let byte = |x: f64| (x.clamp(0.0, 1.0) * 255.0).round() as u8;
    [byte(c[0]), byte(c[1]), byte(c[2]), 255]
}
