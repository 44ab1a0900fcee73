/// Finds `x` between `in_low` and `in_high` with `f(x)` within `precision`
/// of `target`, by repeated linear interpolation (false position).
///
/// Each estimate replaces the bound whose output lies on the same side of
/// `target`. `f` should be monotonic over the bracket. Returns `None` as soon
/// as the error stops shrinking, which also covers a flat bracket
/// (`f(in_low) == f(in_high)`) and NaN outputs.
pub fn interpolate<F>(
    mut in_low: f64,
    mut in_high: f64,
    target: f64,
    precision: f64,
    f: F,
) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    let mut out_low = f(in_low);
    let mut out_high = f(in_high);
    let mut last_delta = (out_high - out_low).abs();

    loop {
        let factor = (target - out_low) / (out_high - out_low);
        let in_test = in_low + factor * (in_high - in_low);
        let out_test = f(in_test);
        let delta = (out_test - target).abs();
        if delta < precision {
            return Some(in_test);
        }
        if delta.is_nan() || delta >= last_delta {
            return None;
        }
        last_delta = delta;

        if (target - out_test) * (out_high - out_low) > 0.0 {
            in_low = in_test;
            out_low = out_test;
        } else {
            in_high = in_test;
            out_high = out_test;
        }
    }
}
