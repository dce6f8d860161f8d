use simple_easing::*;

use crate::errors::{Error, InvalidValueSnafu};

/// Represents a set of named easing functions.
///
/// An easing function is a temporal function that takes a progress between 0 and 1 (beginning /
/// end) and associates to it a number value according to an ease curve.
///
/// See <https://easings.net> for a representation of each curve.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub enum Easing {
    BackIn,
    BackInOut,
    BackOut,
    BounceIn,
    BounceInOut,
    BounceOut,
    CircIn,
    CircInOut,
    CircOut,
    CubicIn,
    CubicInOut,
    CubicOut,
    ElasticIn,
    ElasticInOut,
    ElasticOut,
    ExpoIn,
    ExpoInOut,
    ExpoOut,
    /// Applies no transformation (default).
    #[default]
    Linear,
    QuadIn,
    QuadInOut,
    QuadOut,
    QuartIn,
    QuartInOut,
    QuartOut,
    QuintIn,
    QuintInOut,
    QuintOut,
    /// Goes from 1.0 to 0.0.
    Reverse,
    /// Goes from 0.0 to 1.0 and back to 0.0.
    RoundTrip,
    SineIn,
    SineInOut,
    SineOut,
}

impl Easing {
    /// Call the easing function.
    pub fn call(&self, t: f32) -> f32 {
        match self {
            Easing::BackIn => back_in(t),
            Easing::BackInOut => back_in_out(t),
            Easing::BackOut => back_out(t),
            Easing::BounceIn => bounce_in(t),
            Easing::BounceInOut => bounce_in_out(t),
            Easing::BounceOut => bounce_out(t),
            Easing::CircIn => circ_in(t),
            Easing::CircInOut => circ_in_out(t),
            Easing::CircOut => circ_out(t),
            Easing::CubicIn => cubic_in(t),
            Easing::CubicInOut => cubic_in_out(t),
            Easing::CubicOut => cubic_out(t),
            Easing::ElasticIn => elastic_in(t),
            Easing::ElasticInOut => elastic_in_out(t),
            Easing::ElasticOut => elastic_out(t),
            Easing::ExpoIn => expo_in(t),
            Easing::ExpoInOut => expo_in_out(t),
            Easing::ExpoOut => expo_out(t),
            Easing::Linear => t,
            Easing::QuadIn => quad_in(t),
            Easing::QuadInOut => quad_in_out(t),
            Easing::QuadOut => quad_out(t),
            Easing::QuartIn => quart_in(t),
            Easing::QuartInOut => quart_in_out(t),
            Easing::QuartOut => quart_out(t),
            Easing::QuintIn => quint_in(t),
            Easing::QuintInOut => quint_in_out(t),
            Easing::QuintOut => quint_out(t),
            Easing::Reverse => reverse(t),
            Easing::RoundTrip => roundtrip(t),
            Easing::SineIn => sine_in(t),
            Easing::SineInOut => sine_in_out(t),
            Easing::SineOut => sine_out(t),
        }
    }
}

/// The easing descriptor of a keyframe: shapes the progress of the transition that ends on it.
///
/// Serialized untagged: `[x1, y1, x2, y2]`, `"quadOut"`, or `[v0, v1, ..., vn]`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Clone, Debug, PartialEq)]
pub enum Ease {
    /// CSS-style cubic-bezier control points `(x1, y1, x2, y2)`; `[0, 0, 1, 1]` is linear.
    Bezier([f64; 4]),
    /// One of the named [`Easing`] curves.
    Named(Easing),
    /// A one-dimensional bezier curve over the given control values, of any order.
    /// `[0, 0.95, 1]` rushes toward the end value and settles into it.
    Values(Vec<f64>),
}

impl Default for Ease {
    fn default() -> Self {
        Ease::LINEAR
    }
}

impl From<Easing> for Ease {
    fn from(easing: Easing) -> Self {
        Ease::Named(easing)
    }
}

impl From<[f64; 4]> for Ease {
    fn from(points: [f64; 4]) -> Self {
        Ease::Bezier(points)
    }
}

impl From<Vec<f64>> for Ease {
    fn from(values: Vec<f64>) -> Self {
        Ease::Values(values)
    }
}

impl Ease {
    pub const LINEAR: Ease = Ease::Bezier([0.0, 0.0, 1.0, 1.0]);

    /// Maps a linear progress (clamped to `[0, 1]`) onto the eased progress.
    ///
    /// # Example
    /// ```
    /// use keyline::animations::Ease;
    /// assert_eq!(Ease::LINEAR.call(0.25), 0.25);
    /// assert_eq!(Ease::Values(vec![0.0, 0.95, 1.0]).call(1.0), 1.0);
    /// ```
    pub fn call(&self, progress: f64) -> f64 {
        let t = progress.clamp(0.0, 1.0);
        match self {
            Ease::Bezier([x1, y1, x2, y2]) => bezier_ease(t, *x1, *y1, *x2, *y2),
            Ease::Named(easing) => f64::from(easing.call(t as f32)),
            Ease::Values(values) => de_casteljau(values, t),
        }
    }

    /// Rejects non-finite control values.
    pub fn validate(&self) -> Result<(), Error> {
        let points: &[f64] = match self {
            Ease::Bezier(points) => points,
            Ease::Named(_) => &[],
            Ease::Values(values) => values,
        };
        match points.iter().all(|v| v.is_finite()) {
            true => Ok(()),
            false => InvalidValueSnafu {
                info: format!("ease {:?} has non-finite control values", points),
            }
            .fail(),
        }
    }
}

fn cubic_bezier(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Solves the x curve for `t` by bisection, then reads the y curve.
fn bezier_ease(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    if t <= 0.0 || t >= 1.0 {
        return t;
    }
    if x1 == 0.0 && y1 == 0.0 && x2 == 1.0 && y2 == 1.0 {
        return t;
    }
    // x must stay monotonic for the inversion to hold.
    let (x1, x2) = (x1.clamp(0.0, 1.0), x2.clamp(0.0, 1.0));
    let mut lo = 0.0;
    let mut hi = 1.0;
    let mut mid = t;
    for _ in 0..48 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-9 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}

fn de_casteljau(values: &[f64], t: f64) -> f64 {
    match values.len() {
        0 => t,
        1 => values[0],
        _ => {
            let mut points = values.to_vec();
            for level in (1..points.len()).rev() {
                for i in 0..level {
                    points[i] += (points[i + 1] - points[i]) * t;
                }
            }
            points[0]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_easing_approx_equal(easing: Easing, input: f32, expected: f32) {
        let result = easing.call(input);
        assert!(
            (result - expected).abs() < 1e-6,
            "Expected {}, got {}",
            expected,
            result
        );
    }

    fn assert_ease_approx_equal(ease: &Ease, input: f64, expected: f64) {
        let result = ease.call(input);
        assert!(
            (result - expected).abs() < 1e-6,
            "Expected {}, got {}",
            expected,
            result
        );
    }

    #[test]
    fn test_named_curves() {
        assert_easing_approx_equal(Easing::Linear, 0.3, 0.3);
        assert_easing_approx_equal(Easing::QuadOut, 0.5, 0.75);
        assert_easing_approx_equal(Easing::BounceOut, 0.5, 0.765625);
        assert_easing_approx_equal(Easing::ElasticOut, 0.5, 1.015625);
        assert_easing_approx_equal(Easing::SineInOut, 0.2, 0.0954915);
        assert_easing_approx_equal(Easing::SineInOut, 0.8, 0.9045085);
        assert_eq!(Easing::Reverse.call(0.0), 1.0);
        assert_eq!(Easing::RoundTrip.call(0.5), 1.0);
    }

    #[test]
    fn test_default_is_linear() {
        assert_eq!(Ease::default(), Ease::Bezier([0.0, 0.0, 1.0, 1.0]));
        assert_eq!(Easing::default(), Easing::Linear);
        for p in [0.0, 0.1, 0.5, 0.77, 1.0] {
            assert_eq!(Ease::default().call(p), p);
        }
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(Ease::LINEAR.call(-0.5), 0.0);
        assert_eq!(Ease::LINEAR.call(1.5), 1.0);
        assert_eq!(Ease::Named(Easing::QuadIn).call(2.0), 1.0);
    }

    #[test]
    fn test_bezier() {
        let ease_in_out = Ease::Bezier([0.42, 0.0, 0.58, 1.0]);
        assert_ease_approx_equal(&ease_in_out, 0.5, 0.5);
        assert!(ease_in_out.call(0.25) < 0.25);
        assert!(ease_in_out.call(0.75) > 0.75);
        assert_eq!(ease_in_out.call(0.0), 0.0);
        assert_eq!(ease_in_out.call(1.0), 1.0);

        let fast_start = Ease::Bezier([0.0, 0.0, 0.0, 1.0]);
        assert!(fast_start.call(0.25) > 0.25);

        // Monotonic over the unit interval.
        let mut last = 0.0;
        for i in 0..=100 {
            let value = ease_in_out.call(i as f64 / 100.0);
            assert!(value >= last);
            last = value;
        }
    }

    #[test]
    fn test_value_curve() {
        let rush = Ease::Values(vec![0.0, 0.95, 1.0]);
        // 2 * 0.5 * 0.5 * 0.95 + 0.25
        assert_ease_approx_equal(&rush, 0.5, 0.725);
        assert_eq!(rush.call(0.0), 0.0);
        assert_eq!(rush.call(1.0), 1.0);

        assert_ease_approx_equal(&Ease::Values(vec![0.0, 1.0]), 0.3, 0.3);
        assert_eq!(Ease::Values(vec![0.4]).call(0.9), 0.4);
        assert_eq!(Ease::Values(vec![]).call(0.9), 0.9);
    }

    #[test]
    fn test_validate() {
        assert!(Ease::LINEAR.validate().is_ok());
        assert!(Ease::Named(Easing::CubicIn).validate().is_ok());
        assert!(Ease::Bezier([0.0, f64::NAN, 1.0, 1.0]).validate().is_err());
        assert!(Ease::Values(vec![0.0, f64::INFINITY]).validate().is_err());

        let error = Ease::Values(vec![f64::NAN]).validate().unwrap_err();
        assert!(matches!(error, Error::InvalidValue { .. }));
        assert_eq!(
            error.to_string(),
            "Invalid value: ease [NaN] has non-finite control values."
        );
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Ease::from(Easing::QuadIn), Ease::Named(Easing::QuadIn));
        assert_eq!(
            Ease::from([0.0, 0.0, 0.0, 1.0]),
            Ease::Bezier([0.0, 0.0, 0.0, 1.0])
        );
        assert_eq!(
            Ease::from(vec![0.0, 0.95, 1.0]),
            Ease::Values(vec![0.0, 0.95, 1.0])
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_forms() {
        assert_eq!(
            serde_json::to_string(&Ease::Bezier([0.0, 0.0, 0.0, 1.0])).unwrap(),
            "[0.0,0.0,0.0,1.0]"
        );
        assert_eq!(
            serde_json::to_string(&Ease::Named(Easing::SineInOut)).unwrap(),
            r#""sineInOut""#
        );

        let bezier: Ease = serde_json::from_str("[0, 0, 1, 1]").unwrap();
        assert_eq!(bezier, Ease::LINEAR);
        let named: Ease = serde_json::from_str(r#""quadOut""#).unwrap();
        assert_eq!(named, Ease::Named(Easing::QuadOut));
        let values: Ease = serde_json::from_str("[0, 0.95, 1]").unwrap();
        assert_eq!(values, Ease::Values(vec![0.0, 0.95, 1.0]));
        assert!(serde_json::from_str::<Ease>(r#""wobble""#).is_err());
    }
}
