use std::fmt::{Display, Formatter};

use crate::animations::Ease;
use crate::errors::{Error, InvalidTimeSnafu};
use crate::utils::{Call, Scalable, State};

/// Represents a keyframe in a [`Track`](crate::animations::Track).
///
/// A `Keyframe` specifies the values (`to`) its track target must hold at a given `time`. The
/// values are sparse: only the keys the keyframe changes are present. Between the previous keyframe
/// and this one, the values transition following this keyframe's [`Ease`].
///
/// A keyframe may also carry calls: side effects invoked when playback crosses its time going
/// forward. A keyframe with calls but no values is legal (a cue).
///
/// # Example
/// ```
/// use keyline::animations::{Ease, Keyframe};
/// use keyline::utils::State;
///
/// let keyframe = Keyframe::new(6000.0)
///     .with_to(State::from_iter([("colorMapAlpha", 1.0)]))
///     .set_ease([0.0, 0.0, 0.0, 1.0]);
/// assert_eq!(keyframe.get_time(), 6000.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Keyframe {
    /// The time of the keyframe in milliseconds.
    time: f64,
    /// The values to reach at `time`.
    to: Option<State>,
    /// The easing of the transition ending on this keyframe (default: linear).
    ease: Ease,
    /// Side effects fired when playback crosses `time` forward.
    call: Vec<Call>,
}

impl Keyframe {
    /// Creates a new value-less `Keyframe` at `time` (in milliseconds), with a linear ease.
    ///
    /// The time is only checked when the keyframe is inserted into a track.
    pub fn new(time: f64) -> Self {
        Self {
            time,
            ..Default::default()
        }
    }

    /// Sets the values to reach.
    pub fn with_to<S: Into<State>>(mut self, to: S) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Sets the easing of the transition ending on this keyframe.
    pub fn set_ease<E: Into<Ease>>(mut self, ease: E) -> Self {
        self.ease = ease.into();
        self
    }

    /// Adds a side effect fired when the keyframe is crossed.
    pub fn with_call(mut self, call: Call) -> Self {
        self.call.push(call);
        self
    }

    /// Replaces the side effects fired when the keyframe is crossed.
    pub fn set_calls(mut self, calls: Vec<Call>) -> Self {
        self.call = calls;
        self
    }

    /// Returns the time of the keyframe.
    pub fn get_time(&self) -> f64 {
        self.time
    }

    /// Returns the values of the keyframe, if any.
    pub fn get_to(&self) -> Option<&State> {
        self.to.as_ref()
    }

    /// Returns the easing of the keyframe.
    pub fn get_ease(&self) -> &Ease {
        &self.ease
    }

    /// Returns the side effects of the keyframe.
    pub fn get_calls(&self) -> &[Call] {
        &self.call
    }

    pub(crate) fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    pub(crate) fn to_mut(&mut self) -> &mut Option<State> {
        &mut self.to
    }

    /// Checks the keyframe can be stored: a finite time and a finite ease.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if !self.time.is_finite() {
            return InvalidTimeSnafu { time: self.time }.fail();
        }
        self.ease.validate()
    }

    /// Computes the eased progress of the transition from `from` (the time of the previous
    /// keyframe) to this keyframe, at a given `time`.
    ///
    /// The time is clamped to the transition: 0.0 before it, 1.0 after it (before easing).
    pub(crate) fn compute_progress(&self, from: f64, time: f64) -> f64 {
        let progress = time.progress(from, self.time);
        self.ease.call(progress)
    }
}

impl Display for Keyframe {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Keyframe at {}ms", self.time)?;
        if let Some(to) = &self.to {
            write!(f, " to {}", to)?;
        }
        if !self.call.is_empty() {
            write!(f, " ({} calls)", self.call.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::animations::Easing;

    use super::*;

    #[test]
    fn test_keyframe_new() {
        let keyframe = Keyframe::new(1000.0);
        assert_eq!(keyframe.get_time(), 1000.0);
        assert_eq!(keyframe.get_to(), None);
        assert_eq!(keyframe.get_ease(), &Ease::LINEAR);
        assert!(keyframe.get_calls().is_empty());

        let call = Call::new(|| {});
        let keyframe = keyframe
            .with_to(42)
            .set_ease(Easing::QuadOut)
            .with_call(call.clone());
        assert_eq!(keyframe.get_to(), Some(&State::Scalar(42.0)));
        assert_eq!(keyframe.get_ease(), &Ease::Named(Easing::QuadOut));
        assert_eq!(keyframe.get_calls(), &[call]);

        let keyframe = keyframe.set_calls(vec![]);
        assert!(keyframe.get_calls().is_empty());
    }

    #[test]
    fn test_validate() {
        assert!(Keyframe::new(0.0).validate().is_ok());
        assert!(Keyframe::new(-250.0).validate().is_ok());

        let error = Keyframe::new(f64::NAN).validate().unwrap_err();
        assert!(matches!(error, Error::InvalidTime { .. }));
        assert!(Keyframe::new(f64::INFINITY).validate().is_err());

        let keyframe = Keyframe::new(10.0).set_ease(Ease::Values(vec![f64::NAN]));
        assert!(matches!(
            keyframe.validate().unwrap_err(),
            Error::InvalidValue { .. }
        ));
    }

    #[test]
    fn test_compute_progress() {
        let keyframe = Keyframe::new(2000.0);
        assert_eq!(keyframe.compute_progress(1000.0, 500.0), 0.0); // 0% if time is before start
        assert_eq!(keyframe.compute_progress(1000.0, 2500.0), 1.0); // 100% if time is after end
        assert_eq!(keyframe.compute_progress(1000.0, 1300.0), 0.3);

        let keyframe = keyframe.set_ease(Easing::QuadOut);
        assert!((keyframe.compute_progress(1000.0, 1500.0) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_display() {
        let keyframe = Keyframe::new(60.0).with_to(State::from_iter([("speed", 0.5)]));
        assert_eq!(format!("{}", keyframe), "Keyframe at 60ms to {\"speed\": 0.5}");

        let keyframe = Keyframe::new(200.0).with_call(Call::new(|| {}));
        assert_eq!(format!("{}", keyframe), "Keyframe at 200ms (1 calls)");
    }
}
