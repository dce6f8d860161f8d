use std::fmt::{Display, Formatter};
use std::time::Instant;

/// How a [`Clock`] advances.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockMode {
    /// The clock accumulates the deltas it is ticked with (wall-clock time).
    #[default]
    Autonomous,
    /// The clock is set to an externally observed position (e.g. media playback time).
    Slaved,
}

/// A time source, in milliseconds.
///
/// The control fields (`paused`, `rate`, `step`, `end`, `looping`) are public so a control surface
/// can bind to them directly; changes apply on the next [`Clock::tick`].
///
/// # Example
/// ```
/// use keyline::timing::Clock;
///
/// let mut clock = Clock::autonomous();
/// clock.rate = 2.0;
/// clock.end = Some(1000.0);
/// clock.looping = true;
///
/// clock.tick(300.0);
/// assert_eq!(clock.time, 600.0);
/// clock.tick(300.0);
/// assert_eq!(clock.time, 200.0);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug)]
pub struct Clock {
    /// Current time (ms).
    pub time: f64,
    /// A paused autonomous clock does not advance.
    pub paused: bool,
    /// Speed factor of an autonomous clock (0 freezes it, negative plays backward).
    pub rate: f64,
    /// Autonomous: fixed delta replacing the measured one. Slaved: quantization of the position.
    pub step: Option<f64>,
    /// Time bound of an autonomous clock; none (or 0) means unbounded.
    pub end: Option<f64>,
    /// Whether an autonomous clock wraps to 0 at `end` (otherwise it stops there, paused).
    #[cfg_attr(feature = "serde", serde(rename = "loop"))]
    pub looping: bool,
    mode: ClockMode,

    // ########################################
    // # Volatile utility data.
    /// Delta applied by the last tick.
    #[cfg_attr(feature = "serde", serde(skip))]
    dt: f64,
    /// Wall-clock reference of the last `tick_now`.
    #[cfg_attr(feature = "serde", serde(skip))]
    last: Option<Instant>,
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            time: 0.0,
            paused: false,
            rate: 1.0,
            step: None,
            end: None,
            looping: false,
            mode: ClockMode::default(),
            dt: 0.0,
            last: None,
        }
    }
}

impl Clock {
    pub fn new(mode: ClockMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn autonomous() -> Self {
        Self::new(ClockMode::Autonomous)
    }

    pub fn slaved() -> Self {
        Self::new(ClockMode::Slaved)
    }

    /// Advances the clock.
    ///
    /// * Autonomous: `input` is the elapsed delta (ms), scaled by `rate` and then wrapped or
    ///   clamped at `end`.
    /// * Slaved: `input` is the observed external position (ms), quantized to `step`.
    ///
    /// # Returns
    /// The delta applied to `time` by this tick (the scaled delta when autonomous, before wrapping).
    pub fn tick(&mut self, input: f64) -> f64 {
        self.dt = match self.mode {
            ClockMode::Autonomous => self.advance(input),
            ClockMode::Slaved => self.follow(input),
        };
        self.dt
    }

    /// Jumps to `position` (ms), regardless of `rate`, `step` and `paused`.
    ///
    /// An autonomous clock wraps or clamps the position within `end`. A slaved clock follows it as
    /// an observed position.
    ///
    /// # Returns
    /// The delta applied to `time`.
    pub fn seek(&mut self, position: f64) -> f64 {
        self.dt = match self.mode {
            ClockMode::Autonomous => self.jump(position),
            ClockMode::Slaved => self.follow(position),
        };
        self.dt
    }

    /// Ticks with the wall-clock time elapsed since the previous `tick_now` (0 the first time).
    ///
    /// A slaved clock has no source of its own: it only re-quantizes its current position.
    pub fn tick_now(&mut self) -> f64 {
        let now = Instant::now();
        let elapsed = self
            .last
            .map(|last| now.duration_since(last).as_secs_f64() * 1000.0)
            .unwrap_or(0.0);
        self.last = Some(now);
        match self.mode {
            ClockMode::Autonomous => self.tick(elapsed),
            ClockMode::Slaved => self.tick(self.time),
        }
    }

    /// Returns the delta applied by the last tick.
    pub fn get_dt(&self) -> f64 {
        self.dt
    }

    pub fn get_mode(&self) -> ClockMode {
        self.mode
    }

    /// Bounded end of the clock, if any.
    pub fn get_end(&self) -> Option<f64> {
        self.end.filter(|end| end.is_finite() && *end > 0.0)
    }

    fn advance(&mut self, delta: f64) -> f64 {
        if !self.rate.is_finite() {
            log::warn!("Clock rate {} is not finite: clamped to 0", self.rate);
            self.rate = 0.0;
        }
        if self.paused {
            return 0.0;
        }
        let delta = match self.step {
            Some(step) if step > 0.0 => step,
            _ if delta.is_finite() => delta,
            _ => {
                log::warn!("Clock delta {} is not finite: ignored", delta);
                0.0
            }
        };

        let dt = self.rate * delta;
        let time = self.time + dt;
        self.time = match self.get_end() {
            Some(end) if self.looping => {
                let wrapped = time.rem_euclid(end);
                if wrapped != time {
                    log::trace!("Clock wrapped at {}ms", end);
                }
                wrapped
            }
            Some(end) if time >= end => {
                self.paused = true;
                end
            }
            _ if time < 0.0 => {
                self.paused = true;
                0.0
            }
            _ => time,
        };
        dt
    }

    fn jump(&mut self, position: f64) -> f64 {
        if !position.is_finite() {
            log::warn!("Clock position {} is not finite: ignored", position);
            return 0.0;
        }
        let time = match self.get_end() {
            Some(end) if self.looping => position.rem_euclid(end),
            Some(end) => position.clamp(0.0, end),
            None => position.max(0.0),
        };
        let dt = time - self.time;
        self.time = time;
        dt
    }

    fn follow(&mut self, position: f64) -> f64 {
        if !position.is_finite() {
            log::warn!("Clock position {} is not finite: ignored", position);
            return 0.0;
        }
        let time = match self.step {
            Some(step) if step > 0.0 => (position / step).round() * step,
            _ => position,
        };
        let dt = time - self.time;
        self.time = time;
        dt
    }
}

impl Display for Clock {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Clock [{:?}, time={}ms, rate={}, paused={}, loop={}]",
            self.mode, self.time, self.rate, self.paused, self.looping
        )
    }
}
