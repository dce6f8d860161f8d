use std::fmt::{Display, Formatter};

use crate::animations::{Ease, Keyframe, Player};
use crate::errors::{Error, UnknownTrackSnafu};
use crate::timing::Clock;
use crate::utils::{Call, State};

/// What a [`Stage::frame`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Clock time after the tick (ms).
    pub time: f64,
    /// Delta applied by the tick (ms).
    pub dt: f64,
    /// Number of calls fired by the playback.
    pub fired: usize,
}

/// Binds a [`Clock`] to a [`Player`]: each rendered frame ticks the clock and plays the timeline
/// at the resulting time.
///
/// The stage also records live edits: [`Stage::record`] captures the current values of a track
/// target as a keyframe at the clock time, continuing smoothly from what was playing.
///
/// # Example
/// ```
/// use keyline::animations::{LiveState, Player};
/// use keyline::host::Stage;
/// use keyline::timing::Clock;
/// use keyline::utils::State;
///
/// let tendrils = LiveState::new(State::from_iter([("speed", 0.2)]));
/// let player = Player::new().with_track("tendrils", tendrils.clone());
/// let mut stage = Stage::new(Clock::slaved(), player);
///
/// stage.frame(0.0);
/// stage.record("tendrils", None, vec![])?;
/// stage.frame(1000.0);
/// tendrils.set("speed", 0.8);
/// stage.record("tendrils", None, vec![])?;
///
/// assert_eq!(stage.player.track("tendrils").unwrap().len(), 2);
/// # Ok::<(), keyline::errors::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Stage {
    pub clock: Clock,
    pub player: Player,
    /// Whether frames play the timeline (otherwise only the clock runs and edits stay live).
    pub animate: bool,
    /// Ease given to recorded keyframes.
    pub record_ease: Ease,
}

impl Stage {
    pub fn new(clock: Clock, player: Player) -> Self {
        Self {
            clock,
            player,
            animate: true,
            record_ease: Ease::Values(vec![0.0, 0.95, 1.0]),
        }
    }

    /// Runs a host frame: ticks the clock with `input` (a delta or a position depending on the
    /// clock mode) then plays the timeline at the new time.
    pub fn frame(&mut self, input: f64) -> FrameReport {
        let dt = self.clock.tick(input);
        self.play(dt)
    }

    /// Runs a host frame ticked from the wall clock.
    pub fn frame_now(&mut self) -> FrameReport {
        let dt = self.clock.tick_now();
        self.play(dt)
    }

    fn play(&mut self, dt: f64) -> FrameReport {
        let time = self.clock.time;
        let fired = match self.animate {
            true => self.player.play(time).len(),
            false => 0,
        };
        FrameReport { time, dt, fired }
    }

    /// Records a keyframe on `track` at the clock time, eased with [`Stage::record_ease`].
    ///
    /// Without `to`, the whole current value of the track target is recorded.
    ///
    /// # Errors
    /// * `UnknownTrack`: no track is named `track`.
    /// * `ShapeMismatch`: the recorded values do not fit the track.
    pub fn record(
        &mut self,
        track: &str,
        to: Option<State>,
        calls: Vec<Call>,
    ) -> Result<&mut Self, Error> {
        let time = self.clock.time;
        let keyframe = Keyframe::new(time)
            .set_ease(self.record_ease.clone())
            .set_calls(calls);
        let keyframe = match to {
            Some(to) => keyframe.with_to(to),
            None => keyframe,
        };
        self.player
            .track_mut(track)
            .ok_or_else(|| UnknownTrackSnafu { name: track }.build())?
            .smooth_to(keyframe)?;
        log::debug!("Recorded '{}' at {}ms", track, time);
        Ok(self)
    }

    /// Moves the clock to `position` and re-anchors the timeline there when animating.
    ///
    /// The re-anchoring maps the authored time 0 to `position`: a timeline recorded live keeps
    /// playing from the point it was recorded at.
    pub fn seek(&mut self, position: f64) -> Result<&mut Self, Error> {
        self.clock.seek(position);
        if self.animate {
            self.player.play_from(position, 0.0)?;
        }
        Ok(self)
    }

    /// Removes every keyframe at or after `time` (the clock time by default) on every track.
    ///
    /// # Returns
    /// The number of keyframes removed.
    pub fn undo(&mut self, time: Option<f64>) -> usize {
        let time = time.unwrap_or(self.clock.time);
        let removed: usize = self.player.splice_at(time).values().map(Vec::len).sum();
        if removed > 0 {
            log::debug!("Undo from {}ms removed {} keyframe(s)", time, removed);
        }
        removed
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Stage [animate={}] {} {}",
            self.animate, self.clock, self.player
        )
    }
}
