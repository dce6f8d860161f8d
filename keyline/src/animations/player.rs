use std::fmt::{Display, Formatter};

use indexmap::IndexMap;

use crate::animations::{Frame, FrameOptions, Frames, Keyframe, Target, Track};
use crate::errors::{Error, InvalidValueSnafu, UnknownTrackSnafu};
use crate::utils::{Call, CallRegistry, State};

/// Represents a timeline: a named collection of [`Track`]s evaluated together at a shared time.
///
/// Each track animates its own live target. Targets may be intentionally aliased (several tracks
/// handed clones of the same [`LiveState`](crate::animations::LiveState)), in which case the tracks
/// are expected to animate disjoint keys.
///
/// # Example
/// ```
/// use keyline::animations::{Keyframe, LiveState, Player};
/// use keyline::utils::{CallRegistry, State};
///
/// let registry = CallRegistry::default();
/// let tendrils = LiveState::new(State::from_iter([("speed", 0.2)]));
/// let mut player = Player::new()
///     .with_track("tendrils", tendrils.clone())
///     .with_track("calls", LiveState::default());
///
/// player
///     .track_mut("tendrils")
///     .unwrap()
///     .to(Keyframe::new(1000.0).with_to(State::from_iter([("speed", 1.0)])))?;
/// player
///     .track_mut("calls")
///     .unwrap()
///     .to(Keyframe::new(500.0).with_call(registry.register("reset", || println!("reset"))))?;
///
/// let fired = player.play(600.0);
/// assert_eq!(fired.len(), 1);
/// assert_eq!(player.end(), 1000.0);
/// # Ok::<(), keyline::errors::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct Player {
    /// The tracks, in declaration order.
    tracks: IndexMap<String, Track>,
}

impl Player {
    /// The conventional time [`Player::apply`] seeds tracks at.
    pub const START_TIME: f64 = 0.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a new track animating `target`.
    pub fn with_track<S: Into<String>, T: Target + 'static>(mut self, name: S, target: T) -> Self {
        self.add_track(name, target);
        self
    }

    /// Declares a new track animating `target` and returns it.
    ///
    /// A track target is never reassigned: declaring an existing name keeps the existing track.
    pub fn add_track<S: Into<String>, T: Target + 'static>(&mut self, name: S, target: T) -> &mut Track {
        self.add_boxed_track(name.into(), Box::new(target))
    }

    fn add_boxed_track(&mut self, name: String, target: Box<dyn Target>) -> &mut Track {
        if self.tracks.contains_key(&name) {
            log::warn!("Track '{}' is already declared: its target is kept", name);
        }
        self.tracks
            .entry(name)
            .or_insert_with(|| Track::from_boxed(target))
    }

    /// Rebuilds a player from serialized frames.
    ///
    /// Every track named in `frames` needs a target; targets without frames become empty tracks
    /// (declared after the others). Call identifiers resolve against `registry`: unknown ones are
    /// dropped with a warning.
    ///
    /// # Errors
    /// * `UnknownTrack`: a track of `frames` has no target.
    /// * `InvalidTime` / `ShapeMismatch`: a frame cannot be inserted.
    pub fn from_frames<I, S>(
        frames: &Frames,
        targets: I,
        registry: Option<&CallRegistry>,
    ) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (S, Box<dyn Target>)>,
        S: Into<String>,
    {
        let mut targets: IndexMap<String, Box<dyn Target>> = targets
            .into_iter()
            .map(|(name, target)| (name.into(), target))
            .collect();

        let mut player = Player::new();
        for (name, track_frames) in frames.iter() {
            let target = targets
                .shift_remove(name)
                .ok_or_else(|| UnknownTrackSnafu { name }.build())?;
            let track = player.add_boxed_track(name.to_string(), target);
            for frame in track_frames {
                track.to(frame.to_keyframe(registry))?;
            }
        }
        for (name, target) in targets {
            player.add_boxed_track(name, target);
        }
        Ok(player)
    }

    // ########################################
    // Playback

    /// Evaluates every track at `time`, then invokes the calls of the keyframes newly crossed.
    ///
    /// Calls run after all targets are updated, in track order then time order. A call shared by
    /// several crossed keyframes runs once.
    ///
    /// # Returns
    /// The calls invoked, in invocation order.
    pub fn play(&mut self, time: f64) -> Vec<Call> {
        let mut fired: Vec<Call> = vec![];
        for track in self.tracks.values_mut() {
            for call in track.evaluate(time).calls {
                if !fired.iter().any(|other| other.ptr_eq(&call)) {
                    fired.push(call);
                }
            }
        }
        if !fired.is_empty() {
            log::trace!("Playing {}ms fires {} call(s)", time, fired.len());
        }
        for call in &fired {
            call.invoke();
        }
        fired
    }

    /// Time of the last keyframe across all tracks (0 when there is none).
    pub fn end(&self) -> f64 {
        self.tracks
            .values()
            .filter_map(Track::end)
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    // ########################################
    // Editing

    /// Seeds every track at [`Player::START_TIME`]: see [`Player::apply_at`].
    pub fn apply<F>(&mut self, f: F) -> Result<&mut Self, Error>
    where
        F: FnMut(&mut Track, &str) -> Option<State>,
    {
        self.apply_at(Self::START_TIME, f)
    }

    /// Invokes `f(track, name)` for each track in order; values it returns become the track
    /// keyframe at `time`.
    ///
    /// # Errors
    /// Stops at the first keyframe that cannot be inserted; earlier tracks stay seeded.
    pub fn apply_at<F>(&mut self, time: f64, mut f: F) -> Result<&mut Self, Error>
    where
        F: FnMut(&mut Track, &str) -> Option<State>,
    {
        for (name, track) in self.tracks.iter_mut() {
            if let Some(to) = f(track, name) {
                track.to(Keyframe::new(time).with_to(to))?;
            }
        }
        Ok(self)
    }

    /// Re-anchors every track so that authored time `local` maps to time `source`.
    pub fn play_from(&mut self, source: f64, local: f64) -> Result<&mut Self, Error> {
        if !(source - local).is_finite() {
            return InvalidValueSnafu {
                info: format!("cannot anchor local time {} to {}", local, source),
            }
            .fail();
        }
        for track in self.tracks.values_mut() {
            track.play_from(source, local)?;
        }
        Ok(self)
    }

    /// Removes every keyframe at or after `time` on every track.
    ///
    /// # Returns
    /// The removed keyframes of the tracks that lost some.
    pub fn splice_at(&mut self, time: f64) -> IndexMap<String, Vec<Keyframe>> {
        self.tracks
            .iter_mut()
            .filter_map(|(name, track)| {
                let removed = track.splice_at(time);
                match removed.is_empty() {
                    true => None,
                    false => Some((name.clone(), removed)),
                }
            })
            .collect()
    }

    /// Exports the whole timeline.
    pub fn frames(&self, options: &FrameOptions) -> Frames {
        let mut frames = Frames::new();
        for (name, track) in &self.tracks {
            frames.insert(
                name.as_str(),
                track
                    .get_keyframes()
                    .iter()
                    .map(|keyframe| Frame::from_keyframe(keyframe, options.calls.as_ref()))
                    .collect(),
            );
        }
        frames
    }

    // ########################################
    // Accessors

    pub fn track(&self, name: &str) -> Option<&Track> {
        self.tracks.get(name)
    }

    pub fn track_mut(&mut self, name: &str) -> Option<&mut Track> {
        self.tracks.get_mut(name)
    }

    /// Returns the tracks in declaration order.
    pub fn get_tracks(&self) -> &IndexMap<String, Track> {
        &self.tracks
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Player [end={}ms, tracks={}]",
            self.end(),
            self.tracks.len()
        )?;
        for (name, track) in &self.tracks {
            writeln!(f, "  Track '{}' [target={:?}]:", name, track.get_target())?;
            for keyframe in track.get_keyframes() {
                writeln!(f, "    {} [ease={:?}]", keyframe, keyframe.get_ease())?;
            }
        }
        Ok(())
    }
}
