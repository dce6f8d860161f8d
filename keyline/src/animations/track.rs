use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use crate::animations::{Keyframe, Target};
use crate::errors::{Error, InvalidValueSnafu};
use crate::utils::{Call, State};

/// Key path of a resolution channel: the record keys leading to a leaf value, empty when keyframes
/// carry whole (non-record) values.
type Channel = Vec<String>;

/// The outcome of a [`Track::evaluate`] call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Evaluation {
    /// The values written onto the target, if any.
    pub patch: Option<State>,
    /// Times of the keyframes newly crossed going forward, in time order.
    pub crossed: Vec<f64>,
    /// Calls of the newly crossed keyframes, in time order (not deduplicated).
    pub calls: Vec<Call>,
}

/// Represents the animation of one live [`Target`] by an ordered sequence of [`Keyframe`]s.
///
/// Keyframe times are strictly increasing: inserting at an existing time replaces that keyframe.
/// Evaluation is stateless with respect to values (any time may be evaluated in any order); only
/// the firing of keyframe calls depends on the previously evaluated time.
///
/// # Example
/// ```
/// use keyline::animations::{Keyframe, LiveState, Track};
/// use keyline::utils::State;
///
/// let target = LiveState::new(State::from_iter([("x", 0.0)]));
/// let mut track = Track::new(target.clone());
/// track
///     .to(Keyframe::new(0.0).with_to(State::from_iter([("x", 0.0)])))?
///     .to(Keyframe::new(1000.0).with_to(State::from_iter([("x", 10.0)])))?;
///
/// track.evaluate(500.0);
/// assert_eq!(target.get("x"), Some(State::Scalar(5.0)));
/// # Ok::<(), keyline::errors::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Track {
    /// The live object animated by this track.
    target: Box<dyn Target>,
    /// The [`Keyframe`]s belonging to this track, strictly ordered by time.
    keyframes: Vec<Keyframe>,
    /// The last evaluated time, used to detect keyframe crossings.
    last_applied: Option<f64>,
    /// The offset applied to authored times by [`Track::play_from`].
    offset: f64,

    // ########################################
    // # Volatile utility data.
    /// Per channel, the indices of the keyframes defining it (ascending).
    channels: BTreeMap<Channel, Vec<usize>>,
}

impl Track {
    /// Creates a new empty `Track` bound to the given target.
    pub fn new<T: Target + 'static>(target: T) -> Self {
        Self::from_boxed(Box::new(target))
    }

    pub(crate) fn from_boxed(target: Box<dyn Target>) -> Self {
        Self {
            target,
            keyframes: vec![],
            last_applied: None,
            offset: 0.0,
            channels: BTreeMap::new(),
        }
    }

    // ########################################
    // Editing

    /// Inserts a keyframe, or replaces the keyframe already at its exact time.
    ///
    /// # Errors
    /// * `InvalidTime`: the keyframe time is not finite.
    /// * `ShapeMismatch`: a value conflicts with the values other keyframes give to the same key.
    ///
    /// On error the track is left unmodified.
    pub fn to(&mut self, keyframe: Keyframe) -> Result<&mut Self, Error> {
        self.check(&keyframe)?;
        self.insert(keyframe);
        Ok(self)
    }

    /// Ramps to a keyframe over `duration` milliseconds.
    ///
    /// A start keyframe is inserted at `keyframe.time - duration` holding the current target
    /// values of every key the keyframe animates (captured now), then the keyframe itself.
    pub fn over(&mut self, duration: f64, keyframe: Keyframe) -> Result<&mut Self, Error> {
        if !duration.is_finite() || duration < 0.0 {
            return InvalidValueSnafu {
                info: format!("ramp duration {} must be a finite positive number", duration),
            }
            .fail();
        }
        self.check(&keyframe)?;

        let start = match (duration > 0.0, keyframe.get_to()) {
            (true, Some(to)) => match self.target.get_state().pick(to) {
                Some(values) => Some(Keyframe::new(keyframe.get_time() - duration).with_to(values)),
                None => {
                    log::warn!("Ramp start ignored: the target holds none of {}", to);
                    None
                }
            },
            _ => None,
        };

        if let Some(start) = start {
            self.check(&start)?;
            if let (Some(from), Some(to)) = (start.get_to(), keyframe.get_to()) {
                from.check_shape(to, "")?;
            }
            self.insert(start);
        }
        self.insert(keyframe);
        Ok(self)
    }

    /// Records a keyframe continuing from whatever is live right now.
    ///
    /// When `to` is absent, the full current target value is recorded. When the track was last
    /// evaluated before the keyframe time, the recording takes over the interval in between: the
    /// keyframes strictly inside it are removed, and the live values of the recorded keys are
    /// anchored at the last evaluated time so the transition starts from them.
    pub fn smooth_to(&mut self, keyframe: Keyframe) -> Result<&mut Self, Error> {
        let mut keyframe = keyframe;
        if keyframe.get_to().is_none() {
            *keyframe.to_mut() = Some(self.target.get_state());
        }
        let time = keyframe.get_time();

        let anchor = match (self.last_applied, keyframe.get_to()) {
            (Some(last), Some(to)) if last < time => self
                .target
                .get_state()
                .pick(to)
                .map(|values| (last, values)),
            _ => None,
        };

        let anchor = match anchor {
            None => {
                self.check(&keyframe)?;
                self.insert(keyframe);
                return Ok(self);
            }
            Some(anchor) => anchor,
        };

        // Validate everything before editing, against what remains once the interval is cleared.
        let (last, values) = anchor;
        let mut edited = self.clone();
        edited.keyframes.retain(|k| k.get_time() <= last || k.get_time() >= time);
        edited.reindex();
        let anchor = match edited.keyframe_at(last) {
            Some(existing) => {
                let mut merged = existing.clone();
                match merged.to_mut() {
                    Some(current) => current.merge(&values)?,
                    empty => *empty = Some(values),
                }
                merged
            }
            None => Keyframe::new(last).with_to(values),
        };
        edited.check(&anchor)?;
        edited.insert(anchor);
        edited.check(&keyframe)?;
        edited.insert(keyframe);

        let superseded = self
            .keyframes
            .iter()
            .filter(|k| k.get_time() > last && k.get_time() < time)
            .count();
        if superseded > 0 {
            log::debug!(
                "Recording over ]{}, {}[ superseded {} keyframe(s)",
                last,
                time,
                superseded
            );
        }
        self.keyframes = edited.keyframes;
        self.channels = edited.channels;
        Ok(self)
    }

    /// Re-anchors the track so that authored time `local` maps to time `source`.
    ///
    /// Every keyframe shifts by the same amount; anchoring is absolute, so repeating a call with
    /// the same arguments changes nothing.
    pub fn play_from(&mut self, source: f64, local: f64) -> Result<&mut Self, Error> {
        let offset = source - local;
        if !offset.is_finite() {
            return InvalidValueSnafu {
                info: format!("cannot anchor local time {} to {}", local, source),
            }
            .fail();
        }
        let shift = offset - self.offset;
        if shift != 0.0 {
            log::debug!("Track re-anchored by {}ms", shift);
            for keyframe in self.keyframes.iter_mut() {
                keyframe.set_time(keyframe.get_time() + shift);
            }
            self.last_applied = self.last_applied.map(|last| last + shift);
        }
        self.offset = offset;
        Ok(self)
    }

    /// Removes every keyframe at or after `time` and returns them.
    ///
    /// Splicing before the first keyframe does nothing.
    pub fn splice_at(&mut self, time: f64) -> Vec<Keyframe> {
        match self.keyframes.first() {
            Some(first) if time >= first.get_time() => {
                let index = self.keyframes.partition_point(|k| k.get_time() < time);
                let removed: Vec<Keyframe> = self.keyframes.drain(index..).collect();
                log::debug!("Spliced {} keyframe(s) at {}ms", removed.len(), time);
                self.reindex();
                removed
            }
            _ => vec![],
        }
    }

    // ########################################
    // Playback

    /// Evaluates the track at `time` and writes the result onto the target.
    ///
    /// Keys are resolved independently: each holds the value of the last keyframe defining it at
    /// or before the segment start, and transitions when the segment end defines it too. Before
    /// its first definition a key holds that first value; after the last keyframe every key holds.
    ///
    /// An empty track leaves the target untouched.
    pub fn evaluate(&mut self, time: f64) -> Evaluation {
        if !time.is_finite() {
            log::warn!("Track evaluation skipped: time {} is not finite", time);
            return Evaluation::default();
        }

        let (crossed, calls) = self.crossed_since(self.last_applied, time);
        self.last_applied = Some(time);

        let patch = self.resolve(time);
        if let Some(patch) = &patch {
            if let Err(error) = self.target.set_state(patch) {
                log::warn!("Track target rejected {}: {}", patch, error);
            }
        }
        if !crossed.is_empty() {
            log::trace!("Crossed keyframes at {:?} evaluating {}ms", crossed, time);
        }

        Evaluation {
            patch,
            crossed,
            calls,
        }
    }

    /// Returns the keyframes bracketing `time`: the last at or before it, and the first after it.
    pub fn track_at(&self, time: f64) -> (Option<&Keyframe>, Option<&Keyframe>) {
        let index = self.keyframes.partition_point(|k| k.get_time() <= time);
        let before = match index {
            0 => None,
            i => self.keyframes.get(i - 1),
        };
        (before, self.keyframes.get(index))
    }

    /// Time of the last keyframe, if any.
    pub fn end(&self) -> Option<f64> {
        self.keyframes.last().map(Keyframe::get_time)
    }

    // ########################################
    // Accessors

    /// Returns the target associated with the [`Track`].
    pub fn get_target(&self) -> &dyn Target {
        &*self.target
    }

    /// Returns the keyframes of this [`Track`], ordered by time.
    pub fn get_keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Returns the last evaluated time.
    pub fn get_last_applied(&self) -> Option<f64> {
        self.last_applied
    }

    /// Returns the anchoring offset set by [`Track::play_from`].
    pub fn get_offset(&self) -> f64 {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    // ########################################
    // Internals

    fn keyframe_at(&self, time: f64) -> Option<&Keyframe> {
        self.keyframes
            .binary_search_by(|k| k.get_time().total_cmp(&time))
            .ok()
            .map(|index| &self.keyframes[index])
    }

    /// Verifies a keyframe can be inserted without breaking the track invariants.
    fn check(&self, keyframe: &Keyframe) -> Result<(), Error> {
        keyframe.validate()?;
        let to = match keyframe.get_to() {
            Some(to) => to,
            None => return Ok(()),
        };
        let time = keyframe.get_time();

        // Any two keyframes must agree on the shape of every key path they share.
        self.keyframes
            .iter()
            .filter(|k| k.get_time() != time)
            .filter_map(Keyframe::get_to)
            .try_for_each(|other| other.check_shape(to, ""))
    }

    /// Inserts (or replaces at equal time) a checked keyframe, keeping the time order.
    fn insert(&mut self, keyframe: Keyframe) {
        let time = keyframe.get_time();
        match self
            .keyframes
            .binary_search_by(|k| k.get_time().total_cmp(&time))
        {
            Ok(index) => self.keyframes[index] = keyframe,
            Err(index) => self.keyframes.insert(index, keyframe),
        }
        self.reindex();
    }

    /// Rebuilds the per-channel index of defining keyframes.
    fn reindex(&mut self) {
        self.channels.clear();
        for (index, keyframe) in self.keyframes.iter().enumerate() {
            if let Some(to) = keyframe.get_to() {
                for (channel, _) in channels_of(to) {
                    self.channels.entry(channel).or_default().push(index);
                }
            }
        }
    }

    /// Collects keyframes crossed going forward from `previous` to `time`.
    ///
    /// The very first evaluation crosses every keyframe at or before `time`.
    fn crossed_since(&self, previous: Option<f64>, time: f64) -> (Vec<f64>, Vec<Call>) {
        let range = match previous {
            None => 0..self.keyframes.partition_point(|k| k.get_time() <= time),
            Some(previous) if time > previous => {
                let from = self.keyframes.partition_point(|k| k.get_time() <= previous);
                let to = self.keyframes.partition_point(|k| k.get_time() <= time);
                from..to
            }
            Some(_) => return (vec![], vec![]),
        };
        let crossed = &self.keyframes[range];
        (
            crossed.iter().map(Keyframe::get_time).collect(),
            crossed
                .iter()
                .flat_map(|k| k.get_calls().iter().cloned())
                .collect(),
        )
    }

    /// Computes the values of every channel at `time`.
    fn resolve(&self, time: f64) -> Option<State> {
        if self.channels.is_empty() {
            return None;
        }
        // Index of the segment start: the last keyframe at or before `time`.
        let count = self.keyframes.partition_point(|k| k.get_time() <= time);
        let segment = match count {
            0 => None,
            n => Some(n - 1),
        };

        let mut fields = BTreeMap::new();
        for (channel, indices) in &self.channels {
            let value = self.resolve_channel(channel, indices, segment, time);
            match channel.is_empty() {
                true => return Some(value),
                false => insert_at(&mut fields, channel, value),
            }
        }
        Some(State::Record(fields))
    }

    fn resolve_channel(
        &self,
        channel: &Channel,
        indices: &[usize],
        segment: Option<usize>,
        time: f64,
    ) -> State {
        let value_of = |index: usize| {
            self.keyframes[index]
                .get_to()
                .and_then(|to| channel_value(to, channel))
                .cloned()
                .unwrap_or_default()
        };

        let start = match segment {
            Some(start) => start,
            None => return value_of(indices[0]),
        };
        let defined = indices.partition_point(|&index| index <= start);
        let from = match defined {
            0 => indices[0],
            n => indices[n - 1],
        };

        let before = &self.keyframes[start];
        match indices.get(defined) {
            Some(&next) if next == start + 1 && time > before.get_time() && defined > 0 => {
                let after = &self.keyframes[next];
                let progress = after.compute_progress(before.get_time(), time);
                value_of(from).lerp(&value_of(next), progress)
            }
            _ => value_of(from),
        }
    }
}

/// Splits a patch into its leaf channels, recursing into records.
fn channels_of(to: &State) -> Vec<(Channel, &State)> {
    let mut channels = vec![];
    collect_channels(to, &mut vec![], &mut channels);
    channels
}

fn collect_channels<'a>(
    value: &'a State,
    path: &mut Vec<String>,
    channels: &mut Vec<(Channel, &'a State)>,
) {
    match value {
        State::Record(fields) => {
            for (key, field) in fields {
                path.push(key.clone());
                collect_channels(field, path, channels);
                path.pop();
            }
        }
        leaf => channels.push((path.clone(), leaf)),
    }
}

fn channel_value<'a>(to: &'a State, channel: &Channel) -> Option<&'a State> {
    channel
        .iter()
        .try_fold(to, |value, key| value.get(key))
        .filter(|value| !value.is_record())
}

/// Writes a leaf value at its key path, creating the intermediate records.
fn insert_at(fields: &mut BTreeMap<String, State>, channel: &[String], value: State) {
    match channel {
        [] => {}
        [key] => {
            fields.insert(key.clone(), value);
        }
        [key, rest @ ..] => {
            if let State::Record(inner) = fields.entry(key.clone()).or_default() {
                insert_at(inner, rest, value);
            }
        }
    }
}

impl Display for Track {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Track: {} keyframes - end: {}ms",
            self.keyframes.len(),
            self.end().unwrap_or_default()
        )
    }
}
