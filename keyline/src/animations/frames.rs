use indexmap::IndexMap;

use crate::animations::{Ease, Keyframe};
#[cfg(feature = "serde")]
use crate::errors::Error;
use crate::utils::{CallRegistry, State};

/// Options of [`Player::frames`](crate::animations::Player::frames).
#[derive(Clone, Debug, Default)]
pub struct FrameOptions {
    /// When set, keyframe calls are exported by the identifier they are registered under.
    /// Otherwise calls are left out of the export.
    pub calls: Option<CallRegistry>,
}

impl FrameOptions {
    pub fn with_calls(registry: &CallRegistry) -> Self {
        Self {
            calls: Some(registry.clone()),
        }
    }
}

/// The serializable form of a [`Keyframe`]: calls are referenced by identifier.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub time: f64,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub to: Option<State>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ease: Ease,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub call: Vec<String>,
}

impl Frame {
    pub(crate) fn from_keyframe(keyframe: &Keyframe, registry: Option<&CallRegistry>) -> Self {
        let calls = keyframe.get_calls();
        let call = match registry {
            None => {
                if !calls.is_empty() {
                    log::debug!(
                        "{} call(s) at {}ms left out of the export",
                        calls.len(),
                        keyframe.get_time()
                    );
                }
                vec![]
            }
            Some(registry) => calls
                .iter()
                .filter_map(|call| match registry.identify(call) {
                    Some(id) => Some(id),
                    None => {
                        log::warn!(
                            "Unregistered {:?} at {}ms omitted from the export",
                            call,
                            keyframe.get_time()
                        );
                        None
                    }
                })
                .collect(),
        };

        Self {
            time: keyframe.get_time(),
            to: keyframe.get_to().cloned(),
            ease: keyframe.get_ease().clone(),
            call,
        }
    }

    pub(crate) fn to_keyframe(&self, registry: Option<&CallRegistry>) -> Keyframe {
        let calls = self
            .call
            .iter()
            .filter_map(|id| match registry.and_then(|registry| registry.get(id)) {
                Some(call) => Some(call),
                None => {
                    log::warn!("Unknown call '{}' at {}ms dropped", id, self.time);
                    None
                }
            })
            .collect();

        let keyframe = Keyframe::new(self.time)
            .set_ease(self.ease.clone())
            .set_calls(calls);
        match &self.to {
            Some(to) => keyframe.with_to(to.clone()),
            None => keyframe,
        }
    }
}

/// A whole timeline in serializable form: track name to its ordered frames.
///
/// Track order is preserved. The JSON shape is
/// `{ "trackName": [ { "time": 0, "to": {...}, "ease": [0, 0, 1, 1], "call": ["id"] } ] }`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frames {
    tracks: IndexMap<String, Vec<Frame>>,
}

impl Frames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the frames of a track (appended if the track is new).
    pub fn insert<S: Into<String>>(&mut self, name: S, frames: Vec<Frame>) {
        self.tracks.insert(name.into(), frames);
    }

    pub fn with_track<S: Into<String>>(mut self, name: S, frames: Vec<Frame>) -> Self {
        self.insert(name, frames);
        self
    }

    pub fn get(&self, name: &str) -> Option<&[Frame]> {
        self.tracks.get(name).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Frame])> {
        self.tracks
            .iter()
            .map(|(name, frames)| (name.as_str(), frames.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    #[cfg(feature = "serde")]
    pub fn to_json_pretty(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::animations::Easing;
    use crate::utils::Call;

    use super::*;

    #[test]
    fn test_frame_from_keyframe() {
        let registry = CallRegistry::default();
        let reset = registry.register("reset", || {});
        let keyframe = Keyframe::new(60.0)
            .with_to(State::from_iter([("speed", 0.5)]))
            .set_ease(Easing::SineOut)
            .with_call(reset)
            .with_call(Call::new(|| {}));

        let frame = Frame::from_keyframe(&keyframe, Some(&registry));
        assert_eq!(frame.time, 60.0);
        assert_eq!(frame.to, Some(State::from_iter([("speed", 0.5)])));
        assert_eq!(frame.ease, Ease::Named(Easing::SineOut));
        // The unregistered call is omitted.
        assert_eq!(frame.call, vec!["reset"]);

        let frame = Frame::from_keyframe(&keyframe, None);
        assert!(frame.call.is_empty());
    }

    #[test]
    fn test_frame_to_keyframe() {
        let registry = CallRegistry::default();
        let restart = registry.register("restart", || {});
        let frame = Frame {
            time: 200.0,
            to: None,
            ease: Ease::default(),
            call: vec![String::from("restart"), String::from("unknown")],
        };

        let keyframe = frame.to_keyframe(Some(&registry));
        assert_eq!(keyframe.get_time(), 200.0);
        assert_eq!(keyframe.get_to(), None);
        assert_eq!(keyframe.get_calls(), &[restart]);

        let keyframe = frame.to_keyframe(None);
        assert!(keyframe.get_calls().is_empty());
    }

    #[test]
    fn test_frames_accessors() {
        let frames = Frames::new()
            .with_track("tendrils", vec![Frame::default()])
            .with_track("calls", vec![]);
        assert_eq!(frames.len(), 2);
        assert!(!frames.is_empty());
        assert_eq!(frames.get("tendrils").map(|f| f.len()), Some(1));
        assert!(frames.get("blur").is_none());
        assert_eq!(
            frames.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            vec!["tendrils", "calls"]
        );
    }

    #[cfg(feature = "serde")]
    mod serde_tests {
        use super::*;

        #[test]
        fn test_to_json() {
            let frames = Frames::new()
                .with_track(
                    "tendrils",
                    vec![Frame {
                        time: 0.0,
                        to: Some(State::from_iter([("speed", 0.25)])),
                        ease: Ease::LINEAR,
                        call: vec![],
                    }],
                )
                .with_track(
                    "calls",
                    vec![Frame {
                        time: 60.0,
                        to: None,
                        ease: Ease::Values(vec![0.0, 0.95, 1.0]),
                        call: vec![String::from("reset")],
                    }],
                );
            assert_eq!(
                frames.to_json().unwrap(),
                r#"{"tendrils":[{"time":0.0,"to":{"speed":0.25},"ease":[0.0,0.0,1.0,1.0]}],"calls":[{"time":60.0,"ease":[0.0,0.95,1.0],"call":["reset"]}]}"#
            );
        }

        #[test]
        fn test_from_json() {
            let frames = Frames::from_json(
                r#"{
                    "colorMap": [{"time": 2000, "to": {"colorMapAlpha": 0.1}},
                                 {"time": 6000, "to": {"colorMapAlpha": 1}, "ease": [0, 0, 0, 1]}],
                    "baseColor": [{"time": 60, "to": [1, 1, 1, 0.5], "ease": "quadOut"}]
                }"#,
            )
            .unwrap();

            assert_eq!(
                frames.iter().map(|(name, _)| name).collect::<Vec<_>>(),
                vec!["colorMap", "baseColor"]
            );
            let color_map = frames.get("colorMap").unwrap();
            assert_eq!(color_map[0].ease, Ease::LINEAR);
            assert_eq!(color_map[1].ease, Ease::Bezier([0.0, 0.0, 0.0, 1.0]));
            let base_color = frames.get("baseColor").unwrap();
            assert_eq!(base_color[0].to, Some(State::from([1.0, 1.0, 1.0, 0.5])));
            assert_eq!(base_color[0].ease, Ease::Named(Easing::QuadOut));
        }

        #[test]
        fn test_from_json_errors() {
            let missing_time = Frames::from_json(r#"{"a": [{"to": {"x": 1}}]}"#);
            assert!(matches!(missing_time, Err(Error::Serialization { .. })));
            let null_value = Frames::from_json(r#"{"a": [{"time": 0, "to": {"x": null}}]}"#);
            assert!(null_value.is_err());
            assert!(Frames::from_json("[]").is_err());
        }
    }
}
