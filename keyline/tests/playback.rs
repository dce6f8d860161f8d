use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use keyline::animations::{Keyframe, LiveState, Player, Track};
use keyline::host::Stage;
use keyline::timing::Clock;
use keyline::utils::{Call, State};

fn x(value: f64) -> State {
    State::from_iter([("x", value)])
}

fn counter() -> (Call, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let clone = count.clone();
    let call = Call::new(move || {
        clone.fetch_add(1, Ordering::SeqCst);
    });
    (call, count)
}

fn assert_strictly_increasing(track: &Track) {
    let times: Vec<f64> = track.get_keyframes().iter().map(|k| k.get_time()).collect();
    assert!(
        times.windows(2).all(|pair| pair[0] < pair[1]),
        "keyframe times are not strictly increasing: {:?}",
        times
    );
}

#[test]
fn test_edits_keep_times_strictly_increasing() {
    let target = LiveState::new(x(0.0));
    let mut track = Track::new(target.clone());

    for time in [500.0, 100.0, 300.0, 100.0, 900.0, 300.0] {
        track.to(Keyframe::new(time).with_to(x(time))).unwrap();
        assert_strictly_increasing(&track);
    }
    for (duration, time) in [(200.0, 700.0), (0.0, 300.0), (600.0, 1000.0)] {
        track
            .over(duration, Keyframe::new(time).with_to(x(1.0)))
            .unwrap();
        assert_strictly_increasing(&track);
    }
    for (played, time) in [(150.0, 650.0), (800.0, 800.0), (0.0, 2000.0), (1200.0, 1100.0)] {
        track.evaluate(played);
        target.set("x", 42.0);
        track
            .smooth_to(Keyframe::new(time).with_to(x(2.0)))
            .unwrap();
        assert_strictly_increasing(&track);
    }
    // Rejected edits leave the track untouched.
    let before = track.get_keyframes().to_vec();
    assert!(track.to(Keyframe::new(f64::NAN).with_to(x(0.0))).is_err());
    assert!(track.to(Keyframe::new(50.0).with_to(State::from(true))).is_err());
    assert!(track
        .smooth_to(Keyframe::new(5000.0).with_to(State::from_iter([("x", "text")])))
        .is_err());
    assert_eq!(track.get_keyframes(), before.as_slice());
}

#[test]
fn test_play_is_idempotent() {
    let target = LiveState::new(x(0.0));
    let (call, count) = counter();
    let mut player = Player::new().with_track("main", target.clone());
    player
        .track_mut("main")
        .unwrap()
        .to(Keyframe::new(0.0).with_to(x(0.0)))
        .unwrap()
        .to(Keyframe::new(100.0).with_to(x(4.0)).with_call(call))
        .unwrap()
        .to(Keyframe::new(200.0).with_to(x(8.0)))
        .unwrap();

    assert_eq!(player.play(150.0).len(), 1);
    let state = target.get("x");
    assert!(player.play(150.0).is_empty());
    assert_eq!(target.get("x"), state);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_evaluation_clamps_at_boundaries() {
    let a = State::from_iter([
        ("x", State::from(0.0)),
        ("color", State::from([0.0, 0.5, 1.0])),
    ]);
    let b = State::from_iter([
        ("x", State::from(10.0)),
        ("color", State::from([1.0, 1.0, 0.0])),
    ]);
    let target = LiveState::new(a.clone());
    let mut track = Track::new(target.clone());
    track
        .to(Keyframe::new(100.0).with_to(a.clone()))
        .unwrap()
        .to(Keyframe::new(500.0).with_to(b.clone()))
        .unwrap();

    assert_eq!(track.evaluate(0.0).patch, Some(a.clone()));
    assert_eq!(track.evaluate(1000.0).patch, Some(b.clone()));

    let middle = track.evaluate(300.0).patch.unwrap();
    let speed = middle.get("x").unwrap().as_float();
    assert!(0.0 < speed && speed < 10.0);
    let color = middle.get("color").unwrap().as_tuple().to_vec();
    let (from, to) = (a.get("color").unwrap().as_tuple(), b.get("color").unwrap().as_tuple());
    for ((value, from), to) in color.iter().zip(from).zip(to) {
        assert!(value > &from.min(*to) && value < &from.max(*to));
    }
    assert_eq!(target.get("x"), Some(State::from(speed)));
}

#[test]
fn test_linear_bezier_midpoint() {
    let target = LiveState::new(x(0.0));
    let mut track = Track::new(target.clone());
    track
        .to(Keyframe::new(0.0).with_to(x(0.0)))
        .unwrap()
        .to(Keyframe::new(1000.0)
            .with_to(x(10.0))
            .set_ease([0.0, 0.0, 1.0, 1.0]))
        .unwrap();

    track.evaluate(500.0);
    let value = target.get("x").unwrap().as_float();
    assert!((value - 5.0).abs() < 1e-9);
}

#[test]
fn test_calls_fire_on_forward_crossings() {
    let (call, count) = counter();
    let mut player = Player::new().with_track("calls", LiveState::default());
    player
        .track_mut("calls")
        .unwrap()
        .to(Keyframe::new(200.0).with_call(call))
        .unwrap();

    player.play(100.0);
    player.play(300.0);
    assert_eq!(count.load(Ordering::SeqCst), 1);
    player.play(300.0);
    assert_eq!(count.load(Ordering::SeqCst), 1);
    player.play(100.0);
    assert_eq!(count.load(Ordering::SeqCst), 1);
    player.play(300.0);
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn test_shared_call_fires_once_in_track_order() {
    let order = Arc::new(support::CallLog::default());
    let (first, second) = (order.call("first"), order.call("second"));
    let mut player = Player::new()
        .with_track("a", LiveState::default())
        .with_track("b", LiveState::default());
    player
        .track_mut("a")
        .unwrap()
        .to(Keyframe::new(20.0).with_call(second.clone()))
        .unwrap();
    player
        .track_mut("b")
        .unwrap()
        .to(Keyframe::new(10.0).with_call(first.clone()).with_call(second))
        .unwrap();

    player.play(0.0);
    let fired = player.play(50.0);
    assert_eq!(fired.len(), 2);
    assert_eq!(order.entries(), vec!["second", "first"]);
}

#[test]
fn test_splice_then_evaluate() {
    let target = LiveState::new(x(0.0));
    let mut track = Track::new(target.clone());
    for time in [100.0, 200.0, 300.0] {
        track.to(Keyframe::new(time).with_to(x(time))).unwrap();
    }

    let removed = track.splice_at(200.0);
    assert_eq!(removed.len(), 2);
    assert_eq!(track.len(), 1);
    assert_eq!(track.get_keyframes()[0].get_time(), 100.0);
    assert_eq!(track.evaluate(250.0).patch, Some(x(100.0)));

    // Splicing before the first keyframe does nothing.
    assert!(track.splice_at(50.0).is_empty());
    assert_eq!(track.len(), 1);
}

#[test]
fn test_smooth_to_continuity() {
    let target = LiveState::new(x(0.0));
    let mut track = Track::new(target.clone());
    target.set("x", 2.0);
    track.evaluate(0.0);
    track.smooth_to(Keyframe::new(1000.0).with_to(x(5.0))).unwrap();

    track.evaluate(0.0);
    assert_eq!(target.get("x"), Some(State::from(2.0)));
    track.evaluate(1000.0);
    assert_eq!(target.get("x"), Some(State::from(5.0)));
    for time in [250.0, 500.0, 750.0] {
        track.evaluate(time);
        let value = target.get("x").unwrap().as_float();
        assert!(2.0 < value && value < 5.0);
    }
}

#[test]
fn test_smooth_to_supersedes_scheduled_keyframes() {
    let target = LiveState::new(x(0.0));
    let mut track = Track::new(target.clone());
    for time in [0.0, 400.0, 800.0, 1200.0] {
        track.to(Keyframe::new(time).with_to(x(time))).unwrap();
    }

    track.evaluate(200.0);
    track.smooth_to(Keyframe::new(1000.0).with_to(x(-1.0))).unwrap();
    let times: Vec<f64> = track.get_keyframes().iter().map(|k| k.get_time()).collect();
    assert_eq!(times, vec![0.0, 200.0, 1000.0, 1200.0]);
}

#[test]
fn test_stage_records_over_media_time() {
    let tendrils = LiveState::new(State::from_iter([("speed", 0.0), ("scale", 1.0)]));
    let player = Player::new().with_track("tendrils", tendrils.clone());
    let mut stage = Stage::new(Clock::slaved(), player);
    stage.record_ease = [0.0, 0.0, 1.0, 1.0].into();

    stage.frame(0.0);
    stage.record("tendrils", None, vec![]).unwrap();
    stage.frame(1000.0);
    tendrils.set("speed", 1.0);
    stage
        .record("tendrils", Some(State::from_iter([("speed", 1.0)])), vec![])
        .unwrap();

    stage.frame(500.0);
    assert_eq!(tendrils.get("speed"), Some(State::from(0.5)));
    assert_eq!(tendrils.get("scale"), Some(State::from(1.0)));
    assert_eq!(stage.player.end(), 1000.0);

    assert_eq!(stage.undo(Some(1000.0)), 1);
    assert_eq!(stage.player.end(), 0.0);
}

mod support {
    use std::sync::Mutex;

    use keyline::utils::Call;

    /// Records call invocations in order.
    #[derive(Default)]
    pub struct CallLog(Mutex<Vec<&'static str>>);

    impl CallLog {
        pub fn call(self: &std::sync::Arc<Self>, name: &'static str) -> Call {
            let log = self.clone();
            Call::new(move || {
                if let Ok(mut entries) = log.0.lock() {
                    entries.push(name);
                }
            })
        }

        pub fn entries(&self) -> Vec<&'static str> {
            self.0.lock().map(|e| e.clone()).unwrap_or_default()
        }
    }
}
