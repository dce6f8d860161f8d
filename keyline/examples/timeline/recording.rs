use std::thread;
use std::time::Duration;

use keyline::animations::{LiveState, Player};
use keyline::errors::Error;
use keyline::host::Stage;
use keyline::timing::Clock;
use keyline::utils::{CallRegistry, State};

fn main() -> Result<(), Error> {
    // The parameters a user tweaks live while the media plays.
    let tendrils = LiveState::new(State::from_iter([("speed", 0.2), ("noise", 0.5)]));

    let registry = CallRegistry::default();
    let reset = registry.register("reset", || println!("  -> reset the flow field"));

    let player = Player::new()
        .with_track("tendrils", tendrils.clone())
        .with_track("calls", LiveState::default());

    // The timeline follows the media playback position.
    let mut stage = Stage::new(Clock::slaved(), player);
    stage.clock.step = Some(10.0);

    // A fake media element advancing by ~16ms per rendered frame.
    let mut media_position = 0.0;
    for frame in 0..240 {
        media_position += 16.6;
        let report = stage.frame(media_position);

        match frame {
            // Snapshot the starting values.
            0 => {
                stage.record("tendrils", None, vec![])?;
            }
            // The user drags the speed slider and hits the keyframe shortcut.
            60 => {
                tendrils.set("speed", 0.9);
                stage.record("tendrils", Some(State::from_iter([("speed", 0.9)])), vec![])?;
            }
            // Another gesture also resets the simulation when replayed.
            120 => {
                tendrils.set("noise", 0.05);
                stage.record("tendrils", None, vec![])?;
                stage.record("calls", None, vec![reset.clone()])?;
            }
            // Oops: undo the last gesture.
            150 => {
                let removed = stage.undo(Some(report.time - 500.0));
                println!("Undo removed {} keyframe(s)", removed);
            }
            _ => {}
        }
        if frame % 30 == 0 {
            println!("{:>7.1}ms | {}", report.time, tendrils.get("speed").unwrap_or_default());
        }
        thread::sleep(Duration::from_millis(1));
    }
    println!("{}", stage.player);

    // The user seeks the media back to the start: replay what was recorded.
    stage.seek(0.0)?;
    for position in [0.0, 500.0, 1000.0, 1500.0, 2000.0] {
        let report = stage.frame(position);
        println!(
            "replay {:>6}ms | speed {} | {} call(s)",
            report.time,
            tendrils.get("speed").unwrap_or_default(),
            report.fired
        );
    }

    Ok(())
}
