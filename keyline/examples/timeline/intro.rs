use keyline::animations::{Easing, FrameOptions, Keyframe, LiveState, Player, Target};
use keyline::errors::Error;
use keyline::timing::Clock;
use keyline::utils::{CallRegistry, State};

fn main() -> Result<(), Error> {
    // The live parameters consumed by the (imaginary) renderer.
    let tendrils = LiveState::new(State::from_iter([
        ("speed", 0.2),
        ("noise", 0.5),
        ("width", 1.0),
    ]));
    let base_color = LiveState::new(State::from_iter([("rgba", [0.0, 0.0, 0.0, 1.0])]));

    // Host-side callbacks referenced by the timeline.
    let registry = CallRegistry::default();
    registry.register("restart", || println!("  -> restart the simulation"));
    registry.register("spawn", || println!("  -> spawn new particles"));

    let mut player = Player::new()
        .with_track("tendrils", tendrils.clone())
        .with_track("baseColor", base_color.clone())
        .with_track("calls", LiveState::default());

    // Seed every track from a lookup table of start values.
    player.apply(|track, name| match name {
        "tendrils" => Some(track.get_target().get_state()),
        "baseColor" => Some(State::from_iter([("rgba", [0.1, 0.0, 0.2, 1.0])])),
        _ => None,
    })?;

    // Ramps ending at the given time: they start from whatever is live when declared.
    if let Some(track) = player.track_mut("tendrils") {
        track
            .over(
                2000.0,
                Keyframe::new(3000.0)
                    .with_to(State::from_iter([("speed", 0.8), ("noise", 0.1)]))
                    .set_ease(Easing::SineInOut),
            )?
            .to(Keyframe::new(5000.0)
                .with_to(State::from_iter([("width", 3.0)]))
                .set_ease([0.0, 0.0, 0.0, 1.0]))?;
    }
    if let Some(track) = player.track_mut("baseColor") {
        track.to(
            Keyframe::new(4000.0)
                .with_to(State::from_iter([("rgba", [1.0, 0.6, 0.2, 1.0])]))
                .set_ease(vec![0.0, 0.95, 1.0]),
        )?;
    }
    if let Some(track) = player.track_mut("calls") {
        for (time, id) in [(1000.0, "spawn"), (4500.0, "restart")] {
            if let Some(call) = registry.get(id) {
                track.to(Keyframe::new(time).with_call(call))?;
            }
        }
    }
    println!("{}", player);

    // Render loop: a fixed 500ms step, looping over the whole timeline.
    let mut clock = Clock::autonomous();
    clock.step = Some(500.0);
    clock.end = Some(player.end() + 500.0);
    clock.looping = true;
    for _ in 0..14 {
        let fired = player.play(clock.time);
        println!(
            "{:>5}ms | tendrils {} | color {} | {} call(s)",
            clock.time,
            tendrils.get_state(),
            base_color.get_state(),
            fired.len()
        );
        clock.tick(0.0);
    }

    // Export the timeline: calls are referenced by their registered identifier.
    let frames = player.frames(&FrameOptions::with_calls(&registry));
    println!("{}", frames.to_json_pretty()?);

    Ok(())
}
