//! Frame Transition
//!
//! The deterministic step function. Given the prior state, one input word
//! per fighter, and the disconnect mask, advances the match by exactly one
//! frame. Holds no state of its own, so a restored snapshot replays
//! identically.

use tracing::trace;

use crate::game::config::SimConfig;
use crate::game::input::{ControlSignals, DisconnectMask, FighterInput, FrameInputs};
use crate::game::state::{Fighter, GameState};
use crate::core::vec2::Velocity;

/// Advance `state` by one frame.
///
/// # Arguments
///
/// * `state` - The match state (will be mutated)
/// * `inputs` - One word per fighter; missing slots read as no buttons
/// * `disconnected` - Fighters driven by autopilot this frame
/// * `config` - Simulation constants, identical on every peer
///
/// # Determinism
///
/// Fighters are processed in slot order. Every float operation is a single
/// IEEE-754 addition, so the result is bit-identical everywhere.
pub fn advance(
    state: &mut GameState,
    inputs: &[FighterInput],
    disconnected: DisconnectMask,
    config: &SimConfig,
) {
    for (index, fighter) in state.fighters_mut().iter_mut().enumerate() {
        let signals = if disconnected.is_disconnected(index) {
            ControlSignals::autopilot(fighter.heading, config)
        } else {
            let input = inputs.get(index).copied().unwrap_or_default();
            trace!(fighter = index, inputs = input.bits(), "parsing fighter inputs");
            input.decode(fighter.heading, config)
        };

        move_fighter(fighter, &signals);

        if fighter.cooldown > 0 {
            fighter.cooldown -= 1;
        }

        // signals.fire is reserved for combat
    }

    state.frame_number = state.frame_number.wrapping_add(1);
}

/// Apply one frame of motion.
///
/// The heading is fed into the x axis and the thrust into the y axis.
/// Peers depend on this exact mapping; it is not a trigonometric thrust
/// vector.
fn move_fighter(fighter: &mut Fighter, signals: &ControlSignals) {
    fighter.heading = signals.heading;

    if signals.thrust != 0.0 {
        fighter.velocity += Velocity::new(f64::from(signals.heading), signals.thrust);
    }
    trace!(
        dx = fighter.velocity.dx,
        dy = fighter.velocity.dy,
        "new fighter velocity"
    );

    fighter.position.translate(fighter.velocity);
    trace!(
        x = fighter.position.x,
        y = fighter.position.y,
        "new fighter position"
    );
}

/// Advance once with a bundled frame of inputs.
#[inline]
pub fn advance_frame(state: &mut GameState, frame: &FrameInputs, config: &SimConfig) {
    advance(state, &frame.inputs, frame.disconnected, config);
}

/// Replay recorded frames from a starting state.
///
/// Returns the final state; the starting state is left untouched.
pub fn replay(initial: &GameState, frames: &[FrameInputs], config: &SimConfig) -> GameState {
    let mut state = initial.clone();
    for frame in frames {
        advance_frame(&mut state, frame, config);
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Position;

    fn one_fighter() -> (GameState, SimConfig) {
        let config = SimConfig::default();
        (GameState::new(1, &config).unwrap(), config)
    }

    #[test]
    fn test_rotate_and_thrust() {
        let (mut state, config) = one_fighter();
        let input = FighterInput::NONE.with(FighterInput::ROTATE_RIGHT | FighterInput::THRUST);

        advance(&mut state, &[input], DisconnectMask::NONE, &config);

        let f = &state.fighters()[0];
        assert_eq!(f.heading, 15);
        assert_eq!(f.velocity, Velocity::new(15.0, 5.0));
        assert_eq!(f.position, Position::new(115.0, 105.0));
        assert_eq!(state.frame_number, 1);
    }

    #[test]
    fn test_disconnected_uses_autopilot() {
        let (mut state, config) = one_fighter();
        let input = FighterInput::NONE.with(FighterInput::ROTATE_RIGHT | FighterInput::THRUST);

        advance(&mut state, &[input], DisconnectMask::NONE.with(0), &config);

        let f = &state.fighters()[0];
        assert_eq!(f.heading, 5);
        assert_eq!(f.velocity, Velocity::ZERO);
        assert_eq!(f.position, Position::new(100.0, 100.0));
    }

    #[test]
    fn test_velocity_never_damped() {
        let (mut state, config) = one_fighter();
        let thrust = FighterInput::NONE.with(FighterInput::THRUST);

        advance(&mut state, &[thrust], DisconnectMask::NONE, &config);
        advance(&mut state, &[FighterInput::NONE], DisconnectMask::NONE, &config);
        advance(&mut state, &[FighterInput::NONE], DisconnectMask::NONE, &config);

        let f = &state.fighters()[0];
        // Heading 0 contributes nothing to dx
        assert_eq!(f.velocity, Velocity::new(0.0, 5.0));
        assert_eq!(f.position, Position::new(100.0, 115.0));
    }

    #[test]
    fn test_brake_reverses_thrust() {
        let (mut state, config) = one_fighter();
        let brake = FighterInput::NONE.with(FighterInput::BRAKE | FighterInput::ROTATE_LEFT);

        advance(&mut state, &[brake], DisconnectMask::NONE, &config);

        let f = &state.fighters()[0];
        assert_eq!(f.heading, 345);
        assert_eq!(f.velocity, Velocity::new(345.0, -5.0));
    }

    #[test]
    fn test_cooldown_floor() {
        let (mut state, config) = one_fighter();
        if let Some(f) = state.fighter_mut(0) {
            f.cooldown = 2;
        }

        let mut seen = Vec::new();
        for _ in 0..4 {
            advance(&mut state, &[], DisconnectMask::NONE, &config);
            seen.push(state.fighters()[0].cooldown);
        }
        assert_eq!(seen, vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_negative_cooldown_untouched() {
        let (mut state, config) = one_fighter();
        if let Some(f) = state.fighter_mut(0) {
            f.cooldown = -4;
        }
        advance(&mut state, &[], DisconnectMask::NONE, &config);
        assert_eq!(state.fighters()[0].cooldown, -4);
    }

    #[test]
    fn test_out_of_range_heading_normalized() {
        let (mut state, config) = one_fighter();
        if let Some(f) = state.fighter_mut(0) {
            f.heading = 725;
        }
        advance(&mut state, &[FighterInput::NONE], DisconnectMask::NONE, &config);
        assert_eq!(state.fighters()[0].heading, 5);

        let right = FighterInput::NONE.with(FighterInput::ROTATE_RIGHT);
        advance(&mut state, &[right], DisconnectMask::NONE, &config);
        assert_eq!(state.fighters()[0].heading, 20);
    }

    #[test]
    fn test_frame_number_wraps() {
        let (mut state, config) = one_fighter();
        state.frame_number = u32::MAX;
        advance(&mut state, &[], DisconnectMask::NONE, &config);
        assert_eq!(state.frame_number, 0);
    }

    #[test]
    fn test_fighters_independent() {
        let config = SimConfig::default();
        let mut state = GameState::new(2, &config).unwrap();
        let inputs = [
            FighterInput::NONE.with(FighterInput::THRUST),
            FighterInput::NONE.with(FighterInput::ROTATE_LEFT),
        ];

        advance(&mut state, &inputs, DisconnectMask::NONE, &config);

        assert_eq!(state.fighters()[0].velocity, Velocity::new(0.0, 5.0));
        assert_eq!(state.fighters()[1].heading, 345);
        assert_eq!(state.fighters()[1].velocity, Velocity::ZERO);
    }

    #[test]
    fn test_missing_input_slot_reads_empty() {
        let config = SimConfig::default();
        let mut short = GameState::new(2, &config).unwrap();
        let mut padded = short.clone();
        let thrust = FighterInput::NONE.with(FighterInput::THRUST);

        advance(&mut short, &[thrust], DisconnectMask::NONE, &config);
        advance(&mut padded, &[thrust, FighterInput::NONE], DisconnectMask::NONE, &config);

        assert!(short.bits_eq(&padded));
        assert_eq!(short.fighters()[1].position, Position::new(100.0, 100.0));
    }

    #[test]
    fn test_replay_determinism() {
        let config = SimConfig::default();
        let initial = GameState::new(2, &config).unwrap();

        let frames: Vec<FrameInputs> = (0..200u32)
            .map(|t| {
                FrameInputs::new(
                    vec![FighterInput::from_bits(t % 32), FighterInput::from_bits((t * 7) % 32)],
                    if t % 50 < 10 { DisconnectMask::NONE.with(1) } else { DisconnectMask::NONE },
                )
            })
            .collect();

        let a = replay(&initial, &frames, &config);
        let b = replay(&initial, &frames, &config);

        assert_eq!(a.frame_number, 200);
        assert_eq!(initial.frame_number, 0);
        assert!(a.bits_eq(&b));
        assert_eq!(a.checksum(), b.checksum());
    }
}
