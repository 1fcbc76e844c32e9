//! Survivor integration tests: cross-attribute coupling and movement

use survival_core::core::config::SurvivalConfig;
use survival_core::core::types::{GaitMode, MovementState, ParameterKind};
use survival_core::simulation::{run_frame, SimulationEvent, Survivor};
use survival_core::stats::{ParameterEvent, StatLookup};
use survival_core::time::{minutes, Process, TimeContext};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

fn survivor() -> Survivor {
    Survivor::from_config(&SurvivalConfig::default()).unwrap()
}

/// One permanent modifier on Capacity plus one each on Stamina, Food and Water
const BASELINE_MODIFIERS: usize = 4;

#[test]
fn test_initial_registration() {
    let survivor = survivor();
    assert_eq!(survivor.vitals.modifier_count(), BASELINE_MODIFIERS);
    assert_eq!(survivor.controller.speed_mediator.len(), 2);
    assert!(survivor.is_alive());
    assert!(survivor.health_drained_by().is_empty());
}

#[test]
fn test_empty_food_drains_health_until_restored() {
    let mut survivor = survivor();
    let base_rate = survivor.vitals.change_rate(ParameterKind::Health).unwrap();

    let events = survivor.restore(ParameterKind::Food, -100.0).unwrap();
    assert!(events.contains(&ParameterEvent::ReachedZero(ParameterKind::Food)));
    assert_eq!(survivor.health_drained_by(), vec![ParameterKind::Food]);
    assert_eq!(survivor.vitals.modifier_count(), BASELINE_MODIFIERS + 1);
    assert!(approx(
        survivor.vitals.change_rate(ParameterKind::Health).unwrap(),
        base_rate - 3.0
    ));

    let events = survivor.restore(ParameterKind::Food, 10.0).unwrap();
    assert!(events.contains(&ParameterEvent::RecoveredFromZero(ParameterKind::Food)));
    assert!(survivor.health_drained_by().is_empty());
    assert_eq!(survivor.vitals.modifier_count(), BASELINE_MODIFIERS);
    assert!(approx(
        survivor.vitals.change_rate(ParameterKind::Health).unwrap(),
        base_rate
    ));
}

#[test]
fn test_damage_stacks_per_parameter() {
    let mut survivor = survivor();
    survivor.restore(ParameterKind::Food, -100.0).unwrap();
    survivor.restore(ParameterKind::Water, -100.0).unwrap();
    // A second drop while already empty adds nothing
    survivor.restore(ParameterKind::Water, -1.0).unwrap();

    assert_eq!(
        survivor.health_drained_by(),
        vec![ParameterKind::Food, ParameterKind::Water]
    );
    assert!(approx(
        survivor.vitals.change_rate(ParameterKind::Health).unwrap(),
        1.0 - 3.0 - 5.0
    ));
}

#[test]
fn test_already_empty_parameter_drains_from_start() {
    let mut config = SurvivalConfig::default();
    for parameter in config.parameters.0.iter_mut() {
        if parameter.kind == ParameterKind::Energy {
            parameter.current = 0.0;
        }
    }
    let survivor = Survivor::from_config(&config).unwrap();

    assert_eq!(survivor.health_drained_by(), vec![ParameterKind::Energy]);
    assert!(approx(
        survivor.vitals.change_rate(ParameterKind::Health).unwrap(),
        1.0 - 2.0
    ));
    // Empty Energy takes the full capacity reduction
    assert!(approx(survivor.vitals.max(ParameterKind::Capacity), 25.0));
}

#[test]
fn test_low_energy_shrinks_capacity() {
    let mut survivor = survivor();
    assert!(approx(survivor.vitals.max(ParameterKind::Capacity), 40.0));

    survivor.restore(ParameterKind::Energy, -50.0).unwrap();
    assert!(approx(survivor.vitals.max(ParameterKind::Capacity), 40.0));

    survivor.restore(ParameterKind::Energy, -25.0).unwrap();
    assert!(approx(survivor.vitals.max(ParameterKind::Capacity), 32.5));
}

#[test]
fn test_load_slows_recovery_and_speeds_drain() {
    let mut survivor = survivor();
    assert!(approx(survivor.vitals.change_rate(ParameterKind::Stamina).unwrap(), 30.0));
    assert!(approx(survivor.vitals.change_rate(ParameterKind::Food).unwrap(), -5.0));

    // Halfway between the critical (30) and ultimate (40) boundaries
    survivor.pick_up(35.0).unwrap();
    assert!(approx(survivor.vitals.change_rate(ParameterKind::Stamina).unwrap(), 15.0));
    assert!(approx(survivor.vitals.change_rate(ParameterKind::Food).unwrap(), -7.5));
    assert!(approx(survivor.vitals.change_rate(ParameterKind::Water).unwrap(), -12.0));

    survivor.pick_up(10.0).unwrap();
    assert!(approx(survivor.vitals.change_rate(ParameterKind::Stamina).unwrap(), 0.0));
    assert!(approx(survivor.vitals.change_rate(ParameterKind::Food).unwrap(), -10.0));

    survivor.put_down(45.0).unwrap();
    assert!(approx(survivor.vitals.change_rate(ParameterKind::Water).unwrap(), -8.0));
}

#[test]
fn test_heavy_load_gates_movement() {
    let mut survivor = survivor();
    survivor.set_gait(GaitMode::Run).unwrap();
    survivor.start_moving().unwrap();
    assert_eq!(survivor.controller.state(), MovementState::Running);
    assert!(approx(survivor.speed(), 5.0));

    // Ultimate: running is refused, walking is slowed to the overloaded floor
    survivor.pick_up(45.0).unwrap();
    assert!(!survivor.controller.can_run());
    assert!(!survivor.controller.can_jump());
    assert_eq!(survivor.controller.gait(), GaitMode::Walk);
    assert_eq!(survivor.controller.state(), MovementState::Walking);
    assert!(approx(survivor.speed(), 1.0));
    assert!(!survivor.jump().unwrap());

    // Overload: no movement at all
    survivor.pick_up(10.0).unwrap();
    assert!(!survivor.controller.can_walk());
    assert_eq!(survivor.controller.state(), MovementState::Idle);
    assert_eq!(survivor.speed(), 0.0);

    survivor.put_down(55.0).unwrap();
    assert!(survivor.controller.can_run());
    survivor.set_gait(GaitMode::Run).unwrap();
    survivor.start_moving().unwrap();
    assert_eq!(survivor.controller.state(), MovementState::Running);
}

#[test]
fn test_overloaded_run_matches_overloaded_walk() {
    let mut survivor = survivor();
    survivor.pick_up(40.0).unwrap();
    let walk = survivor
        .controller
        .speed_for(GaitMode::Walk, &survivor.vitals);
    let run = survivor
        .controller
        .speed_for(GaitMode::Run, &survivor.vitals);
    assert!(approx(walk, 1.0));
    assert!(approx(run, walk));
}

#[test]
fn test_jump_costs_stamina() {
    let mut survivor = survivor();
    assert!(survivor.jump().unwrap());
    assert!(approx(survivor.vitals.current(ParameterKind::Stamina), 90.0));
}

#[test]
fn test_jump_drains_at_jumping_rate_then_lands() {
    let mut survivor = survivor();
    survivor.start_moving().unwrap();
    assert!(survivor.jump().unwrap());
    assert_eq!(survivor.controller.state(), MovementState::Jumping);
    assert!(approx(survivor.vitals.change_rate(ParameterKind::Stamina).unwrap(), -25.0));

    // The jump lasts one update: 90 - 25 * 0.1
    survivor.update(0.1).unwrap();
    assert!(approx(survivor.vitals.current(ParameterKind::Stamina), 87.5));
    assert_eq!(survivor.controller.state(), MovementState::Walking);
    assert!(approx(survivor.vitals.change_rate(ParameterKind::Stamina).unwrap(), 10.0));
}

#[test]
fn test_energy_loss_regates_movement_under_carried_load() {
    let mut survivor = survivor();
    survivor.pick_up(35.0).unwrap();
    survivor.start_moving().unwrap();
    assert!(survivor.controller.can_walk());

    // Max Capacity falls to 25, so 35 is past the overload boundary (31.25)
    survivor.restore(ParameterKind::Energy, -100.0).unwrap();
    assert!(approx(survivor.vitals.max(ParameterKind::Capacity), 25.0));
    assert!(!survivor.controller.can_walk());
    assert!(!survivor.controller.can_run());
    assert_eq!(survivor.controller.state(), MovementState::Idle);
    assert_eq!(survivor.speed(), 0.0);

    survivor.restore(ParameterKind::Energy, 100.0).unwrap();
    assert!(survivor.controller.can_walk());
    assert!(survivor.controller.can_run());
}

#[test]
fn test_carried_load_reports_no_zero_crossings() {
    let mut survivor = survivor();
    let events = survivor.pick_up(5.0).unwrap();
    assert_eq!(events, vec![ParameterEvent::LoadChanged { carried: 5.0 }]);

    let events = survivor.put_down(5.0).unwrap();
    assert_eq!(events, vec![ParameterEvent::LoadChanged { carried: 0.0 }]);
}

#[test]
fn test_exhaustion_blocks_running_and_jumping() {
    let mut survivor = survivor();
    survivor.set_gait(GaitMode::Run).unwrap();
    survivor.start_moving().unwrap();

    let events = survivor.restore(ParameterKind::Stamina, -100.0).unwrap();
    assert!(events.contains(&ParameterEvent::ReachedZero(ParameterKind::Stamina)));
    assert!(!survivor.controller.can_run());
    assert!(!survivor.jump().unwrap());
    assert_eq!(survivor.controller.state(), MovementState::Walking);

    survivor.restore(ParameterKind::Stamina, 5.0).unwrap();
    assert!(survivor.controller.can_run());
    assert!(survivor.controller.can_jump());
}

#[test]
fn test_movement_state_drives_stamina_rate() {
    let mut survivor = survivor();
    survivor.start_moving().unwrap();
    assert!(approx(survivor.vitals.change_rate(ParameterKind::Stamina).unwrap(), 10.0));

    survivor.set_gait(GaitMode::Run).unwrap();
    assert!(approx(survivor.vitals.change_rate(ParameterKind::Stamina).unwrap(), -25.0));

    survivor.stop().unwrap();
    assert!(approx(survivor.vitals.change_rate(ParameterKind::Stamina).unwrap(), 30.0));
}

#[test]
fn test_update_reports_zero_crossings() {
    let mut survivor = survivor();
    // Water drains at 8 per hour from 100
    let events = survivor.update(13.0).unwrap();

    assert!(events.contains(&ParameterEvent::ReachedZero(ParameterKind::Water)));
    assert_eq!(survivor.health_drained_by(), vec![ParameterKind::Water]);
    assert!(approx(survivor.vitals.current(ParameterKind::Food), 35.0));
    assert!(survivor.is_alive());
}

#[test]
fn test_teardown_removes_every_registration() {
    let mut survivor = survivor();
    survivor.restore(ParameterKind::Food, -100.0).unwrap();
    survivor.start_moving().unwrap();

    survivor.teardown();
    assert_eq!(survivor.vitals.modifier_count(), 0);
    assert_eq!(survivor.controller.speed_mediator.len(), 0);
    assert!(survivor.health_drained_by().is_empty());
}

#[test]
fn test_frame_advances_survivor_by_game_time() {
    let mut config = SurvivalConfig::default();
    config.time.start_minute = 0;
    let mut time = TimeContext::with_clock(&config.time);
    let mut survivor = Survivor::from_config(&config).unwrap();

    let now = time.clock().unwrap().time();
    time.add_process(Process::starting_at("meal", now, minutes(30), |_| {}))
        .unwrap();

    // Speed up so a single 6 second frame covers one game hour
    time.start_speed_up(minutes(120)).unwrap();
    let events = run_frame(&mut time, &mut survivor, 6.0).unwrap();

    assert!(events
        .iter()
        .any(|e| matches!(e, SimulationEvent::ProcessFired { .. })));
    assert_eq!(time.clock().unwrap().reading().hour, 1);
    assert!(approx(survivor.vitals.current(ParameterKind::Water), 92.0));
    assert!(approx(survivor.vitals.current(ParameterKind::Food), 95.0));
}

#[test]
fn test_death_is_reported_once() {
    let mut config = SurvivalConfig::default();
    for parameter in config.parameters.0.iter_mut() {
        match parameter.kind {
            ParameterKind::Health => parameter.current = 1.0,
            ParameterKind::Water => parameter.current = 0.0,
            _ => {}
        }
    }
    let mut time = TimeContext::with_clock(&config.time);
    let mut survivor = Survivor::from_config(&config).unwrap();

    time.start_speed_up(minutes(600)).unwrap();
    let mut deaths = 0;
    for _ in 0..10 {
        let events = run_frame(&mut time, &mut survivor, 6.0).unwrap();
        deaths += events
            .iter()
            .filter(|e| matches!(e, SimulationEvent::Died { .. }))
            .count();
    }

    assert!(!survivor.is_alive());
    assert_eq!(deaths, 1);
}
