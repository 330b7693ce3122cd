//! Vehicle kinematics tests

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smart_signal::simulation::{
    AdvanceResult, Category, Phase, SimVehicle, VehicleId, EXIT_BOUNDARY, PRIORITY_BOOST,
    RESPAWN_RANGE, SPAWN_RANGE, STOP_LINE,
};

fn vehicle(category: Category, speed: f32, position: f32) -> SimVehicle {
    SimVehicle::new(VehicleId(0), 0, category, speed, position)
}

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn test_green_moves_at_base_speed() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut car = vehicle(Category::Normal, 8.0, 100.0);

    assert_eq!(car.advance(Phase::Green, false, &mut rng), AdvanceResult::Continue);
    assert!(approx_eq(car.position, 108.0));
    assert_eq!(car.waiting_ticks, 0);
}

#[test]
fn test_yellow_slows_vehicle() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut car = vehicle(Category::Normal, 8.0, 100.0);

    car.advance(Phase::Yellow, false, &mut rng);
    assert!(approx_eq(car.position, 105.6), "position was {}", car.position);
}

#[test]
fn test_red_holds_vehicle_before_stop_line() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut car = vehicle(Category::Truck, 5.0, STOP_LINE - 10.0);

    for expected_wait in 1..=5 {
        car.advance(Phase::Red, false, &mut rng);
        assert!(approx_eq(car.position, STOP_LINE - 10.0));
        assert_eq!(car.waiting_ticks, expected_wait);
    }
}

#[test]
fn test_red_lets_vehicle_past_stop_line_creep() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut car = vehicle(Category::Normal, 10.0, STOP_LINE + 1.0);

    car.advance(Phase::Red, false, &mut rng);
    assert!(approx_eq(car.position, STOP_LINE + 4.0));
    assert_eq!(car.waiting_ticks, 1);
}

#[test]
fn test_priority_vehicle_ignores_red_while_window_open() {
    let mut rng = StdRng::seed_from_u64(1);
    for category in [Category::Emergency, Category::Police, Category::Fire] {
        let mut car = vehicle(category, 15.0, -40.0);
        car.advance(Phase::Red, true, &mut rng);
        assert!(approx_eq(car.position, -40.0 + 15.0 + PRIORITY_BOOST));
        assert_eq!(car.waiting_ticks, 0);
    }
}

#[test]
fn test_priority_vehicle_stops_without_window() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut ambulance = vehicle(Category::Emergency, 15.0, -40.0);

    ambulance.advance(Phase::Red, false, &mut rng);
    assert!(approx_eq(ambulance.position, -40.0));
    assert_eq!(ambulance.waiting_ticks, 1);
}

#[test]
fn test_normal_vehicle_does_not_use_priority_window() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut bus = vehicle(Category::Bus, 5.0, 0.0);

    bus.advance(Phase::Red, true, &mut rng);
    assert!(approx_eq(bus.position, 0.0));
    assert_eq!(bus.waiting_ticks, 1);
}

#[test]
fn test_exit_respawns_upstream_once() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut car = vehicle(Category::Normal, 8.0, EXIT_BOUNDARY - 4.0);
    car.waiting_ticks = 12;

    assert_eq!(car.advance(Phase::Green, false, &mut rng), AdvanceResult::Exited);
    assert!(car.has_exited);
    assert_eq!(car.waiting_ticks, 0);
    assert!(RESPAWN_RANGE.contains(&(car.position as i32)));

    car.position = EXIT_BOUNDARY - 1.0;
    assert_eq!(car.advance(Phase::Green, false, &mut rng), AdvanceResult::Respawned);
    assert!(car.has_exited);
}

#[test]
fn test_pass_line_marks_vehicle_once() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut car = vehicle(Category::Normal, 8.0, 795.0);

    assert!(!car.cross_pass_line());
    car.advance(Phase::Green, false, &mut rng);
    assert!(car.cross_pass_line());
    assert!(!car.cross_pass_line());

    // Already counted, so the exit that follows is only a respawn
    car.position = EXIT_BOUNDARY - 1.0;
    assert_eq!(car.advance(Phase::Green, false, &mut rng), AdvanceResult::Respawned);
}

#[test]
fn test_spawn_places_vehicle_upstream() {
    let mut rng = StdRng::seed_from_u64(9);
    for i in 0..50 {
        let car = SimVehicle::spawn(VehicleId(i), i % 4, Category::Normal, 8.0, &mut rng);
        assert!(SPAWN_RANGE.contains(&(car.position as i32)));
        assert!(car.position < STOP_LINE);
        assert!(!car.has_exited);
    }
}

#[test]
fn test_waiting_ticks_only_reset_on_respawn() {
    let mut rng = StdRng::seed_from_u64(42);
    let phases = [Phase::Red, Phase::Green, Phase::Yellow];

    for category in [Category::Normal, Category::Emergency, Category::Truck] {
        let mut car = vehicle(category, 8.0, -30.0);
        for _ in 0..2000 {
            let before = car.waiting_ticks;
            let phase = phases[rng.random_range(0..phases.len())];
            let priority_active = rng.random_bool(0.3);
            let result = car.advance(phase, priority_active, &mut rng);
            match result {
                AdvanceResult::Continue => assert!(car.waiting_ticks >= before),
                AdvanceResult::Exited | AdvanceResult::Respawned => {
                    assert_eq!(car.waiting_ticks, 0)
                }
            }
        }
    }
}

#[test]
fn test_priority_vehicle_always_advances_under_window() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut car = vehicle(Category::Fire, 15.0, -100.0);

    for i in 0..500 {
        let phase = [Phase::Red, Phase::Green, Phase::Yellow][i % 3];
        let before = car.position;
        if car.advance(phase, true, &mut rng) == AdvanceResult::Continue {
            assert!(car.position > before);
        }
    }
}
