//! Demo driver: simulated acquisition session with waypoint placement

use geoanchor::{
    AcquisitionStateMachine, GeoFix, SessionConfig, SimulationConfig, WaypointStore,
    LABEL_CURRENT, LABEL_DESTINATION,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let simulation = SimulationConfig::default();
    let mut config = SessionConfig::default();
    config.simulation = Some(simulation.clone());
    config.validate()?;

    let mut machine =
        AcquisitionStateMachine::with_simulation(config.acquisition.clone(), &simulation)?;

    // The store consumes every accepted fix: the first one becomes the
    // origin, the latest one the "current" waypoint
    let store = Rc::new(RefCell::new(WaypointStore::new()));
    let fix_sink = store.clone();
    machine.on_fix(Box::new(move |fix| {
        let mut store = fix_sink.borrow_mut();
        let _ = store.set_origin(fix.clone());
        if let Err(error) = store.set(LABEL_CURRENT, fix.clone()) {
            eprintln!("failed to record current waypoint: {}", error);
        }
    }));

    machine.on_state_change(Box::new(|previous, next| {
        println!("state: {} -> {}", previous, next);
    }));

    machine.start();
    for _ in 0..5 {
        machine.tick();
        thread::sleep(Duration::from_millis(200));
    }

    let current = machine.current_fix().cloned().ok_or("no fix acquired")?;
    println!("current fix: {}", current);

    // Place a destination a short walk north-east of the origin
    let destination = GeoFix::new(current.latitude + 0.001, current.longitude + 0.001);
    let mut store = store.borrow_mut();
    store.set(LABEL_DESTINATION, destination)?;

    let offset = store.offset(LABEL_DESTINATION)?;
    println!(
        "destination offset: east {:.1} m, north {:.1} m",
        offset.east_m, offset.north_m
    );

    let distance = store.distance_between(LABEL_CURRENT, LABEL_DESTINATION)?;
    println!("distance to destination: {:.1} m", distance);

    Ok(())
}
