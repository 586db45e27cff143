use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{select, tick, unbounded};
use rand::Rng;

use controller::debug::Monitor;
use controller::dispatcher::Dispatcher;
use controller::elevator::Elevator;
use controller::sim;
use controller::strategy::Strategy;
use shared_resources::config::SimulationConfig;

fn main() -> std::io::Result<()> {
    // READ CONFIGURATION
    let config = SimulationConfig::get();
    let strategy = Strategy::from_name(&config.strategy);

    println!("============================================================");
    println!("ELEVATOR DISPATCH SIMULATOR");
    println!(
        "floors: {}, elevators: {}, strategy: {}, duration: {} s",
        config.building.num_floors,
        config.building.num_elevators,
        strategy.as_str(),
        config.duration_secs
    );
    println!("============================================================");

    // INITIALIZE ELEVATOR UNITS
    let mut rng = rand::rng();
    let mut elevators = Vec::new();
    for i in 0..config.building.num_elevators {
        let start_floor = rng.random_range(1..=config.building.num_floors);
        let capacity = 8 + rng.random_range(0..9);
        let name = format!("Lift-{}", i + 1);
        elevators.push(Arc::new(Elevator::new(
            i + 1,
            &name,
            start_floor,
            config.building.num_floors,
            capacity,
            config.timing.clone(),
        )));
    }

    // INITIALIZE ONE THREAD PER UNIT
    let mut unit_threads = Vec::new();
    for elevator in &elevators {
        let unit = Arc::clone(elevator);
        let handle = thread::Builder::new()
            .name(String::from(unit.name()))
            .spawn(move || unit.run())?;
        unit_threads.push(handle);
    }

    // INITIALIZE DISPATCHER
    let dispatcher = Arc::new(Dispatcher::new(
        elevators.clone(),
        config.building.num_floors,
        strategy,
    ));
    dispatcher.start();

    // INITIALIZE THREAD FOR THE REQUEST GENERATOR
    let (generator_stop_tx, generator_stop_rx) = unbounded::<bool>();
    let (generator_done_tx, generator_done_rx) = unbounded::<bool>();
    {
        let dispatcher = Arc::clone(&dispatcher);
        let num_floors = config.building.num_floors;
        let duration = Duration::from_secs(config.duration_secs);
        thread::Builder::new()
            .name(String::from("generator"))
            .spawn(move || {
                sim::main(dispatcher, num_floors, duration, generator_stop_rx);
                generator_done_tx.send(true).unwrap();
            })?;
    }

    // LIVE STATUS UNTIL THE GENERATOR FINISHES
    let mut monitor = Monitor::new();
    let ticker = tick(Duration::from_secs(1));
    loop {
        select! {
            recv(ticker) -> _ => {
                monitor.print_status(&dispatcher.statistics())?;
            },
            recv(generator_done_rx) -> _ => break,
        }
    }
    drop(generator_stop_tx);

    // SHUT DOWN: drain the dispatcher, then stop and join the units
    dispatcher.stop();
    for elevator in &elevators {
        elevator.stop();
    }
    for handle in unit_threads {
        let _ = handle.join();
    }

    print_final_report(&dispatcher);
    Ok(())
}

fn print_final_report(dispatcher: &Dispatcher) {
    let statistics = dispatcher.statistics();

    println!("\n============================================================");
    println!("SIMULATION FINISHED");
    println!("============================================================");
    println!("total requests:     {}", statistics.total_requests);
    println!("processed requests: {}", statistics.processed_requests);
    println!("rejected requests:  {}", statistics.rejected_requests);
    println!("pending requests:   {}", statistics.pending_requests);
    if let Some(average) = statistics.average_processing_time_ms {
        println!("average dispatch latency: {average:.2} ms");
    }

    println!("\nPER-UNIT STATISTICS:");
    for elevator in &statistics.elevators {
        println!("\n{} (id {}):", elevator.name, elevator.id);
        println!(
            "  floor: {}, status: {}, passengers: {}",
            elevator.current_floor, elevator.status, elevator.passengers
        );
        println!("  total transported: {}", elevator.statistics.total_passengers);
        println!(
            "  floors traveled:   {}",
            elevator.statistics.total_traveled_floors
        );
        println!(
            "  idle time:         {} s",
            elevator.statistics.idle_time_seconds
        );
        println!(
            "  efficiency:        {:.2} floors/passenger",
            elevator.statistics.efficiency
        );
    }

    println!("\nstatistics snapshot:");
    println!("{}", serde_json::to_string_pretty(&statistics).unwrap());
}
