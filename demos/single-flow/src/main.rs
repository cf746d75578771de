//! single-flow — smallest demo of the AMR fleet allocator.
//!
//! Two robots auction a three-task precedence chain across a 50 m x 30 m
//! warehouse.  The run log lands in `output/single-flow/` as CSV.
//! Set `RUST_LOG=debug` to watch the protocol traffic.

use std::path::Path;

use anyhow::Result;

use amr_auction::{AuctionDelays, IteratedAuctionInitiator, IteratedAuctionParticipant};
use amr_core::{Pose, Position, Topology};
use amr_flow::{Location, MaterialFlow, Order, Task, TransportOrder, TransportOrderStep};
use amr_model::{
    AmrAbility, AmrDescription, AmrKinematics, AmrLoadHandling, AmrPhysicalProperties,
    AmrProperties, FleetRegistry, LoadCarrier,
};
use amr_order::{StnOrderManagement, UtilityFn};
use amr_output::{AllocationRecorder, CsvWriter};
use amr_sim::AuctionHarness;

// ── Fleet configuration ───────────────────────────────────────────────────────

const WAREHOUSE_W: f64 = 50.0;
const WAREHOUSE_H: f64 = 30.0;

fn robot(serial: u32) -> AmrDescription {
    AmrDescription::new(
        serial,
        AmrKinematics::new(1.5, 0.0, 0.8, -0.8),
        AmrLoadHandling::new(3.0, 2.0, AmrAbility::new(LoadCarrier::Package, 25.0)),
        AmrProperties::standard("acme", "carrier-one"),
        AmrPhysicalProperties {
            weight_kg: 90.0,
            footprint: amr_core::Vec2::new(0.9, 0.6),
        },
    )
}

fn station(name: &str, x: f64, y: f64) -> Location {
    Location::new(name, "handover", Position::new(x, y))
}

fn transport(name: &str, from: Location, to: Location, preceding: Vec<amr_core::TaskId>) -> Task {
    let order = TransportOrder::new(
        vec![TransportOrderStep::new(format!("{name}-pickup"), from)],
        TransportOrderStep::new(format!("{name}-delivery"), to),
    );
    Task::new(
        name,
        vec![Order::Transport(order)],
        preceding,
        AmrAbility::new(LoadCarrier::Package, 10.0),
    )
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== single-flow — AMR fleet auction demo ===");

    let topology = Topology::new(WAREHOUSE_W, WAREHOUSE_H)?;
    let fleet = FleetRegistry::from_abilities([robot(0).ability()]);

    // Two robots parked at opposite corners of the hall.
    let participants: Vec<IteratedAuctionParticipant> = [(2.0, 2.0), (45.0, 25.0)]
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| {
            let description = robot(i as u32);
            let management = StnOrderManagement::new(
                description.clone(),
                topology,
                Pose::from(Position::new(x, y)),
                UtilityFn::default(),
            );
            IteratedAuctionParticipant::new(
                format!("amr-{i}"),
                description,
                &fleet,
                management,
                UtilityFn::default(),
            )
        })
        .collect();

    let initiator = IteratedAuctionInitiator::new(
        "initiator",
        fleet,
        AuctionDelays::default(),
        UtilityFn::default(),
    );

    // Inbound goods flow: dock → buffer → assembly, strictly in that order.
    let inbound = transport("inbound", station("dock", 0.0, 15.0), station("buffer", 20.0, 15.0), vec![]);
    let staging = transport(
        "staging",
        station("buffer", 20.0, 15.0),
        station("assembly", 40.0, 10.0),
        vec![inbound.id()],
    );
    let supply = transport(
        "supply",
        station("assembly", 40.0, 10.0),
        station("outbound", 48.0, 25.0),
        vec![staging.id()],
    );
    let flow = MaterialFlow::new(vec![inbound, staging, supply])?;
    println!("Material flow: {} tasks in a precedence chain", flow.len());

    // Run the auction to completion, recording traffic to CSV.
    std::fs::create_dir_all("output/single-flow")?;
    let writer = CsvWriter::new(Path::new("output/single-flow"))?;
    let mut recorder = AllocationRecorder::new(writer);

    let mut harness = AuctionHarness::new(initiator, participants)?;
    harness.submit_material_flow(flow)?;
    let finished_at = harness.run(&mut recorder)?;

    if let Some(e) = recorder.take_error() {
        eprintln!("output error: {e}");
    }

    // Allocation summary.
    println!("Allocation complete at {finished_at}");
    println!();
    println!("{:<8} {:<6} {:<12} {:<12}", "Robot", "Tasks", "Empty (s)", "Loaded (s)");
    println!("{}", "-".repeat(40));
    for i in 0..2 {
        let management = harness.participant(i).management();
        let (empty, loaded) = management.current_ordering().iter().fold(
            (0.0, 0.0),
            |(e, l), info| {
                let m = info.metrics_composition.current_metrics();
                (e + m.empty_travel_time, l + m.loaded_travel_time)
            },
        );
        println!(
            "{:<8} {:<6} {:<12.1} {:<12.1}",
            format!("amr-{i}"),
            management.queued_len(),
            empty,
            loaded,
        );
    }
    println!();
    println!("Run log: output/single-flow/{{bids,awards}}.csv");

    Ok(())
}
