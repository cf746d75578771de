//! Duration estimation, phase decomposition, and metrics-by-domain.

use amr_core::{Distance, Duration, Pose, Position, Topology, Vec2, Velocity};
use amr_model::AmrDescription;

use crate::error::{MobilityError, MobilityResult};
use crate::functionality::Functionality;
use crate::status::{MobilityState, MobilityStatus};

// ── Preconditions ─────────────────────────────────────────────────────────────

fn check_supported(
    functionality: &Functionality,
    description: &AmrDescription,
) -> MobilityResult<()> {
    let kind = functionality.kind();
    if !description.properties().supports(kind) {
        return Err(MobilityError::UnsupportedFunctionality(kind));
    }
    Ok(())
}

fn check_positions_in_topology(
    functionality: &Functionality,
    topology: &Topology,
) -> MobilityResult<()> {
    let check = |p: Position| {
        if topology.contains(p) {
            Ok(())
        } else {
            Err(MobilityError::DestinationOutsideTopology(p))
        }
    };
    match functionality {
        Functionality::MoveTo { destination }
        | Functionality::Load { destination }
        | Functionality::Unload { destination } => check(*destination),
        Functionality::Navigate { waypoints } => waypoints.iter().try_for_each(|&p| check(p)),
    }
}

fn sanity_check(
    start_pose: &Pose,
    functionality: &Functionality,
    description: &AmrDescription,
    topology: &Topology,
) -> MobilityResult<()> {
    check_supported(functionality, description)?;
    if !topology.contains(start_pose.position) {
        return Err(MobilityError::StartOutsideTopology(start_pose.position));
    }
    check_positions_in_topology(functionality, topology)
}

// ── Distances ─────────────────────────────────────────────────────────────────

/// Path length of one functionality starting at `start`.
///
/// Load/Unload measure the offset between the robot and the action position
/// (zero when correctly positioned); Navigate sums its legs.
pub fn calculate_distance(start: Position, functionality: &Functionality) -> Distance {
    match functionality {
        Functionality::MoveTo { destination }
        | Functionality::Load { destination }
        | Functionality::Unload { destination } => (*destination - start).length(),
        Functionality::Navigate { waypoints } => {
            let mut total = 0.0;
            let mut last = start;
            for &waypoint in waypoints {
                total += (waypoint - last).length();
                last = waypoint;
            }
            total
        }
    }
}

/// Total path length of a functionality sequence, tracking the end position
/// of each movement.
pub fn calculate_distance_along(start: Position, functionalities: &[Functionality]) -> Distance {
    let mut total = 0.0;
    let mut last = start;
    for functionality in functionalities {
        total += calculate_distance(last, functionality);
        if let Some(end) = functionality.end_position() {
            last = end;
        }
    }
    total
}

// ── Trapezoid decomposition ───────────────────────────────────────────────────

/// Split a leg of length `distance` into `[d_acc, d_const, d_dec]`.
///
/// Below the threshold `v²/2a + v²/2|a⁻|` the profile is a triangle and the
/// leg splits in the inverse ratio of the two rates (the gentler rate gets
/// the longer share).
fn phase_distances(distance: Distance, description: &AmrDescription) -> [f64; 3] {
    let kinematics = description.kinematics();
    let max_vel = kinematics.max_velocity();
    let max_acc = kinematics.max_acceleration();
    let max_dec = kinematics.deceleration_magnitude();

    let mut d_acc = (max_vel * max_vel) / (2.0 * max_acc);
    let mut d_dec = (max_vel * max_vel) / (2.0 * max_dec);
    let threshold = d_acc + d_dec;
    let d_const;
    if distance < threshold {
        d_acc = distance * max_dec / (max_acc + max_dec);
        d_const = 0.0;
        d_dec = distance * max_acc / (max_acc + max_dec);
    } else {
        d_const = distance - d_acc - d_dec;
    }
    [d_acc, d_const, d_dec]
}

/// Durations `[t_acc, t_const, t_dec]` for the distances from
/// [`phase_distances`].
fn phase_durations(distances: &[f64; 3], description: &AmrDescription) -> [Duration; 3] {
    let kinematics = description.kinematics();
    let max_vel = kinematics.max_velocity();
    let max_acc = kinematics.max_acceleration();
    let max_dec = kinematics.deceleration_magnitude();

    if distances[1] == 0.0 {
        [
            (2.0 * distances[0] / max_acc).sqrt(),
            0.0,
            (2.0 * distances[2] / max_dec).sqrt(),
        ]
    } else {
        [
            max_vel / max_acc,
            distances[1] / max_vel,
            max_vel / max_dec,
        ]
    }
}

// ── Duration estimation ───────────────────────────────────────────────────────

/// Estimated execution time of one functionality from `start_pose`.
///
/// With `check_positioning`, a `Load`/`Unload` whose destination differs from
/// the start position fails with [`MobilityError::Misplaced`].
pub fn estimate_duration(
    start_pose: &Pose,
    functionality: &Functionality,
    description: &AmrDescription,
    topology: &Topology,
    check_positioning: bool,
) -> MobilityResult<Duration> {
    sanity_check(start_pose, functionality, description, topology)?;

    match functionality {
        Functionality::MoveTo { .. } | Functionality::Navigate { .. } => {
            let distance = calculate_distance(start_pose.position, functionality);
            let durations = phase_durations(&phase_distances(distance, description), description);
            Ok(durations.iter().sum())
        }
        Functionality::Load { destination } => {
            if check_positioning && (*destination - start_pose.position).length() != 0.0 {
                return Err(MobilityError::Misplaced {
                    expected: *destination,
                    actual: start_pose.position,
                });
            }
            Ok(description.load_handling().load_time())
        }
        Functionality::Unload { destination } => {
            if check_positioning && (*destination - start_pose.position).length() != 0.0 {
                return Err(MobilityError::Misplaced {
                    expected: *destination,
                    actual: start_pose.position,
                });
            }
            Ok(description.load_handling().unload_time())
        }
    }
}

/// Estimated execution time of a functionality sequence, threading the end
/// position of each movement into the next estimate.
pub fn estimate_duration_along(
    start_pose: &Pose,
    functionalities: &[Functionality],
    description: &AmrDescription,
    topology: &Topology,
    check_positioning: bool,
) -> MobilityResult<Duration> {
    let mut start = start_pose.position;
    let mut total = 0.0;
    for functionality in functionalities {
        total += estimate_duration(
            &Pose::from(start),
            functionality,
            description,
            topology,
            check_positioning,
        )?;
        if let Some(end) = functionality.end_position() {
            start = end;
        }
    }
    Ok(total)
}

// ── Phase decomposition ───────────────────────────────────────────────────────

/// Decompose one functionality into its motion phases.
///
/// Invariants on the result: timestamps are non-decreasing, the last phase is
/// `Idle` at the destination, and its timestamp is start + total duration.
pub fn calculate_phases(
    start_timestamp: Duration,
    start_pose: &Pose,
    functionality: &Functionality,
    description: &AmrDescription,
    topology: &Topology,
) -> MobilityResult<Vec<MobilityStatus>> {
    sanity_check(start_pose, functionality, description, topology)?;

    match functionality {
        Functionality::Load { destination } => Ok(leg_phases(
            start_timestamp,
            start_pose.position,
            *destination,
            &[0.0, 0.0, 0.0],
            description.load_handling().load_time(),
            description,
        )),
        Functionality::Unload { destination } => Ok(leg_phases(
            start_timestamp,
            start_pose.position,
            *destination,
            &[0.0, 0.0, 0.0],
            description.load_handling().unload_time(),
            description,
        )),
        Functionality::MoveTo { destination } => {
            let distance = calculate_distance(start_pose.position, functionality);
            let distances = phase_distances(distance, description);
            Ok(leg_phases(
                start_timestamp,
                start_pose.position,
                *destination,
                &distances,
                0.0,
                description,
            ))
        }
        Functionality::Navigate { waypoints } => Ok(navigate_phases(
            start_timestamp,
            start_pose.position,
            waypoints,
            description,
        )),
    }
}

/// Phases for a single straight leg plus an optional stationary action.
fn leg_phases(
    start_timestamp: Duration,
    start_position: Position,
    destination: Position,
    distances: &[f64; 3],
    stationary_time: Duration,
    description: &AmrDescription,
) -> Vec<MobilityStatus> {
    let durations = phase_durations(distances, description);
    let kinematics = description.kinematics();
    let translation = destination - start_position;

    let mut next_position = start_position;
    let mut next_timestamp = start_timestamp;
    let mut next_velocity_scalar = 0.0;
    let mut phases = Vec::new();

    if durations[0] > 0.0 {
        let direction = translation.unit();
        phases.push(MobilityStatus {
            state: MobilityState::Accelerating,
            position: next_position,
            velocity: Velocity::ZERO,
            acceleration: direction * kinematics.max_acceleration(),
            timestamp: next_timestamp,
        });
        next_timestamp += durations[0];
        next_position += direction * distances[0];
        next_velocity_scalar = durations[0] * kinematics.max_acceleration();
    }

    if durations[1] > 0.0 {
        let direction = translation.unit();
        phases.push(MobilityStatus {
            state: MobilityState::ConstSpeedTraveling,
            position: next_position,
            velocity: direction * kinematics.max_velocity(),
            acceleration: Vec2::ZERO,
            timestamp: next_timestamp,
        });
        next_timestamp += durations[1];
        next_position += direction * distances[1];
        next_velocity_scalar = kinematics.max_velocity();
    }

    if durations[2] > 0.0 {
        let direction = translation.unit();
        phases.push(MobilityStatus {
            state: MobilityState::Decelerating,
            position: next_position,
            velocity: direction * next_velocity_scalar,
            acceleration: -direction * kinematics.deceleration_magnitude(),
            timestamp: next_timestamp,
        });
        next_timestamp += durations[2];
    }

    if stationary_time > 0.0 {
        phases.push(MobilityStatus {
            state: MobilityState::Stationary,
            position: destination,
            velocity: Velocity::ZERO,
            acceleration: Vec2::ZERO,
            timestamp: next_timestamp,
        });
        next_timestamp += stationary_time;
    }

    phases.push(MobilityStatus::idle(destination, next_timestamp));
    phases
}

/// Phases for a multi-waypoint navigate.
///
/// The trapezoid spans the *total* path length; corners are traversed
/// without stopping.  Waypoints inside the acceleration zone emit an
/// `Accelerating` phase whose initial velocity is the previous waypoint's
/// exit velocity and whose duration solves `v·t + a·t²/2 = leg`.
fn navigate_phases(
    start_timestamp: Duration,
    start_position: Position,
    waypoints: &[Position],
    description: &AmrDescription,
) -> Vec<MobilityStatus> {
    let total = calculate_distance(
        start_position,
        &Functionality::Navigate { waypoints: waypoints.to_vec() },
    );
    let distances = phase_distances(total, description);
    let durations = phase_durations(&distances, description);

    let kinematics = description.kinematics();
    let max_acc = kinematics.max_acceleration();
    let max_dec = kinematics.deceleration_magnitude();
    let max_vel = kinematics.max_velocity();

    let mut phases = Vec::new();
    let mut cumulative_distance = 0.0;
    let mut cumulative_time = 0.0;
    let mut waypoint = start_position;
    let mut last_waypoint;
    let mut translation = Vec2::ZERO;
    let mut last_speed = 0.0;
    let mut i = 0;

    // Waypoints fully inside the acceleration zone.
    while i < waypoints.len() {
        last_waypoint = waypoint;
        waypoint = waypoints[i];
        translation = waypoint - last_waypoint;
        cumulative_distance += translation.length();
        if translation.length() == 0.0 {
            i += 1;
            continue;
        }
        if cumulative_distance < distances[0] {
            let direction = translation.unit();
            // Leg time under constant acceleration from entry speed.
            let leg = translation.length();
            let time = -last_speed / max_acc
                + (last_speed * last_speed / (max_acc * max_acc) + 2.0 * leg / max_acc).sqrt();
            let exit_speed = last_speed + max_acc * time;
            phases.push(MobilityStatus {
                state: MobilityState::Accelerating,
                position: last_waypoint,
                velocity: direction * exit_speed,
                acceleration: direction * max_acc,
                timestamp: start_timestamp + cumulative_time,
            });
            last_speed = exit_speed;
            cumulative_time += time;
            i += 1;
        } else {
            break;
        }
    }

    // Partial leg reaching max speed.
    if translation.length() > 0.0 && durations[0] > 0.0 {
        let direction = translation.unit();
        let last_waypoint = waypoint - translation;
        phases.push(MobilityStatus {
            state: MobilityState::Accelerating,
            position: last_waypoint,
            velocity: direction * last_speed,
            acceleration: direction * max_acc,
            timestamp: start_timestamp + cumulative_time,
        });
        waypoint = last_waypoint
            + direction * (distances[0] + translation.length() - cumulative_distance);
        cumulative_time = durations[0];
        cumulative_distance = distances[0];
        last_speed = max_acc * durations[0];
    }

    // Waypoints fully inside the constant-speed zone.
    while i < waypoints.len() {
        last_waypoint = waypoint;
        waypoint = waypoints[i];
        translation = waypoint - last_waypoint;
        cumulative_distance += translation.length();
        if translation.length() == 0.0 {
            i += 1;
            continue;
        }
        if cumulative_distance < distances[0] + distances[1] {
            let direction = translation.unit();
            phases.push(MobilityStatus {
                state: MobilityState::ConstSpeedTraveling,
                position: last_waypoint,
                velocity: direction * max_vel,
                acceleration: Vec2::ZERO,
                timestamp: start_timestamp + cumulative_time,
            });
            cumulative_time += translation.length() / max_vel;
            i += 1;
        } else {
            break;
        }
    }

    // Partial leg up to the deceleration point, or rewind the unconsumed leg.
    if translation.length() > 0.0 && durations[1] > 0.0 {
        let direction = translation.unit();
        let last_waypoint = waypoint - translation;
        phases.push(MobilityStatus {
            state: MobilityState::ConstSpeedTraveling,
            position: last_waypoint,
            velocity: direction * max_vel,
            acceleration: Vec2::ZERO,
            timestamp: start_timestamp + cumulative_time,
        });
        waypoint = last_waypoint
            + direction
                * (distances[0] + distances[1] + translation.length() - cumulative_distance);
        cumulative_time = durations[0] + durations[1];
        cumulative_distance = distances[0] + distances[1];
        last_speed = max_vel;
    } else {
        waypoint -= translation;
        cumulative_distance -= translation.length();
    }

    // Remaining waypoints are inside the deceleration zone.
    while i < waypoints.len() {
        last_waypoint = waypoint;
        waypoint = waypoints[i];
        translation = waypoint - last_waypoint;
        cumulative_distance += translation.length();
        i += 1;
        if translation.length() == 0.0 {
            continue;
        }
        if cumulative_distance > distances[0] + distances[1] {
            let direction = translation.unit();
            let leg = translation.length();
            let time = last_speed / max_dec
                - (last_speed * last_speed / (max_dec * max_dec) - 2.0 * leg / max_dec)
                    .max(0.0)
                    .sqrt();
            phases.push(MobilityStatus {
                state: MobilityState::Decelerating,
                position: last_waypoint,
                velocity: direction * last_speed,
                acceleration: -direction * max_dec,
                timestamp: start_timestamp + cumulative_time,
            });
            last_speed -= max_dec * time;
            cumulative_time += time;
        }
    }

    phases.push(MobilityStatus::idle(
        waypoint,
        start_timestamp + durations[0] + durations[1] + durations[2],
    ));
    phases
}

// ── Status at time ────────────────────────────────────────────────────────────

/// The kinematic state at `timestamp`, integrated from `phase`.
///
/// `timestamp` must not precede the phase start (beyond float noise).
pub fn status_at(phase: &MobilityStatus, timestamp: Duration) -> MobilityResult<MobilityStatus> {
    let delta = timestamp - phase.timestamp;
    if delta < -f64::EPSILON {
        return Err(MobilityError::TimestampBeforePhase {
            timestamp,
            phase_start: phase.timestamp,
        });
    }

    let mut status = *phase;
    match phase.state {
        MobilityState::Accelerating | MobilityState::Decelerating => {
            // Acceleration points against the velocity while decelerating.
            status.position += status.velocity * delta + status.acceleration * (0.5 * delta * delta);
            status.velocity += status.acceleration * delta;
        }
        MobilityState::ConstSpeedTraveling => {
            status.position += status.velocity * delta;
        }
        MobilityState::Stationary | MobilityState::Idle => {}
    }
    status.timestamp = timestamp;
    Ok(status)
}

// ── Metrics by domain ─────────────────────────────────────────────────────────

/// Travel metrics split by load state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DomainBreakdown {
    pub empty_travel_time: Duration,
    pub loaded_travel_time: Duration,
    pub action_time: Duration,
    pub empty_travel_distance: Distance,
    pub loaded_travel_distance: Distance,
}

/// Walk a functionality sequence and attribute each `MoveTo` to empty or
/// loaded travel depending on the load state at that point; `Load`/`Unload`
/// flip the state and contribute action time only.
pub fn metrics_by_domain(
    start_position: Position,
    functionalities: &[Functionality],
    description: &AmrDescription,
    topology: &Topology,
) -> MobilityResult<DomainBreakdown> {
    let mut breakdown = DomainBreakdown::default();
    let mut loaded = false;
    let mut last_position = start_position;

    for functionality in functionalities {
        match functionality {
            Functionality::MoveTo { destination } => {
                let distance = calculate_distance(last_position, functionality);
                let time = estimate_duration(
                    &Pose::from(last_position),
                    functionality,
                    description,
                    topology,
                    false,
                )?;
                if loaded {
                    breakdown.loaded_travel_distance += distance;
                    breakdown.loaded_travel_time += time;
                } else {
                    breakdown.empty_travel_distance += distance;
                    breakdown.empty_travel_time += time;
                }
                last_position = *destination;
            }
            Functionality::Load { .. } => {
                loaded = true;
                breakdown.action_time += estimate_duration(
                    &Pose::from(last_position),
                    functionality,
                    description,
                    topology,
                    false,
                )?;
            }
            Functionality::Unload { .. } => {
                loaded = false;
                breakdown.action_time += estimate_duration(
                    &Pose::from(last_position),
                    functionality,
                    description,
                    topology,
                    false,
                )?;
            }
            Functionality::Navigate { .. } => {
                return Err(MobilityError::NavigateNotCosted);
            }
        }
    }

    Ok(breakdown)
}
