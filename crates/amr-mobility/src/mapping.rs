//! Expansion of material-flow orders into functionality sequences.
//!
//! A `TransportOrder` expands into `MoveTo(pickup) Load … MoveTo(delivery)
//! Unload` — the implicit move to the first pickup is what makes the
//! get-to-start leg of a task visible to the cost oracle.

use amr_core::Position;
use amr_flow::Order;

use crate::error::{MobilityError, MobilityResult};
use crate::functionality::Functionality;

/// Expand `orders` into the flat functionality sequence a robot executes.
///
/// `last_position` seeds the position-tracking: a `MoveOrder` or
/// `ActionOrder` at the head of the list is only meaningful when the caller
/// says where the robot currently stands.
pub fn orders_to_functionalities(
    orders: &[Order],
    mut last_position: Option<Position>,
) -> MobilityResult<Vec<Functionality>> {
    let mut functionalities = Vec::new();

    for order in orders {
        match order {
            Order::Move(move_order) => {
                if last_position.is_none() {
                    return Err(MobilityError::NoPriorPosition("move"));
                }
                let destination = move_order.step.location.position();
                functionalities.push(Functionality::MoveTo { destination });
                last_position = Some(destination);
            }

            Order::Action(action_order) => {
                let Some(position) = last_position else {
                    return Err(MobilityError::NoPriorPosition("action"));
                };
                let params = &action_order.step.parameters;
                if params.contains("load") {
                    functionalities.push(Functionality::Load { destination: position });
                } else if params.contains("unload") {
                    functionalities.push(Functionality::Unload { destination: position });
                } else {
                    return Err(MobilityError::UnrecognizedAction);
                }
            }

            Order::Transport(transport_order) => {
                for pickup in &transport_order.pickup_steps {
                    let position = pickup.location.position();
                    functionalities.push(Functionality::MoveTo { destination: position });
                    functionalities.push(Functionality::Load { destination: position });
                }
                let delivery = transport_order.delivery_step.location.position();
                functionalities.push(Functionality::MoveTo { destination: delivery });
                functionalities.push(Functionality::Unload { destination: delivery });
                last_position = Some(delivery);
            }
        }
    }

    Ok(functionalities)
}
