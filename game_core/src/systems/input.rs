use crate::controller::{Controller, Observation};
use crate::{Action, Events, GameEvent, Side};

/// Ask a controller for its action, holding on an invalid or missing answer
pub fn select_action(
    side: Side,
    controller: &mut dyn Controller,
    state: &Observation,
    events: &mut Events,
) -> Action {
    let raw = controller.select_action(state);
    match raw.and_then(Action::from_raw) {
        Some(action) => action,
        None => {
            tracing::warn!(%side, ?raw, kind = controller.kind(), "invalid controller action, holding");
            events.push(GameEvent::InvalidAction { side, raw });
            Action::Hold
        }
    }
}
