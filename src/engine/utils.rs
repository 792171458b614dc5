use crate::ghost::StateChange;
use crate::types::RuntimeEvent;

pub(super) fn state_change_event(change: StateChange) -> RuntimeEvent {
    RuntimeEvent::GhostStateChanged {
        ghost: change.role,
        from: change.from,
        to: change.to,
    }
}
