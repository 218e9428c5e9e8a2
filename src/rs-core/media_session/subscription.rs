use std::rc::Rc;

use super::backend::MediaBackend;
use crate::{bindings::SubscriptionId, Logger};

/// Event listeners registered on a `MediaBackend`, removed as soon as this object is
/// dropped.
///
/// Events sent by the host are tagged with the `SubscriptionId` of the listeners which
/// produced them, allowing to recognize and ignore events coming from a previous session.
pub(crate) struct ScopedSubscription {
    backend: Rc<dyn MediaBackend>,
    id: SubscriptionId,
}

impl ScopedSubscription {
    /// Register listeners on the given `MediaBackend`.
    pub(crate) fn register(backend: Rc<dyn MediaBackend>) -> Self {
        let id = backend.add_listeners();
        Logger::lazy_debug(&|| format!("Session: Listeners registered ({id})"));
        Self { backend, id }
    }

    pub(crate) fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for ScopedSubscription {
    fn drop(&mut self) {
        Logger::lazy_debug(&|| format!("Session: Removing listeners ({})", self.id));
        self.backend.remove_listeners(self.id);
    }
}
