use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use crate::event::{Navigation, UpdateSignal};

/// Fire-and-forget instructions for the list view and for navigation.
pub struct Signals<E> {
    context: CapabilityContext<SignalOperation, E>,
}

impl<Ev> Capability<Ev> for Signals<Ev> {
    type Operation = SignalOperation;
    type MappedSelf<MappedEv> = Signals<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Signals::new(self.context.map_event(f))
    }
}

impl<E> Signals<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<SignalOperation, E>) -> Self {
        Self { context }
    }

    pub fn update(&self, signal: UpdateSignal) {
        self.notify(SignalOperation::Update(signal));
    }

    pub fn navigate(&self, navigation: Navigation) {
        self.notify(SignalOperation::Navigate(navigation));
    }

    fn notify(&self, operation: SignalOperation) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(operation).await;
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SignalOperation {
    Update(UpdateSignal),
    Navigate(Navigation),
}

impl Operation for SignalOperation {
    type Output = ();
}
