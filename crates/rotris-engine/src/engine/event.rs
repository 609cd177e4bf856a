use std::sync::mpsc;

use crate::core::{Cell, RotationDirection};

/// Observation emitted by [`GridMapEngine`](super::GridMapEngine) after a mutation.
///
/// Coordinates and rows are bucket-local.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum GridEvent {
    CellChanged { x: usize, y: usize, cell: Cell },
    RowDeleted { row: usize },
    GridRotated { direction: RotationDirection },
    BucketContentsRotated,
    MapReset,
}

/// Receiver of [`GridEvent`]s.
///
/// Observers only ever see shared references to events and have no access to the
/// engine, so they cannot mutate grid state from inside a notification.
pub trait GridObserver {
    fn notify(&mut self, event: &GridEvent);
}

impl<F> GridObserver for F
where
    F: FnMut(&GridEvent),
{
    fn notify(&mut self, event: &GridEvent) {
        self(event);
    }
}

/// Observer forwarding every event into an mpsc channel.
///
/// Events sent after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct EventSender(mpsc::Sender<GridEvent>);

impl GridObserver for EventSender {
    fn notify(&mut self, event: &GridEvent) {
        self.0.send(event.clone()).ok();
    }
}

/// Creates a channel whose sending half can be subscribed to an engine.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use rotris_engine::{GridEvent, GridMapEngine, Topology, TopologyConfig, event_channel};
///
/// let topology = Arc::new(Topology::new(TopologyConfig::framed(4, 4)).unwrap());
/// let mut engine = GridMapEngine::new(topology);
/// let (sender, receiver) = event_channel();
/// engine.subscribe(sender);
///
/// engine.reset_map();
/// assert_eq!(receiver.try_iter().collect::<Vec<_>>(), vec![GridEvent::MapReset]);
/// ```
#[must_use]
pub fn event_channel() -> (EventSender, mpsc::Receiver<GridEvent>) {
    let (sender, receiver) = mpsc::channel();
    (EventSender(sender), receiver)
}
