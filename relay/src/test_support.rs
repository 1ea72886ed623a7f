use crate::connection::ConnectionId;
use crate::message::Event;
use crate::transport::Transport;
use std::collections::HashSet;
use std::sync::Mutex;

/// Transport that records every delivery instead of writing to a socket.
#[derive(Default)]
pub(crate) struct RecordingTransport {
    deliveries: Mutex<Vec<(ConnectionId, Event)>>,
    detached: Mutex<Vec<ConnectionId>>,
}

impl RecordingTransport {
    /// Every connection that received something, sorted, one entry per delivery.
    pub(crate) fn recipients(&self) -> Vec<ConnectionId> {
        let mut recipients: Vec<_> = self
            .deliveries
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect();
        recipients.sort();
        recipients
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.deliveries
            .lock()
            .unwrap()
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub(crate) fn detached(&self) -> Vec<ConnectionId> {
        self.detached.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    fn emit(&self, targets: &HashSet<ConnectionId>, event: &Event) {
        let mut deliveries = self.deliveries.lock().unwrap();
        for id in targets {
            deliveries.push((id.clone(), event.clone()));
        }
    }

    fn detach(&self, connection_id: &ConnectionId) {
        self.detached.lock().unwrap().push(connection_id.clone());
    }
}
