//! Topic-based event bus implementation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use rally_core::GameEvent;

/// Topics for event routing.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Round lifecycle: start, phases, game over.
    Round,
    /// Robot state changes: damage, death, scoring.
    Actors,
    /// Movement and stage strips for presentation.
    Animation,
}

impl Topic {
    const ALL: [Topic; 3] = [Topic::Round, Topic::Actors, Topic::Animation];

    /// Which topic a core event is routed to.
    pub fn of(event: &GameEvent) -> Topic {
        use GameEvent::*;
        match event {
            GameStarted { .. } | ProgrammingStarted | PhaseChanged { .. } | RoundFinished
            | GameOver { .. } => Topic::Round,
            ActorMoved { .. } | ActorRotated { .. } | ShotFired { .. }
            | CardMovesResolved { .. } | StageResolved { .. } => Topic::Animation,
            _ => Topic::Actors,
        }
    }
}

/// Topic-based event bus.
///
/// Consumers subscribe to the topics they care about and only receive
/// those events. Publishing is best-effort; a topic without subscribers
/// simply drops its events.
pub struct EventBus {
    channels: HashMap<Topic, broadcast::Sender<GameEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let channels = Topic::ALL
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity).0))
            .collect();
        Self { channels }
    }

    pub fn publish(&self, event: GameEvent) {
        let topic = Topic::of(&event);
        if let Some(tx) = self.channels.get(&topic)
            && tx.send(event).is_err()
        {
            tracing::trace!(?topic, "no subscribers for topic");
        }
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<GameEvent> {
        self.channels
            .get(&topic)
            .expect("channels exist for every topic")
            .subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rally_core::ActorId;

    #[tokio::test]
    async fn events_land_on_their_topic() {
        let bus = EventBus::new();
        let mut round = bus.subscribe(Topic::Round);
        let mut actors = bus.subscribe(Topic::Actors);

        bus.publish(GameEvent::PhaseChanged { phase: 2 });
        bus.publish(GameEvent::ActorDead { actor: ActorId(1) });

        assert_eq!(
            round.recv().await.unwrap(),
            GameEvent::PhaseChanged { phase: 2 }
        );
        assert_eq!(
            actors.recv().await.unwrap(),
            GameEvent::ActorDead { actor: ActorId(1) }
        );
        // the round subscriber never sees actor events
        assert!(round.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(GameEvent::RoundFinished);
    }
}
