//! Countdown latch gating the round on participant acknowledgements.
//!
//! Every resolved stage arms the latch with all participants; the round
//! only continues once each of them confirmed the stage was shown.

use std::collections::BTreeSet;

use crate::common::ActorId;

#[derive(Debug, Default)]
pub struct AckLatch {
    pending: BTreeSet<ActorId>,
}

impl AckLatch {
    pub fn arm(&mut self, ids: impl IntoIterator<Item = ActorId>) {
        self.pending = ids.into_iter().collect();
    }

    /// Returns `true` when this acknowledgement released the latch.
    pub fn acknowledge(&mut self, id: ActorId) -> bool {
        self.pending.remove(&id) && self.pending.is_empty()
    }

    pub fn is_armed(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.pending.iter().copied()
    }
}
