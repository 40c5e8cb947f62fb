//! Bookkeeping for animated player transitions awaiting completion.

use marble_maze_core::{PlayerId, Position, TransitionId, TransitionKind};

/// Transition handed to the rendering collaborator whose completion is outstanding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PendingTransition {
    /// Identifier the completion must quote.
    pub(crate) id: TransitionId,
    /// Player instance being animated.
    pub(crate) player: PlayerId,
    /// Purpose of the transition.
    pub(crate) kind: TransitionKind,
    /// Location where the continuation respawns the player.
    pub(crate) respawn: Position,
}

/// Outstanding transitions, at most one per player instance.
#[derive(Debug)]
pub(crate) struct TransitionLedger {
    pending: Vec<PendingTransition>,
    next_transition_id: TransitionId,
}

impl TransitionLedger {
    pub(crate) fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_transition_id: TransitionId::new(0),
        }
    }

    /// Records a new transition, returning it along with any transition of the
    /// same player it replaced.
    pub(crate) fn begin(
        &mut self,
        player: PlayerId,
        kind: TransitionKind,
        respawn: Position,
    ) -> (PendingTransition, Option<PendingTransition>) {
        let superseded = self.discard_player(player);
        let id = self.next_transition_id;
        self.next_transition_id = TransitionId::new(id.get().saturating_add(1));
        let transition = PendingTransition {
            id,
            player,
            kind,
            respawn,
        };
        self.pending.push(transition);
        (transition, superseded)
    }

    /// Removes and returns the transition with the provided identifier.
    pub(crate) fn take(&mut self, id: TransitionId) -> Option<PendingTransition> {
        let index = self.pending.iter().position(|pending| pending.id == id)?;
        Some(self.pending.remove(index))
    }

    /// Drops the transition of a player instance that is being destroyed.
    pub(crate) fn discard_player(&mut self, player: PlayerId) -> Option<PendingTransition> {
        let index = self
            .pending
            .iter()
            .position(|pending| pending.player == player)?;
        Some(self.pending.remove(index))
    }

    pub(crate) fn pending_for(&self, player: PlayerId) -> Option<&PendingTransition> {
        self.pending.iter().find(|pending| pending.player == player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_transition_supersedes_previous_one_for_same_player() {
        let mut ledger = TransitionLedger::new();
        let player = PlayerId::new(0);
        let (teleport, none) =
            ledger.begin(player, TransitionKind::Teleporting, Position::new(1.0, 1.0));
        assert!(none.is_none());

        let (dying, superseded) =
            ledger.begin(player, TransitionKind::Dying, Position::new(2.0, 2.0));
        assert_eq!(superseded, Some(teleport));
        assert_ne!(dying.id, teleport.id);
        assert!(ledger.take(teleport.id).is_none());
        assert_eq!(ledger.take(dying.id), Some(dying));
    }

    #[test]
    fn take_yields_each_transition_once() {
        let mut ledger = TransitionLedger::new();
        let (pending, _) =
            ledger.begin(PlayerId::new(3), TransitionKind::Dying, Position::new(0.0, 0.0));

        assert!(ledger.pending_for(PlayerId::new(3)).is_some());
        assert_eq!(ledger.take(pending.id), Some(pending));
        assert!(ledger.take(pending.id).is_none());
        assert!(ledger.pending_for(PlayerId::new(3)).is_none());
    }
}
