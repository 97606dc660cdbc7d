//! Events broadcast by the controller to whatever view is rendering it.

use crate::session::{Connectivity, GameState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    ScreenChanged(GameState),
    /// Guess, history, hints or feedback changed without a screen change.
    RoundUpdated,
    NoticeShown(String),
    NoticeCleared,
    ConnectivityChanged(Connectivity),
}
