//! The four screens and the table of moves between them.
//!
//! The selected artifact only exists inside `Map` and `Notes`, so leaving
//! either screen drops the selection without extra bookkeeping.

use super::data::ArtifactId;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Scan,
    Collection,
    Map(ArtifactId),
    Notes(ArtifactId),
}

/// Navigation events raised by the nav bar and collection cards
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    ShowScan,
    ShowCollection,
    OpenMap(ArtifactId),
    OpenNotes(ArtifactId),
    Close,
}

impl Screen {
    /// Next screen for `transition`, or None if the move is not allowed
    /// from here
    pub fn next(&self, transition: Transition) -> Option<Screen> {
        match (self, transition) {
            // Nav bar items are reachable from everywhere
            (_, Transition::ShowScan) => Some(Screen::Scan),
            (_, Transition::ShowCollection) => Some(Screen::Collection),

            (Screen::Collection, Transition::OpenMap(id)) => Some(Screen::Map(id)),
            (Screen::Collection, Transition::OpenNotes(id)) => Some(Screen::Notes(id)),

            (Screen::Map(_) | Screen::Notes(_), Transition::Close) => Some(Screen::Collection),

            _ => None,
        }
    }

    /// Artifact shown by the Map or Notes screen
    pub fn selected(&self) -> Option<&ArtifactId> {
        match self {
            Screen::Map(id) | Screen::Notes(id) => Some(id),
            Screen::Scan | Screen::Collection => None,
        }
    }

    /// Which nav bar item is highlighted
    pub fn nav_item(&self) -> NavItem {
        match self {
            Screen::Scan => NavItem::Scan,
            Screen::Collection | Screen::Map(_) | Screen::Notes(_) => NavItem::Collection,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Scan,
    Collection,
}
