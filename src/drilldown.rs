use crate::source::Listing;
use std::path::PathBuf;

/// Folder drill-down and back navigation. Owns the stack of previously
/// displayed listings; each stacked listing is a frozen value snapshot, so
/// later mutation of the live listing never rewrites history.
///
/// A drill is a two-step affair: `activate` decides what should happen and
/// marks the navigator busy when a fetch is needed; the caller performs the
/// fetch (and transition animation) and reports back through
/// `commit_drill`/`commit_back_fetch`/`abort`. While busy, further
/// activations are rejected outright.
#[derive(Debug, Default)]
pub struct DrillNavigator {
    stack: Vec<Listing>,
    in_flight: bool,
}

/// Outcome of activating a card.
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    /// Pop succeeded: install this snapshot, scroll reset to 0, no
    /// transition animation.
    Back(Listing),
    /// `..` activated with an empty stack: fetch the parent fresh and
    /// install it like a back-navigation.
    FetchParent(PathBuf),
    /// Folder activated: fetch this path, then run the drill transition.
    Drill(PathBuf),
    /// File struck, index out of range, or navigator busy.
    Ignored,
}

impl DrillNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Depth of the history stack (how many levels "back" can restore).
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn can_go_back(&self) -> bool {
        !self.stack.is_empty() && !self.in_flight
    }

    /// A fetch or drill transition is still running.
    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    pub fn activate(&mut self, current: &Listing, index: usize) -> Activation {
        if self.in_flight {
            tracing::debug!(index, "activation rejected: drill already in flight");
            return Activation::Ignored;
        }
        let Some(entry) = current.entries.get(index) else {
            return Activation::Ignored;
        };

        if entry.is_parent_sentinel() {
            return match self.stack.pop() {
                Some(previous) => {
                    tracing::info!(path = %previous.path.display(), "back-navigating to stacked listing");
                    Activation::Back(previous)
                }
                None => {
                    self.in_flight = true;
                    tracing::info!(path = %entry.path.display(), "back-navigating past history, fetching parent");
                    Activation::FetchParent(entry.path.clone())
                }
            };
        }

        if entry.is_folder() {
            // Push before the child listing is installed; aborting the
            // fetch pops this snapshot back off.
            self.stack.push(current.clone());
            self.in_flight = true;
            tracing::info!(path = %entry.path.display(), "drilling into folder");
            return Activation::Drill(entry.path.clone());
        }

        // Files are inert; opening them is out of scope.
        Activation::Ignored
    }

    /// Equivalent of activating `..`, for the header back affordance.
    pub fn go_back(&mut self) -> Option<Listing> {
        if self.in_flight {
            return None;
        }
        self.stack.pop()
    }

    /// Child listing arrived; the caller starts the transition and keeps the
    /// navigator busy until `finish_transition`.
    pub fn commit_drill(&mut self, child: Listing) -> Listing {
        debug_assert!(self.in_flight);
        child
    }

    /// The drill transition resolved; activations are accepted again.
    pub fn finish_transition(&mut self) {
        self.in_flight = false;
    }

    /// Parent fetch (back past an empty stack) arrived; installs without a
    /// transition, so the navigator is idle immediately. A parent that came
    /// back as an empty advisory listing (denied, missing, or outside a
    /// served root) is not installed: it has no `..` sentinel, so installing
    /// it would strand the session on a zero-card view. The caller keeps the
    /// current listing and surfaces the advisory.
    pub fn commit_back_fetch(&mut self, parent: Listing) -> Option<Listing> {
        self.in_flight = false;
        if parent.entries.is_empty() && parent.advisory.is_some() {
            tracing::warn!(path = %parent.path.display(), "parent listing unavailable, keeping current listing");
            return None;
        }
        Some(parent)
    }

    /// Fetch failed or timed out: the live listing stays as it was, and the
    /// snapshot pushed by `activate` is taken back off the stack.
    pub fn abort(&mut self, was_drill: bool) {
        if was_drill {
            self.stack.pop();
        }
        self.in_flight = false;
    }
}
