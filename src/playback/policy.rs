//! Track-advance rules.
//!
//! Pure functions over the current index and playlist length so they can be
//! exercised without a player.

use rand::Rng;

/// Play mode flags toggled from the player screen.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PlayModes {
    pub shuffle: bool,
    /// Repeat the current track when it ends.
    pub repeat: bool,
}

/// What to do once the current track has finished.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Load the track at this index.
    Play(usize),
    /// Stop with the cursor on this index and progress pinned to the end.
    Stop(usize),
}

/// Decide the track that follows `current` in a playlist of `len` tracks.
///
/// Repeat wins over shuffle. Shuffle never reselects the current track and
/// stops when there is nothing else to pick. Linear mode stops at the last
/// track instead of wrapping. Returns `None` for an empty playlist.
pub fn next_index<R: Rng>(
    current: usize,
    len: usize,
    modes: PlayModes,
    rng: &mut R,
) -> Option<Advance> {
    if len == 0 {
        return None;
    }
    let current = current.min(len - 1);

    if modes.repeat {
        return Some(Advance::Play(current));
    }

    if modes.shuffle {
        if len < 2 {
            return Some(Advance::Stop(current));
        }
        // Draw from the other `len - 1` slots and skip over `current`.
        let pick = rng.random_range(0..len - 1);
        let next = if pick >= current { pick + 1 } else { pick };
        return Some(Advance::Play(next));
    }

    if current + 1 >= len {
        Some(Advance::Stop(len - 1))
    } else {
        Some(Advance::Play(current + 1))
    }
}

/// Index to play when stepping back from `current`.
///
/// Underflow wraps to the last track with repeat on, otherwise it stays at 0.
/// Returns `None` for an empty playlist.
pub fn previous_index(current: usize, len: usize, repeat: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = current.min(len - 1);
    match current.checked_sub(1) {
        Some(prev) => Some(prev),
        None if repeat => Some(len - 1),
        None => Some(0),
    }
}
