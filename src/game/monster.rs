use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Session-unique monster identity. Ids are never reused within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MonsterId(pub u64);

/// Index into [`crate::MONSTER_GLYPHS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MonsterKind(pub u8);

impl MonsterKind {
    pub fn glyph(self) -> &'static str {
        crate::MONSTER_GLYPHS[self.0 as usize % crate::MONSTER_GLYPHS.len()]
    }
}

/// Normalized play-area position, both axes in `[0, 1)`. The renderer scales it to
/// the area size minus the sprite size so monsters stay fully on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Pure data monster; render handles live in the renderer, keyed by `id`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Monster {
    pub id: MonsterId,
    pub kind: MonsterKind,
    pub position: Position,
    pub spawned_at_ms: u64,
    pub expires_at_ms: u64,
}

impl Monster {
    pub(crate) fn random<R: Rng>(rng: &mut R, id: MonsterId, now_ms: u64, lifetime_ms: u64) -> Self {
        let kind = MonsterKind(rng.gen_range(0..crate::MONSTER_GLYPHS.len()) as u8);
        let position = Position {
            x: rng.gen_range(0.0..1.0),
            y: rng.gen_range(0.0..1.0),
        };
        Self {
            id,
            kind,
            position,
            spawned_at_ms: now_ms,
            expires_at_ms: now_ms.saturating_add(lifetime_ms),
        }
    }

    /// Lifetime left at `now_ms`, zero once expired.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at_ms.saturating_sub(now_ms)
    }
}
