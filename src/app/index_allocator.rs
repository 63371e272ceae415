//! Vergabe stage-weiter Entitäts-Indizes.

use crate::core::Stage;

/// Vergibt fortlaufende Indizes; gelöschte Indizes werden in einer Session nie
/// erneut vergeben. Liegt außerhalb der Undo-History.
#[derive(Debug, Clone, Default)]
pub struct IndexAllocator {
    /// Nächster freier Index; `> u32::MAX` heißt erschöpft
    next: u64,
}

impl IndexAllocator {
    /// Startet hinter dem höchsten Index der Stage.
    pub fn from_stage(stage: &Stage) -> Self {
        Self {
            next: stage.max_index().map_or(0, |max| u64::from(max) + 1),
        }
    }

    /// Nächster Index, ohne ihn zu verbrauchen.
    pub fn peek(&self) -> anyhow::Result<u32> {
        u32::try_from(self.next)
            .map_err(|_| anyhow::anyhow!("Indexraum der Stage erschöpft (u32::MAX vergeben)"))
    }

    pub fn allocate(&mut self) -> anyhow::Result<u32> {
        let index = self.peek()?;
        self.next += 1;
        Ok(index)
    }

    /// Stellt sicher, dass `index` nie vergeben wird (z.B. nach Server-Updates).
    pub fn reserve(&mut self, index: u32) {
        self.next = self.next.max(u64::from(index) + 1);
    }

    /// Übernimmt den Fortschritt eines anderen Allocators (nach Neuladen der Stage).
    pub fn absorb(&mut self, other: &IndexAllocator) {
        self.next = self.next.max(other.next);
    }
}
