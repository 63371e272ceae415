//! Segment-Zustandsmaschine: gültige (Typ, Zustand)-Kombinationen eines Wandabschnitts.

use serde::{Deserialize, Serialize};

/// Art eines Wandabschnitts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SegmentType {
    #[default]
    Wall,
    Fence,
    Door,
    Passage,
    Window,
    Opening,
}

/// Zustand eines Wandabschnitts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentState {
    Open,
    Closed,
    Locked,
    Secret,
    Visible,
}

const BARRIER_STATES: &[SegmentState] = &[SegmentState::Visible, SegmentState::Secret];
const OPEN_ONLY_STATES: &[SegmentState] = &[SegmentState::Open, SegmentState::Secret];
const OPERABLE_STATES: &[SegmentState] = &[
    SegmentState::Open,
    SegmentState::Closed,
    SegmentState::Locked,
    SegmentState::Secret,
];

impl SegmentType {
    /// Alle Typen in Anzeige-Reihenfolge.
    pub const ALL: [SegmentType; 6] = [
        SegmentType::Wall,
        SegmentType::Fence,
        SegmentType::Door,
        SegmentType::Passage,
        SegmentType::Window,
        SegmentType::Opening,
    ];

    /// Gültige Zustände dieses Typs.
    pub fn valid_states(self) -> &'static [SegmentState] {
        if self.is_barrier() {
            BARRIER_STATES
        } else if self.is_open_only() {
            OPEN_ONLY_STATES
        } else {
            OPERABLE_STATES
        }
    }

    /// Standardzustand dieses Typs.
    pub fn default_state(self) -> SegmentState {
        if self.is_barrier() {
            SegmentState::Visible
        } else if self.is_open_only() {
            SegmentState::Open
        } else {
            SegmentState::Closed
        }
    }

    /// Immer geschlossene Typen (Wand, Zaun).
    pub fn is_barrier(self) -> bool {
        matches!(self, SegmentType::Wall | SegmentType::Fence)
    }

    /// Typen ohne Verschluss (Durchgang, Öffnung): offen oder geheim.
    pub fn is_open_only(self) -> bool {
        matches!(self, SegmentType::Passage | SegmentType::Opening)
    }

    /// Anzeigename
    pub fn label(self) -> &'static str {
        match self {
            SegmentType::Wall => "Wall",
            SegmentType::Fence => "Fence",
            SegmentType::Door => "Door",
            SegmentType::Passage => "Passage",
            SegmentType::Window => "Window",
            SegmentType::Opening => "Opening",
        }
    }
}

/// Liefert `state`, falls für `segment_type` gültig, sonst dessen Standardzustand.
pub fn normalize(segment_type: SegmentType, state: SegmentState) -> SegmentState {
    if segment_type.valid_states().contains(&state) {
        state
    } else {
        segment_type.default_state()
    }
}

/// Ob ein Abschnitt mit diesem Typ/Zustand Bewegung und Sicht blockiert.
pub fn blocks_passage(segment_type: SegmentType, state: SegmentState) -> bool {
    if segment_type.is_barrier() {
        true
    } else if segment_type.is_open_only() {
        // Geheime Durchgänge wirken wie Wand, bis sie aufgedeckt sind
        state == SegmentState::Secret
    } else {
        state != SegmentState::Open
    }
}

/// Typ und Zustand eines Abschnitts (Spanne `index` → `index + 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub index: usize,
    #[serde(rename = "type")]
    pub segment_type: SegmentType,
    pub state: SegmentState,
}

impl Segment {
    /// Erstellt einen Abschnitt; ungültige Zustände werden normalisiert.
    pub fn new(index: usize, segment_type: SegmentType, state: SegmentState) -> Self {
        Self {
            index,
            segment_type,
            state: normalize(segment_type, state),
        }
    }

    /// Abschnitt mit Standardzustand des Typs.
    pub fn with_type(index: usize, segment_type: SegmentType) -> Self {
        Self::new(index, segment_type, segment_type.default_state())
    }

    /// Wechselt den Typ und hält den Zustand gültig.
    pub fn set_type(&mut self, segment_type: SegmentType) {
        self.segment_type = segment_type;
        self.state = normalize(segment_type, self.state);
    }

    /// Setzt den Zustand; ungültige Werte fallen auf den Standard zurück.
    pub fn set_state(&mut self, state: SegmentState) {
        self.state = normalize(self.segment_type, state);
    }

    pub fn blocks_passage(&self) -> bool {
        blocks_passage(self.segment_type, self.state)
    }

    /// Stellt nach Deserialisierung die Gültigkeit wieder her.
    pub fn normalized(self) -> Self {
        Self::new(self.index, self.segment_type, self.state)
    }
}
