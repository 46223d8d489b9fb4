//! Static practice level catalog.
//!
//! Levels carry guidance text only; the session duration comes from
//! [`Settings`](crate::Settings) (or a per-session override).

/// Seconds of elapsed practice between guidance step advances when the
/// auto-advance setting is on.
pub const STEP_ADVANCE_SECS: u64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub id: u32,
    pub name: &'static str,
    /// Guidance steps, shown one at a time during practice.
    pub steps: &'static [&'static str],
}

impl Level {
    /// Index of the guidance step active after `elapsed_secs` of practice,
    /// assuming auto-advance. Clamped to the last step.
    pub fn step_at(&self, elapsed_secs: u64) -> usize {
        let idx = (elapsed_secs / STEP_ADVANCE_SECS) as usize;
        idx.min(self.steps.len().saturating_sub(1))
    }
}

const CATALOG: &[Level] = &[
    Level {
        id: 1,
        name: "Breath Awareness",
        steps: &[
            "Sit comfortably and close your eyes.",
            "Rest your full attention on the sensation of breathing.",
            "Notice the air at the nostrils, the rise and fall of the chest.",
            "When the mind wanders, return to the breath without comment.",
        ],
    },
    Level {
        id: 2,
        name: "Body Awareness",
        steps: &[
            "Keep a light awareness of the breath.",
            "Widen your attention to the weight of the body.",
            "Notice the points of contact with the surface beneath you.",
            "Hold breath and body together in one steady field of attention.",
        ],
    },
    Level {
        id: 3,
        name: "Open Observation",
        steps: &[
            "You are not doing, you are observing.",
            "Watch thoughts and feelings arise and pass without engaging.",
            "Do not judge or follow what appears; note it and let it go.",
            "Remain the silent, impartial observer until the bell.",
        ],
    },
];

/// The full level catalog, ordered by id.
pub fn catalog() -> &'static [Level] {
    CATALOG
}

/// Look up a level by id.
pub fn by_id(id: u32) -> Option<&'static Level> {
    CATALOG.iter().find(|l| l.id == id)
}
