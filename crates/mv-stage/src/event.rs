//! GameEvent: everything the math core reports to the frontend

use serde::{Deserialize, Serialize};

use crate::codec::lenient_f64;

/// Grid position as `(reel, row)`, both zero-based
pub type Position = (u8, u8);

/// A single event, tagged on the wire by its `type` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    /// Board evaluated, wins paid
    SpinResult(SpinResultEvent),
    /// A collector threshold fired and a transformation became active
    SymbolTransformation(TransformationEvent),
    /// Collector symbols landed during a bonus spin
    CollectorCollection(CollectionEvent),
    /// Scatters awarded (or re-awarded) free spins
    FreeSpinTrigger(FreeSpinTriggerEvent),
    /// Board reveal with stacked top-tier reels
    Reveal(RevealEvent),
    /// Free-form diagnostic payload
    Annotation(AnnotationEvent),
}

impl GameEvent {
    /// All `type` tags this schema understands
    pub const TYPE_NAMES: [&'static str; 6] = [
        "spinResult",
        "symbolTransformation",
        "collectorCollection",
        "freeSpinTrigger",
        "reveal",
        "annotation",
    ];

    /// Wire name of this event's `type`
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SpinResult(_) => "spinResult",
            Self::SymbolTransformation(_) => "symbolTransformation",
            Self::CollectorCollection(_) => "collectorCollection",
            Self::FreeSpinTrigger(_) => "freeSpinTrigger",
            Self::Reveal(_) => "reveal",
            Self::Annotation(_) => "annotation",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAYLOADS
// ═══════════════════════════════════════════════════════════════════════════════

/// One evaluated spin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinResultEvent {
    /// Spin number within the round (0 = base spin)
    #[serde(default)]
    pub spin_index: u32,

    /// `"basegame"` or `"freegame"`
    #[serde(default)]
    pub game_mode: String,

    /// Evaluated board (after transformation), reel-major symbol codes
    pub reels: Vec<Vec<String>>,

    /// Board as drawn, before any transformation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub original_reels: Vec<Vec<String>>,

    /// Per-symbol ways wins
    pub wins: Vec<WinSummary>,

    /// Sum of win payouts for this spin
    #[serde(with = "lenient_f64")]
    pub total_win: f64,

    /// Session collector total after this spin
    pub collector_count: u32,
}

/// Compact view of a ways win
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinSummary {
    /// Symbol code
    pub symbol: String,
    /// Contiguous reels matched
    pub count: u8,
    /// Number of distinct left-to-right paths
    pub ways: u32,
    /// Ways-weighted average wild multiplier
    #[serde(with = "lenient_f64")]
    pub multiplier: f64,
    /// Final payout
    #[serde(with = "lenient_f64")]
    pub payout: f64,
    /// Every contributing cell
    #[serde(default)]
    pub positions: Vec<Position>,
}

/// A transformation threshold crossed for the first time this session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationEvent {
    /// Collector count that fired the rule
    pub threshold: u32,
    /// Rule label, e.g. `H4_TO_H1`
    pub transformation: String,
    /// Cells on the current board affected by the rule
    pub positions: Vec<Position>,
    /// Session collector total when the rule fired
    #[serde(default)]
    pub collector_count: u32,
}

/// Collector symbols banked by a bonus spin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEvent {
    pub previous_count: u32,
    pub new_count: u32,
    pub collected: u32,
    pub positions: Vec<Position>,
}

/// Free spins awarded by scatters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeSpinTriggerEvent {
    pub scatter_count: u8,
    /// Spins added by this trigger after the session cap
    pub awarded: u32,
    /// Session total awarded so far
    pub total_awarded: u32,
    /// True when awarded during an active bonus
    pub retrigger: bool,
}

/// Board reveal hint for the frontend (screen shake on big stacks)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealEvent {
    pub h1_stack_count: u8,
    pub trigger_screen_shake: bool,
}

/// Arbitrary diagnostic data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationEvent {
    pub label: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl AnnotationEvent {
    /// Build an annotation, coercing unserializable data to a string
    pub fn new<T: Serialize + std::fmt::Debug>(label: impl Into<String>, data: &T) -> Self {
        Self {
            label: label.into(),
            data: crate::codec::lossy_value(data),
        }
    }
}
