// Complexity score - fixed-shape, validated six-dimension assessment

use serde::{Deserialize, Serialize};

use crate::errors::EscalationError;

/// Weight of each dimension in `overall`, in percent.
///
/// The weights deliberately sum to more than 100: reasoning depth alone can
/// push a query into the high band, while the other four dimensions only
/// nudge it. `confidence` is not part of `overall`.
pub const WEIGHT_FACTUAL_VS_REASONING: u32 = 90;
pub const WEIGHT_DATA_RETRIEVAL: u32 = 30;
pub const WEIGHT_DECISION_MAKING: u32 = 30;
pub const WEIGHT_TIME_SENSITIVITY: u32 = 10;
pub const WEIGHT_REVERSIBILITY: u32 = 30;

/// Upper bound of every dimension
pub const MAX_SCORE: u32 = 100;

/// Multi-dimensional complexity score; every field is in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityScore {
    pub overall: u32,
    /// 0 = pure fact, 100 = deep reasoning
    pub factual_vs_reasoning: u32,
    /// 0 = no data needed, 100 = complex data queries
    pub data_retrieval: u32,
    /// 0 = no decision, 100 = critical decision
    pub decision_making: u32,
    /// 0 = not urgent, 100 = immediate
    pub time_sensitivity: u32,
    /// 0 = easily reversible, 100 = irreversible
    pub reversibility: u32,
    /// Expected quality of a local answer
    pub confidence: u32,
}

impl ComplexityScore {
    /// Build a score from the five independent dimensions plus confidence.
    ///
    /// `overall` is derived, so it can never disagree with the dimensions.
    pub fn from_dimensions(
        factual_vs_reasoning: u32,
        data_retrieval: u32,
        decision_making: u32,
        time_sensitivity: u32,
        reversibility: u32,
        confidence: u32,
    ) -> Result<Self, EscalationError> {
        for (field, value) in [
            ("factual_vs_reasoning", factual_vs_reasoning),
            ("data_retrieval", data_retrieval),
            ("decision_making", decision_making),
            ("time_sensitivity", time_sensitivity),
            ("reversibility", reversibility),
            ("confidence", confidence),
        ] {
            if value > MAX_SCORE {
                return Err(EscalationError::InvalidScore { field, value });
            }
        }

        Ok(Self {
            overall: overall_of(
                factual_vs_reasoning,
                data_retrieval,
                decision_making,
                time_sensitivity,
                reversibility,
            ),
            factual_vs_reasoning,
            data_retrieval,
            decision_making,
            time_sensitivity,
            reversibility,
            confidence,
        })
    }

    /// Build a score from all seven fields, rejecting anything out of range
    /// or an `overall` that disagrees with the dimensions.
    pub fn new(
        overall: u32,
        factual_vs_reasoning: u32,
        data_retrieval: u32,
        decision_making: u32,
        time_sensitivity: u32,
        reversibility: u32,
        confidence: u32,
    ) -> Result<Self, EscalationError> {
        if overall > MAX_SCORE {
            return Err(EscalationError::InvalidScore {
                field: "overall",
                value: overall,
            });
        }
        let score = Self {
            overall,
            factual_vs_reasoning,
            data_retrieval,
            decision_making,
            time_sensitivity,
            reversibility,
            confidence,
        };
        score.validate()?;
        Ok(score)
    }

    /// Check a score read back from disk
    pub fn validate(&self) -> Result<(), EscalationError> {
        let rebuilt = Self::from_dimensions(
            self.factual_vs_reasoning,
            self.data_retrieval,
            self.decision_making,
            self.time_sensitivity,
            self.reversibility,
            self.confidence,
        )?;
        if rebuilt.overall != self.overall {
            return Err(EscalationError::InvalidScore {
                field: "overall",
                value: self.overall,
            });
        }
        Ok(())
    }

    /// Complexity band of `overall`: low (<=33), medium (<=66) or high
    pub fn band(&self) -> ComplexityBand {
        ComplexityBand::of(self.overall)
    }

    /// Dimension labels and values, in display order
    pub fn dimensions(&self) -> [(&'static str, u32); 7] {
        [
            ("Overall", self.overall),
            ("Factual vs Reasoning", self.factual_vs_reasoning),
            ("Data Retrieval", self.data_retrieval),
            ("Decision Making", self.decision_making),
            ("Time Sensitivity", self.time_sensitivity),
            ("Reversibility", self.reversibility),
            ("Local Confidence", self.confidence),
        ]
    }
}

/// Weighted sum of the five dimensions, rounded half-up and clamped
fn overall_of(
    factual_vs_reasoning: u32,
    data_retrieval: u32,
    decision_making: u32,
    time_sensitivity: u32,
    reversibility: u32,
) -> u32 {
    let weighted = WEIGHT_FACTUAL_VS_REASONING * factual_vs_reasoning
        + WEIGHT_DATA_RETRIEVAL * data_retrieval
        + WEIGHT_DECISION_MAKING * decision_making
        + WEIGHT_TIME_SENSITIVITY * time_sensitivity
        + WEIGHT_REVERSIBILITY * reversibility;
    ((weighted + 50) / 100).min(MAX_SCORE)
}

/// Coarse complexity band used by the routing table and dashboards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityBand {
    Low,
    Medium,
    High,
}

impl ComplexityBand {
    pub const LOW_MAX: u32 = 33;
    pub const MEDIUM_MAX: u32 = 66;

    pub fn of(overall: u32) -> Self {
        if overall <= Self::LOW_MAX {
            ComplexityBand::Low
        } else if overall <= Self::MEDIUM_MAX {
            ComplexityBand::Medium
        } else {
            ComplexityBand::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityBand::Low => "low",
            ComplexityBand::Medium => "medium",
            ComplexityBand::High => "high",
        }
    }
}
