//! Rank engine: per-discipline letter ranks and the overall rank.
//!
//! Each discipline has an ordered threshold table from the highest rank
//! down. Timed disciplines rank lower scores higher. Out-of-range scores
//! fall through to E; scoring never fails.
//!
//! The overall rank sums the points of each discipline rank and maps the
//! total through a second bracket table. It overwrites the stored rank
//! unconditionally on each full assessment (it is not a ratchet).

use crate::{Discipline, Rank};

/// Whether a bigger score is better for a discipline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreDirection {
    HigherIsBetter,
    LowerIsBetter,
}

/// Threshold table for one discipline, highest rank first
#[derive(Clone, Debug)]
pub struct RankTable {
    pub direction: ScoreDirection,
    pub thresholds: [(Rank, f64); 6],
}

impl Discipline {
    /// The fixed ranking table for this discipline
    pub fn table(self) -> RankTable {
        use Rank::*;
        match self {
            Discipline::PushUps => RankTable {
                direction: ScoreDirection::HigherIsBetter,
                thresholds: [(Ss, 60.0), (S, 50.0), (A, 40.0), (B, 30.0), (C, 20.0), (D, 10.0)],
            },
            Discipline::Squats => RankTable {
                direction: ScoreDirection::HigherIsBetter,
                thresholds: [(Ss, 100.0), (S, 80.0), (A, 60.0), (B, 45.0), (C, 30.0), (D, 15.0)],
            },
            Discipline::SitUps => RankTable {
                direction: ScoreDirection::HigherIsBetter,
                thresholds: [(Ss, 80.0), (S, 65.0), (A, 50.0), (B, 35.0), (C, 25.0), (D, 15.0)],
            },
            Discipline::HighJump => RankTable {
                direction: ScoreDirection::HigherIsBetter,
                thresholds: [(Ss, 70.0), (S, 60.0), (A, 50.0), (B, 40.0), (C, 30.0), (D, 20.0)],
            },
            // 100m time in seconds
            Discipline::Sprint => RankTable {
                direction: ScoreDirection::LowerIsBetter,
                thresholds: [(Ss, 12.0), (S, 13.5), (A, 15.0), (B, 17.0), (C, 19.0), (D, 22.0)],
            },
        }
    }
}

/// Rank a raw measurement for one discipline
pub fn score_discipline(discipline: Discipline, score: f64) -> Rank {
    let table = discipline.table();
    for (rank, threshold) in table.thresholds {
        let met = match table.direction {
            ScoreDirection::HigherIsBetter => score >= threshold,
            ScoreDirection::LowerIsBetter => score <= threshold,
        };
        if met {
            return rank;
        }
    }
    Rank::E
}

/// Map a summed point total to the overall rank (highest bracket wins)
pub fn overall_rank(total_points: u32) -> Rank {
    const BRACKETS: [(Rank, u32); 6] = [
        (Rank::Ss, 900),
        (Rank::S, 650),
        (Rank::A, 450),
        (Rank::B, 300),
        (Rank::C, 150),
        (Rank::D, 50),
    ];
    for (rank, floor) in BRACKETS {
        if total_points >= floor {
            return rank;
        }
    }
    Rank::E
}

/// Outcome for one discipline in a full assessment
#[derive(Clone, Debug)]
pub struct DisciplineResult {
    pub discipline: Discipline,
    pub score: f64,
    pub rank: Rank,
    pub points: u32,
}

/// Aggregated result of a full assessment
#[derive(Clone, Debug)]
pub struct Assessment {
    pub results: Vec<DisciplineResult>,
    pub total_points: u32,
    pub overall: Rank,
}

/// Score a full set of discipline measurements
pub fn assess(scores: &[(Discipline, f64)]) -> Assessment {
    let results: Vec<DisciplineResult> = scores
        .iter()
        .map(|&(discipline, score)| {
            let rank = score_discipline(discipline, score);
            DisciplineResult {
                discipline,
                score,
                rank,
                points: rank.points(),
            }
        })
        .collect();

    let total_points = results.iter().map(|r| r.points).sum();
    let overall = overall_rank(total_points);

    tracing::debug!(
        "Assessment: {} disciplines, {} points, overall {}",
        results.len(),
        total_points,
        overall
    );

    Assessment {
        results,
        total_points,
        overall,
    }
}
