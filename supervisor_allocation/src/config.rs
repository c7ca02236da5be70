// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A student, as read from one row of the input table.
///
/// `ranks` holds one rank per supervisor, in the column order of the
/// supervisors. Rank 1 is the most preferred supervisor.
#[derive(PartialEq, Debug, Clone)]
pub struct Student {
    pub roll: String,
    pub name: String,
    pub email: String,
    pub score: f64,
    pub ranks: Vec<u32>,
}

// ******** Output data structures *********

/// The capacity of a supervisor and how much of it was used.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SupervisorStats {
    pub name: String,
    pub capacity: usize,
    pub assigned: usize,
}

/// How many students ranked a supervisor at each position.
///
/// `counts[r - 1]` is the number of students that gave rank `r` to this supervisor.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PreferenceCount {
    pub supervisor: String,
    pub counts: Vec<u64>,
}

/// A student with the outcome of the allocation.
#[derive(PartialEq, Debug, Clone)]
pub struct AllocatedStudent {
    /// The position of the student in the input (starting at 0).
    pub input_index: usize,
    pub roll: String,
    pub name: String,
    pub email: String,
    pub score: f64,
    /// The assigned supervisor, or None if every preferred supervisor was full.
    pub supervisor: Option<String>,
}

/// Statistics for one round
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    /// (roll, supervisor) for every student assigned in this round, in priority order.
    pub assignments: Vec<(String, String)>,
    /// The rolls of the students of this round that could not be placed.
    pub unassigned: Vec<String>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct AllocationResult {
    /// The supervisors, in column order.
    pub supervisors: Vec<SupervisorStats>,
    pub preference_counts: Vec<PreferenceCount>,
    /// The students by decreasing score. Equal scores keep the input order.
    pub by_score: Vec<AllocatedStudent>,
    /// The students sorted by roll number.
    pub by_roll: Vec<AllocatedStudent>,
    pub round_stats: Vec<RoundStats>,
}

impl AllocationResult {
    /// The rolls of all the students that did not receive a supervisor, in priority order.
    pub fn unassigned(&self) -> Vec<String> {
        self.by_score
            .iter()
            .filter(|s| s.supervisor.is_none())
            .map(|s| s.roll.clone())
            .collect()
    }
}

/// Errors that prevent the allocation from starting.
///
/// Students are identified by their roll and by their row, starting at 1.
#[derive(PartialEq, Debug, Clone)]
pub enum AllocationErrors {
    NoSupervisors,
    DuplicateSupervisor {
        name: String,
    },
    WrongNumberOfRanks {
        row: usize,
        roll: String,
        expected: usize,
        found: usize,
    },
    RankOutOfRange {
        row: usize,
        roll: String,
        supervisor: String,
        rank: u32,
        max_rank: usize,
    },
    DuplicateRank {
        row: usize,
        roll: String,
        rank: u32,
        first: String,
        second: String,
    },
    InvalidScore {
        row: usize,
        roll: String,
        score: f64,
    },
    /// A supervisor named twice in a list of preferences. Positions start at 1.
    RepeatedPreference {
        row: usize,
        roll: String,
        supervisor: String,
        first_position: usize,
        second_position: usize,
    },
}

impl Error for AllocationErrors {}

impl Display for AllocationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocationErrors::NoSupervisors => {
                write!(f, "no supervisor columns found, nothing to allocate")
            }
            AllocationErrors::DuplicateSupervisor { name } => {
                write!(f, "supervisor {:?} appears in more than one column", name)
            }
            AllocationErrors::WrongNumberOfRanks {
                row,
                roll,
                expected,
                found,
            } => write!(
                f,
                "row {} (roll {}): expected {} ranks, found {}",
                row, roll, expected, found
            ),
            AllocationErrors::RankOutOfRange {
                row,
                roll,
                supervisor,
                rank,
                max_rank,
            } => write!(
                f,
                "row {} (roll {}), column {}: rank {} is outside of 1..={}",
                row, roll, supervisor, rank, max_rank
            ),
            AllocationErrors::DuplicateRank {
                row,
                roll,
                rank,
                first,
                second,
            } => write!(
                f,
                "row {} (roll {}): rank {} is given to both {} and {}",
                row, roll, rank, first, second
            ),
            AllocationErrors::InvalidScore { row, roll, score } => {
                write!(f, "row {} (roll {}): invalid score {}", row, roll, score)
            }
            AllocationErrors::RepeatedPreference {
                row,
                roll,
                supervisor,
                first_position,
                second_position,
            } => write!(
                f,
                "row {} (roll {}): supervisor {} is listed at positions {} and {}",
                row, roll, supervisor, first_position, second_position
            ),
        }
    }
}

// ********* Configuration **********

/// What to do when a student gives the same rank to several supervisors.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum DuplicateRankMode {
    /// Every preference list must be a permutation of 1..=M.
    Reject,
    /// Duplicates and gaps are accepted. Supervisors with the same rank
    /// are tried in column order.
    UseColumnOrder,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AllocationRules {
    pub duplicate_rank_mode: DuplicateRankMode,
}

impl AllocationRules {
    pub const DEFAULT_RULES: AllocationRules = AllocationRules {
        duplicate_rank_mode: DuplicateRankMode::Reject,
    };
}

impl Default for AllocationRules {
    fn default() -> Self {
        AllocationRules::DEFAULT_RULES
    }
}
