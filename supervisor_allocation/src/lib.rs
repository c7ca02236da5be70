pub mod builder;
mod config;
pub mod manual;
mod roll;

use log::{debug, info, warn};

use std::collections::{HashMap, HashSet};

pub use crate::config::*;
pub use crate::roll::{roll_sort_key, RollKey};

// **** Private structures ****

type RoundId = u32;

// The position of the supervisor in the columns of the input.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct SupervisorId(usize);

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
struct SupervisorCapacity {
    total: usize,
    remaining: usize,
}

/// The capacities of all the supervisors for one run, indexed by SupervisorId.
///
/// Invariant: remaining <= total, and remaining only decreases.
#[derive(Eq, PartialEq, Debug, Clone)]
struct CapacityLedger(Vec<SupervisorCapacity>);

impl CapacityLedger {
    fn from_totals(totals: &[usize]) -> CapacityLedger {
        CapacityLedger(
            totals
                .iter()
                .map(|&total| SupervisorCapacity {
                    total,
                    remaining: total,
                })
                .collect(),
        )
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn has_room(&self, sid: SupervisorId) -> bool {
        self.0[sid.0].remaining > 0
    }

    fn take(&mut self, sid: SupervisorId) {
        let c = &mut self.0[sid.0];
        assert!(c.remaining > 0, "supervisor {:?} has no room left", sid);
        c.remaining -= 1;
    }

    fn total(&self, sid: SupervisorId) -> usize {
        self.0[sid.0].total
    }

    fn assigned(&self, sid: SupervisorId) -> usize {
        let c = self.0[sid.0];
        c.total - c.remaining
    }
}

// A student that passed the checks.
#[derive(Eq, PartialEq, Debug, Clone)]
struct StudentInternal {
    // All the supervisors, most preferred first.
    preferences: Vec<SupervisorId>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
struct RoundStatistics {
    // (student index, supervisor) in the order of the assignments
    assignments: Vec<(usize, SupervisorId)>,
    unassigned: Vec<usize>,
}

/// Runs the allocation of the students to the supervisors.
///
/// Arguments:
/// * `students` the students, in the order of the input table
/// * `supervisors` the names of the supervisors, in the order of the columns. The ranks
/// of every student follow the same order.
/// * `rules` the rules that govern the validation of the preferences
pub fn run_allocation(
    students: &[Student],
    supervisors: &[String],
    rules: &AllocationRules,
) -> Result<AllocationResult, AllocationErrors> {
    info!(
        "run_allocation: Processing {:?} students, {:?} supervisors, rules: {:?}",
        students.len(),
        supervisors.len(),
        rules
    );

    let checked_students = checks(students, supervisors, rules)?;
    let preference_counts = tally_preferences(students, supervisors)?;

    let mut ledger = plan_capacity_ledger(students.len(), supervisors.len())?;
    for (idx, name) in supervisors.iter().enumerate() {
        info!(
            "Supervisor: {}: {} (capacity {})",
            idx + 1,
            name,
            ledger.total(SupervisorId(idx))
        );
    }

    let order = priority_order(students);
    debug!("run_allocation: priority order: {:?}", order);

    let (assignments, rounds) = allocate_rounds(&checked_students, &order, &mut ledger);

    let round_stats = round_results_to_stats(&rounds, students, supervisors);
    for rs in round_stats.iter() {
        info!("Round {}", rs.round);
        for (roll, supervisor) in rs.assignments.iter() {
            info!("      {} -> {}", roll, supervisor);
        }
        for roll in rs.unassigned.iter() {
            warn!("      {} -> unassigned", roll);
        }
    }

    let by_score: Vec<AllocatedStudent> = order
        .iter()
        .map(|&idx| {
            let s = &students[idx];
            AllocatedStudent {
                input_index: idx,
                roll: s.roll.clone(),
                name: s.name.clone(),
                email: s.email.clone(),
                score: s.score,
                supervisor: assignments[idx].map(|sid| supervisors[sid.0].clone()),
            }
        })
        .collect();

    let mut by_roll = by_score.clone();
    by_roll.sort_by_cached_key(|s| roll_sort_key(&s.roll));

    let supervisor_stats: Vec<SupervisorStats> = supervisors
        .iter()
        .enumerate()
        .map(|(idx, name)| SupervisorStats {
            name: name.clone(),
            capacity: ledger.total(SupervisorId(idx)),
            assigned: ledger.assigned(SupervisorId(idx)),
        })
        .collect();

    Ok(AllocationResult {
        supervisors: supervisor_stats,
        preference_counts,
        by_score,
        by_roll,
        round_stats,
    })
}

/// The number of students that each supervisor can take, in column order.
///
/// Every supervisor receives `num_students / M` students, and the first
/// `num_students % M` supervisors receive one more. The capacities sum to `num_students`.
///
/// ```
/// use supervisor_allocation::plan_capacities;
///
/// let caps = plan_capacities(5, &["F1".to_string(), "F2".to_string()])?;
/// assert_eq!(caps, vec![("F1".to_string(), 3), ("F2".to_string(), 2)]);
/// # Ok::<(), supervisor_allocation::AllocationErrors>(())
/// ```
pub fn plan_capacities(
    num_students: usize,
    supervisors: &[String],
) -> Result<Vec<(String, usize)>, AllocationErrors> {
    let ledger = plan_capacity_ledger(num_students, supervisors.len())?;
    Ok(supervisors
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.clone(), ledger.total(SupervisorId(idx))))
        .collect())
}

fn plan_capacity_ledger(
    num_students: usize,
    num_supervisors: usize,
) -> Result<CapacityLedger, AllocationErrors> {
    if num_supervisors == 0 {
        return Err(AllocationErrors::NoSupervisors);
    }
    let base = num_students / num_supervisors;
    let extra = num_students % num_supervisors;
    let totals: Vec<usize> = (0..num_supervisors)
        .map(|idx| if idx < extra { base + 1 } else { base })
        .collect();
    debug!(
        "plan_capacity_ledger: base: {:?} extra: {:?} totals: {:?}",
        base, extra, totals
    );
    Ok(CapacityLedger::from_totals(&totals))
}

/// Counts, for every supervisor, how many students gave it each rank.
///
/// This is a diagnostic table: it plays no role in the allocation itself.
pub fn tally_preferences(
    students: &[Student],
    supervisors: &[String],
) -> Result<Vec<PreferenceCount>, AllocationErrors> {
    let num_supervisors = supervisors.len();
    if num_supervisors == 0 {
        return Err(AllocationErrors::NoSupervisors);
    }
    let mut counts: Vec<Vec<u64>> = vec![vec![0; num_supervisors]; num_supervisors];
    for (idx, s) in students.iter().enumerate() {
        check_num_ranks(idx, s, num_supervisors)?;
        for (col, &rank) in s.ranks.iter().enumerate() {
            let pos = rank_position(idx, s, supervisors, col, rank)?;
            counts[col][pos] += 1;
        }
    }
    Ok(supervisors
        .iter()
        .zip(counts)
        .map(|(name, counts)| PreferenceCount {
            supervisor: name.clone(),
            counts,
        })
        .collect())
}

/// The indexes of the students, by decreasing score.
///
/// Students with the same score keep their relative order. Scores are expected to be
/// finite, which `run_allocation` checks first. Otherwise the order is still total:
/// NaN comes before every number and infinities sit at both ends.
pub fn priority_order(students: &[Student]) -> Vec<usize> {
    // Adding 0.0 turns -0.0 into 0.0, so that both count as the same score.
    let score = |idx: usize| students[idx].score + 0.0;
    let mut order: Vec<usize> = (0..students.len()).collect();
    order.sort_by(|&a, &b| score(b).total_cmp(&score(a)));
    order
}

// The students are taken by groups of M in priority order. Within a group, a supervisor
// receives at most one student.
fn allocate_rounds(
    students: &[StudentInternal],
    order: &[usize],
    ledger: &mut CapacityLedger,
) -> (Vec<Option<SupervisorId>>, Vec<RoundStatistics>) {
    let round_size = ledger.len();
    assert!(round_size > 0);
    let mut assignments: Vec<Option<SupervisorId>> = vec![None; students.len()];
    let mut rounds: Vec<RoundStatistics> = Vec::new();

    for group in order.chunks(round_size) {
        // Supervisors already full before the round started are not part of it.
        let mut available: Vec<bool> = (0..round_size)
            .map(|idx| ledger.has_room(SupervisorId(idx)))
            .collect();
        debug!(
            "allocate_rounds: round {:?} group: {:?} available: {:?}",
            rounds.len() + 1,
            group,
            available
        );
        let mut stats = RoundStatistics::default();
        for &sidx in group {
            let choice = students[sidx]
                .preferences
                .iter()
                .copied()
                .find(|sid| available[sid.0] && ledger.has_room(*sid));
            match choice {
                Some(sid) => {
                    ledger.take(sid);
                    available[sid.0] = false;
                    assignments[sidx] = Some(sid);
                    stats.assignments.push((sidx, sid));
                }
                None => {
                    debug!(
                        "allocate_rounds: student {:?} exhausted all preferences",
                        sidx
                    );
                    stats.unassigned.push(sidx);
                }
            }
        }
        rounds.push(stats);
    }
    (assignments, rounds)
}

fn round_results_to_stats(
    rounds: &[RoundStatistics],
    students: &[Student],
    supervisors: &[String],
) -> Vec<RoundStats> {
    rounds
        .iter()
        .enumerate()
        .map(|(idx, r)| RoundStats {
            round: idx as RoundId + 1,
            assignments: r
                .assignments
                .iter()
                .map(|(sidx, sid)| (students[*sidx].roll.clone(), supervisors[sid.0].clone()))
                .collect(),
            unassigned: r
                .unassigned
                .iter()
                .map(|sidx| students[*sidx].roll.clone())
                .collect(),
        })
        .collect()
}

fn check_num_ranks(
    idx: usize,
    student: &Student,
    num_supervisors: usize,
) -> Result<(), AllocationErrors> {
    if student.ranks.len() != num_supervisors {
        return Err(AllocationErrors::WrongNumberOfRanks {
            row: idx + 1,
            roll: student.roll.clone(),
            expected: num_supervisors,
            found: student.ranks.len(),
        });
    }
    Ok(())
}

// The 0-based position of a rank, if it is a valid one.
fn rank_position(
    idx: usize,
    student: &Student,
    supervisors: &[String],
    col: usize,
    rank: u32,
) -> Result<usize, AllocationErrors> {
    let pos = rank as usize;
    if pos == 0 || pos > supervisors.len() {
        return Err(AllocationErrors::RankOutOfRange {
            row: idx + 1,
            roll: student.roll.clone(),
            supervisor: supervisors[col].clone(),
            rank,
            max_rank: supervisors.len(),
        });
    }
    Ok(pos - 1)
}

// Students are returned in the same order.
fn checks(
    students: &[Student],
    supervisors: &[String],
    rules: &AllocationRules,
) -> Result<Vec<StudentInternal>, AllocationErrors> {
    debug!("checks: students: {:?}", students.len());
    if supervisors.is_empty() {
        return Err(AllocationErrors::NoSupervisors);
    }
    let mut seen_names: HashSet<&String> = HashSet::new();
    for name in supervisors.iter() {
        if !seen_names.insert(name) {
            return Err(AllocationErrors::DuplicateSupervisor { name: name.clone() });
        }
    }

    let num_supervisors = supervisors.len();
    let mut res: Vec<StudentInternal> = Vec::with_capacity(students.len());
    for (idx, s) in students.iter().enumerate() {
        if !s.score.is_finite() {
            return Err(AllocationErrors::InvalidScore {
                row: idx + 1,
                roll: s.roll.clone(),
                score: s.score,
            });
        }
        check_num_ranks(idx, s, num_supervisors)?;

        // Rank -> column of the first supervisor with this rank
        let mut seen_ranks: HashMap<u32, usize> = HashMap::new();
        for (col, &rank) in s.ranks.iter().enumerate() {
            rank_position(idx, s, supervisors, col, rank)?;
            if let Some(first_col) = seen_ranks.insert(rank, col) {
                if rules.duplicate_rank_mode == DuplicateRankMode::Reject {
                    return Err(AllocationErrors::DuplicateRank {
                        row: idx + 1,
                        roll: s.roll.clone(),
                        rank,
                        first: supervisors[first_col].clone(),
                        second: supervisors[col].clone(),
                    });
                }
                // Keep the first column for reporting purposes.
                seen_ranks.insert(rank, first_col);
            }
        }

        // The sort is stable: equal ranks stay in column order.
        let mut preferences: Vec<SupervisorId> = (0..num_supervisors).map(SupervisorId).collect();
        preferences.sort_by_key(|sid| s.ranks[sid.0]);
        debug!("checks: student {:?} preferences: {:?}", s.roll, preferences);
        res.push(StudentInternal { preferences });
    }
    Ok(res)
}
