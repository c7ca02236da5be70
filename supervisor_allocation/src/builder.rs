pub use crate::config::*;

/// A builder for adding students.
///
/// ```
/// pub use supervisor_allocation::builder::Builder;
/// pub use supervisor_allocation::AllocationRules;
/// # use supervisor_allocation::AllocationErrors;
///
/// let mut builder = Builder::new(&AllocationRules::DEFAULT_RULES)?
///     .supervisors(&["Anna".to_string(), "Bob".to_string()])?;
///
/// builder.add_student("CS01", "Clara", "clara@example.com", 8.5, &[2, 1])?;
/// builder.add_student_by_preference("CS02", "Dan", "dan@example.com", 9.1, &["Anna".to_string(), "Bob".to_string()])?;
///
/// let result = builder.run()?;
/// assert_eq!(result.by_roll[0].supervisor, Some("Bob".to_string()));
///
/// # Ok::<(), AllocationErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: AllocationRules,
    pub(crate) _supervisors: Vec<String>,
    pub(crate) _students: Vec<Student>,
}

impl Builder {
    pub fn new(rules: &AllocationRules) -> Result<Builder, AllocationErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _supervisors: Vec::new(),
            _students: Vec::new(),
        })
    }

    /// Sets the supervisors, in column order. Drops the students added so far.
    pub fn supervisors(self, names: &[String]) -> Result<Builder, AllocationErrors> {
        if names.is_empty() {
            return Err(AllocationErrors::NoSupervisors);
        }
        for (idx, name) in names.iter().enumerate() {
            if names[..idx].contains(name) {
                return Err(AllocationErrors::DuplicateSupervisor { name: name.clone() });
            }
        }
        Ok(Builder {
            _rules: self._rules,
            _supervisors: names.to_vec(),
            _students: Vec::new(),
        })
    }

    /// Adds a student with one rank per supervisor, in column order.
    pub fn add_student(
        &mut self,
        roll: &str,
        name: &str,
        email: &str,
        score: f64,
        ranks: &[u32],
    ) -> Result<(), AllocationErrors> {
        self.add_student_2(&Student {
            roll: roll.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            score,
            ranks: ranks.to_vec(),
        })
    }

    /// Adds a student from the list of supervisor names, most preferred first.
    ///
    /// The list must contain every supervisor exactly once.
    pub fn add_student_by_preference(
        &mut self,
        roll: &str,
        name: &str,
        email: &str,
        score: f64,
        preferences: &[String],
    ) -> Result<(), AllocationErrors> {
        let row = self._students.len() + 1;
        if preferences.len() != self._supervisors.len() {
            return Err(AllocationErrors::WrongNumberOfRanks {
                row,
                roll: roll.to_string(),
                expected: self._supervisors.len(),
                found: preferences.len(),
            });
        }
        let mut ranks: Vec<u32> = vec![0; self._supervisors.len()];
        for (pos, pref) in preferences.iter().enumerate() {
            // Unknown names stay at rank 0, which the allocation rejects.
            if let Some(col) = self._supervisors.iter().position(|s| s == pref) {
                if ranks[col] != 0 {
                    return Err(AllocationErrors::RepeatedPreference {
                        row,
                        roll: roll.to_string(),
                        supervisor: pref.clone(),
                        first_position: ranks[col] as usize,
                        second_position: pos + 1,
                    });
                }
                ranks[col] = pos as u32 + 1;
            }
        }
        self.add_student(roll, name, email, score, &ranks)
    }

    pub fn add_student_2(&mut self, student: &Student) -> Result<(), AllocationErrors> {
        self._students.push(student.clone());
        Ok(())
    }

    pub fn run(&self) -> Result<AllocationResult, AllocationErrors> {
        crate::run_allocation(&self._students, &self._supervisors, &self._rules)
    }
}
