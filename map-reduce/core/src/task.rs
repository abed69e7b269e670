// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{Phase, ScheduleError};
use serde::{Deserialize, Serialize};

/// Arguments passed to a worker when a task is scheduled on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub job_name: String,
    /// Input file for a map task; carried along unchanged for reduce tasks
    pub input: String,
    pub phase: Phase,
    pub task_index: usize,
    /// Number of partitions to write (map) or map outputs to read (reduce)
    pub other_phase_count: usize,
}

/// Returns `(ntasks, other_phase_count)` for a phase
pub fn phase_counts(phase: Phase, num_inputs: usize, n_reduce: usize) -> (usize, usize) {
    match phase {
        Phase::Map => (num_inputs, n_reduce),
        Phase::Reduce => (n_reduce, num_inputs),
    }
}

/// Builds exactly one task per index of the phase.
///
/// Inputs are selected by `index % inputs.len()`, so a phase with more
/// tasks than inputs reuses the input list cyclically.
pub fn plan_tasks(
    job_name: &str,
    phase: Phase,
    inputs: &[String],
    n_reduce: usize,
) -> Result<Vec<Task>, ScheduleError> {
    let (ntasks, other_phase_count) = phase_counts(phase, inputs.len(), n_reduce);
    if ntasks > 0 && inputs.is_empty() {
        return Err(ScheduleError::EmptyInputs { phase, ntasks });
    }

    Ok((0..ntasks)
        .map(|task_index| Task {
            job_name: job_name.to_string(),
            input: inputs[task_index % inputs.len()].clone(),
            phase,
            task_index,
            other_phase_count,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_map_phase_has_one_task_per_input() {
        let tasks = plan_tasks("wc", Phase::Map, &inputs(&["a", "b", "c"]), 5).unwrap();

        assert_eq!(tasks.len(), 3);
        for (i, task) in tasks.iter().enumerate() {
            assert_eq!(task.task_index, i);
            assert_eq!(task.other_phase_count, 5);
            assert_eq!(task.phase, Phase::Map);
        }
        assert_eq!(tasks[2].input, "c");
    }

    #[test]
    fn test_reduce_inputs_wrap_around_input_list() {
        let tasks = plan_tasks("wc", Phase::Reduce, &inputs(&["in0", "in1"]), 5).unwrap();

        assert_eq!(tasks.len(), 5);
        let picked: Vec<&str> = tasks.iter().map(|t| t.input.as_str()).collect();
        assert_eq!(picked, vec!["in0", "in1", "in0", "in1", "in0"]);
        assert!(tasks.iter().all(|t| t.other_phase_count == 2));
    }

    #[test]
    fn test_reduce_without_inputs_is_rejected() {
        let result = plan_tasks("wc", Phase::Reduce, &[], 3);
        assert!(matches!(
            result,
            Err(ScheduleError::EmptyInputs { ntasks: 3, .. })
        ));
    }

    #[test]
    fn test_empty_map_phase_plans_nothing() {
        let tasks = plan_tasks("wc", Phase::Map, &[], 3).unwrap();
        assert!(tasks.is_empty());
    }
}
