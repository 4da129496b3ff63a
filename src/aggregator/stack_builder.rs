//! Build collapsed stack format from profile samples.
//!
//! Collapsed stacks are the input format for external flamegraph tools.
//! Format: "root;caller;callee weight"
//!
//! Example: "main.main;main.worker;runtime.chanrecv1 250000"
//! This means: 250000 ns were spent blocked at chanrecv1, reached from main.worker.

use super::profile::Profile;
use log::debug;
use std::collections::HashMap;

/// A single collapsed stack entry
///
/// **Public** - used by the folded output writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string, root first
    pub stack: String,

    /// Weight (nanoseconds attributed to this stack)
    pub weight: u64,
}

impl CollapsedStack {
    /// Create a new collapsed stack
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// One line of folded output
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Build collapsed stacks from a profile
///
/// **Public** - main entry point for stack building
///
/// # Arguments
/// * `profile` - Profile computed by the aggregator
///
/// # Returns
/// Vector of collapsed stacks, one per unique folded path
///
/// # Algorithm
/// 1. Fold each sample's stack root-first into a `;` joined string
/// 2. Aggregate by folded string (stacks differing only in file or line
///    fold to the same path)
/// 3. Sort by weight descending
pub fn build_collapsed_stacks(profile: &Profile) -> Vec<CollapsedStack> {
    debug!(
        "Building collapsed stacks from {} {} samples",
        profile.samples.len(),
        profile.kind
    );

    let mut stack_map: HashMap<String, u64> = HashMap::new();
    for sample in &profile.samples {
        let weight = u64::try_from(sample.duration_ns).unwrap_or(0);
        *stack_map.entry(sample.folded_stack()).or_insert(0) += weight;
    }

    let mut stacks: Vec<CollapsedStack> = stack_map
        .into_iter()
        .map(|(stack, weight)| CollapsedStack::new(stack, weight))
        .collect();

    stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.stack.cmp(&b.stack)));

    debug!("Built {} unique collapsed stacks", stacks.len());

    stacks
}

impl Profile {
    /// Folded stack lines, heaviest first
    pub fn collapsed(&self) -> Vec<String> {
        build_collapsed_stacks(self)
            .iter()
            .map(CollapsedStack::to_line)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::profile::Sample;
    use crate::model::{Frame, ProfileKind};

    fn sample(frames: &[(&str, i64)], duration_ns: i64) -> Sample {
        Sample {
            stack: frames
                .iter()
                .map(|(func, line)| Frame::new(0, *func, "x.go", *line))
                .collect(),
            count: 1,
            duration_ns,
        }
    }

    #[test]
    fn test_collapsed_stack_to_line() {
        let stack = CollapsedStack::new("main.main;main.run;syscall.Read".to_string(), 1000);
        assert_eq!(stack.to_line(), "main.main;main.run;syscall.Read 1000");
    }

    #[test]
    fn test_same_functions_different_lines_fold_together() {
        let profile = Profile {
            kind: ProfileKind::Block,
            samples: vec![
                sample(&[("sync.Wait", 1), ("main.main", 5)], 300),
                sample(&[("sync.Wait", 1), ("main.main", 9)], 200),
                sample(&[("chan.recv", 1), ("main.main", 5)], 400),
            ],
            diagnostics: vec![],
        };

        let stacks = build_collapsed_stacks(&profile);
        assert_eq!(stacks.len(), 2);
        assert_eq!(stacks[0], CollapsedStack::new("main.main;sync.Wait".to_string(), 500));
        assert_eq!(profile.collapsed()[1], "main.main;chan.recv 400");
    }
}
