//! Narrowing combinator shared by the host selector and the distributor.
//!
//! A step keeps the candidates passing its predicate, unless none pass: then
//! the step is discarded and the list from before it is kept. A chain of steps
//! can never strand a team or leave a pool without a host candidate.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Narrowing {
    Applied,
    /// Every candidate failed, step discarded.
    Relaxed,
}

pub fn narrow<T>(candidates: Vec<T>, mut keep: impl FnMut(&T) -> bool) -> (Vec<T>, Narrowing) {
    let mask: Vec<bool> = candidates.iter().map(&mut keep).collect();
    if !mask.contains(&true) {
        return (candidates, Narrowing::Relaxed);
    }
    let kept = candidates.into_iter().zip(mask).filter_map(|(c, k)| k.then_some(c)).collect();
    (kept, Narrowing::Applied)
}

/// Folds `narrow` over several predicates in order.
pub fn narrow_all<T>(candidates: Vec<T>, steps: &mut [&mut dyn FnMut(&T) -> bool]) -> Vec<T> {
    steps.iter_mut().fold(candidates, |acc, step| narrow(acc, |c| step(c)).0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrow_applies() {
        let (kept, outcome) = narrow(vec![1, 2, 3, 4], |n| n % 2 == 0);
        assert_eq!(kept, vec![2, 4]);
        assert_eq!(outcome, Narrowing::Applied);
    }

    #[test]
    fn test_narrow_never_empties() {
        let (kept, outcome) = narrow(vec![1, 3], |n| n % 2 == 0);
        assert_eq!(kept, vec![1, 3]);
        assert_eq!(outcome, Narrowing::Relaxed);
    }

    #[test]
    fn test_narrow_all_skips_only_the_emptying_step() {
        let mut even = |n: &i32| n % 2 == 0;
        let mut over_ten = |n: &i32| *n > 10;
        let mut small = |n: &i32| *n < 5;
        let kept = narrow_all(vec![1, 2, 3, 4, 6], &mut [&mut even, &mut over_ten, &mut small]);
        assert_eq!(kept, vec![2, 4]);
    }

    #[test]
    fn test_empty_input_stays_empty() {
        let (kept, _) = narrow(Vec::<i32>::new(), |_| true);
        assert!(kept.is_empty());
    }
}
