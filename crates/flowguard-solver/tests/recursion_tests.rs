use super::*;

#[test]
fn test_enter_and_leave() {
    let mut guard: RecursionGuard<u32> = RecursionGuard::with_profile(RecursionProfile::Comparison);
    assert!(guard.enter(1).is_entered());
    assert!(guard.is_visiting(&1));
    assert_eq!(guard.depth(), 1);
    guard.leave(1);
    assert_eq!(guard.depth(), 0);
    assert!(!guard.is_visiting(&1));
}

#[test]
fn test_reentering_a_key_is_a_cycle() {
    let mut guard: RecursionGuard<u32> = RecursionGuard::new(10, 100);
    assert!(guard.enter(7).is_entered());
    assert!(guard.enter(7).is_cycle());
    assert!(!guard.is_exceeded());
    assert_eq!(guard.depth(), 1);
    guard.leave(7);
}

#[test]
fn test_depth_limit() {
    let mut guard: RecursionGuard<u32> = RecursionGuard::new(2, 100);
    assert!(guard.enter(1).is_entered());
    assert!(guard.enter(2).is_entered());
    assert_eq!(guard.enter(3), RecursionResult::DepthExceeded);
    assert!(guard.is_exceeded());
    guard.leave(2);
    guard.leave(1);
    // Sticky until reset.
    assert!(guard.is_exceeded());
    guard.reset();
    assert!(!guard.is_exceeded());
}

#[test]
fn test_iteration_limit() {
    let mut guard: RecursionGuard<u32> = RecursionGuard::new(10, 2);
    for key in 0..2 {
        assert!(guard.enter(key).is_entered());
        guard.leave(key);
    }
    assert_eq!(guard.enter(5), RecursionResult::IterationExceeded);
    assert!(RecursionResult::IterationExceeded.is_exceeded());
}

#[test]
fn test_profiles() {
    assert_eq!(RecursionProfile::Comparison.max_depth(), 100);
    assert_eq!(RecursionProfile::Validation.max_depth(), 50);
    assert_eq!(
        RecursionProfile::Resolution.limits(),
        RecursionLimits {
            max_depth: 50,
            max_iterations: 100_000,
        }
    );
    let custom = RecursionProfile::Custom {
        max_depth: 3,
        max_iterations: 9,
    };
    assert_eq!(custom.max_depth(), 3);
    assert_eq!(custom.max_iterations(), 9);
}

#[test]
fn test_depth_counter() {
    let mut counter = DepthCounter::new(1);
    assert!(counter.enter());
    assert!(!counter.enter());
    assert!(counter.is_exceeded());
    counter.leave();
    assert_eq!(counter.depth(), 0);
    counter.reset();
    assert!(!counter.is_exceeded());
}
