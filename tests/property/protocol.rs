// Property tests for the frame protocol: replay fidelity, nesting
// balance, and growth transparency.

use proptest::prelude::*;
use weft::Stack;

use super::strategies::{arb_chain, build, replay_and_check, FrameSpec};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // =========================================================================
    // Save / restore round-trip
    // =========================================================================

    #[test]
    fn replay_restores_every_label_and_slot(chain in arb_chain()) {
        let mut stack = Stack::new(16);
        build(&mut stack, &chain);
        replay_and_check(&mut stack, &chain);
        // Nothing was popped, so the replay can run again.
        replay_and_check(&mut stack, &chain);
    }

    #[test]
    fn fresh_stacks_always_enter_at_zero(capacity in 1usize..512) {
        let mut stack = Stack::new(capacity);
        prop_assert_eq!(stack.next_method_entry(), 0);
    }

    // =========================================================================
    // Nesting balance
    // =========================================================================

    #[test]
    fn pops_return_to_each_enter_point(chain in arb_chain()) {
        let mut stack = Stack::new(16);
        let mut markers = Vec::with_capacity(chain.len());
        for frame in &chain {
            stack.next_method_entry();
            markers.push(stack.current_frame());
            stack.push_method(frame.entry, frame.values.len() as u32);
        }

        for marker in markers.iter().rev() {
            prop_assert_eq!(stack.current_frame(), *marker);
            stack.pop_method();
        }
        prop_assert!(stack.is_empty());
    }

    #[test]
    fn partial_unwind_then_rebuild_replays(chain in arb_chain(), extra in arb_chain()) {
        let mut stack = Stack::new(16);
        build(&mut stack, &chain);

        // The top frame returns normally, then a different sub-chain runs.
        stack.pop_method();
        let survivors = &chain[..chain.len() - 1];
        for frame in extra.iter() {
            stack.next_method_entry();
            stack.push_method(frame.entry, frame.values.len() as u32);
            super::strategies::store(&mut stack, &frame.values);
        }

        let expected: Vec<FrameSpec> =
            survivors.iter().chain(extra.iter()).cloned().collect();
        replay_and_check(&mut stack, &expected);
    }

    // =========================================================================
    // prev_num_slots chain
    // =========================================================================

    #[test]
    fn every_frame_links_to_its_parents_width(chain in arb_chain()) {
        let mut stack = Stack::new(16);
        build(&mut stack, &chain);

        let widths: Vec<u32> = stack.frames().map(|f| f.num_slots).collect();
        let links: Vec<u32> = stack.frames().map(|f| f.prev_num_slots).collect();
        prop_assert_eq!(links[0], 0);
        for i in 1..links.len() {
            prop_assert_eq!(links[i], widths[i - 1]);
        }
    }

    // =========================================================================
    // Growth transparency
    // =========================================================================

    #[test]
    fn growth_is_observationally_invisible(chain in arb_chain()) {
        let mut small = Stack::new(1);
        let mut large = Stack::new(1 << 12);
        build(&mut small, &chain);
        build(&mut large, &chain);

        prop_assert_eq!(small.current_frame(), large.current_frame());
        prop_assert_eq!(small.dump(), large.dump());

        replay_and_check(&mut small, &chain);
        replay_and_check(&mut large, &chain);
    }
}
