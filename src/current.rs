//! Resolution of "the stack for the current computation".
//!
//! Lookup order: the running continuation's stack, then the running
//! fiber's stack, then a lazily created per-thread default. The first two
//! are installed and cleared by external schedulers around the
//! computations they run; each setter returns the previous registration so
//! hosts can nest. All three cells are thread-local: "current stack" is a
//! thread-confined notion and never locks.

use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use crate::stack::{Stack, DEFAULT_STACK_SIZE};

/// Shared per-thread handle to a [`Stack`].
pub type StackHandle = Rc<RefCell<Stack>>;

thread_local! {
    static CONTINUATION_STACK: RefCell<Option<StackHandle>> = const { RefCell::new(None) };
    static FIBER_STACK: RefCell<Option<StackHandle>> = const { RefCell::new(None) };
    static THREAD_STACK: OnceCell<StackHandle> = const { OnceCell::new() };
}

/// Resolves the stack of the computation running on this thread.
///
/// Falls back to a per-thread default stack (no context, default capacity)
/// when no continuation or fiber is registered, so uninstrumented callers
/// of instrumented code still get a working stack.
pub fn current_stack() -> StackHandle {
    if let Some(stack) = CONTINUATION_STACK.with(|slot| slot.borrow().clone()) {
        return stack;
    }
    if let Some(stack) = FIBER_STACK.with(|slot| slot.borrow().clone()) {
        return stack;
    }
    THREAD_STACK.with(|slot| {
        slot.get_or_init(|| Rc::new(RefCell::new(Stack::new(DEFAULT_STACK_SIZE))))
            .clone()
    })
}

/// Installs the stack of the continuation now running on this thread.
/// Returns the previous registration.
pub fn set_continuation_stack(stack: Option<StackHandle>) -> Option<StackHandle> {
    CONTINUATION_STACK.with(|slot| slot.replace(stack))
}

/// Installs the stack of the fiber now running on this thread. Returns the
/// previous registration.
pub fn set_fiber_stack(stack: Option<StackHandle>) -> Option<StackHandle> {
    FIBER_STACK.with(|slot| slot.replace(stack))
}
