//! # weft: shadow stacks for suspendable computations
//!
//! A suspendable computation cannot keep its state on the runtime call
//! stack: when it suspends, that stack unwinds. `weft` materializes the
//! computation's frames on the heap instead. Instrumented methods save
//! their live locals and a continuation label into a [`Stack`] before each
//! suspendable call; on resume the saved frames are replayed one
//! `next_method_entry` at a time, re-entering each method at the label it
//! recorded.
//!
//! The crate also provides delimited-continuation primitives: a [`Marker`]
//! delimits a region of the stack, [`Stack::pop_segment_above`] detaches
//! it as a transferable [`Segment`], and [`Stack::push_segment`] splices a
//! segment onto any stack.
//!
//! ## The frame protocol
//!
//! Every instrumented method follows one shape: read an entry label at the
//! top and dispatch on it (0 means fresh entry), save locals and push a
//! label before each suspendable sub-call, pop on normal return.
//!
//! ```
//! use std::sync::Arc;
//! use weft::Stack;
//!
//! let mut stack = Stack::new(16);
//!
//! // Outer method enters fresh, saves two locals, continues at label 1.
//! assert_eq!(stack.next_method_entry(), 0);
//! stack.push_method(1, 2);
//! stack.push_ref(Arc::new(true), 0);
//! stack.push_i64(2, 1);
//!
//! // Inner method enters fresh, saves one local, continues at label 7.
//! assert_eq!(stack.next_method_entry(), 0);
//! stack.push_method(7, 1);
//! stack.push_i32(42, 0);
//!
//! // ... the computation suspends, and is later replayed:
//! stack.resume_stack();
//! assert_eq!(stack.next_method_entry(), 1);
//! assert_eq!(stack.get_ref(0).unwrap().downcast_ref::<bool>(), Some(&true));
//! assert_eq!(stack.get_i64(1), 2);
//! assert_eq!(stack.next_method_entry(), 7);
//! assert_eq!(stack.get_i32(0), 42);
//! ```
//!
//! ## Layout
//!
//! Frames are packed: one growable word array interleaves bit-packed
//! header words with 64-bit primitive slots, and a reference array runs in
//! lock-step. Storage doubles on demand and never shrinks.
//!
//! A stack belongs to one computation at a time and is driven
//! synchronously; suspension and scheduling happen around it, never inside
//! it.

mod record;

pub mod current;
pub mod segment;
pub mod stack;

pub use current::{current_stack, set_continuation_stack, set_fiber_stack, StackHandle};
pub use record::{MAX_ENTRY, MAX_SLOTS};
pub use segment::{Marker, Segment};
pub use stack::{FrameView, Frames, OwnerContext, SlotRef, Stack};
