//! Delimited-continuation support: markers, detached segments, and the
//! split/splice operations.
//!
//! A continuation host delimits a computation by taking a [`Marker`] at the
//! boundary frame. When the computation suspends, everything the marker
//! delimits is detached with [`Stack::pop_segment_above`] into a
//! self-contained [`Segment`]; splicing it back, onto the same stack or a
//! different one, replays it with [`Stack::push_segment`]. Segments copy
//! their slot storage on detach, so the origin stack and the segment never
//! alias; referents inside reference slots are shared.

use std::fmt;

use smallvec::SmallVec;
use tracing::trace;

use crate::record::FrameRecord;
use crate::stack::{SlotRef, Stack, EMPTY, HEADER_WORDS};

/// Inline capacity of a segment's slot arrays. Delimited captures are
/// usually shallow; anything wider spills to the heap.
const SEGMENT_INLINE_WORDS: usize = 8;

/// An opaque position within the stack that created it.
///
/// A marker identifies the frame that was current when it was taken and is
/// only meaningful on its originating stack.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Marker {
    pointer: isize,
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Marker({})", self.pointer)
    }
}

/// A detached, contiguous range of frames together with a relative stack
/// pointer.
///
/// Self-contained: the origin stack keeps no reference into a popped
/// segment, and pushing a segment copies its contents, so one segment can
/// be pushed any number of times, onto any stack.
#[derive(Clone)]
pub struct Segment {
    words: SmallVec<[u64; SEGMENT_INLINE_WORDS]>,
    refs: SmallVec<[Option<SlotRef>; SEGMENT_INLINE_WORDS]>,
    /// Distance from the split point to the captured frame's `sp`; added to
    /// the destination's base position on push.
    sp: isize,
}

impl Segment {
    fn empty() -> Self {
        Segment {
            words: SmallVec::new(),
            refs: SmallVec::new(),
            sp: EMPTY,
        }
    }

    /// True when the segment holds no frames.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of frames held.
    pub fn frame_count(&self) -> usize {
        let mut count = 0;
        let mut k = 0;
        while k < self.words.len() {
            let record = FrameRecord::from_raw(self.words[k]);
            k += 1 + record.num_slots() as usize;
            count += 1;
        }
        count
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "segment sp={}", self.sp)?;
        let mut m = 0;
        let mut k = 0;
        while k < self.words.len() {
            let record = FrameRecord::from_raw(self.words[k]);
            k += 1;
            writeln!(
                f,
                "  frame {m}: entry={} slots={} prev_slots={}",
                record.entry(),
                record.num_slots(),
                record.prev_num_slots()
            )?;
            for i in 0..record.num_slots() as usize {
                let has_ref = if self.refs[k].is_some() { "ref" } else { "-" };
                writeln!(f, "    slot {i}: word={:#018x} ref={has_ref}", self.words[k])?;
                k += 1;
            }
            m += 1;
        }
        Ok(())
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Segment {{ frames: {}, sp: {} }}", self.frame_count(), self.sp)
    }
}

impl Stack {
    /// Returns a marker for the frame that is current right now.
    pub fn current_frame(&self) -> Marker {
        if self.sp == EMPTY {
            Marker { pointer: EMPTY }
        } else {
            Marker { pointer: self.sp - HEADER_WORDS }
        }
    }

    /// Makes the frame identified by `marker` current again. Frames above
    /// it stay in storage but become logically inactive; they are
    /// overwritten by subsequent pushes.
    pub fn resume_at(&mut self, marker: Marker) {
        trace!(marker = %marker, "resume_at");
        self.sp = if marker.pointer == EMPTY {
            EMPTY
        } else {
            marker.pointer + HEADER_WORDS
        };
    }

    /// Splits the stack at `marker`: the marker's frame and everything
    /// above it, up to and including the current frame, move into a new
    /// [`Segment`]; the frame below the marker becomes current. Vacated
    /// reference slots are released and the header at the split point is
    /// zeroed so the next entry observes a fresh frame.
    ///
    /// On an empty stack this returns an empty segment and changes nothing.
    ///
    /// # Panics
    ///
    /// Panics if `marker` lies above the current stack pointer.
    pub fn pop_segment_above(&mut self, marker: Marker) -> Segment {
        trace!(marker = %marker, sp = self.sp, "pop_segment_above");
        if marker.pointer > self.sp {
            panic!("marker {} is above the stack pointer {}", marker.pointer, self.sp);
        }
        if self.sp == EMPTY {
            return Segment::empty();
        }

        let from = marker.pointer.max(0) as usize;
        let to = (self.sp + self.current_record().num_slots() as isize) as usize;
        let old_sp = self.sp;

        let words = SmallVec::from_slice(&self.data_long[from..to]);
        let mut refs = SmallVec::with_capacity(to - from);
        for slot in &mut self.data_ref[from..to] {
            refs.push(slot.take());
        }

        let first = FrameRecord::from_raw(words[0]);
        let new_sp = from as isize - first.prev_num_slots() as isize;
        self.sp = if new_sp == 0 { EMPTY } else { new_sp };

        // The next entry at the split point must observe a fresh frame.
        self.data_long[from] = 0;

        Segment { words, refs, sp: old_sp - new_sp }
    }

    /// Splices `segment`'s frames above the current frame and makes the
    /// segment's originally-current frame current. Grows storage to fit.
    ///
    /// The spliced bottom frame's `prev_num_slots` is rewritten against the
    /// destination's current frame, so a segment captured over one parent
    /// replays correctly over another. The segment is copied in, not
    /// consumed.
    pub fn push_segment(&mut self, segment: &Segment) {
        if segment.is_empty() {
            trace!("push_segment: empty segment");
            return;
        }

        let base = if self.sp == EMPTY { 0 } else { self.sp };
        let current_slots = self.current_record().num_slots();
        let first = (base + current_slots as isize) as usize;
        let last = first + segment.words.len();
        self.ensure_capacity(last + HEADER_WORDS as usize);

        self.data_long[first..last].copy_from_slice(&segment.words);
        for (dst, src) in self.data_ref[first..last].iter_mut().zip(&segment.refs) {
            *dst = src.clone();
        }

        let record = FrameRecord::from_raw(self.data_long[first]).with_prev_num_slots(current_slots);
        self.data_long[first] = record.raw();

        // Fresh header above the spliced region.
        self.data_long[last] = 0;

        self.sp = base + segment.sp;
        trace!(sp = self.sp, "push_segment");
    }
}
