//! Double-ended linear arena underlying every per-frame allocation.
//!
//! Allocations hand out byte *ranges* into the buffer instead of pointers,
//! so a growth event (which may relocate the backing block) can never leave
//! a dangling reference behind; callers index into [`Buffer::memory`] with
//! the range they were given, within the frame that produced it.

use crate::math::Vector2;

/// Allocation capability for dynamically growing buffers.
///
/// The default [`HeapAllocator`] goes through the global allocator; tests
/// and embedders can substitute their own accounting implementation.
pub trait Allocator {
    /// Returns a zero-initialized block of at least `size` bytes.
    fn alloc(&mut self, size: usize) -> Vec<u8>;
}

#[derive(Debug, Default)]
pub struct HeapAllocator;

impl Allocator for HeapAllocator {
    fn alloc(&mut self, size: usize) -> Vec<u8> {
        vec![0u8; size]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Fixed size block: allocation past capacity fails and is recorded
    /// in the `needed` counter.
    Fixed,
    /// Grows by `grow_factor` when exhausted. Only front-allocated content
    /// survives a growth event.
    Dynamic,
}

/// Which end of the buffer to bump-allocate from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferSide {
    Front = 0,
    Back = 1,
}

/// Diagnostic snapshot of a buffer's allocation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStatus {
    pub kind: BufferKind,
    /// Total size of the backing block.
    pub size: usize,
    /// Bytes currently allocated from both ends.
    pub allocated: usize,
    /// Bytes that failed to allocate; non-zero means the buffer was undersized.
    pub needed: usize,
    /// Number of allocation calls made against this buffer.
    pub calls: usize,
}

pub struct Buffer {
    memory: Vec<u8>,
    kind: BufferKind,
    grow_factor: f32,
    allocator: Option<Box<dyn Allocator>>,
    front: usize,
    back: usize,
    markers: [Option<usize>; 2],
    needed: usize,
    calls: usize,
}

pub(crate) const DEFAULT_ALIGN: usize = core::mem::align_of::<Vector2>();

impl Buffer {
    /// Fixed-size buffer over `size` bytes. No growth; exhaustion is
    /// signalled by `alloc` returning `None` and `status().needed` growing.
    pub fn with_fixed_size(size: usize) -> Self {
        Self {
            back: size,
            memory: vec![0u8; size],
            kind: BufferKind::Fixed,
            grow_factor: 0.0,
            allocator: None,
            front: 0,
            markers: [None, None],
            needed: 0,
            calls: 0,
        }
    }

    /// Dynamically growing buffer starting at `initial_size` bytes.
    pub fn new(allocator: Box<dyn Allocator>, initial_size: usize) -> Self {
        let mut allocator = allocator;
        let memory = allocator.alloc(initial_size);
        Self {
            back: memory.len(),
            memory,
            kind: BufferKind::Dynamic,
            grow_factor: 2.0,
            allocator: Some(allocator),
            front: 0,
            markers: [None, None],
            needed: 0,
            calls: 0,
        }
    }

    pub fn with_default_allocator(initial_size: usize) -> Self {
        Self::new(Box::new(HeapAllocator), initial_size)
    }

    pub fn grow_factor(mut self, factor: f32) -> Self {
        self.grow_factor = factor.max(1.0);
        self
    }

    /// Bump-allocates `size` bytes with the given alignment, returning a
    /// byte range into [`Buffer::memory`]. `None` means exhaustion.
    pub fn alloc(
        &mut self,
        side: BufferSide,
        size: usize,
        align: usize,
    ) -> Option<core::ops::Range<usize>> {
        self.calls += 1;
        let align = align.max(1);
        match side {
            BufferSide::Front => {
                let mut start = align_up(self.front, align);
                if start + size > self.back {
                    if !self.grow(start + size - self.back) {
                        return None;
                    }
                    start = align_up(self.front, align);
                }
                self.front = start + size;
                Some(start..self.front)
            }
            BufferSide::Back => {
                if size > self.back || align_down(self.back - size, align) < self.front {
                    // Growth does not preserve back content, so growing to
                    // satisfy a back allocation would hand out a range into
                    // bytes the next growth event throws away. Fail instead.
                    self.needed += size;
                    return None;
                }
                let start = align_down(self.back - size, align);
                self.back = start;
                Some(start..start + size)
            }
        }
    }

    pub fn alloc_front(&mut self, size: usize) -> Option<core::ops::Range<usize>> {
        self.alloc(BufferSide::Front, size, DEFAULT_ALIGN)
    }

    pub fn alloc_back(&mut self, size: usize) -> Option<core::ops::Range<usize>> {
        self.alloc(BufferSide::Back, size, DEFAULT_ALIGN)
    }

    fn grow(&mut self, shortfall: usize) -> bool {
        if self.kind == BufferKind::Fixed {
            self.needed += shortfall;
            return false;
        }
        let Some(allocator) = self.allocator.as_mut() else {
            self.needed += shortfall;
            return false;
        };
        let want = (self.memory.len() as f32 * self.grow_factor) as usize;
        let want = want.max(self.memory.len() + shortfall);
        let mut block = allocator.alloc(want);
        // Only the front region survives growth; back-allocated content is
        // frame-transient scratch and is dropped with the old block.
        block[..self.front].copy_from_slice(&self.memory[..self.front]);
        self.memory = block;
        self.back = self.memory.len();
        self.markers[BufferSide::Back as usize] = None;
        true
    }

    /// Records the current allocation offset of `side` for a later
    /// [`Buffer::reset_to_marker`], discarding speculative content.
    pub fn mark(&mut self, side: BufferSide) {
        let offset = match side {
            BufferSide::Front => self.front,
            BufferSide::Back => self.back,
        };
        self.markers[side as usize] = Some(offset);
    }

    /// Rewinds `side` to its marker, or all the way back when none is set.
    pub fn reset_to_marker(&mut self, side: BufferSide) {
        let marker = self.markers[side as usize].take();
        match side {
            BufferSide::Front => self.front = marker.unwrap_or(0),
            BufferSide::Back => self.back = marker.unwrap_or(self.memory.len()),
        }
    }

    /// Rewinds both sides to empty, keeping the backing block. Called once
    /// per frame.
    pub fn reset(&mut self) {
        self.front = 0;
        self.back = self.memory.len();
        self.markers = [None, None];
        self.needed = 0;
        self.calls = 0;
    }

    /// Releases the backing memory. The buffer is unusable afterwards until
    /// re-initialized.
    pub fn free(&mut self) {
        self.memory = Vec::new();
        self.front = 0;
        self.back = 0;
        self.markers = [None, None];
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }

    /// Total size of the backing block.
    pub fn total(&self) -> usize {
        self.memory.len()
    }

    /// Bytes allocated from the front.
    pub fn front_len(&self) -> usize {
        self.front
    }

    pub fn status(&self) -> MemoryStatus {
        MemoryStatus {
            kind: self.kind,
            size: self.memory.len(),
            allocated: self.front + (self.memory.len() - self.back),
            needed: self.needed,
            calls: self.calls,
        }
    }
}

impl core::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Buffer")
            .field("kind", &self.kind)
            .field("size", &self.memory.len())
            .field("front", &self.front)
            .field("back", &self.back)
            .finish()
    }
}

fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

fn align_down(value: usize, align: usize) -> usize {
    value & !(align - 1)
}
