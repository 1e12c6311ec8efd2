//! Stack and call frame management
//!
//! The stack holds both operands and the locals of every active frame.
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │ Operand Stack (top)                 │
//! │   value₁                            │
//! │   value₀                            │
//! ├─────────────────────────────────────┤
//! │ Call Frame N (current)              │  ← base
//! │   local₁                            │
//! │   local₀ (first argument)           │
//! │ callee                              │  ← base - 1
//! ├─────────────────────────────────────┤
//! │ Call Frame N-1                      │
//! │   ...                               │
//! └─────────────────────────────────────┘
//! ```
//!
//! Arguments are left in place by `CALL` and become the callee's first
//! locals. The callee value sits just below the frame base and is removed
//! together with the frame on return.

use super::value::Value;
use super::{VmError, VmResult, DEFAULT_MAX_FRAMES};

/// One function activation
#[derive(Debug, Clone, PartialEq)]
pub struct CallFrame {
    /// Index of the executing chunk in the interpreter's chunk table
    pub chunk: usize,

    /// Instruction to resume at in the caller
    pub return_ip: usize,

    /// Stack index of local slot 0
    pub base: usize,

    /// Number of local slots, parameters included
    pub local_count: usize,
}

/// Operand and call frame stack for the VM
#[derive(Debug)]
pub struct Stack {
    slots: Vec<Value>,
    frames: Vec<CallFrame>,
    max_frames: usize,
}

impl Stack {
    pub fn new() -> Self {
        Self::with_max_frames(DEFAULT_MAX_FRAMES)
    }

    pub fn with_max_frames(max_frames: usize) -> Self {
        Self {
            slots: Vec::with_capacity(256),
            frames: Vec::with_capacity(max_frames.min(256)),
            max_frames,
        }
    }

    // ========================================================================
    // Operand Stack Operations
    // ========================================================================

    #[inline]
    pub fn push(&mut self, value: Value) {
        self.slots.push(value);
    }

    /// # Errors
    ///
    /// Returns `VmError::StackUnderflow` if the stack is empty.
    #[inline]
    pub fn pop(&mut self) -> VmResult<Value> {
        self.slots.pop().ok_or(VmError::StackUnderflow)
    }

    /// Pop the top `n` values, returned bottom first.
    pub fn pop_n(&mut self, n: usize) -> VmResult<Vec<Value>> {
        if self.slots.len() < n {
            return Err(VmError::StackUnderflow);
        }
        let at = self.slots.len() - n;
        Ok(self.slots.split_off(at))
    }

    /// # Errors
    ///
    /// Returns `VmError::StackUnderflow` if the stack is empty.
    #[inline]
    pub fn peek(&self) -> VmResult<&Value> {
        self.slots.last().ok_or(VmError::StackUnderflow)
    }

    /// Peek at the value `n` slots below the top (0 = top).
    #[inline]
    pub fn peek_n(&self, n: usize) -> VmResult<&Value> {
        if self.slots.len() <= n {
            return Err(VmError::StackUnderflow);
        }
        Ok(&self.slots[self.slots.len() - 1 - n])
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop every value at or above `len`.
    pub fn truncate(&mut self, len: usize) {
        self.slots.truncate(len);
    }

    // ========================================================================
    // Call Frame Management
    // ========================================================================

    /// Push a frame whose locals start at `base`.
    ///
    /// Slots between the current top and `base + local_count` are filled
    /// with `nil`, so arguments already on the stack keep their values.
    ///
    /// # Errors
    ///
    /// Returns `VmError::StackOverflow` if the frame limit is reached.
    pub fn push_frame(
        &mut self,
        chunk: usize,
        return_ip: usize,
        base: usize,
        local_count: usize,
    ) -> VmResult<()> {
        if self.frames.len() >= self.max_frames {
            return Err(VmError::StackOverflow(self.max_frames));
        }
        if base > self.slots.len() {
            return Err(VmError::StackUnderflow);
        }

        let top = base + local_count;
        if self.slots.len() < top {
            self.slots.resize(top, Value::Nil);
        }
        self.frames.push(CallFrame {
            chunk,
            return_ip,
            base,
            local_count,
        });
        Ok(())
    }

    /// Pop the current frame. The caller decides how far to unwind the
    /// operand stack.
    pub fn pop_frame(&mut self) -> VmResult<CallFrame> {
        self.frames.pop().ok_or(VmError::StackUnderflow)
    }

    #[inline]
    pub fn current_frame(&self) -> Option<&CallFrame> {
        self.frames.last()
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    pub fn frames(&self) -> impl DoubleEndedIterator<Item = &CallFrame> + '_ {
        self.frames.iter()
    }

    /// Drop all values and frames.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.frames.clear();
    }

    // ========================================================================
    // Local Variable Access
    // ========================================================================

    fn local_index(&self, index: usize) -> VmResult<usize> {
        let frame = self.current_frame().ok_or(VmError::StackUnderflow)?;
        if index >= frame.local_count {
            return Err(VmError::InvalidLocal {
                index,
                count: frame.local_count,
            });
        }
        Ok(frame.base + index)
    }

    /// # Errors
    ///
    /// Returns error if no active frame or index out of bounds.
    #[inline]
    pub fn load_local(&self, index: usize) -> VmResult<Value> {
        let slot = self.local_index(index)?;
        self.slots
            .get(slot)
            .cloned()
            .ok_or(VmError::StackUnderflow)
    }

    /// # Errors
    ///
    /// Returns error if no active frame or index out of bounds.
    #[inline]
    pub fn store_local(&mut self, index: usize, value: Value) -> VmResult<()> {
        let slot = self.local_index(index)?;
        match self.slots.get_mut(slot) {
            Some(target) => {
                *target = value;
                Ok(())
            }
            None => Err(VmError::StackUnderflow),
        }
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}
