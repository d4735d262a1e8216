// Copyright 2024 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// A cached piece of GPU state.
///
/// Setting a slot to the value it already holds is a no-op unless the slot was
/// marked dirty, which is needed when the driver state may have changed behind the
/// cache's back (for example an element buffer binding swapped out together with
/// its vertex array).
#[derive(Clone, Debug, Default)]
pub struct State<T> {
    current: T,
    dirty: bool,
}

impl<T: Clone + PartialEq> State<T> {
    pub fn new(value: T) -> Self {
        Self {
            current: value,
            dirty: false,
        }
    }

    pub fn get(&self) -> &T {
        &self.current
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forces the next [`set`](Self::set) to apply.
    pub fn set_dirty(&mut self) {
        self.dirty = true;
    }

    /// Stores `value`, returning whether it has to be applied.
    pub fn set(&mut self, value: T) -> bool {
        if !self.dirty && self.current == value {
            return false;
        }
        self.current = value;
        self.dirty = false;
        true
    }
}
