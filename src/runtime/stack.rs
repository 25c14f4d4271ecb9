use super::constants::STACK_CAPACITY;

/// Why a push was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushError {
    /// the language's fixed capacity is full
    Capacity,
    /// the budget's depth ceiling is reached
    Budget,
}

/// The operand stack. Depth is checked before every push, so it never
/// exceeds `min(limit, STACK_CAPACITY)`.
#[derive(Debug)]
pub struct Stack {
    values: Vec<i64>,
    limit: usize,
}

impl Stack {
    pub fn new(limit: usize) -> Self {
        Self {
            values: Vec::with_capacity(limit.min(STACK_CAPACITY).min(64)),
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn push(&mut self, val: i64) -> Result<(), PushError> {
        let depth = self.values.len();

        if depth >= self.limit && self.limit < STACK_CAPACITY {
            return Err(PushError::Budget);
        }

        if depth >= STACK_CAPACITY {
            return Err(PushError::Capacity);
        }

        self.values.push(val);

        Ok(())
    }

    pub fn pop(&mut self) -> Option<i64> {
        self.values.pop()
    }

    /// Pops `b` then `a` and returns `(a, b)`. Leaves the stack untouched if
    /// fewer than two values are present.
    pub fn pop_pair(&mut self) -> Option<(i64, i64)> {
        if self.values.len() < 2 {
            return None;
        }

        let b = self.values.pop()?;
        let a = self.values.pop()?;

        Some((a, b))
    }

    pub fn peek(&self) -> Option<i64> {
        self.values.last().copied()
    }

    pub fn swap_top(&mut self) -> bool {
        let len = self.values.len();

        if len < 2 {
            return false;
        }

        self.values.swap(len - 1, len - 2);

        true
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[i64] {
        &self.values
    }
}
