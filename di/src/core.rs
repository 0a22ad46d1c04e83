//! Resolution-stack bookkeeping shared by every resolver.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

/// A fresh id distinguishing one resolver's frames from another's on the same thread.
pub(crate) fn next_owner_id() -> u64 {
  NEXT_OWNER.fetch_add(1, Ordering::Relaxed)
}

struct Frame {
  owner: u64,
  id: String,
}

thread_local! {
  // The ids currently being resolved on this thread, outermost first.
  static RESOLUTION_STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// RAII frame on the thread-local resolution stack.
///
/// Entering fails with `ResolutionCycle` when the id is already being resolved by the same
/// resolver further up the stack, or when the resolver's frames would exceed `max_depth`.
/// Dropping the guard pops the frame.
pub(crate) struct ResolutionGuard {
  owner: u64,
}

impl ResolutionGuard {
  pub(crate) fn enter(owner: u64, id: &str, max_depth: usize) -> Result<Self> {
    RESOLUTION_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      let mut depth = 0;
      let mut revisited = false;
      for frame in stack.iter().filter(|f| f.owner == owner) {
        depth += 1;
        revisited |= frame.id == id;
      }

      if revisited || depth >= max_depth {
        let mut path: Vec<String> = stack
          .iter()
          .filter(|f| f.owner == owner)
          .map(|f| f.id.clone())
          .collect();
        path.push(id.to_owned());
        return Err(Error::ResolutionCycle(path));
      }

      stack.push(Frame {
        owner,
        id: id.to_owned(),
      });
      Ok(Self { owner })
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLUTION_STACK.with(|stack| {
      let popped = stack.borrow_mut().pop();
      debug_assert!(popped.is_some_and(|f| f.owner == self.owner));
    });
  }
}
