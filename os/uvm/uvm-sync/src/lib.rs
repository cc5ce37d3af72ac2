//! # Signal-Safe Synchronization Primitives
//!
//! The pager's state is mutated from two asynchronous contexts: the
//! protection-fault handler and the interval-timer handler. Neither may use
//! blocking primitives from `std` (a signal can interrupt the very thread that
//! holds a `std::sync::Mutex`), so this crate provides:
//!
//! - [`SpinLock`]: a test-and-test-and-set lock with a non-blocking
//!   [`try_lock`](SpinLock::try_lock) for the timer path.
//! - [`TimerMaskGuard`]: blocks the timer signal on the calling thread for the
//!   guard's lifetime and restores the previous mask on drop.
//! - [`SpinLock::lock_masked`]: both at once, for normal code that must not be
//!   preempted by a tick while it holds the lock.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod mask;
mod spin_lock;

pub use mask::{MaskedGuard, TimerMaskGuard, TIMER_SIGNAL};
pub use spin_lock::{SpinLock, SpinLockGuard};
