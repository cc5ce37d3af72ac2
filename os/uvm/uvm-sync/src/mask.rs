//! Blocking the timer signal around critical sections.

use crate::{SpinLock, SpinLockGuard};
use core::mem::MaybeUninit;
use core::ops::{Deref, DerefMut};
use core::ptr;

/// The signal delivered by the periodic interval timer.
pub const TIMER_SIGNAL: libc::c_int = libc::SIGALRM;

/// RAII guard that blocks [`TIMER_SIGNAL`] on the calling thread and restores
/// the previous signal mask on drop.
///
/// A tick that arrives while the guard is alive stays pending and is
/// delivered right after the guard is dropped, so no tick is lost; it is
/// merely deferred past the critical section.
///
/// # Examples
///
/// ```no_run
/// use uvm_sync::TimerMaskGuard;
///
/// {
///     let _g = TimerMaskGuard::new(); // SIGALRM blocked here
///     // critical section
/// }
/// // previous mask restored
/// ```
pub struct TimerMaskGuard {
    /// Signal mask in effect when the guard was created.
    previous: libc::sigset_t,
}

impl Default for TimerMaskGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerMaskGuard {
    /// Blocks the timer signal and remembers the previous mask.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        let mut block = MaybeUninit::<libc::sigset_t>::uninit();
        let mut previous = MaybeUninit::<libc::sigset_t>::uninit();
        // SAFETY: both sets are initialized by sigemptyset / pthread_sigmask
        // before they are read. pthread_sigmask only fails for an invalid
        // `how`, which is a constant here.
        unsafe {
            libc::sigemptyset(block.as_mut_ptr());
            libc::sigaddset(block.as_mut_ptr(), TIMER_SIGNAL);
            libc::pthread_sigmask(libc::SIG_BLOCK, block.as_ptr(), previous.as_mut_ptr());
            Self {
                previous: previous.assume_init(),
            }
        }
    }

    /// Whether the timer signal was already blocked before this guard.
    #[must_use]
    pub fn was_blocked(&self) -> bool {
        // SAFETY: `previous` is a valid, initialized set.
        unsafe { libc::sigismember(&raw const self.previous, TIMER_SIGNAL) == 1 }
    }
}

impl Drop for TimerMaskGuard {
    /// Restores the signal mask captured in [`TimerMaskGuard::new`].
    fn drop(&mut self) {
        // SAFETY: `previous` was filled by pthread_sigmask.
        unsafe {
            libc::pthread_sigmask(libc::SIG_SETMASK, &raw const self.previous, ptr::null_mut());
        }
    }
}

/// Returns whether the timer signal is currently blocked on this thread.
#[must_use]
pub fn timer_blocked() -> bool {
    let mut current = MaybeUninit::<libc::sigset_t>::uninit();
    // SAFETY: a null `set` only queries the mask into `current`.
    unsafe {
        libc::pthread_sigmask(libc::SIG_BLOCK, ptr::null(), current.as_mut_ptr());
        libc::sigismember(current.as_ptr(), TIMER_SIGNAL) == 1
    }
}

/// A lock guard that also keeps the timer signal blocked while held.
///
/// Created via [`SpinLock::lock_masked`]. The signal is blocked *before* the
/// lock is taken and unblocked *after* it is released, so a tick can never
/// observe the lock held by the thread it interrupted.
pub struct MaskedGuard<'a, T> {
    // Field order matters: the lock guard drops first, then the mask.
    guard: SpinLockGuard<'a, T>,
    _mask: TimerMaskGuard,
}

impl<T> SpinLock<T> {
    /// Blocks the timer signal, then acquires the lock.
    #[inline]
    pub fn lock_masked(&self) -> MaskedGuard<'_, T> {
        let mask = TimerMaskGuard::new();
        let guard = self.lock();
        MaskedGuard { guard, _mask: mask }
    }
}

impl<T> Deref for MaskedGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for MaskedGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
