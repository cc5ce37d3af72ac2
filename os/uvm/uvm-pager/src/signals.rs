//! Host signal plumbing: the fault and timer callbacks and their
//! installation.
//!
//! ```text
//!  SIGSEGV (SIGALRM masked)            SIGALRM
//!      │                                  │
//!  on_fault                            on_timer
//!      │ lock()                           │ try_lock(), skip when busy
//!      ▼                                  ▼
//!  VmSystem::handle_fault             VmSystem::tick
//! ```
//!
//! Both callbacks run on whatever thread the host picked and share the
//! single [`SYSTEM`] slot. An error in either is fatal: it is logged and the
//! process aborts.

use crate::{FaultCode, PagerError, VmSystem};
use core::mem::MaybeUninit;
use core::ptr;
use std::io;
use std::time::Duration;
use uvm_addresses::VirtualAddress;
use uvm_log::uvm_trace;
use uvm_sync::{SpinLock, TIMER_SIGNAL};

/// The one pager of this process.
pub static SYSTEM: SpinLock<Option<VmSystem>> = SpinLock::new(None);

/// Dispositions that were in place before [`install`].
#[derive(Clone, Copy)]
pub struct PreviousHandlers {
    segv: libc::sigaction,
    alarm: libc::sigaction,
}

/// Installs the fault handler (with the timer signal masked while it runs)
/// and the timer handler.
///
/// # Errors
/// The host rejected either disposition. Nothing stays installed then.
pub fn install() -> Result<PreviousHandlers, PagerError> {
    let segv = set_action(
        libc::SIGSEGV,
        on_fault as usize,
        libc::SA_SIGINFO,
        &[TIMER_SIGNAL],
    )
    .map_err(|source| PagerError::Signal {
        signal: "SIGSEGV",
        source,
    })?;

    let alarm = match set_action(
        TIMER_SIGNAL,
        on_timer as usize,
        libc::SA_SIGINFO | libc::SA_RESTART,
        &[],
    ) {
        Ok(alarm) => alarm,
        Err(source) => {
            // best effort, the install error is what gets reported
            let _ = restore_action(libc::SIGSEGV, &segv);
            return Err(PagerError::Signal {
                signal: "SIGALRM",
                source,
            });
        }
    };

    Ok(PreviousHandlers { segv, alarm })
}

/// Puts back the dispositions captured by [`install`].
///
/// # Errors
/// The host rejected a disposition.
pub fn restore(previous: &PreviousHandlers) -> Result<(), PagerError> {
    // Ignoring the signal first discards a tick that is still pending, so
    // it cannot reach the previous disposition.
    // SAFETY: SIG_IGN is always a valid disposition.
    unsafe {
        libc::signal(TIMER_SIGNAL, libc::SIG_IGN);
    }
    restore_action(TIMER_SIGNAL, &previous.alarm).map_err(|source| PagerError::Signal {
        signal: "SIGALRM",
        source,
    })?;
    restore_action(libc::SIGSEGV, &previous.segv).map_err(|source| PagerError::Signal {
        signal: "SIGSEGV",
        source,
    })
}

/// Starts the periodic timer, or stops it for `Duration::ZERO`.
///
/// # Errors
/// The host rejected the timer.
pub fn set_timer(interval: Duration) -> Result<(), PagerError> {
    let tv = libc::timeval {
        tv_sec: libc::time_t::try_from(interval.as_secs()).unwrap_or(libc::time_t::MAX),
        tv_usec: libc::suseconds_t::try_from(interval.subsec_micros()).unwrap_or(0),
    };
    let timer = libc::itimerval {
        it_interval: tv,
        it_value: tv,
    };
    // SAFETY: both pointers are valid for the duration of the call.
    let rc = unsafe { libc::setitimer(libc::ITIMER_REAL, &raw const timer, ptr::null_mut()) };
    if rc != 0 {
        return Err(PagerError::Timer(io::Error::last_os_error()));
    }
    Ok(())
}

fn set_action(
    signal: libc::c_int,
    handler: libc::sighandler_t,
    flags: libc::c_int,
    mask: &[libc::c_int],
) -> io::Result<libc::sigaction> {
    // SAFETY: sigaction is plain data; every field we rely on is set below.
    let mut action: libc::sigaction = unsafe { MaybeUninit::zeroed().assume_init() };
    action.sa_sigaction = handler;
    action.sa_flags = flags;
    let mut previous = MaybeUninit::<libc::sigaction>::uninit();
    // SAFETY: all pointers reference live locals.
    unsafe {
        libc::sigemptyset(&raw mut action.sa_mask);
        for &s in mask {
            libc::sigaddset(&raw mut action.sa_mask, s);
        }
        if libc::sigaction(signal, &raw const action, previous.as_mut_ptr()) != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(previous.assume_init())
    }
}

fn restore_action(signal: libc::c_int, action: &libc::sigaction) -> io::Result<()> {
    // SAFETY: `action` came from a previous sigaction call.
    if unsafe { libc::sigaction(signal, action, ptr::null_mut()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Keeps `errno` of the interrupted code intact across a handler.
struct ErrnoGuard(libc::c_int);

impl ErrnoGuard {
    fn save() -> Self {
        // SAFETY: errno is thread local and always addressable.
        Self(unsafe { *libc::__errno_location() })
    }
}

impl Drop for ErrnoGuard {
    fn drop(&mut self) {
        // SAFETY: as above.
        unsafe { *libc::__errno_location() = self.0 };
    }
}

fn fatal(err: &PagerError) -> ! {
    log::error!("{err}");
    uvm_trace!("uvm: unrecoverable paging error, aborting\n");
    std::process::abort()
}

extern "C" fn on_fault(_signal: libc::c_int, info: *mut libc::siginfo_t, _ctx: *mut libc::c_void) {
    let _errno = ErrnoGuard::save();
    // SAFETY: with SA_SIGINFO the host passes a valid siginfo.
    let (addr, code) = unsafe {
        (
            VirtualAddress::from_ptr((*info).si_addr()),
            FaultCode::from_si_code((*info).si_code),
        )
    };

    let mut slot = SYSTEM.lock();
    let Some(system) = slot.as_mut() else {
        drop(slot);
        genuine_violation(addr);
        return;
    };
    let Some(page) = system.range().addr_to_page(addr) else {
        drop(slot);
        genuine_violation(addr);
        return;
    };
    if let Err(e) = system.handle_fault(page, code) {
        fatal(&e);
    }
}

/// Lets the retried access kill the process with the host's default action.
fn genuine_violation(addr: VirtualAddress) {
    log::error!("segmentation violation at {addr}, outside the managed range");
    // SAFETY: resetting to the default disposition is always valid.
    unsafe {
        libc::signal(libc::SIGSEGV, libc::SIG_DFL);
    }
}

extern "C" fn on_timer(_signal: libc::c_int, _info: *mut libc::siginfo_t, _ctx: *mut libc::c_void) {
    let _errno = ErrnoGuard::save();
    // A busy slot means a fault or a caller holds the state; skip this tick.
    let Some(mut slot) = SYSTEM.try_lock() else {
        return;
    };
    if let Some(system) = slot.as_mut()
        && let Err(e) = system.tick()
    {
        fatal(&e);
    }
}
