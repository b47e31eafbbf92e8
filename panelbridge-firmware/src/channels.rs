//! Inter-task signals

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Raised whenever the tick or slave task leaves events pending
///
/// The dispatcher sleeps on this while the event set is empty.
pub static EVENTS_PENDING: Signal<CriticalSectionRawMutex, ()> = Signal::new();
