//! Reentrant critical section
//!
//! Interrupt handlers and the main loop share the register map and the
//! pending event set. Every read-modify-write on that state happens with
//! interrupts masked. Sections nest: only the outermost [`CriticalSection::end`]
//! unmasks interrupts again.
//!
//! [`Shared`] wraps the state itself so it can only be reached while a
//! section is held.

use core::cell::RefCell;

use portable_atomic::{AtomicU8, Ordering};

/// Global interrupt mask control
///
/// Implemented by the firmware for the target core and by mocks in tests.
pub trait InterruptControl {
    /// Mask all maskable interrupts
    fn disable(&self);

    /// Unmask interrupts
    fn enable(&self);
}

/// Depth-counting critical section
///
/// Single-core only. Calls from interrupt context are fine as long as
/// interrupts do not nest.
pub struct CriticalSection<I> {
    irq: I,
    depth: AtomicU8,
}

impl<I> CriticalSection<I> {
    pub const fn new(irq: I) -> Self {
        Self {
            irq,
            depth: AtomicU8::new(0),
        }
    }

    /// Current nesting depth (0 = interrupts enabled by us)
    pub fn depth(&self) -> u8 {
        self.depth.load(Ordering::Relaxed)
    }
}

impl<I: InterruptControl> CriticalSection<I> {
    /// Mask interrupts and enter one more nesting level
    ///
    /// # Panics
    /// If nesting exceeds 255 levels.
    pub fn begin(&self) {
        self.irq.disable();
        let depth = self.depth.load(Ordering::Relaxed);
        assert!(depth < u8::MAX, "critical section nested too deeply");
        self.depth.store(depth + 1, Ordering::Relaxed);
    }

    /// Leave one nesting level, unmasking interrupts at the outermost one
    ///
    /// # Panics
    /// If called without a matching [`begin`](Self::begin).
    pub fn end(&self) {
        let depth = self.depth.load(Ordering::Relaxed);
        assert!(depth > 0, "critical section ended without begin");
        self.depth.store(depth - 1, Ordering::Relaxed);
        if depth == 1 {
            self.irq.enable();
        }
    }

    /// Enter a section that ends when the guard is dropped
    pub fn enter(&self) -> CriticalGuard<'_, I> {
        self.begin();
        CriticalGuard { section: self }
    }

    /// Run `f` inside a section
    pub fn with<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.enter();
        f()
    }
}

/// Scoped critical section, released on every exit path
pub struct CriticalGuard<'a, I: InterruptControl> {
    section: &'a CriticalSection<I>,
}

impl<I: InterruptControl> Drop for CriticalGuard<'_, I> {
    fn drop(&mut self) {
        self.section.end();
    }
}

/// State shared between interrupt handlers and the main loop
///
/// The value can only be borrowed inside a critical section. Locking the
/// same `Shared` again from inside its own closure panics.
pub struct Shared<T> {
    inner: RefCell<T>,
}

// Access is serialized by masking interrupts on a single core, see `lock`.
#[allow(unsafe_code)]
unsafe impl<T: Send> Sync for Shared<T> {}

impl<T> Shared<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: RefCell::new(value),
        }
    }

    /// Borrow the value mutably with interrupts masked
    pub fn lock<I: InterruptControl, R>(
        &self,
        section: &CriticalSection<I>,
        f: impl FnOnce(&mut T) -> R,
    ) -> R {
        let _guard = section.enter();
        let mut value = self.inner.borrow_mut();
        f(&mut value)
    }

    /// Direct access when the caller owns the cell exclusively
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}
