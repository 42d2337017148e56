//! Synchronization primitives used by the double buffer.
//!
//! Building with `--cfg loom` swaps these for loom's model-checked versions.

cfg_if::cfg_if! {
    if #[cfg(loom)] {
        pub(crate) use ::loom::sync::Arc;

        pub(crate) mod atomic {
            pub(crate) use ::loom::sync::atomic::AtomicUsize;
            pub(crate) use ::loom::sync::atomic::Ordering;
        }

        pub(crate) use ::loom::cell::UnsafeCell;

        /// Busy-wait step. Loom has to see a yield or it explores the spin
        /// forever.
        #[inline]
        pub(crate) fn spin(_backoff: &crossbeam_utils::Backoff) {
            ::loom::thread::yield_now();
        }
    } else {
        pub(crate) use ::alloc::sync::Arc;

        pub(crate) mod atomic {
            pub(crate) use ::core::sync::atomic::AtomicUsize;
            pub(crate) use ::core::sync::atomic::Ordering;
        }

        /// `core::cell::UnsafeCell` behind loom's closure-based accessors.
        #[derive(Debug)]
        #[repr(transparent)]
        pub(crate) struct UnsafeCell<T>(::core::cell::UnsafeCell<T>);

        impl<T> UnsafeCell<T> {
            #[inline]
            pub(crate) fn new(value: T) -> Self {
                Self(::core::cell::UnsafeCell::new(value))
            }

            #[inline]
            pub(crate) fn with<R>(&self, f: impl FnOnce(*const T) -> R) -> R {
                f(self.0.get())
            }

            #[inline]
            pub(crate) fn with_mut<R>(&self, f: impl FnOnce(*mut T) -> R) -> R {
                f(self.0.get())
            }
        }

        #[inline]
        pub(crate) fn spin(backoff: &crossbeam_utils::Backoff) {
            backoff.snooze();
        }
    }
}
