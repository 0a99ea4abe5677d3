//! Scoped ownership of native allocations
//!
//! An [`Acquired`] value is the only owner of a native address. It hands
//! out borrows tied to its own lifetime and calls the matching release
//! function exactly once, in `Drop`. That covers `?` returns, strict-mode
//! errors and unwinding alike.

use std::os::raw::c_int;
use std::ptr::NonNull;

/// How an acquisition is given back
pub enum Release<T> {
    /// `free(ptr)` for a single record or string
    Single(unsafe extern "C" fn(*mut T)),
    /// `free(ptr, count)` for an array produced with `count` elements
    Array(unsafe extern "C" fn(*mut T, c_int), c_int),
}

/// A native allocation owned by the caller until dropped
///
/// Deliberately neither `Clone` nor `Send`.
pub struct Acquired<T> {
    ptr: NonNull<T>,
    release: Release<T>,
    entry_point: &'static str,
}

impl<T> Acquired<T> {
    /// Take ownership of a single-record result
    ///
    /// Returns `None` for the null sentinel, which must never be released.
    ///
    /// # Safety
    /// A non-null `ptr` must have just been returned by `entry_point` and
    /// `release` must be its matching release function.
    pub unsafe fn single(
        ptr: *mut T,
        release: unsafe extern "C" fn(*mut T),
        entry_point: &'static str,
    ) -> Option<Self> {
        Self::new(ptr, Release::Single(release), entry_point)
    }

    /// Take ownership of an array result of `count` elements
    ///
    /// # Safety
    /// As for [`Acquired::single`], and the block must hold `count` elements.
    pub unsafe fn array(
        ptr: *mut T,
        count: c_int,
        release: unsafe extern "C" fn(*mut T, c_int),
        entry_point: &'static str,
    ) -> Option<Self> {
        Self::new(ptr, Release::Array(release, count), entry_point)
    }

    fn new(ptr: *mut T, release: Release<T>, entry_point: &'static str) -> Option<Self> {
        let ptr = NonNull::new(ptr)?;
        tracing::trace!(entry_point, address = ?ptr, "acquired");
        Some(Self {
            ptr,
            release,
            entry_point,
        })
    }

    /// Borrow the single record
    pub fn get(&self) -> &T {
        // Non-null and valid until drop per the constructor contract
        unsafe { self.ptr.as_ref() }
    }

    /// The owned address, valid only while `self` lives
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Number of elements this allocation was produced with
    pub fn len(&self) -> usize {
        match self.release {
            Release::Single(_) => 1,
            Release::Array(_, count) => usize::try_from(count).unwrap_or(0),
        }
    }

    /// Whether the allocation holds no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow every element
    pub fn as_slice(&self) -> &[T] {
        match self.len() {
            0 => &[],
            len => unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), len) },
        }
    }
}

impl<T> Drop for Acquired<T> {
    fn drop(&mut self) {
        tracing::debug!(entry_point = self.entry_point, elements = self.len(), "releasing");
        unsafe {
            match self.release {
                Release::Single(free) => free(self.ptr.as_ptr()),
                Release::Array(free, count) => free(self.ptr.as_ptr(), count),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

    static NEVER_FREES: AtomicUsize = AtomicUsize::new(0);
    static SINGLE_FREES: AtomicUsize = AtomicUsize::new(0);
    static ARRAY_FREES: AtomicUsize = AtomicUsize::new(0);
    static LAST_COUNT: AtomicI32 = AtomicI32::new(-1);

    unsafe extern "C" fn free_one(ptr: *mut u32) {
        SINGLE_FREES.fetch_add(1, Ordering::SeqCst);
        drop(Box::from_raw(ptr));
    }

    unsafe extern "C" fn free_never(_: *mut u32) {
        NEVER_FREES.fetch_add(1, Ordering::SeqCst);
    }

    unsafe extern "C" fn free_many(ptr: *mut u32, count: c_int) {
        ARRAY_FREES.fetch_add(1, Ordering::SeqCst);
        LAST_COUNT.store(count, Ordering::SeqCst);
        drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, count as usize)));
    }

    #[test]
    fn test_null_is_never_acquired() {
        let guard = unsafe { Acquired::single(std::ptr::null_mut(), free_never, "test") };
        assert!(guard.is_none());
        drop(guard);
        assert_eq!(NEVER_FREES.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_release_on_drop_and_unwind() {
        let before = SINGLE_FREES.load(Ordering::SeqCst);
        {
            let guard = unsafe { Acquired::single(Box::into_raw(Box::new(7u32)), free_one, "test") }.unwrap();
            assert_eq!(*guard.get(), 7);
        }
        assert_eq!(SINGLE_FREES.load(Ordering::SeqCst), before + 1);

        let result = std::panic::catch_unwind(|| {
            let _guard = unsafe { Acquired::single(Box::into_raw(Box::new(8u32)), free_one, "test") };
            panic!("decode blew up");
        });
        assert!(result.is_err());
        assert_eq!(SINGLE_FREES.load(Ordering::SeqCst), before + 2);
    }

    #[test]
    fn test_array_passes_count_back() {
        let block = Box::into_raw(vec![1u32, 2, 3].into_boxed_slice()) as *mut u32;
        let guard = unsafe { Acquired::array(block, 3, free_many, "test") }.unwrap();
        assert_eq!(guard.as_slice(), &[1, 2, 3]);
        drop(guard);
        assert_eq!(LAST_COUNT.load(Ordering::SeqCst), 3);

        let empty = Box::into_raw(Vec::<u32>::new().into_boxed_slice()) as *mut u32;
        let guard = unsafe { Acquired::array(empty, 0, free_many, "test") }.unwrap();
        assert!(guard.is_empty());
        drop(guard);
        assert_eq!(LAST_COUNT.load(Ordering::SeqCst), 0);
        assert_eq!(ARRAY_FREES.load(Ordering::SeqCst), 2);
    }
}
