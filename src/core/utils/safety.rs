//! Slot access macros for the solver hot loop
//!
//! Constraints cache the slot of every body they touch once per tick
//! (`compute_data`). Inside the Gauss-Seidel passes those slots are known to be
//! in bounds, so release builds skip the bounds check while debug builds keep
//! it and panic with a useful message.
//!
//! Usage:
//! ```rust
//! use softbody_engine::fast;
//!
//! let slot = 1;
//! let inverse_masses = vec![0.0f32, 0.5, 1.0];
//! // Read: fast!(slice, [index])
//! assert_eq!(*fast!(inverse_masses, [slot]), 0.5);
//!
//! let mut impulses = vec![0.0f32; 3];
//! // Write: fast!(slice, [index] = value)
//! fast!(impulses, [slot] = 2.0);
//! // Mutable borrow: fast!(mut slice, [index])
//! *fast!(mut impulses, [slot]) += 1.0;
//! assert_eq!(impulses[slot], 3.0);
//! ```

/// Bounds-checked in debug, unchecked in release.
///
/// Only use with slots refreshed by `compute_data` during the current tick.
#[macro_export]
macro_rules! fast {
    (mut $slice:expr, [$index:expr]) => {{
        #[cfg(debug_assertions)]
        {
            &mut $slice[$index]
        }
        #[cfg(not(debug_assertions))]
        {
            unsafe { $slice.get_unchecked_mut($index) }
        }
    }};

    ($slice:expr, [$index:expr] = $val:expr) => {{
        #[cfg(debug_assertions)]
        {
            $slice[$index] = $val;
        }
        #[cfg(not(debug_assertions))]
        {
            unsafe {
                *$slice.get_unchecked_mut($index) = $val;
            }
        }
    }};

    ($slice:expr, [$index:expr]) => {{
        #[cfg(debug_assertions)]
        {
            &$slice[$index]
        }
        #[cfg(not(debug_assertions))]
        {
            unsafe { $slice.get_unchecked($index) }
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn fast_read_write_and_mut() {
        let mut arr = vec![1.0f32, 2.0, 3.0];
        assert_eq!(*fast!(arr, [2]), 3.0);
        fast!(arr, [0] = 10.0);
        *fast!(mut arr, [1]) *= 4.0;
        assert_eq!(arr, vec![10.0, 8.0, 3.0]);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn fast_bounds_check_debug() {
        let arr = vec![1.0f32];
        let _ = *fast!(arr, [4]);
    }
}
