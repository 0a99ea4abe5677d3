//! User record entry points

use std::ffi::CString;
use std::os::raw::{c_char, c_int};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{validate_count, Result};
use crate::ffi_boundary;
use crate::memory::{allocate_array, allocate_string, copy_c_str, release_array, release_string};
use crate::types::User;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Dennis", "Edsger", "Frances", "Grace", "Guido", "Hedy", "Ken",
    "Linus", "Margaret", "Niklaus", "Radia", "Rob", "Sophie",
];

const LAST_NAMES: &[&str] = &[
    "Allen", "Dijkstra", "Hamilton", "Hopper", "Kernighan", "Lamarr", "Liskov", "Lovelace",
    "Perlman", "Pike", "Ritchie", "Thompson", "Torvalds", "Turing", "Wilson", "Wirth",
];

const MIN_AGE: c_int = 13;
const MAX_AGE: c_int = 90;

impl User {
    fn new(name: CString, age: c_int, email: CString) -> Self {
        Self {
            name: name.into_raw(),
            age,
            email: email.into_raw(),
        }
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Result<Self> {
        let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Ada");
        let last = LAST_NAMES.choose(rng).copied().unwrap_or("Lovelace");
        let email = format!("{}.{}@example.com", first, last).to_lowercase();

        let name = allocate_string(format!("{} {}", first, last))?;
        let email = match allocate_string(email) {
            Ok(email) => email,
            Err(err) => {
                unsafe { release_string(name) };
                return Err(err);
            }
        };

        Ok(Self {
            name,
            age: rng.gen_range(MIN_AGE..=MAX_AGE),
            email,
        })
    }
}

/// Create a user from caller-supplied fields
///
/// Text is copied byte for byte. Returns null if either text is null.
///
/// # Safety
/// `name` and `email` must be null or valid null-terminated strings. A
/// non-null result must be freed with `handoff_free_user`.
#[no_mangle]
pub unsafe extern "C" fn handoff_create_user(
    name: *const c_char,
    age: c_int,
    email: *const c_char,
) -> *mut User {
    ffi_boundary!("handoff_create_user", {
        let name = copy_c_str(name, "name")?;
        let email = copy_c_str(email, "email")?;
        Ok(Box::into_raw(Box::new(User::new(name, age, email))))
    })
}

/// Create one user with random fields
///
/// # Safety
/// The result must be freed with `handoff_free_user`.
#[no_mangle]
pub unsafe extern "C" fn handoff_create_random_user() -> *mut User {
    ffi_boundary!("handoff_create_random_user", {
        let user = User::random(&mut rand::thread_rng())?;
        Ok(Box::into_raw(Box::new(user)))
    })
}

/// Create `count` users with random fields
///
/// Returns null if `count` is negative.
///
/// # Safety
/// A non-null result must be freed with `handoff_free_users(ptr, count)`.
#[no_mangle]
pub unsafe extern "C" fn handoff_create_random_users(count: c_int) -> *mut User {
    ffi_boundary!("handoff_create_random_users", {
        let len = validate_count(count, "count")?;
        let mut rng = rand::thread_rng();
        let users = (0..len)
            .map(|_| User::random(&mut rng))
            .collect::<Result<Vec<_>>>()?;
        Ok(allocate_array(users))
    })
}

/// Free a user and its text
///
/// # Safety
/// `user` must be null or come from a single-user entry point.
#[no_mangle]
pub unsafe extern "C" fn handoff_free_user(user: *mut User) {
    if user.is_null() {
        return;
    }

    drop(Box::from_raw(user));
}

/// Free an array of users and the text each one holds
///
/// # Safety
/// `users` must be null or come from `handoff_create_random_users(count)`.
#[no_mangle]
pub unsafe extern "C" fn handoff_free_users(users: *mut User, count: c_int) {
    release_array(users, count);
}
