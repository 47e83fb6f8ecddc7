use crate::error::AppError;

/// bcrypt only reads this many bytes of input. Longer passwords are refused instead of
/// silently truncated, so two different passwords can never share a hash.
pub const MAX_PASSWORD_BYTES: usize = 72;

const DUMMY_PASSWORD: &[u8] = b"no-such-account";
const DUMMY_SALT: [u8; 16] = [0x5a; 16];

/// Salted, deliberately slow password hashing backed by bcrypt.
///
/// One instance is built from configuration at startup and shared by reference. The work
/// factor is fixed for the life of the process. Both operations are CPU-bound; async callers
/// run them on the blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AppError::ValidationError(format!(
                "Password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }
        Ok(bcrypt::hash(password, self.cost)?)
    }

    /// Returns `Ok(false)` on mismatch. A stored hash that bcrypt cannot parse is an error.
    pub fn verify(&self, password: &str, hashed_password: &str) -> Result<bool, AppError> {
        if password.len() > MAX_PASSWORD_BYTES {
            self.verify_dummy();
            return Ok(false);
        }
        Ok(bcrypt::verify(password, hashed_password)?)
    }

    /// Spends the same work as a real `verify`, for login attempts on unknown accounts.
    pub fn verify_dummy(&self) {
        if let Err(e) = bcrypt::hash_with_salt(DUMMY_PASSWORD, self.cost, DUMMY_SALT) {
            log::warn!("dummy password check failed: {}", e);
        }
    }
}
