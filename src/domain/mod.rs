// Records layered on the key-value store, and how they map onto keys.

pub mod clock;
pub mod progress;
pub mod user;

pub use clock::{Clock, SystemClock};
pub use progress::Progress;
pub use user::{CreatedUser, CredentialHasher, User};
