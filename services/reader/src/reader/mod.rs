pub mod session;

pub use session::{LoadOutcome, Navigation, ReadingSession};
