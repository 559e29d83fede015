pub mod context;
pub mod profiles;

pub use context::{AppContext, DocumentSelection};
pub use profiles::ProfileSwitcher;
