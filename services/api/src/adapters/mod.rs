pub mod coach;
pub mod db;
pub mod memory;

pub use coach::{build_coach, AiProvider, UnavailableCoach, VendorCoach};
pub use db::DbAdapter;
pub use memory::MemoryDb;
