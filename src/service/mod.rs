pub mod aggregate;
pub mod directory;
pub mod ledger;
pub mod notify;
pub mod registry;
pub mod scheduler;
pub mod token;
