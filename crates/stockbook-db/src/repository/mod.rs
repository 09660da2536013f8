//! SurrealDB repository implementations.

mod ledger;
mod product;
mod user;

pub use ledger::SurrealLedgerRepository;
pub use product::SurrealProductRepository;
pub use user::SurrealUserRepository;
