//! `SeaORM` entity definitions.
//!
//! Role and action columns are stored as plain strings and converted to the
//! core enums by the repositories.

pub mod inventory;
pub mod transactions;
pub mod users;

pub mod prelude {
    //! Entity re-exports.
    pub use super::inventory::Entity as Inventory;
    pub use super::transactions::Entity as Transactions;
    pub use super::users::Entity as Users;
}
