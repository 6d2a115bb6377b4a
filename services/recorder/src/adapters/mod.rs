pub mod db;
pub mod identity;
pub mod local_store;

pub use db::DbAdapter;
pub use identity::TokenIdentity;
pub use local_store::FileStore;
