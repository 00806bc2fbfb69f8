pub mod import_log;
pub mod product;
pub mod user;

pub use import_log::ImportLog;
pub use product::Product;
pub use user::User;
