pub mod achievement;
pub mod notify;
pub mod order;
pub mod pharmacy;
pub mod product;
pub mod report;
pub mod route;
#[cfg(test)]
pub mod test_utils;
pub mod user;

pub use achievement::Achievement;
pub use notify::Mailer;
pub use order::Order;
pub use pharmacy::Pharmacy;
pub use product::Product;
pub use report::Report;
pub use route::Route;
pub use user::User;
