pub mod confirmed_order;
pub mod order_counter;
pub mod order_detail;
pub mod pending_order;
pub mod pharmacy;
pub mod product;
pub mod rep_achievement;
pub mod route_plan;
pub mod user;

pub use pending_order::OrderStatus;
pub use user::UserRole;
