pub mod flows;
pub mod health;
pub mod logs;
pub mod types;
