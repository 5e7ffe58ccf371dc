pub mod art;
pub mod health;
pub mod navigation;
pub mod teams;
pub mod tournaments;
