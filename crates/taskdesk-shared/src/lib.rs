pub mod ids;
pub mod roles;
pub mod schemas;
