pub mod custom;
pub mod layout;
pub mod standard;
