pub mod archive;
pub mod character;
pub mod credits;
pub mod manifest;
pub mod pipeline;
