pub mod data;
pub mod level;
pub mod session;
pub mod settings;
pub mod stats;
