pub mod premium_key;
pub mod profile;
pub mod project;
