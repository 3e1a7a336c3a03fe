pub mod ai_gateway;
pub mod generation;
pub mod premium_keys;
