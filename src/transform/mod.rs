pub mod op;
pub mod overrides;
pub mod resolve;
