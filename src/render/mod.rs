pub mod composite;
pub mod trim;
