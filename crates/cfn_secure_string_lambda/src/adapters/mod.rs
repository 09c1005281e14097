pub mod callback;
pub mod parameter_store;
