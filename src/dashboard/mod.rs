pub mod context;
pub mod view;
