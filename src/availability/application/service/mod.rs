pub mod availability_resolver;
pub mod normalization;
