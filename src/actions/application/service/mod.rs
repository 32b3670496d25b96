pub mod action_service;
pub mod refresh_scheduler;
pub mod vm_action_controller;
