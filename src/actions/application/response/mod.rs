pub mod action_response;
