pub mod collection_response;
