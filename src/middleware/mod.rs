pub mod api_key;
