pub mod account_api_client;
