// Infrastructure layer - External dependencies and adapters
pub mod api_v2;
pub mod config;
pub mod local_api_v1;
pub mod signer;
pub mod transport;
