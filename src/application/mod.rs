// Application layer - clients tying the APIs to the measurement model
pub mod client;
pub mod local_client;
