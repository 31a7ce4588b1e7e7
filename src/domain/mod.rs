// Domain layer - measurement semantics and record taxonomy
pub mod conversion;
pub mod entities;
pub mod quantity;
pub mod record_type;
pub mod sensor_data;
pub mod units;
