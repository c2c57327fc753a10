pub mod batch_convert;
pub mod formats;
pub mod health;
