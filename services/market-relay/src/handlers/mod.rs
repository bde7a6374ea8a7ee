pub mod candles;
pub mod health;
pub mod ticker;
pub mod ws;
