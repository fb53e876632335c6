pub mod bands;
pub mod ema;
pub mod window;
