pub mod service;
pub mod window;

pub use service::{PriceQuote, PricingService};
pub use window::{SlidingWindow, WindowConfig, WindowState};
