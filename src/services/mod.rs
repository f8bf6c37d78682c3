// Service exports
pub mod api;
pub mod csrf;
pub mod renderer;

pub use api::{ApiClient, ApiError};
pub use csrf::{CookiePattern, CookieSource, NoCookies, RequestConfig, StaticCookies};
pub use renderer::{Renderer, TerminalRenderer};
