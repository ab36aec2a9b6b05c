pub mod config;
pub mod cookie;
pub mod demo;
pub mod exception;
pub mod fileserver;
pub mod flash;
pub mod middleware;
pub mod param;
pub mod public;
pub mod render;
pub mod request;
pub mod response;
pub mod server;
pub mod static_pages;
pub mod template;
pub mod token;
pub mod util;
pub mod validation;

pub use config::Config;
pub use cookie::Cookie;
pub use exception::Exception;
pub use fileserver::{resolve, FileServer};
pub use flash::{Flash, FlashFields, Flashable, Flasher};
pub use middleware::{Chain, Exchange, Middleware};
pub use param::{HttpRequestMethod, HttpVersion};
pub use public::Public;
pub use render::{RenderArgs, RenderValue};
pub use request::Request;
pub use response::Response;
pub use server::App;
pub use static_pages::Static;
pub use template::{TemplateManager, TemplateValue};
pub use token::{ErrorSet, FlashMap};
pub use util::HtmlBuilder;
pub use validation::{OverrideMessage, Validation, Validator, Value};
