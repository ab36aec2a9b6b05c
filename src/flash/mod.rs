// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Flash 中间件
//!
//! 读取 `JANTAR_FLASH` Cookie 放入渲染参数的 `_flash`，然后删除该 Cookie，
//! 无论模板是否真的用到了这些消息。注册 `flash` 模板函数。

mod flasher;

pub use flasher::{FlashFields, Flashable, Flasher};

use log::{debug, warn};

use crate::{
    cookie::Cookie,
    exception::Exception,
    middleware::{Exchange, Middleware},
    param::FLASH_COOKIE,
    request::Request,
    template::{TemplateManager, TemplateValue},
    token::{decode_flash, FlashMap},
};

#[derive(Debug, Default)]
pub struct Flash;

impl Flash {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for Flash {
    fn name(&self) -> &'static str {
        "flash"
    }

    fn initialize(&mut self, tm: &mut TemplateManager) -> Result<(), Exception> {
        tm.add_tmpl_func("flash", |args, params| {
            let value = match (args.flash_map(), params.first()) {
                (Some(flash), Some(key)) => flash.get(*key).cloned().unwrap_or_default(),
                _ => String::new(),
            };
            TemplateValue::Text(value)
        });
        Ok(())
    }

    fn call(&self, request: &Request, exchange: &mut Exchange) -> bool {
        if let Some(token) = request.cookie(FLASH_COOKIE) {
            let flash = match decode_flash(token) {
                Ok(flash) => flash,
                Err(e) => {
                    warn!("[ID{}]{}，忽略Flash消息", exchange.id(), e);
                    FlashMap::new()
                }
            };
            debug!("[ID{}]读取到{}条Flash消息", exchange.id(), flash.len());
            exchange.render_args_mut().set_flash(flash);

            exchange
                .response_mut()
                .add_cookie(Cookie::expired(FLASH_COOKIE));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderArgs;

    fn request_with_cookie(cookie: &str) -> Request {
        let raw = format!("GET / HTTP/1.1\r\nHost: localhost\r\nCookie: {}\r\n\r\n", cookie);
        Request::try_from(raw.as_bytes(), 0).unwrap()
    }

    #[test]
    fn test_flash_loaded_and_cleared() {
        let request = request_with_cookie("JANTAR_FLASH=notice=Saved%21&notice=Updated&user.Name=Tom");
        let mut exchange = Exchange::new(1);

        assert!(Flash::new().call(&request, &mut exchange));

        let flash = exchange.render_args().flash_map().unwrap();
        assert_eq!(flash.get("notice").map(String::as_str), Some("Updated"));
        assert_eq!(flash.get("user.Name").map(String::as_str), Some("Tom"));
        assert!(exchange.response().cookie(FLASH_COOKIE).unwrap().is_expired());
    }

    #[test]
    fn test_malformed_flash_still_cleared() {
        let request = request_with_cookie("JANTAR_FLASH=%%%");
        let mut exchange = Exchange::new(2);

        assert!(Flash::new().call(&request, &mut exchange));
        assert_eq!(exchange.render_args().flash_map(), Some(&FlashMap::new()));
        assert!(exchange.response().cookie(FLASH_COOKIE).unwrap().is_expired());
    }

    #[test]
    fn test_other_cookies_ignored() {
        let request = request_with_cookie("JANTAR_ERRORS=name=Required");
        let mut exchange = Exchange::new(3);

        assert!(Flash::new().call(&request, &mut exchange));
        assert!(exchange.render_args().flash_map().is_none());
        assert!(exchange.response().cookies().is_empty());
    }

    #[test]
    fn test_flash_template_function() {
        let mut tm = TemplateManager::new();
        Flash::new().initialize(&mut tm).unwrap();

        let mut args = RenderArgs::new();
        assert_eq!(tm.call_text("flash", &args, &["notice"]), "");

        let mut flash = FlashMap::new();
        flash.insert("notice".to_string(), "Saved".to_string());
        args.set_flash(flash);

        assert_eq!(tm.call_text("flash", &args, &["notice"]), "Saved");
        assert_eq!(tm.call_text("flash", &args, &["missing"]), "");
    }
}
