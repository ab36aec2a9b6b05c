// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Validation 中间件
//!
//! 读取上一个请求保存在 `JANTAR_ERRORS` 中的错误，放入渲染参数的 `_errors`，
//! 随后删除该 Cookie。同时注册 `errors` 与 `hasError` 两个模板函数。

mod validator;
mod value;

pub use validator::{FieldError, OverrideMessage, Validator};
pub use value::{digit_count, Value};

use log::{debug, warn};

use crate::{
    cookie::Cookie,
    exception::Exception,
    middleware::{Exchange, Middleware},
    param::ERRORS_COOKIE,
    request::Request,
    template::{TemplateManager, TemplateValue},
    token::{decode_errors, ErrorSet},
};

#[derive(Debug, Default)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for Validation {
    fn name(&self) -> &'static str {
        "validation"
    }

    fn initialize(&mut self, tm: &mut TemplateManager) -> Result<(), Exception> {
        tm.add_tmpl_func("errors", |args, _| match args.error_map() {
            Some(errors) => TemplateValue::Errors(errors.clone()),
            None => TemplateValue::Nothing,
        });

        tm.add_tmpl_func("hasError", |args, params| {
            let found = match (args.error_map(), params.first()) {
                (Some(errors), Some(key)) => errors.contains_key(*key),
                _ => false,
            };
            TemplateValue::Bool(found)
        });
        Ok(())
    }

    fn call(&self, request: &Request, exchange: &mut Exchange) -> bool {
        if let Some(token) = request.cookie(ERRORS_COOKIE) {
            let errors = match decode_errors(token) {
                Ok(errors) => errors,
                Err(e) => {
                    warn!("[ID{}]{}，按无错误处理", exchange.id(), e);
                    ErrorSet::new()
                }
            };
            debug!("[ID{}]读取到{}个字段的验证错误", exchange.id(), errors.len());
            exchange.render_args_mut().set_errors(errors);

            // 读取一次后立即删除
            exchange
                .response_mut()
                .add_cookie(Cookie::expired(ERRORS_COOKIE));
        }
        true
    }
}
