// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 中间件框架
//!
//! 每个中间件拦截一次请求/响应周期，完成一件小事后返回布尔值：
//! `true` 表示继续执行后续处理器，`false` 表示响应已经完成，调用链到此为止。
//!
//! 生命周期：启动时调用一次 `initialize`（可以注册模板函数），
//! 之后每个请求调用 `call`，停机时调用 `cleanup`。

use log::{debug, error, info};

use crate::{
    config::Config,
    exception::Exception,
    flash::Flash,
    public::Public,
    render::RenderArgs,
    request::Request,
    response::Response,
    static_pages::Static,
    template::TemplateManager,
    validation::Validation,
};

/// 单个请求在调用链中传递的可变状态。
#[derive(Debug)]
pub struct Exchange {
    id: u128,
    response: Response,
    render_args: RenderArgs,
}

impl Exchange {
    pub fn new(id: u128) -> Self {
        Self {
            id,
            response: Response::new(),
            render_args: RenderArgs::new(),
        }
    }

    pub fn id(&self) -> u128 {
        self.id
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    pub fn render_args(&self) -> &RenderArgs {
        &self.render_args
    }

    pub fn render_args_mut(&mut self) -> &mut RenderArgs {
        &mut self.render_args
    }

    /// 用新的响应替换当前响应，已经追加的 `Set-Cookie` 会被保留。
    pub fn replace_response(&mut self, mut response: Response) {
        for cookie in self.response.cookies() {
            if response.cookie(cookie.name()).is_none() {
                response.add_cookie(cookie.clone());
            }
        }
        self.response = response;
    }

    pub fn into_response(self) -> Response {
        self.response
    }
}

pub trait Middleware: Send + Sync {
    fn name(&self) -> &'static str;

    fn initialize(&mut self, _tm: &mut TemplateManager) -> Result<(), Exception> {
        Ok(())
    }

    /// 处理请求，返回 `false` 时后续中间件与处理器都不再执行。
    fn call(&self, request: &Request, exchange: &mut Exchange) -> bool;

    fn cleanup(&mut self) {}
}

/// 按注册顺序执行的中间件列表
#[derive(Default)]
pub struct Chain {
    middlewares: Vec<Box<dyn Middleware>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flash、Validation、Public、Static 四个中间件组成的默认调用链
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with(Flash::new())
            .with(Validation::new())
            .with(Public::new(config.public_prefix(), config.public_root()))
            .with(Static::new(config.static_root(), config.clear_static_on_start()))
    }

    pub fn with<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.push(middleware);
        self
    }

    pub fn push<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Box::new(middleware));
    }

    pub fn initialize_all(&mut self, tm: &mut TemplateManager) -> Result<(), Exception> {
        for middleware in self.middlewares.iter_mut() {
            if let Err(e) = middleware.initialize(tm) {
                error!("中间件{}初始化失败：{}", middleware.name(), e);
                return Err(e);
            }
            info!("中间件{}初始化完成", middleware.name());
        }
        Ok(())
    }

    /// 依次执行中间件，返回请求是否仍需后续处理器处理。
    pub fn run(&self, request: &Request, exchange: &mut Exchange) -> bool {
        for middleware in &self.middlewares {
            if !middleware.call(request, exchange) {
                debug!("[ID{}]中间件{}已完成响应", exchange.id(), middleware.name());
                return false;
            }
        }
        true
    }

    pub fn cleanup_all(&mut self) {
        for middleware in self.middlewares.iter_mut() {
            middleware.cleanup();
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.middlewares.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}
