// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! Public 中间件：把 `/public/` 下的请求映射到 `public/` 目录。

use crate::{
    fileserver::FileServer,
    middleware::{Exchange, Middleware},
    request::Request,
};

#[derive(Debug, Clone)]
pub struct Public {
    server: FileServer,
}

impl Public {
    pub fn new(prefix: &str, root: &str) -> Self {
        Self {
            server: FileServer::new(prefix, root),
        }
    }

    pub fn server(&self) -> &FileServer {
        &self.server
    }
}

impl Middleware for Public {
    fn name(&self) -> &'static str {
        "public"
    }

    fn call(&self, request: &Request, exchange: &mut Exchange) -> bool {
        if !request.path().starts_with(self.server.prefix()) {
            return true;
        }
        let id = exchange.id();
        self.server.serve(request, exchange.response_mut(), id)
    }
}
