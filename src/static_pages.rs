// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! Static 中间件：服务预先生成的静态页面，`/` 映射到 `index.html`。
//!
//! 启动时可以清空输出目录，页面由外部的生成步骤重新写入。

use std::{fs, io::ErrorKind};

use log::{error, info};

use crate::{
    exception::Exception,
    fileserver::FileServer,
    middleware::{Exchange, Middleware},
    request::Request,
    template::TemplateManager,
};

#[derive(Debug, Clone)]
pub struct Static {
    server: FileServer,
    clear_on_start: bool,
}

impl Static {
    pub fn new(root: &str, clear_on_start: bool) -> Self {
        Self {
            server: FileServer::new("/", root).with_index(),
            clear_on_start,
        }
    }

    pub fn server(&self) -> &FileServer {
        &self.server
    }
}

impl Middleware for Static {
    fn name(&self) -> &'static str {
        "static"
    }

    fn initialize(&mut self, _tm: &mut TemplateManager) -> Result<(), Exception> {
        if !self.clear_on_start {
            return Ok(());
        }
        let root = self.server.root();
        match fs::remove_dir_all(root) {
            Ok(()) => info!("已清空静态文件输出目录{}", root.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            // 清理失败不影响启动
            Err(e) => error!("无法清空静态文件输出目录{}：{}", root.display(), e),
        }
        Ok(())
    }

    fn call(&self, request: &Request, exchange: &mut Exchange) -> bool {
        let id = exchange.id();
        self.server.serve(request, exchange.response_mut(), id)
    }
}
