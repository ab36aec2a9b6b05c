// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 文件服务
//!
//! [`resolve`] 把请求路径安全地映射到根目录下的普通文件，
//! [`FileServer`] 在此基础上完成条件 GET 与响应体写入。
//!
//! 越界、隐藏文件、目录、不存在的文件一律视为“未找到”，
//! 调用方无法区分这几种情况。

use std::{
    fs::{File, Metadata},
    io::Read,
    path::{Path, PathBuf},
};

use bytes::Bytes;
use chrono::{DateTime, SubsecRound, Utc};
use log::{debug, error};

use crate::{
    param::{mime_for, HttpRequestMethod, INDEX_FILE},
    request::Request,
    response::Response,
};

/// 在 `root` 下查找 `request_path` 去掉 `prefix` 后对应的普通文件。
///
/// 纯查找，不缓存任何结果。返回已打开的文件句柄与元数据。
pub fn resolve(prefix: &str, root: &Path, request_path: &str) -> Option<(File, Metadata)> {
    let name = request_path.strip_prefix(prefix)?;
    // 任何一段以 `.` 开头都拒绝，覆盖 `..`、`.` 与隐藏文件
    if name.split('/').any(|segment| segment.starts_with('.')) {
        debug!("拒绝隐藏文件或上级目录：{}", request_path);
        return None;
    }

    let root_abs = root.canonicalize().ok()?;
    let target = root_abs.join(name).canonicalize().ok()?;
    // Path::starts_with 按路径组件比较，`public2` 不会被当作 `public` 的子目录
    if !target.starts_with(&root_abs) {
        debug!("路径{}越出根目录{}", target.display(), root_abs.display());
        return None;
    }

    let file = File::open(&target).ok()?;
    let metadata = file.metadata().ok()?;
    if !metadata.is_file() {
        debug!("{}不是普通文件", target.display());
        return None;
    }
    Some((file, metadata))
}

/// 以 `prefix` 为 URL 前缀、`root` 为目录的文件服务。
#[derive(Debug, Clone)]
pub struct FileServer {
    prefix: String,
    root: PathBuf,
    /// 前缀本身（例如 `/`）改写为 `index.html`，子目录不改写
    index_rewrite: bool,
}

impl FileServer {
    pub fn new(prefix: &str, root: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.to_string(),
            root: root.into(),
            index_rewrite: false,
        }
    }

    pub fn with_index(mut self) -> Self {
        self.index_rewrite = true;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 尝试用文件响应请求，返回是否应当继续调用链。
    ///
    /// 找到文件时写入 200（或 304）并返回 `false`；否则不修改响应并返回 `true`。
    pub fn serve(&self, request: &Request, response: &mut Response, id: u128) -> bool {
        let head_only = match request.method() {
            HttpRequestMethod::Get => false,
            HttpRequestMethod::Head => true,
            _ => return true,
        };

        let target = if self.index_rewrite && request.path() == self.prefix {
            format!("{}{}", request.path(), INDEX_FILE)
        } else {
            request.path().to_string()
        };

        let Some((mut file, metadata)) = resolve(&self.prefix, &self.root, &target) else {
            return true;
        };

        // HTTP 日期只精确到秒
        let modified = match metadata.modified() {
            Ok(time) => DateTime::<Utc>::from(time).trunc_subsecs(0),
            Err(e) => {
                error!("[ID{}]无法获取文件{}的修改时间: {}", id, target, e);
                return true;
            }
        };

        if let Some(since) = request.if_modified_since() {
            if modified <= since {
                debug!("[ID{}]{}未修改，返回304", id, target);
                response
                    .set_code(304)
                    .clear_content()
                    .set_last_modified(modified);
                return false;
            }
        }

        let mut contents = Vec::with_capacity(metadata.len() as usize);
        if let Err(e) = file.read_to_end(&mut contents) {
            error!("[ID{}]无法读取文件{}。错误：{}", id, target, e);
            return true;
        }
        drop(file);

        let extension = Path::new(&target).extension().and_then(|e| e.to_str());
        let mime = mime_for(extension);
        debug!("[ID{}]发送文件{}，{} bytes，{}", id, target, contents.len(), mime);

        response
            .set_code(200)
            .set_content(Bytes::from(contents), mime)
            .set_last_modified(modified);
        if head_only {
            response.strip_body();
        }
        false
    }
}
