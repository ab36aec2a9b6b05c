// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! - Cookie 名称与渲染上下文中的保留键。
//! - HTTP 状态码原因短语、MIME 类型映射表。
//! - HTTP 方法与版本的强类型枚举。

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;

/// 服务器名称标识，用于 `Server` 响应头
pub const SERVER_NAME: &str = "jantar-middleware";

/// HTTP 换行符
pub const CRLF: &str = "\r\n";

/// 保存 Flash 消息的 Cookie 名称
pub const FLASH_COOKIE: &str = "JANTAR_FLASH";

/// 保存验证错误的 Cookie 名称
pub const ERRORS_COOKIE: &str = "JANTAR_ERRORS";

/// 渲染上下文中 Flash 映射所在的键
pub const FLASH_KEY: &str = "_flash";

/// 渲染上下文中错误映射所在的键
pub const ERRORS_KEY: &str = "_errors";

/// 目录请求被改写到的默认文件
pub const INDEX_FILE: &str = "index.html";

lazy_static! {
    /// 本项目会产生的状态码及其原因短语。
    pub static ref STATUS_CODES: HashMap<u16, &'static str> = {
        let mut map = HashMap::new();
        map.insert(200, "OK");
        map.insert(204, "No Content");
        map.insert(303, "See Other");
        map.insert(304, "Not Modified");
        map.insert(400, "Bad Request");
        map.insert(404, "Not Found");
        map.insert(405, "Method Not Allowed");
        map.insert(413, "Content Too Large");
        map.insert(500, "Internal Server Error");
        map.insert(505, "HTTP Version Not Supported");
        map
    };
}

lazy_static! {
    /// 文件后缀名到 MIME 类型的映射表，供静态文件服务设置 `Content-Type`。
    pub static ref MIME_TYPES: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        map.insert("css", "text/css;charset=utf-8");
        map.insert("csv", "text/csv");
        map.insert("gif", "image/gif");
        map.insert("htm", "text/html;charset=utf-8");
        map.insert("html", "text/html;charset=utf-8");
        map.insert("ico", "image/x-icon");
        map.insert("jpeg", "image/jpeg");
        map.insert("jpg", "image/jpeg");
        map.insert("js", "text/javascript;charset=utf-8");
        map.insert("json", "application/json");
        map.insert("map", "application/json");
        map.insert("mjs", "text/javascript;charset=utf-8");
        map.insert("mp3", "audio/mpeg");
        map.insert("mp4", "video/mp4");
        map.insert("otf", "font/otf");
        map.insert("pdf", "application/pdf");
        map.insert("png", "image/png");
        map.insert("svg", "image/svg+xml");
        map.insert("ttf", "font/ttf");
        map.insert("txt", "text/plain;charset=utf-8");
        map.insert("wasm", "application/wasm");
        map.insert("webm", "video/webm");
        map.insert("webp", "image/webp");
        map.insert("woff", "font/woff");
        map.insert("woff2", "font/woff2");
        map.insert("xml", "text/xml");
        map.insert("zip", "application/zip");
        map
    };
}

/// 兜底的二进制流类型
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// 支持的 HTTP 协议版本
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpVersion {
    V1_0,
    V1_1,
}

/// 支持的 HTTP 请求方法
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpRequestMethod {
    Get,
    Head,
    Options,
    Post,
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpVersion::V1_0 => write!(f, "HTTP/1.0"),
            HttpVersion::V1_1 => write!(f, "HTTP/1.1"),
        }
    }
}

impl fmt::Display for HttpRequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpRequestMethod::Get => write!(f, "GET"),
            HttpRequestMethod::Head => write!(f, "HEAD"),
            HttpRequestMethod::Options => write!(f, "OPTIONS"),
            HttpRequestMethod::Post => write!(f, "POST"),
        }
    }
}

/// 根据扩展名查找 MIME 类型，未知扩展名返回 [`DEFAULT_MIME`]。
pub fn mime_for(extension: Option<&str>) -> &'static str {
    extension
        .map(|e| e.to_ascii_lowercase())
        .and_then(|e| MIME_TYPES.get(e.as_str()).copied())
        .unwrap_or(DEFAULT_MIME)
}
