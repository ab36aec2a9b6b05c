// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求处理模块
//!
//! 将 TCP 流中读取的原始字节解析为强类型的 `Request` 结构体：
//! 1. 请求行（方法、路径、查询字符串、版本）。
//! 2. 标头（名称大小写不敏感），其中 `Cookie` 与 `If-Modified-Since` 会被单独解析。
//! 3. 请求体，以及 `application/x-www-form-urlencoded` 表单。

use chrono::{DateTime, Utc};
use log::error;
use url::form_urlencoded;

use crate::{cookie::parse_cookie_header, exception::Exception, param::*, util::parse_http_date};

/// 一个完整的 HTTP 请求。
#[derive(Debug, Clone)]
pub struct Request {
    method: HttpRequestMethod,
    /// 不含查询字符串的路径
    path: String,
    query: Option<String>,
    version: HttpVersion,
    user_agent: String,
    /// 标头名称统一为小写
    headers: Vec<(String, String)>,
    cookies: Vec<(String, String)>,
    if_modified_since: Option<DateTime<Utc>>,
    body: Vec<u8>,
}

impl Request {
    /// 从原始字节缓冲区构建 `Request`。
    ///
    /// `id` 是全局请求 ID，仅用于日志追踪。
    pub fn try_from(buffer: &[u8], id: u128) -> Result<Self, Exception> {
        // 请求头必须是 UTF-8，请求体保持原始字节
        let (head_bytes, body) = match find_subsequence(buffer, b"\r\n\r\n") {
            Some(pos) => (&buffer[..pos], &buffer[pos + 4..]),
            None => (buffer, &buffer[buffer.len()..]),
        };
        let head = match std::str::from_utf8(head_bytes) {
            Ok(s) => s.trim_end_matches('\0'),
            Err(_) => {
                error!("[ID{}]无法解析HTTP请求", id);
                return Err(Exception::RequestIsNotUtf8);
            }
        };

        let mut lines = head.split(CRLF);
        let request_line = lines.next().unwrap_or_default();
        let parts: Vec<&str> = request_line.split(' ').filter(|p| !p.is_empty()).collect();
        if parts.len() != 3 {
            error!("[ID{}]HTTP请求行格式不正确：{}", id, request_line);
            return Err(Exception::UnSupportedRequestMethod);
        }

        let method = match parts[0].to_uppercase().as_str() {
            "GET" => HttpRequestMethod::Get,
            "HEAD" => HttpRequestMethod::Head,
            "OPTIONS" => HttpRequestMethod::Options,
            "POST" => HttpRequestMethod::Post,
            other => {
                error!("[ID{}]不支持的HTTP请求方法：{}", id, other);
                return Err(Exception::UnSupportedRequestMethod);
            }
        };

        let version = match parts[2].to_uppercase().as_str() {
            "HTTP/1.1" => HttpVersion::V1_1,
            "HTTP/1.0" => HttpVersion::V1_0,
            other => {
                error!("[ID{}]不支持的HTTP协议版本：{}", id, other);
                return Err(Exception::UnsupportedHttpVersion);
            }
        };

        let (raw_path, query) = match parts[1].split_once('?') {
            Some((p, q)) => (p, Some(q.to_string())),
            None => (parts[1], None),
        };
        // 路径中的百分号转义在这里解码，文件服务看到的是真实路径
        let path = match urlencoding::decode(raw_path) {
            Ok(p) if !p.contains('\0') => p.into_owned(),
            _ => {
                error!("[ID{}]请求路径非法：{}", id, raw_path);
                return Err(Exception::InvalidPath);
            }
        };

        let mut headers = Vec::new();
        for line in lines {
            if let Some((name, value)) = line.split_once(':') {
                headers.push((name.trim().to_lowercase(), value.trim().to_string()));
            }
        }

        let mut request = Self {
            method,
            path,
            query,
            version,
            user_agent: String::new(),
            headers,
            cookies: Vec::new(),
            if_modified_since: None,
            body: body.to_vec(),
        };

        request.user_agent = request.header("user-agent").unwrap_or_default().to_string();
        // 浏览器可能发送多个 Cookie 头
        request.cookies = request
            .headers
            .iter()
            .filter(|(name, _)| name == "cookie")
            .flat_map(|(_, value)| parse_cookie_header(value))
            .collect();
        request.if_modified_since = request.header("if-modified-since").and_then(parse_http_date);

        // Content-Length 小于实际读到的字节时截断
        if let Some(length) = request
            .header("content-length")
            .and_then(|v| v.parse::<usize>().ok())
        {
            request.body.truncate(length);
        }

        Ok(request)
    }
}

// --- Getter 访问器实现 ---

impl Request {
    pub fn version(&self) -> HttpVersion {
        self.version
    }

    /// 请求路径（不含查询字符串）
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// 按名称（大小写不敏感）查找第一个匹配的标头
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// 查找指定名称的 Cookie，重复时取第一个
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn cookies(&self) -> &[(String, String)] {
        &self.cookies
    }

    pub fn if_modified_since(&self) -> Option<DateTime<Utc>> {
        self.if_modified_since
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// 解析 `application/x-www-form-urlencoded` 请求体，其他类型返回空列表。
    pub fn form(&self) -> Vec<(String, String)> {
        let is_form = self
            .header("content-type")
            .map_or(false, |t| t.starts_with("application/x-www-form-urlencoded"));
        if !is_form {
            return Vec::new();
        }
        form_urlencoded::parse(&self.body).into_owned().collect()
    }

    /// 表单中某个字段的第一个值
    pub fn form_value(&self, name: &str) -> Option<String> {
        self.form()
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
