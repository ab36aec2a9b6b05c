// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Cookie 模块
//!
//! 负责 `Cookie` 请求头的解析与 `Set-Cookie` 响应头的格式化。
//! 中间件只用到两种 Cookie：
//! - 会话级写入：`HttpOnly`、`Path=/`、不带过期时间；
//! - 删除：值置空，`Max-Age=0` 且 `Expires` 为纪元时间。

use std::fmt;

use chrono::{DateTime, Utc};

use crate::util::format_http_date;

#[derive(Debug, Clone, PartialEq)]
pub struct Cookie {
    name: String,
    value: String,
    path: Option<String>,
    http_only: bool,
    secure: bool,
    /// `Some(0)` 表示立即过期
    max_age: Option<i64>,
}

impl Cookie {
    /// 会话级 Cookie：浏览器关闭即失效，脚本不可读取，不要求 HTTPS。
    pub fn session(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            path: Some("/".to_string()),
            http_only: true,
            secure: false,
            max_age: None,
        }
    }

    /// 生成一个用于删除同名 Cookie 的过期 Cookie。
    pub fn expired(name: &str) -> Self {
        Self {
            max_age: Some(0),
            value: String::new(),
            ..Self::session(name, "")
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn http_only(&self) -> bool {
        self.http_only
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.max_age, Some(age) if age <= 0)
    }

    /// 格式化为 `Set-Cookie` 头的值
    pub fn to_header_value(&self) -> String {
        let mut parts = vec![format!("{}={}", self.name, self.value)];
        if let Some(path) = &self.path {
            parts.push(format!("Path={}", path));
        }
        if let Some(age) = self.max_age {
            parts.push(format!("Max-Age={}", age.max(0)));
            if age <= 0 {
                let epoch = DateTime::<Utc>::default();
                parts.push(format!("Expires={}", format_http_date(&epoch)));
            }
        }
        if self.http_only {
            parts.push("HttpOnly".to_string());
        }
        if self.secure {
            parts.push("Secure".to_string());
        }
        parts.join("; ")
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_header_value())
    }
}

/// 解析 `Cookie` 请求头（`a=1; b=2`），返回按出现顺序排列的 (名称, 值) 列表。
///
/// 没有 `=` 的片段会被忽略；值中可以再出现 `=`。
pub fn parse_cookie_header(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = value.trim().trim_matches('"');
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}
