// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 中间件在请求处理生命周期中可能遇到的各类异常情况。
//!
//! - **协议层**：请求报文无法解析、方法或版本不受支持。
//! - **路径层**：请求路径解码失败或含有空字节。
//! - **状态层**：Cookie 中携带的令牌无法解码、配置文件不可用。
//!
//! 中间件本身从不把这些错误抛给调用链，它们只在日志中出现，
//! 或者由演示服务器转化为对应的 HTTP 状态码。

use std::{error, fmt};

/// 处理请求过程中发生的异常类型。
#[derive(Debug, Clone, PartialEq)]
pub enum Exception {
    /// 请求字节流不是合法的 UTF-8。
    RequestIsNotUtf8,
    /// 请求行格式错误，或使用了不支持的 HTTP 方法。
    UnSupportedRequestMethod,
    /// 不支持的 HTTP 协议版本。
    UnsupportedHttpVersion,
    /// 请求路径无法解码，或含有空字节。
    InvalidPath,
    /// Cookie 令牌中含有非法的百分号转义序列。
    MalformedToken(String),
    /// 配置文件无法读取。
    ConfigUnreadable(String),
    /// 配置文件内容无法反序列化。
    ConfigInvalid(String),
    /// 需要一个结构体（对象）但得到了其他类型。
    NotARecord(&'static str),
}

use Exception::*;

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestIsNotUtf8 => write!(f, "Request bytes can't be parsed in UTF-8"),
            UnSupportedRequestMethod => write!(f, "Unsupported request method"),
            UnsupportedHttpVersion => write!(f, "Unsupported HTTP version"),
            InvalidPath => write!(f, "Invalid path (400)"),
            MalformedToken(token) => write!(f, "Malformed cookie token: {}", token),
            ConfigUnreadable(reason) => write!(f, "Couldn't read config file: {}", reason),
            ConfigInvalid(reason) => write!(f, "Invalid config file: {}", reason),
            NotARecord(got) => write!(f, "Expected a struct, got {}", got),
        }
    }
}

impl error::Error for Exception {}
