// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 令牌编解码
//!
//! 错误集合与 Flash 数据在 Cookie 中都以 `application/x-www-form-urlencoded`
//! 的形式保存。错误集合允许同一个键重复出现（每条消息一对），
//! Flash 则每个键只有一个值，解码时后出现的值覆盖先出现的值。

use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::exception::Exception;

/// 字段名到错误消息列表的映射
pub type ErrorSet = BTreeMap<String, Vec<String>>;

/// Flash 键到值的映射
pub type FlashMap = BTreeMap<String, String>;

pub fn encode_errors(errors: &ErrorSet) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (field, messages) in errors {
        for message in messages {
            serializer.append_pair(field, message);
        }
    }
    serializer.finish()
}

pub fn decode_errors(token: &str) -> Result<ErrorSet, Exception> {
    check_escapes(token)?;
    let mut errors = ErrorSet::new();
    for (field, message) in form_urlencoded::parse(token.as_bytes()) {
        errors
            .entry(field.into_owned())
            .or_default()
            .push(message.into_owned());
    }
    Ok(errors)
}

pub fn encode_flash(data: &FlashMap) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in data {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

pub fn decode_flash(token: &str) -> Result<FlashMap, Exception> {
    check_escapes(token)?;
    Ok(form_urlencoded::parse(token.as_bytes())
        .into_owned()
        .collect())
}

// form_urlencoded 对非法转义是宽容的，这里单独拒绝，让损坏的令牌按“无状态”处理
fn check_escapes(token: &str) -> Result<(), Exception> {
    let bytes = token.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(Exception::MalformedToken(token.to_string()));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}
