// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Validator
//!
//! 验证用户提交的数据并收集错误消息，最后把错误保存到 Cookie 中，
//! 交给下一个请求的 [`Validation`](super::Validation) 中间件读取。
//!
//! 每个检查在通过时返回 `None`，失败时返回 [`FieldError`]，
//! 可以用它替换刚刚写入的默认消息（例如做本地化）：
//!
//! ```
//! use jantar_middleware::validation::{OverrideMessage, Validator};
//!
//! let mut v = Validator::new();
//! v.required("name", "").message("Bitte ausfüllen");
//! v.min_max("age", 15, 18, 65);
//!
//! assert!(v.has_errors());
//! assert_eq!(v.errors()["name"], vec!["Bitte ausfüllen"]);
//! assert_eq!(v.errors()["age"], vec!["Must be larger 18 and smaller 65"]);
//! ```

use log::debug;
use regex::Regex;

use crate::{
    cookie::Cookie,
    param::ERRORS_COOKIE,
    response::Response,
    token::{encode_errors, ErrorSet},
};

use super::value::{digit_count, Value};

/// 一次请求内的错误收集器。
///
/// 状态只会从“无错误”变为“有错误”，没有删除错误的接口。
#[derive(Debug, Default, Clone)]
pub struct Validator {
    has_errors: bool,
    errors: ErrorSet,
}

/// 失败检查的句柄，指向刚刚追加的那条消息。
pub struct FieldError<'a> {
    validator: &'a mut Validator,
    name: String,
    index: usize,
}

impl<'a> FieldError<'a> {
    /// 用自定义消息替换这次检查写入的消息，同一字段的其他消息不受影响。
    pub fn message(self, msg: &str) -> Self {
        if let Some(slot) = self
            .validator
            .errors
            .get_mut(&self.name)
            .and_then(|messages| messages.get_mut(self.index))
        {
            *slot = msg.to_string();
        }
        self
    }

    pub fn field(&self) -> &str {
        &self.name
    }

    /// 当前记录的消息
    pub fn text(&self) -> &str {
        self.validator.errors[&self.name][self.index].as_str()
    }
}

/// 让 `Option<FieldError>` 也能直接调用 `message`，检查通过时什么也不做。
pub trait OverrideMessage {
    fn message(self, msg: &str) -> Self;
}

impl<'a> OverrideMessage for Option<FieldError<'a>> {
    fn message(self, msg: &str) -> Self {
        self.map(|e| e.message(msg))
    }
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    pub fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    fn add_error(&mut self, name: &str, message: String) -> FieldError<'_> {
        self.has_errors = true;
        let messages = self.errors.entry(name.to_string()).or_default();
        messages.push(message);
        let index = messages.len() - 1;
        FieldError {
            validator: self,
            name: name.to_string(),
            index,
        }
    }

    fn check(&mut self, name: &str, valid: bool, message: String) -> Option<FieldError<'_>> {
        if valid {
            None
        } else {
            debug!("字段{}验证失败：{}", name, message);
            Some(self.add_error(name, message))
        }
    }

    /// 检查值是否存在：整数非零、文本非空、序列非空、时间不是零时刻。
    pub fn required(&mut self, name: &str, value: impl Into<Value>) -> Option<FieldError<'_>> {
        let valid = match value.into() {
            Value::Integer(n) => n != 0,
            Value::Text(s) => !s.is_empty(),
            Value::Sequence(items) => !items.is_empty(),
            Value::Instant(t) => t != Value::zero_instant(),
            Value::Absent | Value::Flag(_) => false,
        };
        self.check(name, valid, "Required".to_string())
    }

    /// 整数不小于 `min`，或文本长度、序列元素数不小于 `min`。
    pub fn min(&mut self, name: &str, value: impl Into<Value>, min: i64) -> Option<FieldError<'_>> {
        let valid = measure(&value.into()).map_or(false, |n| n >= min);
        self.check(name, valid, format!("Must be larger than {}", min))
    }

    /// 整数不大于 `max`，或文本长度、序列元素数不大于 `max`。
    pub fn max(&mut self, name: &str, value: impl Into<Value>, max: i64) -> Option<FieldError<'_>> {
        let valid = measure(&value.into()).map_or(false, |n| n <= max);
        self.check(name, valid, format!("Must be smaller than {}", max))
    }

    /// `min` 与 `max` 合并为一次检查，只产生一条消息。
    pub fn min_max(
        &mut self,
        name: &str,
        value: impl Into<Value>,
        min: i64,
        max: i64,
    ) -> Option<FieldError<'_>> {
        let valid = measure(&value.into()).map_or(false, |n| n >= min && n <= max);
        self.check(name, valid, format!("Must be larger {} and smaller {}", min, max))
    }

    /// 精确长度：文本字符数、序列元素数或整数的十进制位数。
    pub fn length(&mut self, name: &str, value: impl Into<Value>, length: i64) -> Option<FieldError<'_>> {
        let actual = match value.into() {
            Value::Integer(n) => Some(i64::from(digit_count(n))),
            other => other.len().map(|l| l as i64),
        };
        let valid = actual == Some(length);
        self.check(name, valid, format!("Must be {} symbols long", length))
    }

    /// 两个值结构相等，且都不是 `Absent`。
    pub fn equals(
        &mut self,
        name: &str,
        a: impl Into<Value>,
        b: impl Into<Value>,
    ) -> Option<FieldError<'_>> {
        let (a, b) = (a.into(), b.into());
        let valid = !a.is_absent() && !b.is_absent() && a == b;
        self.check(name, valid, format!("{} does not equal {}", a, b))
    }

    /// 值的字符串形式匹配正则 `pattern`。非法的正则视为不匹配。
    pub fn match_regex(
        &mut self,
        name: &str,
        value: impl Into<Value>,
        pattern: &str,
    ) -> Option<FieldError<'_>> {
        let valid = match (value.into().as_match_text(), Regex::new(pattern)) {
            (Some(text), Ok(re)) => re.is_match(&text),
            (_, Err(e)) => {
                debug!("正则表达式{}无法编译：{}", pattern, e);
                false
            }
            (None, _) => false,
        };
        self.check(name, valid, format!("Must match regex {}", pattern))
    }

    /// 调用方自行判断，`fails` 为 `true` 时记录 `message`。
    pub fn custom(&mut self, name: &str, fails: bool, message: &str) -> Option<FieldError<'_>> {
        self.check(name, !fails, message.to_string())
    }

    /// 把错误编码为 Cookie；没有错误时返回 `None`。
    pub fn to_cookie(&self) -> Option<Cookie> {
        if !self.has_errors {
            return None;
        }
        Some(Cookie::session(ERRORS_COOKIE, &encode_errors(&self.errors)))
    }

    /// 有错误时把错误写入响应的 `Set-Cookie`，返回是否写入。
    pub fn save(&self, response: &mut Response) -> bool {
        match self.to_cookie() {
            Some(cookie) => {
                debug!("保存{}个字段的验证错误", self.errors.len());
                response.add_cookie(cookie);
                true
            }
            None => false,
        }
    }
}

// 整数取其本身，文本与序列取长度
fn measure(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(n) => Some(*n),
        other => other.len().map(|l| l as i64),
    }
}
