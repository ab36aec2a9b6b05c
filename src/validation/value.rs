// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 被验证的值。
//!
//! 所有检查都接收一个 [`Value`]，调用方通过 `From` 转换传入具体类型，
//! 每种检查只对它支持的变体做判断，其余变体一律视为验证失败。

use std::fmt;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 缺失的值（例如表单中没有该字段）
    Absent,
    Integer(i64),
    Text(String),
    Instant(DateTime<Utc>),
    Sequence(Vec<Value>),
    Flag(bool),
}

impl Value {
    /// “零时刻”，即 `DateTime::<Utc>::default()`（Unix 纪元）。
    /// `required` 把它当作未填写的时间。
    pub fn zero_instant() -> DateTime<Utc> {
        DateTime::<Utc>::default()
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// 文本的字符数或序列的元素个数，其他变体返回 `None`
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Text(s) => Some(s.chars().count()),
            Value::Sequence(items) => Some(items.len()),
            _ => None,
        }
    }

    /// 用于正则匹配的字符串形式，`Absent` 没有字符串形式
    pub fn as_match_text(&self) -> Option<String> {
        match self {
            Value::Absent => None,
            Value::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// 十进制位数：`0` 记为 1 位，负数不计符号。
pub fn digit_count(n: i64) -> u32 {
    match n.unsigned_abs().checked_ilog10() {
        Some(log) => log + 1,
        None => 1,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => write!(f, "<nil>"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Instant(t) => write!(f, "{}", t.to_rfc3339()),
            Value::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Flag(b) => write!(f, "{}", b),
        }
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Integer(i64::from(n))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

// 超出 i64 范围时饱和到边界
macro_rules! impl_from_wide_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    let saturated = i64::try_from(n).unwrap_or(if n > 0 { i64::MAX } else { i64::MIN });
                    Value::Integer(saturated)
                }
            }
        )*
    };
}

impl_from_wide_integer!(u64, usize, isize, i128, u128);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Instant(t)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Flag(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Value>> From<&[T]> for Value {
    fn from(items: &[T]) -> Self {
        Value::Sequence(items.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Absent, Into::into)
    }
}
