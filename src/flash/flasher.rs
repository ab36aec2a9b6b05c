// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use std::fmt::Display;

use log::{debug, error};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::{
    cookie::Cookie,
    exception::Exception,
    param::FLASH_COOKIE,
    response::Response,
    token::{encode_flash, FlashMap},
};

/// 收集一次请求内的 Flash 消息，每个键只保留最后一次写入的值。
#[derive(Debug, Default, Clone)]
pub struct Flasher {
    data: FlashMap,
}

/// 能被整体 Flash 的记录类型，逐个报告自己的字段。
///
/// ```
/// use jantar_middleware::flash::{FlashFields, Flashable, Flasher};
///
/// struct Login {
///     user: String,
///     password: String,
/// }
///
/// impl Flashable for Login {
///     fn flash_fields(&self, fields: &mut FlashFields<'_>) {
///         fields
///             .field("user", &self.user)
///             .entry("password", &self.password, false);
///     }
/// }
///
/// let mut flasher = Flasher::new();
/// flasher.flash_record("login", &Login { user: "tom".into(), password: "secret".into() });
/// assert_eq!(flasher.get("login.user"), Some("tom"));
/// assert_eq!(flasher.get("login.password"), None);
/// ```
pub trait Flashable {
    fn flash_fields(&self, fields: &mut FlashFields<'_>);
}

/// 记录字段的收集器，键为 `记录名.字段名`
pub struct FlashFields<'a> {
    record: &'a str,
    data: &'a mut FlashMap,
}

impl<'a> FlashFields<'a> {
    pub fn field(&mut self, name: &str, value: &dyn Display) -> &mut Self {
        self.entry(name, value, true)
    }

    /// `flashable` 为 `false` 的字段（例如密码）不会被写入。
    pub fn entry(&mut self, name: &str, value: &dyn Display, flashable: bool) -> &mut Self {
        if flashable {
            self.data
                .insert(format!("{}.{}", self.record, name), value.to_string());
        }
        self
    }
}

impl Flasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flash(&mut self, name: &str, value: impl Display) {
        self.data.insert(name.to_string(), value.to_string());
    }

    pub fn flash_record<T: Flashable + ?Sized>(&mut self, name: &str, record: &T) {
        let mut fields = FlashFields {
            record: name,
            data: &mut self.data,
        };
        record.flash_fields(&mut fields);
    }

    /// 通过 serde 展开一个对象的顶层字段。
    ///
    /// 标记了 `#[serde(skip_serializing)]` 的字段不会出现；
    /// 序列化结果不是对象时记录错误并忽略此次调用。
    pub fn flash_serialized<T: Serialize + ?Sized>(&mut self, name: &str, record: &T) {
        let fields = match serde_json::to_value(record) {
            Ok(JsonValue::Object(fields)) => fields,
            Ok(other) => {
                let e = Exception::NotARecord(json_kind(&other));
                error!("无法Flash记录{}：{}", name, e);
                return;
            }
            Err(e) => {
                error!("无法Flash记录{}，序列化失败：{}", name, e);
                return;
            }
        };
        for (field, value) in fields {
            let text = match value {
                JsonValue::String(s) => s,
                JsonValue::Null => String::new(),
                other => other.to_string(),
            };
            self.data.insert(format!("{}.{}", name, field), text);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.data.get(name).map(String::as_str)
    }

    pub fn data(&self) -> &FlashMap {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 编码为 Cookie；没有任何消息时返回 `None`。
    pub fn to_cookie(&self) -> Option<Cookie> {
        if self.data.is_empty() {
            return None;
        }
        Some(Cookie::session(FLASH_COOKIE, &encode_flash(&self.data)))
    }

    /// 有消息时写入响应的 `Set-Cookie`，返回是否写入。
    pub fn save(&self, response: &mut Response) -> bool {
        match self.to_cookie() {
            Some(cookie) => {
                debug!("保存{}条Flash消息", self.data.len());
                response.add_cookie(cookie);
                true
            }
            None => false,
        }
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::decode_flash;
    use serde_derive::Serialize;

    struct Profile {
        name: String,
        age: u32,
        token: String,
    }

    impl Flashable for Profile {
        fn flash_fields(&self, fields: &mut FlashFields<'_>) {
            fields
                .field("Name", &self.name)
                .field("Age", &self.age)
                .entry("Token", &self.token, false);
        }
    }

    #[derive(Serialize)]
    struct Signup {
        name: String,
        age: Option<u32>,
        tags: Vec<String>,
        #[serde(skip_serializing)]
        #[allow(dead_code)]
        password: String,
    }

    #[test]
    fn test_flash_overwrites() {
        let mut flasher = Flasher::new();
        flasher.flash("notice", "first");
        flasher.flash("notice", "second");

        assert_eq!(flasher.get("notice"), Some("second"));
        assert_eq!(flasher.data().len(), 1);
    }

    #[test]
    fn test_flash_display_values() {
        let mut flasher = Flasher::new();
        flasher.flash("count", 3);
        flasher.flash("ok", true);

        assert_eq!(flasher.get("count"), Some("3"));
        assert_eq!(flasher.get("ok"), Some("true"));
    }

    #[test]
    fn test_flash_record_skips_unflashable() {
        let mut flasher = Flasher::new();
        let profile = Profile {
            name: "Tom".to_string(),
            age: 30,
            token: "secret".to_string(),
        };
        flasher.flash_record("profile", &profile);

        assert_eq!(flasher.get("profile.Name"), Some("Tom"));
        assert_eq!(flasher.get("profile.Age"), Some("30"));
        assert_eq!(flasher.get("profile.Token"), None);
    }

    #[test]
    fn test_flash_serialized() {
        let mut flasher = Flasher::new();
        let signup = Signup {
            name: "Tom".to_string(),
            age: None,
            tags: vec!["a".to_string()],
            password: "hunter2".to_string(),
        };
        flasher.flash_serialized("signup", &signup);

        assert_eq!(flasher.get("signup.name"), Some("Tom"));
        assert_eq!(flasher.get("signup.age"), Some(""));
        assert_eq!(flasher.get("signup.tags"), Some("[\"a\"]"));
        assert_eq!(flasher.get("signup.password"), None);
    }

    #[test]
    fn test_flash_serialized_non_record_is_noop() {
        let mut flasher = Flasher::new();
        flasher.flash_serialized("n", &42);
        flasher.flash_serialized("s", "text");
        flasher.flash_serialized("v", &vec![1, 2]);

        assert!(flasher.is_empty());
    }

    #[test]
    fn test_save_empty_sets_nothing() {
        let flasher = Flasher::new();
        let mut response = Response::new();

        assert!(!flasher.save(&mut response));
        assert!(response.cookies().is_empty());
    }

    #[test]
    fn test_save_round_trip() {
        let mut flasher = Flasher::new();
        flasher.flash("notice", "Welcome back, Tom & Jerry!");
        flasher.flash("user.Name", "Tom");

        let mut response = Response::new();
        assert!(flasher.save(&mut response));

        let cookie = response.cookie(FLASH_COOKIE).unwrap();
        assert!(cookie.http_only());
        assert_eq!(&decode_flash(cookie.value()).unwrap(), flasher.data());
    }
}
