use crate::{
    cookie::Cookie,
    param::*,
    util::{format_http_date, HtmlBuilder},
};

use bytes::Bytes;
use chrono::prelude::*;
use log::error;

/// 正在构建中的 HTTP 响应。
///
/// 中间件按顺序修改同一个 `Response`：Flash 与 Validation 只追加 `Set-Cookie`，
/// 文件服务写入状态码与响应体。
#[derive(Debug, Clone)]
pub struct Response {
    version: HttpVersion,
    status_code: u16,
    information: String,
    content_type: Option<String>,
    content_length: u64,
    date: DateTime<Utc>,
    server_name: String,
    last_modified: Option<DateTime<Utc>>,
    location: Option<String>,
    cookies: Vec<Cookie>,
    content: Option<Bytes>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        Self {
            version: HttpVersion::V1_1,
            status_code: 200,
            information: "OK".to_string(),
            content_type: None,
            content_length: 0,
            date: Utc::now(),
            server_name: SERVER_NAME.to_string(),
            last_modified: None,
            location: None,
            cookies: Vec::new(),
            content: None,
        }
    }

    pub fn from_status_code(code: u16, note: Option<&str>) -> Self {
        let mut response = Self::new();
        let html = HtmlBuilder::from_status_code(code, note).build();
        response
            .set_code(code)
            .set_content(Bytes::from(html), "text/html;charset=utf-8");
        response
    }

    pub fn from_html(html: String) -> Self {
        let mut response = Self::new();
        response.set_content(Bytes::from(html), "text/html;charset=utf-8");
        response
    }

    pub fn response_404() -> Self {
        Self::from_status_code(404, Some("<h2>噢！</h2><p>你指定的网页无法找到。</p>"))
    }

    pub fn response_400() -> Self {
        Self::from_status_code(400, None)
    }

    /// 303 重定向，浏览器会以 GET 请求新地址
    pub fn redirect(location: &str) -> Self {
        let mut response = Self::new();
        response.set_code(303);
        response.location = Some(location.to_string());
        response
    }

    pub fn set_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self.information = match STATUS_CODES.get(&code) {
            Some(&info) => info.to_string(),
            None => {
                error!("非法的状态码：{}。这条错误说明代码编写出现了错误。", code);
                "Unknown".to_string()
            }
        };
        self
    }

    pub fn set_version(&mut self, version: HttpVersion) -> &mut Self {
        self.version = version;
        self
    }

    pub fn set_content(&mut self, content: Bytes, mime: &str) -> &mut Self {
        self.content_length = content.len() as u64;
        self.content_type = Some(mime.to_string());
        self.content = Some(content);
        self
    }

    /// 只保留头部信息（用于 HEAD 请求），`Content-Length` 保持原值。
    pub fn strip_body(&mut self) -> &mut Self {
        self.content = None;
        self
    }

    /// 清空响应体与内容相关头部（用于 304）。
    pub fn clear_content(&mut self) -> &mut Self {
        self.content = None;
        self.content_type = None;
        self.content_length = 0;
        self
    }

    pub fn set_last_modified(&mut self, time: DateTime<Utc>) -> &mut Self {
        self.last_modified = Some(time);
        self
    }

    pub fn add_cookie(&mut self, cookie: Cookie) -> &mut Self {
        // 同名 Cookie 只保留最后一次写入
        self.cookies.retain(|c| c.name() != cookie.name());
        self.cookies.push(cookie);
        self
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        let mut header = format!(
            "{} {} {}{}",
            self.version, self.status_code, self.information, CRLF
        );
        if let Some(t) = &self.content_type {
            header.push_str(&["Content-Type: ", t, CRLF].concat());
        }
        header.push_str(&format!("Content-Length: {}{}", self.content_length, CRLF));
        header.push_str(&["Date: ", &format_http_date(&self.date), CRLF].concat());
        header.push_str(&["Server: ", &self.server_name, CRLF].concat());
        if let Some(time) = &self.last_modified {
            header.push_str(&["Last-Modified: ", &format_http_date(time), CRLF].concat());
        }
        if let Some(location) = &self.location {
            header.push_str(&["Location: ", location, CRLF].concat());
        }
        for cookie in &self.cookies {
            header.push_str(&["Set-Cookie: ", &cookie.to_header_value(), CRLF].concat());
        }
        header.push_str(CRLF);

        let body: &[u8] = self.content.as_deref().unwrap_or_default();
        [header.as_bytes(), body].concat()
    }
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    pub fn content(&self) -> Option<&Bytes> {
        self.content.as_ref()
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_new() {
        let response = Response::new();

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.information(), "OK");
        assert!(response.cookies().is_empty());
    }

    #[test]
    fn test_response_as_bytes_basic() {
        let response = Response::new();
        let bytes = response.as_bytes();
        let response_str = String::from_utf8_lossy(&bytes);

        assert!(response_str.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response_str.contains("Content-Length: 0"));
        assert!(response_str.contains("Server: jantar-middleware"));
        assert!(response_str.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_response_as_bytes_with_content() {
        let mut response = Response::new();
        response.set_content(Bytes::from("Hello"), "text/plain");

        let bytes = response.as_bytes();
        let response_str = String::from_utf8_lossy(&bytes);

        assert!(response_str.contains("Content-Type: text/plain"));
        assert!(response_str.contains("Content-Length: 5"));
        assert!(response_str.ends_with("\r\n\r\nHello"));
    }

    #[test]
    fn test_strip_body_keeps_length() {
        let mut response = Response::new();
        response
            .set_content(Bytes::from("Hello"), "text/plain")
            .strip_body();

        let response_str = String::from_utf8_lossy(&response.as_bytes()).to_string();
        assert!(response_str.contains("Content-Length: 5"));
        assert!(!response_str.contains("Hello"));
    }

    #[test]
    fn test_status_code_setter() {
        for (code, expected_info) in [
            (200, "OK"),
            (303, "See Other"),
            (304, "Not Modified"),
            (404, "Not Found"),
            (500, "Internal Server Error"),
        ] {
            let mut response = Response::new();
            response.set_code(code);
            assert_eq!(response.status_code(), code);
            assert_eq!(response.information(), expected_info);
        }
    }

    #[test]
    fn test_set_cookie_headers() {
        let mut response = Response::new();
        response
            .add_cookie(Cookie::expired(FLASH_COOKIE))
            .add_cookie(Cookie::session(ERRORS_COOKIE, "name=Required"))
            .add_cookie(Cookie::session(FLASH_COOKIE, "notice=Saved"));

        assert_eq!(response.cookies().len(), 2);
        assert_eq!(response.cookie(FLASH_COOKIE).unwrap().value(), "notice=Saved");

        let response_str = String::from_utf8_lossy(&response.as_bytes()).to_string();
        assert!(response_str.contains("Set-Cookie: JANTAR_ERRORS=name=Required; Path=/; HttpOnly\r\n"));
        assert!(response_str.contains("Set-Cookie: JANTAR_FLASH=notice=Saved; Path=/; HttpOnly\r\n"));
    }

    #[test]
    fn test_redirect() {
        let response = Response::redirect("/signup");
        let response_str = String::from_utf8_lossy(&response.as_bytes()).to_string();

        assert!(response_str.starts_with("HTTP/1.1 303 See Other"));
        assert!(response_str.contains("Location: /signup\r\n"));
    }

    #[test]
    fn test_404_page() {
        let response = Response::response_404();
        assert_eq!(response.status_code(), 404);
        assert_eq!(response.content_type(), Some("text/html;charset=utf-8"));
        assert!(response.content_length() > 0);
    }
}
