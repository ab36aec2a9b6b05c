//! 通过 `App::dispatch` 驱动完整调用链的集成测试，文件根目录均为临时目录。

use std::fs;

use jantar_middleware::{
    param::{ERRORS_COOKIE, FLASH_COOKIE},
    App, Config, Request, Response,
};
use tempfile::TempDir;

struct Site {
    dir: TempDir,
}

impl Site {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("public/css")).unwrap();
        fs::write(dir.path().join("public/css/app.css"), "body{}").unwrap();
        fs::create_dir_all(dir.path().join("static/blog")).unwrap();
        fs::write(dir.path().join("static/index.html"), "<h1>static home</h1>").unwrap();
        fs::write(dir.path().join("static/blog/index.html"), "<h1>blog</h1>").unwrap();
        Self { dir }
    }

    fn app(&self, clear_static: bool) -> App {
        let toml = format!(
            "public_root = '{}'\nstatic_root = '{}'\nclear_static_on_start = {}\n",
            self.dir.path().join("public").display(),
            self.dir.path().join("static").display(),
            clear_static
        );
        App::new(Config::from_toml_str(&toml).unwrap()).unwrap()
    }
}

fn get(path: &str, cookies: &str) -> Request {
    let mut raw = format!("GET {} HTTP/1.1\r\nHost: localhost\r\n", path);
    if !cookies.is_empty() {
        raw.push_str(&format!("Cookie: {}\r\n", cookies));
    }
    raw.push_str("\r\n");
    Request::try_from(raw.as_bytes(), 0).unwrap()
}

fn post_signup(body: &str) -> Request {
    let raw = format!(
        "POST /signup HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    Request::try_from(raw.as_bytes(), 0).unwrap()
}

/// 模拟浏览器：把响应中未过期的 Cookie 拼成下一个请求的 Cookie 头
fn cookie_jar(response: &Response) -> String {
    response
        .cookies()
        .iter()
        .filter(|c| !c.is_expired())
        .map(|c| format!("{}={}", c.name(), c.value()))
        .collect::<Vec<_>>()
        .join("; ")
}

fn body(response: &Response) -> String {
    String::from_utf8(response.content().unwrap().to_vec()).unwrap()
}

#[test]
fn test_failed_signup_round_trip() {
    let site = Site::new();
    let app = site.app(false);

    let submitted = app.dispatch(&post_signup("name=Al&email=al%40example.com&age=12&password=hunter22"), 1);
    assert_eq!(submitted.status_code(), 303);
    assert_eq!(submitted.location(), Some("/signup"));
    let jar = cookie_jar(&submitted);
    assert!(jar.contains(ERRORS_COOKIE));
    assert!(jar.contains(FLASH_COOKIE));

    // 重定向后的页面读到错误与回填值，并清除两个 Cookie
    let page = app.dispatch(&get("/signup", &jar), 2);
    assert_eq!(page.status_code(), 200);
    let html = body(&page);
    assert!(html.contains("Must be larger than 18"));
    assert!(html.contains("Name must be between 3 and 32 characters"));
    assert!(html.contains(r#"name="name" value="Al""#));
    assert!(html.contains(r#"name="email" value="al@example.com""#));
    assert!(page.cookie(ERRORS_COOKIE).unwrap().is_expired());
    assert!(page.cookie(FLASH_COOKIE).unwrap().is_expired());

    // 之后的请求不再带有旧状态
    let again = app.dispatch(&get("/signup", ""), 3);
    assert!(!body(&again).contains("Must be larger than 18"));
    assert!(again.cookies().is_empty());
}

#[test]
fn test_successful_signup_flashes_notice() {
    let site = Site::new();
    let app = site.app(true);

    let submitted = app.dispatch(&post_signup("name=Tom&email=tom%40example.com&age=30&password=hunter22"), 1);
    assert_eq!(submitted.location(), Some("/"));
    assert!(submitted.cookie(ERRORS_COOKIE).is_none());

    let home = app.dispatch(&get("/", &cookie_jar(&submitted)), 2);
    assert!(body(&home).contains("Welcome, Tom!"));
    assert!(home.cookie(FLASH_COOKIE).unwrap().is_expired());
}

#[test]
fn test_resubmission_replaces_cleared_cookie() {
    let site = Site::new();
    let app = site.app(false);

    let first = app.dispatch(&post_signup("name=&email=&age=&password="), 1);
    let jar = cookie_jar(&first);

    // 带着旧错误再次提交：新的错误 Cookie 覆盖中间件追加的清除指令
    let raw = format!(
        "POST /signup HTTP/1.1\r\nCookie: {}\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 6\r\n\r\nname=X",
        jar
    );
    let second = app.dispatch(&Request::try_from(raw.as_bytes(), 0).unwrap(), 2);
    let errors = second.cookie(ERRORS_COOKIE).unwrap();
    assert!(!errors.is_expired());
    assert_eq!(
        second.cookies().iter().filter(|c| c.name() == ERRORS_COOKIE).count(),
        1
    );
}

#[test]
fn test_public_file_still_clears_cookies() {
    let site = Site::new();
    let app = site.app(false);

    let response = app.dispatch(&get("/public/css/app.css", "JANTAR_FLASH=notice=hi"), 1);
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.content_type(), Some("text/css;charset=utf-8"));
    assert!(response.cookie(FLASH_COOKIE).unwrap().is_expired());
}

#[test]
fn test_static_pages() {
    let site = Site::new();
    let app = site.app(false);

    assert_eq!(body(&app.dispatch(&get("/", ""), 1)), "<h1>static home</h1>");
    assert_eq!(body(&app.dispatch(&get("/blog/index.html", ""), 2)), "<h1>blog</h1>");
    // 只有根路径改写为 index.html
    assert_eq!(app.dispatch(&get("/blog/", ""), 5).status_code(), 404);
    assert_eq!(app.dispatch(&get("/blog/missing.html", ""), 3).status_code(), 404);
    assert_eq!(app.dispatch(&get("/.hidden", ""), 4).status_code(), 404);
}

#[test]
fn test_static_cleared_on_start() {
    let site = Site::new();
    let app = site.app(true);

    assert!(!site.dir.path().join("static").exists());
    let home = app.dispatch(&get("/", ""), 1);
    assert!(body(&home).contains(r#"<a href="/signup">"#));
}

#[test]
fn test_conditional_get() {
    let site = Site::new();
    let app = site.app(false);

    let first = app.dispatch(&get("/public/css/app.css", ""), 1);
    let stamp = jantar_middleware::util::format_http_date(&first.last_modified().unwrap());

    let raw = format!(
        "GET /public/css/app.css HTTP/1.1\r\nIf-Modified-Since: {}\r\n\r\n",
        stamp
    );
    let second = app.dispatch(&Request::try_from(raw.as_bytes(), 0).unwrap(), 2);
    assert_eq!(second.status_code(), 304);
    assert!(second.content().is_none());
}
