// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 演示应用
//!
//! 一个注册表单，展示 Flash 与 Validation 中间件的完整往返：
//! 提交失败时保存错误与已填写的字段，重定向回表单后由中间件取出并清除。

use log::{debug, info};

use crate::{
    flash::{FlashFields, Flashable, Flasher},
    param::HttpRequestMethod,
    render::RenderArgs,
    request::Request,
    response::Response,
    template::{TemplateManager, TemplateValue},
    util::{escape_html, HtmlBuilder},
    validation::{OverrideMessage, Validator},
};

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

/// 从 POST 请求体中读取的注册表单
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub age: String,
    pub password: String,
}

impl SignupForm {
    pub fn from_request(request: &Request) -> Self {
        let mut form = Self::default();
        for (key, value) in request.form() {
            match key.as_str() {
                "name" => form.name = value,
                "email" => form.email = value,
                "age" => form.age = value,
                "password" => form.password = value,
                _ => {}
            }
        }
        form
    }

    /// 按规则验证表单，错误累积在返回的 `Validator` 中。
    pub fn validate(&self) -> Validator {
        let mut v = Validator::new();
        v.required("name", &self.name);
        v.min_max("name", &self.name, 3, 32)
            .message("Name must be between 3 and 32 characters");
        v.match_regex("email", &self.email, EMAIL_PATTERN)
            .message("Not a valid email address");

        // 无法解析的年龄当作缺失
        let age: Option<i64> = self.age.trim().parse().ok();
        v.required("age", age);
        v.min("age", age, 18);

        v.min("password", &self.password, 8)
            .message("Must be at least 8 symbols long");
        v
    }
}

impl Flashable for SignupForm {
    fn flash_fields(&self, fields: &mut FlashFields<'_>) {
        fields
            .field("name", &self.name)
            .field("email", &self.email)
            .field("age", &self.age)
            .entry("password", &self.password, false);
    }
}

/// 处理调用链未能完成的请求。
pub fn handle(request: &Request, args: &RenderArgs, tm: &TemplateManager, id: u128) -> Response {
    match (request.method(), request.path()) {
        (HttpRequestMethod::Get | HttpRequestMethod::Head, "/") => home(args, tm),
        (HttpRequestMethod::Get | HttpRequestMethod::Head, "/signup") => signup_page(args, tm),
        (HttpRequestMethod::Post, "/signup") => signup_submit(request, id),
        (HttpRequestMethod::Options, _) => {
            let mut response = Response::new();
            response.set_code(204);
            response
        }
        (_, "/") => Response::from_status_code(405, None),
        _ => Response::response_404(),
    }
}

fn home(args: &RenderArgs, tm: &TemplateManager) -> Response {
    let notice = tm.call_text("flash", args, &["notice"]);
    let mut body = String::from("<h1>jantar</h1>");
    if !notice.is_empty() {
        body.push_str(&format!(r#"<p class="flash">{}</p>"#, escape_html(&notice)));
    }
    body.push_str(r#"<p><a href="/signup">Sign up</a></p>"#);
    Response::from_html(HtmlBuilder::from_body("jantar", &body).build())
}

fn signup_page(args: &RenderArgs, tm: &TemplateManager) -> Response {
    let errors = match tm.call("errors", args, &[]) {
        Some(TemplateValue::Errors(errors)) => errors,
        _ => Default::default(),
    };

    let mut body = String::from("<h1>Sign up</h1>");
    if !errors.is_empty() {
        body.push_str(r#"<p class="error">Please correct the errors below.</p>"#);
    }
    body.push_str(r#"<form method="post" action="/signup">"#);
    for (field, kind) in [
        ("name", "text"),
        ("email", "email"),
        ("age", "number"),
        ("password", "password"),
    ] {
        // 密码从不回填
        let key = format!("signup.{}", field);
        let value = match kind {
            "password" => String::new(),
            _ => tm.call_text("flash", args, &[key.as_str()]),
        };
        let class = if tm.call_bool("hasError", args, &[field]) {
            " class=\"error\""
        } else {
            ""
        };
        body.push_str(&format!(
            r#"<p><label{class}>{field} <input type="{kind}" name="{field}" value="{value}"></label></p>"#,
            class = class,
            field = field,
            kind = kind,
            value = escape_html(&value),
        ));
        if let Some(messages) = errors.get(field) {
            for message in messages {
                body.push_str(&format!(r#"<p class="error">{}</p>"#, escape_html(message)));
            }
        }
    }
    body.push_str(r#"<p><button type="submit">Sign up</button></p></form>"#);
    Response::from_html(HtmlBuilder::from_body("Sign up", &body).build())
}

fn signup_submit(request: &Request, id: u128) -> Response {
    let form = SignupForm::from_request(request);
    let validator = form.validate();
    let mut flasher = Flasher::new();

    if validator.has_errors() {
        debug!("[ID{}]注册表单有{}个字段未通过验证", id, validator.errors().len());
        flasher.flash_record("signup", &form);
        let mut response = Response::redirect("/signup");
        validator.save(&mut response);
        flasher.save(&mut response);
        return response;
    }

    info!("[ID{}]新用户注册：{}", id, form.name);
    flasher.flash("notice", format!("Welcome, {}!", form.name));
    let mut response = Response::redirect("/");
    flasher.save(&mut response);
    response
}
