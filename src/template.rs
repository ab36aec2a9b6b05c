// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 模板函数注册表
//!
//! 中间件在 `initialize` 阶段向 `TemplateManager` 注册查找函数，
//! 模板引擎渲染时按名称调用。注册表在启动时构建一次，之后只读，
//! 函数不会被注销。

use std::collections::HashMap;

use log::{debug, warn};

use crate::{render::RenderArgs, token::ErrorSet};

/// 模板函数的返回值
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    Nothing,
    Bool(bool),
    Text(String),
    Errors(ErrorSet),
}

pub type TemplateFunc = Box<dyn Fn(&RenderArgs, &[&str]) -> TemplateValue + Send + Sync>;

#[derive(Default)]
pub struct TemplateManager {
    funcs: HashMap<String, TemplateFunc>,
}

impl TemplateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册模板函数，同名函数会被覆盖。
    pub fn add_tmpl_func<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&RenderArgs, &[&str]) -> TemplateValue + Send + Sync + 'static,
    {
        if self.funcs.insert(name.to_string(), Box::new(func)).is_some() {
            warn!("模板函数{}被重复注册，旧的实现已被覆盖", name);
        } else {
            debug!("注册模板函数：{}", name);
        }
    }

    pub fn has_func(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    /// 按名称调用模板函数，函数不存在时返回 `None`。
    pub fn call(&self, name: &str, args: &RenderArgs, params: &[&str]) -> Option<TemplateValue> {
        self.funcs.get(name).map(|func| func(args, params))
    }

    /// 便捷方法：调用返回文本的函数，其他返回值视为空字符串
    pub fn call_text(&self, name: &str, args: &RenderArgs, params: &[&str]) -> String {
        match self.call(name, args, params) {
            Some(TemplateValue::Text(s)) => s,
            _ => String::new(),
        }
    }

    /// 便捷方法：调用返回布尔值的函数，其他返回值视为 `false`
    pub fn call_bool(&self, name: &str, args: &RenderArgs, params: &[&str]) -> bool {
        matches!(self.call(name, args, params), Some(TemplateValue::Bool(true)))
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }
}
