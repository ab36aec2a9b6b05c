// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 每个请求独有的渲染参数，由中间件写入，模板函数读取。

use std::collections::HashMap;

use crate::{
    param::{ERRORS_KEY, FLASH_KEY},
    token::{ErrorSet, FlashMap},
};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderValue {
    Flash(FlashMap),
    Errors(ErrorSet),
}

#[derive(Debug, Default, Clone)]
pub struct RenderArgs {
    values: HashMap<String, RenderValue>,
}

impl RenderArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: RenderValue) {
        self.values.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&RenderValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn set_flash(&mut self, flash: FlashMap) {
        self.insert(FLASH_KEY, RenderValue::Flash(flash));
    }

    pub fn set_errors(&mut self, errors: ErrorSet) {
        self.insert(ERRORS_KEY, RenderValue::Errors(errors));
    }

    /// `_flash` 下的映射，不存在或类型不符时为 `None`
    pub fn flash_map(&self) -> Option<&FlashMap> {
        match self.values.get(FLASH_KEY) {
            Some(RenderValue::Flash(map)) => Some(map),
            _ => None,
        }
    }

    /// `_errors` 下的映射，不存在或类型不符时为 `None`
    pub fn error_map(&self) -> Option<&ErrorSet> {
        match self.values.get(ERRORS_KEY) {
            Some(RenderValue::Errors(map)) => Some(map),
            _ => None,
        }
    }
}
