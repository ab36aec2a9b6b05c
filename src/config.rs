use serde_derive::Deserialize;
use serde_derive::Serialize;

use log::{error, info, warn};
use std::fs::File;
use std::io::prelude::*;

use crate::exception::Exception;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_local")]
    local: bool,
    #[serde(default)]
    worker_threads: usize,
    #[serde(default = "default_public_prefix")]
    public_prefix: String,
    #[serde(default = "default_public_root")]
    public_root: String,
    #[serde(default = "default_static_root")]
    static_root: String,
    #[serde(default = "default_clear_static_on_start")]
    clear_static_on_start: bool,
    #[serde(default = "default_max_request_size")]
    max_request_size: usize,
}

fn default_port() -> u16 {
    7878
}

fn default_local() -> bool {
    true
}

fn default_public_prefix() -> String {
    "/public/".to_string()
}

fn default_public_root() -> String {
    "public".to_string()
}

fn default_static_root() -> String {
    "views/_static".to_string()
}

fn default_clear_static_on_start() -> bool {
    true
}

fn default_max_request_size() -> usize {
    65536 // 64KB
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            port: default_port(),
            local: default_local(),
            worker_threads: num_cpus::get(),
            public_prefix: default_public_prefix(),
            public_root: default_public_root(),
            static_root: default_static_root(),
            clear_static_on_start: default_clear_static_on_start(),
            max_request_size: default_max_request_size(),
        }
    }

    pub fn from_toml(filename: &str) -> Result<Self, Exception> {
        let mut file = File::open(filename)
            .map_err(|e| Exception::ConfigUnreadable(format!("{}: {}", filename, e)))?;
        let mut str_val = String::new();
        file.read_to_string(&mut str_val)
            .map_err(|e| Exception::ConfigUnreadable(format!("{}: {}", filename, e)))?;
        Self::from_toml_str(&str_val)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, Exception> {
        let mut raw_config: Config =
            toml::from_str(content).map_err(|e| Exception::ConfigInvalid(e.to_string()))?;
        if raw_config.worker_threads == 0 {
            raw_config.worker_threads = num_cpus::get();
        }
        if !raw_config.public_prefix.starts_with('/') || !raw_config.public_prefix.ends_with('/') {
            warn!(
                "public_prefix应以/开头并以/结尾，当前值{}将被改为/public/",
                raw_config.public_prefix
            );
            raw_config.public_prefix = default_public_prefix();
        }
        if raw_config.max_request_size == 0 {
            warn!("max_request_size被设置为0，该值将被改为65536。");
            raw_config.max_request_size = default_max_request_size();
        }
        Ok(raw_config)
    }

    /// 读取配置文件，失败时记录错误并使用默认配置
    pub fn load_or_default(filename: &str) -> Self {
        match Self::from_toml(filename) {
            Ok(config) => {
                info!("配置文件{}已载入", filename);
                config
            }
            Err(e) => {
                error!("无法成功从配置文件构建配置对象，使用默认配置：{}", e);
                Self::new()
            }
        }
    }
}

impl Config {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn local(&self) -> bool {
        self.local
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    pub fn public_root(&self) -> &str {
        &self.public_root
    }

    pub fn static_root(&self) -> &str {
        &self.static_root
    }

    pub fn clear_static_on_start(&self) -> bool {
        self.clear_static_on_start
    }

    pub fn max_request_size(&self) -> usize {
        self.max_request_size
    }
}
