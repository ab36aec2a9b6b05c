// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 连接处理
//!
//! [`App`] 持有启动时构建好的调用链与模板函数注册表，所有连接共享只读引用。
//! [`handle_connection`] 负责单个连接：读取请求、执行调用链、写回响应。

use std::time::Instant;

use log::{debug, error, info, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    config::Config,
    demo,
    exception::Exception,
    middleware::{Chain, Exchange},
    param::HttpRequestMethod,
    request::Request,
    response::Response,
    template::TemplateManager,
};

pub struct App {
    chain: Chain,
    templates: TemplateManager,
    config: Config,
}

impl App {
    /// 按配置构建默认调用链并初始化所有中间件。
    pub fn new(config: Config) -> Result<Self, Exception> {
        let chain = Chain::from_config(&config);
        Self::with_chain(config, chain)
    }

    pub fn with_chain(config: Config, mut chain: Chain) -> Result<Self, Exception> {
        let mut templates = TemplateManager::new();
        chain.initialize_all(&mut templates)?;
        info!("调用链已就绪：{}", chain.names().join(" -> "));
        Ok(Self {
            chain,
            templates,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn templates(&self) -> &TemplateManager {
        &self.templates
    }

    /// 执行调用链，未被中间件完成的请求交给演示应用处理。
    pub fn dispatch(&self, request: &Request, id: u128) -> Response {
        let mut exchange = Exchange::new(id);
        if self.chain.run(request, &mut exchange) {
            let response = demo::handle(request, exchange.render_args(), &self.templates, id);
            // 中间件追加的清除 Cookie 必须随最终响应一起发出
            exchange.replace_response(response);
        }
        let mut response = exchange.into_response();
        response.set_version(request.version());
        if request.method() == HttpRequestMethod::Head {
            response.strip_body();
        }
        response
    }

    pub fn shutdown(&mut self) {
        self.chain.cleanup_all();
        info!("所有中间件已清理");
    }
}

/// 从流中读取一个完整的请求：请求头以及 `Content-Length` 指定长度的请求体。
///
/// 客户端在发送任何数据前关闭连接时返回 `Ok(None)`；
/// 请求超过 `max_size` 时返回 `Err(413)`，报文不完整时返回 `Err(400)`。
async fn read_request<S>(stream: &mut S, max_size: usize, id: u128) -> Result<Option<Vec<u8>>, u16>
where
    S: AsyncRead + Unpin,
{
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    let mut expected: Option<usize> = None;

    loop {
        if let Some(total) = expected {
            if buffer.len() >= total {
                buffer.truncate(total);
                return Ok(Some(buffer));
            }
        }

        let n = match stream.read(&mut chunk).await {
            Ok(n) => n,
            Err(e) => {
                error!("[ID{}]读取TCPStream时遇到错误: {}", id, e);
                return Err(400);
            }
        };
        if n == 0 {
            if buffer.is_empty() {
                return Ok(None);
            }
            warn!("[ID{}]请求在读取完成前被关闭", id);
            return Err(400);
        }
        buffer.extend_from_slice(&chunk[..n]);
        if buffer.len() > max_size {
            warn!("[ID{}]请求超过{}字节的上限", id, max_size);
            return Err(413);
        }

        if expected.is_none() {
            if let Some(head_end) = find_head_end(&buffer) {
                let length = content_length(&buffer[..head_end], max_size).map_err(|code| {
                    warn!("[ID{}]Content-Length无效或超过上限，返回{}", id, code);
                    code
                })?;
                let total = match (head_end + 4).checked_add(length) {
                    Some(total) if total <= max_size => total,
                    _ => {
                        warn!("[ID{}]请求声明的长度超过{}字节的上限", id, max_size);
                        return Err(413);
                    }
                };
                expected = Some(total);
            }
        }
    }
}

fn find_head_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

/// 请求头中声明的请求体长度，没有该头时为 0。
///
/// 非数字返回 `Err(400)`，超过 `max_size`（包括超出整数范围）返回 `Err(413)`。
fn content_length(head: &[u8], max_size: usize) -> Result<usize, u16> {
    let head = String::from_utf8_lossy(head);
    let value = match head
        .split("\r\n")
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
    {
        Some((_, value)) => value.trim(),
        None => return Ok(0),
    };
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(400);
    }
    match value.parse::<usize>() {
        Ok(length) if length <= max_size => Ok(length),
        _ => Err(413),
    }
}

/// # 连接处理器
///
/// 每个连接处理一个请求，写回响应后关闭。
pub async fn handle_connection<S>(stream: &mut S, id: u128, app: &App)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let raw = match read_request(stream, app.config().max_request_size(), id).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return,
        Err(code) => {
            let response = Response::from_status_code(code, None);
            let _ = stream.write_all(&response.as_bytes()).await;
            let _ = stream.flush().await;
            return;
        }
    };
    debug!("[ID{}]HTTP请求接收完毕", id);

    let start_time = Instant::now();

    let request = match Request::try_from(&raw, id) {
        Ok(req) => req,
        Err(e) => {
            warn!("[ID{}]解析HTTP请求失败: {}", id, e);
            let response = match e {
                Exception::UnsupportedHttpVersion => Response::from_status_code(505, None),
                _ => Response::response_400(),
            };
            let _ = stream.write_all(&response.as_bytes()).await;
            let _ = stream.flush().await;
            return;
        }
    };

    let response = app.dispatch(&request, id);
    debug!(
        "[ID{}]HTTP响应构建完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );

    info!(
        "[ID{}] {}, {}, {}, {}, {}, {}, ",
        id,
        request.version(),
        request.path(),
        request.method(),
        response.status_code(),
        response.information(),
        request.user_agent(),
    );

    if let Err(e) = stream.write_all(&response.as_bytes()).await {
        error!("[ID{}]发送响应失败: {}", id, e);
        return;
    }
    let _ = stream.flush().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        flash::Flash, param::FLASH_COOKIE, public::Public, static_pages::Static,
        validation::Validation,
    };
    use std::fs;
    use tempfile::TempDir;
    use tokio::io::duplex;

    fn app(dir: &TempDir) -> App {
        fs::create_dir_all(dir.path().join("public")).unwrap();
        fs::write(dir.path().join("public/app.css"), "body{}").unwrap();
        let public_root = dir.path().join("public");
        let static_root = dir.path().join("static");
        let chain = Chain::new()
            .with(Flash::new())
            .with(Validation::new())
            .with(Public::new("/public/", public_root.to_str().unwrap()))
            .with(Static::new(static_root.to_str().unwrap(), false));
        App::with_chain(Config::new(), chain).unwrap()
    }

    async fn roundtrip(app: &App, raw: &[u8]) -> String {
        let (mut client, mut server) = duplex(64 * 1024);
        client.write_all(raw).await.unwrap();
        client.shutdown().await.unwrap();
        handle_connection(&mut server, 0, app).await;
        drop(server);

        let mut out = Vec::new();
        client.read_to_end(&mut out).await.unwrap();
        String::from_utf8_lossy(&out).into_owned()
    }

    #[test]
    fn test_content_length() {
        assert_eq!(content_length(b"POST / HTTP/1.1\r\ncontent-length: 12", 100), Ok(12));
        assert_eq!(content_length(b"GET / HTTP/1.1\r\nHost: x", 100), Ok(0));
        assert_eq!(content_length(b"POST / HTTP/1.1\r\nContent-Length: 101", 100), Err(413));
        assert_eq!(content_length(b"POST / HTTP/1.1\r\nContent-Length: -1", 100), Err(400));
        assert_eq!(
            content_length(b"POST / HTTP/1.1\r\nContent-Length: 18446744073709551615", 65536),
            Err(413)
        );
        assert_eq!(
            content_length(b"POST / HTTP/1.1\r\nContent-Length: 99999999999999999999999", usize::MAX),
            Err(413)
        );
    }

    #[tokio::test]
    async fn test_serves_public_file() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let out = roundtrip(&app, b"GET /public/app.css HTTP/1.1\r\nHost: x\r\n\r\n").await;

        assert!(out.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(out.contains("Content-Type: text/css;charset=utf-8\r\n"));
        assert!(out.ends_with("\r\n\r\nbody{}"));
    }

    #[tokio::test]
    async fn test_reads_body_by_content_length() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let body = "name=Tom&email=tom%40example.com&age=30&password=hunter22";
        let raw = format!(
            "POST /signup HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let out = roundtrip(&app, raw.as_bytes()).await;

        assert!(out.starts_with("HTTP/1.1 303 See Other\r\n"));
        assert!(out.contains("Location: /\r\n"));
        assert!(out.contains(&format!("Set-Cookie: {}=", FLASH_COOKIE)));
    }

    #[tokio::test]
    async fn test_oversized_request() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let raw = "POST /signup HTTP/1.1\r\nContent-Length: 10000000\r\n\r\n";
        let out = roundtrip(&app, raw.as_bytes()).await;

        assert!(out.starts_with("HTTP/1.1 413 "));
    }

    #[tokio::test]
    async fn test_content_length_at_integer_limit() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let raw = "POST /signup HTTP/1.1\r\nContent-Length: 18446744073709551615\r\n\r\n";
        let out = roundtrip(&app, raw.as_bytes()).await;

        assert!(out.starts_with("HTTP/1.1 413 "));
    }

    #[tokio::test]
    async fn test_length_sum_overflow_without_limit() {
        let (mut client, mut server) = duplex(1024);
        let raw = format!("POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n", usize::MAX);
        client.write_all(raw.as_bytes()).await.unwrap();
        client.shutdown().await.unwrap();

        assert_eq!(read_request(&mut server, usize::MAX, 0).await, Err(413));
    }

    #[tokio::test]
    async fn test_malformed_request() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let out = roundtrip(&app, b"NONSENSE\r\n\r\n").await;

        assert!(out.starts_with("HTTP/1.1 400 "));
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let out = roundtrip(&app, b"HEAD /signup HTTP/1.1\r\n\r\n").await;

        assert!(out.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(out.ends_with("\r\n\r\n"));
    }

    #[tokio::test]
    async fn test_closed_without_data() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        let out = roundtrip(&app, b"").await;

        assert!(out.is_empty());
    }
}
