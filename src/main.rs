// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 演示服务器
//!
//! 加载配置与日志，构建调用链，然后在 Tokio 多线程运行时上接受连接，
//! 每个连接交给一个独立任务处理。Ctrl-C 触发优雅停机。

use std::{
    net::{Ipv4Addr, SocketAddrV4},
    sync::Arc,
};

use jantar_middleware::{config::Config, server::{handle_connection, App}};
use log::{debug, error, info, warn, LevelFilter};
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Config as LogConfig, Root},
};
use tokio::{net::TcpListener, runtime::Builder};

const LOG_CONFIG: &str = "config/log4rs.yaml";
const CONFIG_FILE: &str = "config/development.toml";

fn main() {
    init_logging();

    let config = Config::load_or_default(CONFIG_FILE);
    info!("public root: {}, static root: {}", config.public_root(), config.static_root());

    let runtime = match Builder::new_multi_thread()
        .worker_threads(config.worker_threads())
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("无法创建Tokio运行时：{}", e);
            std::process::exit(1);
        }
    };
    runtime.block_on(serve(config));
}

/// 优先使用 YAML 配置，文件不存在时退回到只输出到控制台的配置
fn init_logging() {
    if log4rs::init_file(LOG_CONFIG, Default::default()).is_ok() {
        return;
    }
    let stdout = ConsoleAppender::builder().build();
    let config = LogConfig::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info));
    match config {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                eprintln!("无法初始化日志系统：{}", e);
            }
        }
        Err(e) => eprintln!("无法构建日志配置：{}", e),
    }
    warn!("未找到{}，日志只输出到控制台", LOG_CONFIG);
}

async fn serve(config: Config) {
    let port = config.port();
    let address = match config.local() {
        true => Ipv4Addr::new(127, 0, 0, 1),
        false => Ipv4Addr::new(0, 0, 0, 0),
    };

    let app = match App::new(config) {
        Ok(app) => Arc::new(app),
        Err(e) => {
            error!("中间件初始化失败：{}", e);
            return;
        }
    };

    let socket = SocketAddrV4::new(address, port);
    let listener = match TcpListener::bind(socket).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("无法绑定端口：{}，错误：{}", port, e);
            return;
        }
    };
    info!("服务端将在{}上监听Socket连接", socket);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut id: u128 = 0;

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (mut stream, addr) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!("接受连接失败：{}", e);
                        continue;
                    }
                };
                debug!("[ID{}]TCP连接已建立：{}", id, addr);
                let app = Arc::clone(&app);
                let conn_id = id;
                tokio::spawn(async move {
                    handle_connection(&mut stream, conn_id, &app).await;
                });
                id += 1;
            }
            _ = &mut shutdown => {
                info!("收到停机信号，正在退出...");
                break;
            }
        }
    }

    match Arc::try_unwrap(app) {
        Ok(mut app) => app.shutdown(),
        Err(_) => warn!("仍有连接在处理中，跳过中间件清理"),
    }
}
