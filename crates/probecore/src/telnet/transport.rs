//! 傳輸層抽象
//!
//! 探測流程只透過 `Transport` 介面讀寫位元組；實際的 TCP 連線
//! 由 `TcpTransport` 提供，方便測試時注入腳本化的假傳輸

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

/// Telnet 探測錯誤
#[derive(Debug, Error)]
pub enum TelnetError {
    #[error("連線被拒絕")]
    ConnectionRefused,

    #[error("連線已關閉")]
    ConnectionClosed,

    #[error("連線失敗: {0}")]
    ConnectionFailed(io::Error),

    #[error("連線逾時")]
    Timeout,

    #[error("DNS 解析失敗: {0}")]
    DnsResolutionFailed(String),
}

impl From<io::Error> for TelnetError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => TelnetError::ConnectionRefused,
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset => TelnetError::ConnectionClosed,
            _ => TelnetError::ConnectionFailed(err),
        }
    }
}

/// 原始傳輸介面
///
/// `read` 回傳 `Ok(None)` 表示這次等待內沒有新資料（逾時或對端
/// 正常關閉），呼叫端視為「暫無資料」而非錯誤
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// 讀取一段資料，最多等待 `wait`
    async fn read(&mut self, wait: Duration) -> Result<Option<Vec<u8>>, TelnetError>;

    /// 寫出一段資料
    async fn write(&mut self, data: &[u8]) -> Result<(), TelnetError>;
}

/// TCP 傳輸設定
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// 連線逾時
    pub connect_timeout: Duration,
    /// 讀取緩衝區大小
    pub read_buffer_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_buffer_size: 8192,
        }
    }
}

/// TCP 傳輸
pub struct TcpTransport {
    stream: TcpStream,
    read_buffer_size: usize,
}

impl TcpTransport {
    /// 連線到遠端主機
    ///
    /// # Arguments
    /// * `host` - 主機名稱或 IP
    /// * `port` - 連接埠
    pub async fn dial(host: &str, port: u16, config: &TransportConfig) -> Result<Self, TelnetError> {
        let addr = format!("{}:{}", host, port);
        let socket_addrs: Vec<SocketAddr> = tokio::net::lookup_host(&addr)
            .await
            .map_err(|e| TelnetError::DnsResolutionFailed(e.to_string()))?
            .collect();

        if socket_addrs.is_empty() {
            return Err(TelnetError::DnsResolutionFailed(format!(
                "無法解析主機: {}",
                host
            )));
        }

        debug!("已解析到位址: {:?}", socket_addrs);

        let stream = timeout(config.connect_timeout, TcpStream::connect(&socket_addrs[0]))
            .await
            .map_err(|_| TelnetError::Timeout)?
            .map_err(TelnetError::from)?;

        stream.set_nodelay(true)?;
        info!("已連線到 {}:{}", host, port);

        Ok(Self {
            stream,
            read_buffer_size: config.read_buffer_size,
        })
    }
}

impl Transport for TcpTransport {
    async fn read(&mut self, wait: Duration) -> Result<Option<Vec<u8>>, TelnetError> {
        let mut buffer = vec![0u8; self.read_buffer_size];
        match timeout(wait, self.stream.read(&mut buffer)).await {
            // 這次等待沒有資料
            Err(_) => Ok(None),
            // 對端關閉，同樣視為暫無資料，由外層期限決定何時放棄
            Ok(Ok(0)) => Ok(None),
            Ok(Ok(n)) => {
                buffer.truncate(n);
                debug!("收到 {} 位元組", n);
                Ok(Some(buffer))
            }
            Ok(Err(e)) => match e.kind() {
                io::ErrorKind::UnexpectedEof
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted => Ok(None),
                _ => Err(e.into()),
            },
        }
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), TelnetError> {
        self.stream.write_all(data).await?;
        self.stream.flush().await?;
        Ok(())
    }
}
