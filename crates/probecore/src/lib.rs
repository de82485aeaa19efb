//! Probe Core Library
//!
//! 提供 Telnet 服務探測的核心功能：
//! - `telnet`: 選項協商過濾、banner 讀取迴圈與傳輸抽象
//! - `patterns`: 登入/密碼/忙碌提示樣式
//! - `trace`: 診斷用位元組緩衝區

pub mod patterns;
pub mod telnet;
pub mod trace;

pub use patterns::{PromptKind, PromptPatterns};
pub use telnet::{
    ProbeConfig, ProbeOutcome, ProbeSession, ProbeVerdict, PromptReport, TcpTransport,
    TelnetError, TelnetNegotiator, Transport, TransportConfig,
};
pub use trace::TraceBuffer;
