//! Telnet 協定模組
//!
//! 實作選項協商過濾、banner 讀取迴圈與傳輸抽象

mod negotiator;
mod protocol;
mod session;
mod transport;

pub use negotiator::TelnetNegotiator;
pub use protocol::{
    is_negotiable_option, normalize_line_endings, TelnetCommand, TelnetOption, EOL, IAC,
};
pub use session::{ProbeConfig, ProbeOutcome, ProbeSession, ProbeVerdict, PromptReport};
pub use transport::{TcpTransport, TelnetError, Transport, TransportConfig};
