//! Telnet 協定常數和回覆策略
//!
//! 實作 RFC 854 Telnet 協定的命令位元組、選項代碼與行尾正規化

/// Telnet IAC (Interpret As Command) - 0xFF
pub const IAC: u8 = 255;

/// Carriage Return - 0x0D
pub const CR: u8 = 0x0D;

/// Line Feed - 0x0A
pub const LF: u8 = 0x0A;

/// NUL - 0x00
pub const NUL: u8 = 0x00;

/// Telnet 行尾序列 (CR LF)
pub const EOL: &[u8] = b"\r\n";

/// Telnet 命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TelnetCommand {
    /// End of File
    EndOfFile = 236,
    /// Suspend Process
    SuspendProcess = 237,
    /// Abort Process
    AbortProcess = 238,
    /// End of Record
    EndOfRecord = 239,
    /// Sub-negotiation End
    Se = 240,
    /// No Operation
    Nop = 241,
    /// Data Mark
    DataMark = 242,
    /// Break
    Break = 243,
    /// Interrupt Process
    InterruptProcess = 244,
    /// Abort Output
    AbortOutput = 245,
    /// Are You There
    AreYouThere = 246,
    /// Erase Character
    EraseCharacter = 247,
    /// Erase Line
    EraseLine = 248,
    /// Go Ahead
    GoAhead = 249,
    /// Sub-negotiation Begin
    Sb = 250,
    /// Will
    Will = 251,
    /// Won't
    Wont = 252,
    /// Do
    Do = 253,
    /// Don't
    Dont = 254,
}

impl TelnetCommand {
    /// 從位元組解析 Telnet 命令
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            236 => Some(Self::EndOfFile),
            237 => Some(Self::SuspendProcess),
            238 => Some(Self::AbortProcess),
            239 => Some(Self::EndOfRecord),
            240 => Some(Self::Se),
            241 => Some(Self::Nop),
            242 => Some(Self::DataMark),
            243 => Some(Self::Break),
            244 => Some(Self::InterruptProcess),
            245 => Some(Self::AbortOutput),
            246 => Some(Self::AreYouThere),
            247 => Some(Self::EraseCharacter),
            248 => Some(Self::EraseLine),
            249 => Some(Self::GoAhead),
            250 => Some(Self::Sb),
            251 => Some(Self::Will),
            252 => Some(Self::Wont),
            253 => Some(Self::Do),
            254 => Some(Self::Dont),
            _ => None,
        }
    }

    /// 獲取命令的位元組值
    pub fn as_byte(&self) -> u8 {
        *self as u8
    }
}

/// Telnet 選項
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TelnetOption {
    /// Binary Transmission
    BinaryTransmission = 0,
    /// Echo
    Echo = 1,
    /// Reconnection
    Reconnection = 2,
    /// Suppress Go Ahead
    SuppressGoAhead = 3,
    /// Approx Message Size Negotiation
    ApproxMessageSize = 4,
    /// Status
    Status = 5,
    /// Timing Mark
    TimingMark = 6,
    /// Remote Controlled Trans and Echo
    Rcte = 7,
    /// Output Line Width
    OutputLineWidth = 8,
    /// Output Page Size
    OutputPageSize = 9,
    /// Output Carriage-Return Disposition
    Naocrd = 10,
    /// Output Horizontal Tab Stops
    Naohts = 11,
    /// Output Horizontal Tab Disposition
    Naohtd = 12,
    /// Output Formfeed Disposition
    Naoffd = 13,
    /// Output Vertical Tabstops
    Naovts = 14,
    /// Output Vertical Tab Disposition
    Naovtd = 15,
    /// Output Linefeed Disposition
    Naolfd = 16,
    /// Extended ASCII
    ExtendedAscii = 17,
    /// Logout
    Logout = 18,
    /// Byte Macro
    ByteMacro = 19,
    /// Data Entry Terminal
    DataEntryTerminal = 20,
    /// SUPDUP
    Supdup = 21,
    /// SUPDUP Output
    SupdupOutput = 22,
    /// Send Location
    SendLocation = 23,
    /// Terminal Type
    TerminalType = 24,
    /// End of Record
    EndOfRecord = 25,
    /// TACACS User Identification
    TacacsUserId = 26,
    /// Output Marking
    OutputMarking = 27,
    /// Terminal Location Number
    TerminalLocation = 28,
    /// Telnet 3270 Regime
    Telnet3270 = 29,
    /// X.3 PAD
    X3Pad = 30,
    /// Window Size (NAWS)
    Naws = 31,
    /// Terminal Speed
    TerminalSpeed = 32,
    /// Remote Flow Control
    RemoteFlowControl = 33,
    /// Linemode
    Linemode = 34,
    /// X Display Location
    XDisplayLocation = 35,
    /// Environment Variables (Old)
    OldEnviron = 36,
    /// Authentication
    Authentication = 37,
    /// Encryption
    Encryption = 38,
    /// Environment Variables (New)
    NewEnviron = 39,
    /// Unknown option
    Unknown(u8),
    /// Extended-Options-List
    Exopl = 255,
}

impl TelnetOption {
    /// 從位元組解析 Telnet 選項
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => Self::BinaryTransmission,
            1 => Self::Echo,
            2 => Self::Reconnection,
            3 => Self::SuppressGoAhead,
            4 => Self::ApproxMessageSize,
            5 => Self::Status,
            6 => Self::TimingMark,
            7 => Self::Rcte,
            8 => Self::OutputLineWidth,
            9 => Self::OutputPageSize,
            10 => Self::Naocrd,
            11 => Self::Naohts,
            12 => Self::Naohtd,
            13 => Self::Naoffd,
            14 => Self::Naovts,
            15 => Self::Naovtd,
            16 => Self::Naolfd,
            17 => Self::ExtendedAscii,
            18 => Self::Logout,
            19 => Self::ByteMacro,
            20 => Self::DataEntryTerminal,
            21 => Self::Supdup,
            22 => Self::SupdupOutput,
            23 => Self::SendLocation,
            24 => Self::TerminalType,
            25 => Self::EndOfRecord,
            26 => Self::TacacsUserId,
            27 => Self::OutputMarking,
            28 => Self::TerminalLocation,
            29 => Self::Telnet3270,
            30 => Self::X3Pad,
            31 => Self::Naws,
            32 => Self::TerminalSpeed,
            33 => Self::RemoteFlowControl,
            34 => Self::Linemode,
            35 => Self::XDisplayLocation,
            36 => Self::OldEnviron,
            37 => Self::Authentication,
            38 => Self::Encryption,
            39 => Self::NewEnviron,
            255 => Self::Exopl,
            other => Self::Unknown(other),
        }
    }

    /// 獲取選項的位元組值
    pub fn as_byte(&self) -> u8 {
        match self {
            Self::BinaryTransmission => 0,
            Self::Echo => 1,
            Self::Reconnection => 2,
            Self::SuppressGoAhead => 3,
            Self::ApproxMessageSize => 4,
            Self::Status => 5,
            Self::TimingMark => 6,
            Self::Rcte => 7,
            Self::OutputLineWidth => 8,
            Self::OutputPageSize => 9,
            Self::Naocrd => 10,
            Self::Naohts => 11,
            Self::Naohtd => 12,
            Self::Naoffd => 13,
            Self::Naovts => 14,
            Self::Naovtd => 15,
            Self::Naolfd => 16,
            Self::ExtendedAscii => 17,
            Self::Logout => 18,
            Self::ByteMacro => 19,
            Self::DataEntryTerminal => 20,
            Self::Supdup => 21,
            Self::SupdupOutput => 22,
            Self::SendLocation => 23,
            Self::TerminalType => 24,
            Self::EndOfRecord => 25,
            Self::TacacsUserId => 26,
            Self::OutputMarking => 27,
            Self::TerminalLocation => 28,
            Self::Telnet3270 => 29,
            Self::X3Pad => 30,
            Self::Naws => 31,
            Self::TerminalSpeed => 32,
            Self::RemoteFlowControl => 33,
            Self::Linemode => 34,
            Self::XDisplayLocation => 35,
            Self::OldEnviron => 36,
            Self::Authentication => 37,
            Self::Encryption => 38,
            Self::NewEnviron => 39,
            Self::Exopl => 255,
            Self::Unknown(b) => *b,
        }
    }
}

/// 判斷選項位元組是否在可協商範圍內
///
/// 範圍為 Binary Transmission 到 New Environ（0-39），外加
/// Extended-Options-List（255）；範圍外的選項不剝離、原樣保留
pub fn is_negotiable_option(byte: u8) -> bool {
    matches!(byte, 0..=39 | 255)
}

/// 行尾正規化
///
/// 先把 CR NUL 合併為 CR，再把 CR LF 合併為 `\n`，兩段替換
/// 依序進行。只處理單一 chunk 內的組合，跨 chunk 邊界被切開的
/// 位元組對不會重組
pub fn normalize_line_endings(data: &[u8]) -> Vec<u8> {
    // CR NUL -> CR
    let mut pass1 = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        if data[i] == CR && i + 1 < data.len() && data[i + 1] == NUL {
            pass1.push(CR);
            i += 2;
        } else {
            pass1.push(data[i]);
            i += 1;
        }
    }

    // CR LF -> LF
    let mut out = Vec::with_capacity(pass1.len());
    let mut i = 0;
    while i < pass1.len() {
        if pass1[i] == CR && i + 1 < pass1.len() && pass1[i + 1] == LF {
            out.push(LF);
            i += 2;
        } else {
            out.push(pass1[i]);
            i += 1;
        }
    }
    out
}

/// 生成協商命令的回覆
///
/// 策略：除了 Binary Transmission（雙向接受）、Suppress Go Ahead
/// （接受遠端啟用）之外，其餘選項一律拒絕；遠端想啟用 Echo 時
/// 明確回 DONT，由本端完全掌控顯示
pub fn negotiate_reply(cmd: TelnetCommand, option: TelnetOption) -> Vec<u8> {
    let opt = option.as_byte();
    match cmd {
        TelnetCommand::Do => {
            if option == TelnetOption::BinaryTransmission {
                vec![IAC, TelnetCommand::Will.as_byte(), opt]
            } else {
                vec![IAC, TelnetCommand::Wont.as_byte(), opt]
            }
        }
        TelnetCommand::Dont => vec![IAC, TelnetCommand::Wont.as_byte(), opt],
        TelnetCommand::Will => match option {
            TelnetOption::BinaryTransmission => vec![IAC, TelnetCommand::Do.as_byte(), opt],
            TelnetOption::Echo => vec![IAC, TelnetCommand::Dont.as_byte(), opt],
            TelnetOption::SuppressGoAhead => vec![IAC, TelnetCommand::Do.as_byte(), opt],
            _ => vec![IAC, TelnetCommand::Dont.as_byte(), opt],
        },
        TelnetCommand::Wont => vec![IAC, TelnetCommand::Dont.as_byte(), opt],
        _ => vec![],
    }
}
