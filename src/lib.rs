// lib.rs
//
// ================================================================================
// multimsg - OneBot11 合并转发消息编码器
//
// 将 OneBot11 消息段 (text / face / image / markdown / forward / node)
// 递归编码为 NT 协议消息封包，支持任意嵌套的合并转发。
// ================================================================================

pub mod api;
pub mod element;
pub mod encoder;
pub mod face;
pub mod forward_card;
pub mod log;
pub mod pb;
pub mod segment;

pub use api::{EncoderContext, ForwardUploader, MediaDescriptor, RichMediaApi};
pub use encoder::{ForwardBundle, MAX_FORWARD_DEPTH, MessageEncoder};
pub use forward_card::NewsEntry;
pub use segment::Segment;

use serde::{Deserialize, Serialize};

/// 会话类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[repr(i32)]
pub enum ChatType {
    /// 私聊
    C2c = 1,
    /// 群聊
    Group = 2,
}

/// 消息投递目标
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Peer {
    pub chat_type: ChatType,
    /// 群号或对方 uid
    pub peer_uid: String,
}

impl Peer {
    pub fn group(peer_uid: impl Into<String>) -> Self {
        Self {
            chat_type: ChatType::Group,
            peer_uid: peer_uid.into(),
        }
    }

    pub fn c2c(peer_uid: impl Into<String>) -> Self {
        Self {
            chat_type: ChatType::C2c,
            peer_uid: peer_uid.into(),
        }
    }

    pub fn is_group(&self) -> bool {
        self.chat_type == ChatType::Group
    }
}

/// 当前登录账号信息，未指定发送者的转发节点用它兜底。
/// 每次顶层 generate 前解析一次，作为只读上下文传入，不做全局状态。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotIdentity {
    pub uin: i64,
    pub uid: String,
    pub nick: String,
}
